//! Selection-set traversal: field collection, the field execution loop,
//! result completion, and the coordination of concurrently settling fields.

use std::collections::HashSet;

use futures::future::BoxFuture;
use futures::stream::{FuturesOrdered, StreamExt as _};
use indexmap::IndexMap;

use crate::ast::{Directive, Field as AstField, InputValue, Selection, SelectionSet, Type, TypeCondition};
use crate::executor::{
    bind_arguments, ExecutionError, Executor, FieldError, ResponsePath, SourcePosition, Variables,
};
use crate::resolver::{default_resolve, Resolved, ResolvedValue, ResolveInfo, ResolverContext};
use crate::schema::meta::{Field, MetaType, ObjectMeta};
use crate::value::{Object, Value};

/// The field selections of one selection set, grouped by response key.
///
/// Key order is the order of first occurrence and fixes response order for
/// good; resolution and settlement order never change it.
pub(crate) type FieldGroups<'a, 'd> = IndexMap<&'a str, Vec<&'a AstField<'d>>>;

/// Spread fragments and group the fields of a selection set by response key.
pub(crate) fn collect_fields<'a, 'd>(
    executor: &Executor<'a, 'd>,
    object: &ObjectMeta,
    selection_set: &'a SelectionSet<'d>,
    groups: &mut FieldGroups<'a, 'd>,
    visited_fragments: &mut HashSet<&'a str>,
) {
    for selection in &selection_set.items {
        match *selection {
            Selection::Field(ref f) => {
                if is_excluded(&f.directives, executor.variables()) {
                    continue;
                }

                let response_key = f.alias.as_deref().unwrap_or(&f.name);
                groups.entry(response_key).or_default().push(f);
            }
            Selection::FragmentSpread(ref spread) => {
                if is_excluded(&spread.directives, executor.variables()) {
                    continue;
                }
                if !visited_fragments.insert(&spread.fragment_name) {
                    continue;
                }

                // Unknown fragments in an unvalidated document drop their
                // fields rather than abort the traversal.
                if let Some(fragment) = executor.fragment_by_name(&spread.fragment_name) {
                    let TypeCondition::On(ref condition) = fragment.type_condition;
                    if executor
                        .schema()
                        .fragment_condition_matches(condition, object)
                    {
                        collect_fields(
                            executor,
                            object,
                            &fragment.selection_set,
                            groups,
                            visited_fragments,
                        );
                    }
                }
            }
            Selection::InlineFragment(ref fragment) => {
                if is_excluded(&fragment.directives, executor.variables()) {
                    continue;
                }

                let applies = match fragment.type_condition {
                    Some(TypeCondition::On(ref condition)) => executor
                        .schema()
                        .fragment_condition_matches(condition, object),
                    None => true,
                };
                if applies {
                    collect_fields(
                        executor,
                        object,
                        &fragment.selection_set,
                        groups,
                        visited_fragments,
                    );
                }
            }
        }
    }
}

/// Whether `@skip`/`@include` directives exclude a selection.
pub(crate) fn is_excluded(directives: &[Directive<'_>], vars: &Variables) -> bool {
    for directive in directives {
        let condition = directive
            .arguments
            .iter()
            .find(|(name, _)| name == "if")
            .and_then(|(_, v)| match InputValue::from(v).into_const(vars) {
                InputValue::Boolean(b) => Some(b),
                _ => None,
            });

        match (directive.name.as_str(), condition) {
            ("skip", Some(true)) => return true,
            ("include", Some(false)) => return true,
            _ => {}
        }
    }
    false
}

/// Execute the grouped fields of one selection set concurrently.
///
/// Every field's work is started before any is awaited; the ordered drain
/// reassembles the object in declared order regardless of settlement order.
/// The first escalated failure, in declared field order, fails the whole
/// selection set.
pub(crate) async fn execute_fields<'r, 'a: 'r, 'd: 'a>(
    executor: &'r Executor<'a, 'd>,
    object: &'r ObjectMeta,
    source: &'r Resolved,
    path: &'r ResponsePath,
    groups: &'r FieldGroups<'a, 'd>,
) -> Result<Value, ExecutionError> {
    let mut pending = groups
        .iter()
        .map(|(response_key, fields)| {
            field_entry(executor, object, source, path, response_key, fields.as_slice())
        })
        .collect::<FuturesOrdered<_>>();

    let mut result = Object::with_capacity(groups.len());
    while let Some((response_key, settled)) = pending.next().await {
        match settled {
            Ok(value) => {
                result.add_field(response_key, value);
            }
            Err(error) => return Err(error),
        }
    }

    Ok(Value::Object(result))
}

/// Execute the grouped fields of one selection set one at a time, in
/// declared order. Used for the mutation root, whose side effects must not
/// overlap.
pub(crate) async fn execute_fields_serially<'r, 'a: 'r, 'd: 'a>(
    executor: &'r Executor<'a, 'd>,
    object: &'r ObjectMeta,
    source: &'r Resolved,
    path: &'r ResponsePath,
    groups: &'r FieldGroups<'a, 'd>,
) -> Result<Value, ExecutionError> {
    let mut result = Object::with_capacity(groups.len());
    for (response_key, fields) in groups {
        let (response_key, settled) =
            field_entry(executor, object, source, path, response_key, fields.as_slice()).await;
        match settled {
            Ok(value) => {
                result.add_field(response_key, value);
            }
            Err(error) => return Err(error),
        }
    }

    Ok(Value::Object(result))
}

/// One response-key entry of a selection set, as a future settling to the
/// key and its completed value (or an escalated failure).
fn field_entry<'r, 'a: 'r, 'd: 'a>(
    executor: &'r Executor<'a, 'd>,
    object: &'r ObjectMeta,
    source: &'r Resolved,
    path: &ResponsePath,
    response_key: &'a str,
    fields: &'r [&'a AstField<'d>],
) -> BoxFuture<'r, (&'a str, Result<Value, ExecutionError>)> {
    let first = fields[0];
    let field_path = path.field(response_key);

    if first.name == "__typename" {
        let type_name = Value::string(&*object.name);
        return Box::pin(async move { (response_key, Ok(type_name)) });
    }

    match object.field_by_name(&first.name) {
        Some(field_def) => Box::pin(async move {
            let settled = resolve_field(executor, field_def, source, fields, field_path).await;
            (response_key, settled)
        }),
        None => {
            // Validation is assumed, but an unknown field degrades to a
            // recorded error and a null entry instead of a crash.
            let position = SourcePosition::from(first.position);
            executor.push_error(ExecutionError::at(
                position,
                &field_path,
                FieldError::new(format!(
                    "Cannot query field \"{}\" on type \"{}\"",
                    first.name, object.name
                )),
            ));
            Box::pin(async move { (response_key, Ok(Value::Null)) })
        }
    }
}

/// Resolve and complete one field, catching failures at the field boundary.
///
/// A failure on a nullable field is recorded and nulls only this field; a
/// failure on a non-null field escalates to the enclosing selection set.
async fn resolve_field<'r, 'a: 'r, 'd: 'a>(
    executor: &'r Executor<'a, 'd>,
    field_def: &'r Field,
    source: &'r Resolved,
    fields: &'r [&'a AstField<'d>],
    path: ResponsePath,
) -> Result<Value, ExecutionError> {
    match resolve_field_value(executor, field_def, source, fields, &path).await {
        Ok(value) => Ok(value),
        Err(error) => {
            if field_def.field_type.is_non_null() {
                Err(error)
            } else {
                executor.push_error(error);
                Ok(Value::Null)
            }
        }
    }
}

async fn resolve_field_value<'r, 'a: 'r, 'd: 'a>(
    executor: &'r Executor<'a, 'd>,
    field_def: &'r Field,
    source: &'r Resolved,
    fields: &'r [&'a AstField<'d>],
    path: &ResponsePath,
) -> Result<Value, ExecutionError> {
    let first = fields[0];
    let position = SourcePosition::from(first.position);

    let args = bind_arguments(
        executor.schema(),
        &field_def.arguments,
        &first.arguments,
        executor.variables(),
    )
    .map_err(|e| ExecutionError::at(position, path, e))?;

    let raw = match field_def.resolver {
        Some(ref resolver) => {
            let info = ResolveInfo {
                field_name: &first.name,
                field_type: &field_def.field_type,
                path,
                schema: executor.schema(),
                variables: executor.variables(),
            };
            (**resolver)(ResolverContext {
                source,
                args: &args,
                context: executor.context(),
                info,
            })
            .map_err(|e| ExecutionError::at(position, path, e))?
        }
        None => default_resolve(source, &first.name)
            .map_err(|e| ExecutionError::at(position, path, e))?
            .unwrap_or_else(ResolvedValue::null),
    };

    let resolved = match raw {
        ResolvedValue::Ready(resolved) => resolved,
        // The single suspension point: settling this handle is what lets
        // sibling fields run ahead.
        ResolvedValue::Pending(future) => future
            .await
            .map_err(|e| ExecutionError::at(position, path, e))?,
    };

    complete_value(
        executor,
        &field_def.field_type,
        fields,
        path.clone(),
        resolved,
    )
    .await
}

/// Complete a raw resolver result against the field's declared type.
///
/// Boxed because completion and field execution are mutually recursive.
fn complete_value<'r, 'a: 'r, 'd: 'a>(
    executor: &'r Executor<'a, 'd>,
    ty: &'r Type,
    fields: &'r [&'a AstField<'d>],
    path: ResponsePath,
    resolved: Resolved,
) -> BoxFuture<'r, Result<Value, ExecutionError>> {
    Box::pin(async move {
        let first = fields[0];
        let position = SourcePosition::from(first.position);

        if ty.is_non_null() {
            let inner = ty.nullable();
            let completed = complete_value(executor, &inner, fields, path.clone(), resolved).await?;
            return if completed.is_null() {
                Err(ExecutionError::at(
                    position,
                    &path,
                    FieldError::new(format!(
                        "Cannot return null for non-nullable field \"{}\"",
                        first.name
                    )),
                ))
            } else {
                Ok(completed)
            };
        }

        if resolved.is_null() {
            return Ok(Value::Null);
        }

        match *ty {
            Type::List(ref item_type) => {
                complete_list(executor, item_type, fields, &path, position, resolved).await
            }
            Type::Named(ref name) => {
                let meta = executor.schema().concrete_type_by_name(name).ok_or_else(|| {
                    ExecutionError::at(
                        position,
                        &path,
                        FieldError::new(format!("Unknown type \"{}\"", name)),
                    )
                })?;

                match *meta {
                    MetaType::Scalar(ref scalar) => match resolved.as_value() {
                        Some(value) => (scalar.serialize_fn)(value).map_err(|message| {
                            ExecutionError::at(position, &path, FieldError::new(message))
                        }),
                        None => Err(ExecutionError::at(
                            position,
                            &path,
                            FieldError::new(format!(
                                "Cannot serialize value for scalar \"{}\"",
                                scalar.name
                            )),
                        )),
                    },
                    MetaType::Enum(ref enum_meta) => {
                        match resolved.as_value().and_then(Value::as_string_value) {
                            Some(value) if enum_meta.has_value(value) => {
                                Ok(Value::String(value.to_owned()))
                            }
                            _ => Err(ExecutionError::at(
                                position,
                                &path,
                                FieldError::new(format!(
                                    "Enum \"{}\" cannot represent value: {:?}",
                                    enum_meta.name, resolved
                                )),
                            )),
                        }
                    }
                    MetaType::Object(ref object) => {
                        complete_object(executor, object, fields, &path, resolved).await
                    }
                    MetaType::Interface(_) | MetaType::Union(_) => {
                        let object = resolve_concrete_type(executor, meta, &resolved)
                            .map_err(|e| ExecutionError::at(position, &path, e))?;
                        complete_object(executor, object, fields, &path, resolved).await
                    }
                    MetaType::InputObject(_) => Err(ExecutionError::at(
                        position,
                        &path,
                        FieldError::new(format!("Type \"{}\" is not an output type", name)),
                    )),
                }
            }
            // Non-null wrappers were unwrapped above.
            Type::NonNullNamed(_) | Type::NonNullList(_) => unreachable!(),
        }
    })
}

/// Complete each element of a list under its own indexed path.
///
/// Element failures follow the element type's nullability: a nullable
/// element nulls itself and records the error, a non-null element fails the
/// whole list.
async fn complete_list<'r, 'a: 'r, 'd: 'a>(
    executor: &'r Executor<'a, 'd>,
    item_type: &'r Type,
    fields: &'r [&'a AstField<'d>],
    path: &ResponsePath,
    position: SourcePosition,
    resolved: Resolved,
) -> Result<Value, ExecutionError> {
    let items = match resolved {
        Resolved::List(items) => items,
        Resolved::Value(Value::List(values)) => {
            values.into_iter().map(Resolved::Value).collect()
        }
        _ => {
            return Err(ExecutionError::at(
                position,
                path,
                FieldError::new(format!(
                    "Expected an ordered sequence for list field \"{}\"",
                    fields[0].name
                )),
            ))
        }
    };

    let len = items.len();
    let mut pending = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| complete_value(executor, item_type, fields, path.index(index), item))
        .collect::<FuturesOrdered<_>>();

    let mut values = Vec::with_capacity(len);
    while let Some(settled) = pending.next().await {
        match settled {
            Ok(value) => values.push(value),
            Err(error) => {
                if item_type.is_non_null() {
                    return Err(error);
                }
                executor.push_error(error);
                values.push(Value::Null);
            }
        }
    }

    Ok(Value::List(values))
}

/// Collect and execute the merged sub-selections of a field group against a
/// freshly resolved source value.
async fn complete_object<'r, 'a: 'r, 'd: 'a>(
    executor: &'r Executor<'a, 'd>,
    object: &'r ObjectMeta,
    fields: &'r [&'a AstField<'d>],
    path: &ResponsePath,
    source: Resolved,
) -> Result<Value, ExecutionError> {
    let mut groups = FieldGroups::new();
    let mut visited_fragments = HashSet::new();
    for field in fields {
        collect_fields(
            executor,
            object,
            &field.selection_set,
            &mut groups,
            &mut visited_fragments,
        );
    }

    execute_fields(executor, object, &source, path, &groups).await
}

/// Resolve an abstract type to the concrete object type of a source value.
fn resolve_concrete_type<'r, 'a: 'r, 'd: 'a>(
    executor: &'r Executor<'a, 'd>,
    abstract_meta: &MetaType,
    source: &Resolved,
) -> Result<&'a ObjectMeta, FieldError> {
    let concrete_name = match *abstract_meta {
        MetaType::Interface(ref interface) => interface
            .resolve_type_fn
            .as_ref()
            .and_then(|f| (**f)(source)),
        MetaType::Union(ref union) => union.resolve_type_fn.as_ref().and_then(|f| (**f)(source)),
        _ => None,
    }
    .or_else(|| source.type_name().map(str::to_owned));

    let name = concrete_name.ok_or_else(|| {
        FieldError::new(format!(
            "Abstract type \"{}\" must resolve to an object type at runtime",
            abstract_meta.name()
        ))
    })?;

    match executor.schema().concrete_type_by_name(&name) {
        Some(MetaType::Object(object))
            if executor
                .schema()
                .is_possible_type(abstract_meta.name(), object) =>
        {
            Ok(object)
        }
        _ => Err(FieldError::new(format!(
            "Abstract type \"{}\" was resolved to \"{}\", which is not a possible type",
            abstract_meta.name(),
            name
        ))),
    }
}
