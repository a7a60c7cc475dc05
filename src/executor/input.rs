//! Input value coercion: variables, arguments, and input objects.

use crate::ast::{InputValue, Type, VariableDefinition};
use crate::executor::{
    ExecutionError, FieldError, FieldResult, SourcePosition, Variables,
};
use crate::resolver::Arguments;
use crate::schema::meta::{Argument, MetaType};
use crate::schema::model::SchemaType;
use crate::value::{Object, Value};

/// Coerce a raw input value against a target type.
///
/// `Ok(None)` means no value was provided (an absent variable); callers
/// decide between defaults, omission and required-value errors. An explicit
/// null is `Ok(Some(Value::Null))` - the two are distinct on purpose.
pub(crate) fn coerce_input_value(
    schema: &SchemaType,
    ty: &Type,
    value: &InputValue,
    vars: &Variables,
) -> FieldResult<Option<Value>> {
    if let InputValue::Variable(ref name) = *value {
        return match vars.get(name) {
            Some(resolved) => coerce_input_value(schema, ty, resolved, vars),
            None => Ok(None),
        };
    }

    if ty.is_non_null() {
        let inner = ty.nullable();
        return match coerce_input_value(schema, &inner, value, vars)? {
            Some(v) if !v.is_null() => Ok(Some(v)),
            _ => Err(FieldError::new(format!(
                "Expected non-nullable type \"{}\", found {}",
                ty, value
            ))),
        };
    }

    if value.is_null() {
        return Ok(Some(Value::Null));
    }

    match *ty {
        Type::List(ref item_type) => coerce_list(schema, item_type, value, vars),
        Type::Named(ref name) => {
            let meta = schema
                .concrete_type_by_name(name)
                .ok_or_else(|| FieldError::new(format!("Unknown type \"{}\"", name)))?;
            match *meta {
                MetaType::Scalar(ref scalar) => {
                    (scalar.parse_fn)(value).map(Some).map_err(FieldError::new)
                }
                MetaType::Enum(ref enum_meta) => {
                    let literal = match *value {
                        InputValue::Enum(ref s) => Some(s),
                        // Variable-supplied enum values arrive as strings.
                        InputValue::String(ref s) => Some(s),
                        _ => None,
                    };
                    match literal {
                        Some(s) if enum_meta.has_value(s) => Ok(Some(Value::String(s.clone()))),
                        _ => Err(FieldError::new(format!(
                            "Enum \"{}\" cannot represent value: {}",
                            name, value
                        ))),
                    }
                }
                MetaType::InputObject(ref input_object) => {
                    coerce_input_object(schema, name, &input_object.input_fields, value, vars)
                }
                _ => Err(FieldError::new(format!(
                    "Type \"{}\" is not an input type",
                    name
                ))),
            }
        }
        // Non-null wrappers were unwrapped above.
        _ => unreachable!(),
    }
}

fn coerce_list(
    schema: &SchemaType,
    item_type: &Type,
    value: &InputValue,
    vars: &Variables,
) -> FieldResult<Option<Value>> {
    match *value {
        InputValue::List(ref items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                // An element-level failure fails the whole list coercion.
                match coerce_input_value(schema, item_type, item, vars)? {
                    Some(v) => out.push(v),
                    // An absent variable nulls the element, unless the
                    // element type forbids it.
                    None if item_type.is_non_null() => {
                        return Err(FieldError::new(format!(
                            "Expected non-nullable type \"{}\", found null",
                            item_type
                        )))
                    }
                    None => out.push(Value::Null),
                }
            }
            Ok(Some(Value::List(out)))
        }
        // The single-value shorthand: a lone value coerces to a
        // one-element list.
        _ => {
            let coerced = coerce_input_value(schema, item_type, value, vars)?;
            Ok(coerced.map(|v| Value::List(vec![v])))
        }
    }
}

fn coerce_input_object(
    schema: &SchemaType,
    type_name: &str,
    input_fields: &[Argument],
    value: &InputValue,
    vars: &Variables,
) -> FieldResult<Option<Value>> {
    let map = value.as_object_value().ok_or_else(|| {
        FieldError::new(format!(
            "Expected type \"{}\" to be an object, found {}",
            type_name, value
        ))
    })?;

    let mut out = Object::with_capacity(input_fields.len());
    for field in input_fields {
        let coerced = match map.get(&field.name) {
            Some(raw) => coerce_input_value(schema, &field.arg_type, raw, vars)?,
            None => None,
        };
        let coerced = match coerced {
            Some(v) => Some(v),
            None => match field.default_value {
                Some(ref default) => coerce_input_value(schema, &field.arg_type, default, vars)?,
                None => None,
            },
        };
        match coerced {
            Some(v) => {
                out.add_field(field.out_key(), v);
            }
            None if field.arg_type.is_non_null() => {
                return Err(FieldError::new(format!(
                    "Field \"{}\" of required type \"{}\" was not provided",
                    field.name, field.arg_type
                )));
            }
            // Unset nullable fields are omitted, not nulled.
            None => {}
        }
    }
    // Unknown keys in `map` are deliberately ignored.

    Ok(Some(Value::Object(out)))
}

/// Build the coerced argument mapping for one field invocation.
///
/// Arguments not present in the selection and without a schema default are
/// omitted entirely.
pub(crate) fn bind_arguments(
    schema: &SchemaType,
    arg_defs: &[Argument],
    ast_args: &[(String, crate::ast::AstValue<'_>)],
    vars: &Variables,
) -> FieldResult<Arguments> {
    let mut args = Arguments::new();

    for def in arg_defs {
        let provided = ast_args
            .iter()
            .find(|(name, _)| name == &def.name)
            .map(|(_, v)| InputValue::from(v));

        let coerced = match provided {
            Some(ref raw) => coerce_input_value(schema, &def.arg_type, raw, vars).map_err(|e| {
                FieldError::new(format!(
                    "Argument \"{}\" has invalid value: {}",
                    def.name,
                    e.message()
                ))
            })?,
            None => None,
        };
        let coerced = match coerced {
            Some(v) => Some(v),
            None => match def.default_value {
                Some(ref default) => coerce_input_value(schema, &def.arg_type, default, vars)?,
                None => None,
            },
        };
        match coerced {
            Some(v) => args.insert(def.out_key(), v),
            None if def.arg_type.is_non_null() => {
                return Err(FieldError::new(format!(
                    "Argument \"{}\" of required type \"{}\" was not provided",
                    def.name, def.arg_type
                )));
            }
            None => {}
        }
    }

    Ok(args)
}

/// Validate the caller's raw variable values against the operation's
/// declared variable types and apply declared defaults.
///
/// Any failure here is fatal: execution never starts and the collected
/// errors are the response's only errors.
pub(crate) fn collect_variable_values(
    schema: &SchemaType,
    definitions: &[VariableDefinition<'_>],
    inputs: &Variables,
) -> Result<Variables, Vec<ExecutionError>> {
    let no_vars = Variables::new();
    let mut values = Variables::new();
    let mut errors = Vec::new();

    for def in definitions {
        let var_type = Type::from(&def.var_type);
        let position = SourcePosition::from(def.position);

        match inputs.get(&def.name) {
            Some(provided) => {
                // Validation only; the raw value is kept and re-coerced per
                // use site, which is where out-name remapping happens.
                match coerce_input_value(schema, &var_type, provided, &no_vars) {
                    Ok(_) => {
                        values.insert(def.name.clone(), provided.clone());
                    }
                    Err(e) => errors.push(ExecutionError::new(
                        position,
                        vec![],
                        FieldError::new(format!(
                            "Variable \"${}\" got invalid value: {}",
                            def.name,
                            e.message()
                        )),
                    )),
                }
            }
            None => match def.default_value {
                Some(ref default) => {
                    values.insert(def.name.clone(), InputValue::from(default));
                }
                None if var_type.is_non_null() => errors.push(ExecutionError::new(
                    position,
                    vec![],
                    FieldError::new(format!(
                        "Variable \"${}\" of required type \"{}\" was not provided",
                        def.name, var_type
                    )),
                )),
                None => {}
            },
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}
