/*!

# Tamarack

Tamarack is a dynamic [GraphQL][1] query execution engine: schemas are built
at runtime, resolvers are plain closures, and source values are dynamically
typed. Given a schema, a parsed query document and a root value, it produces
a response by recursively resolving each requested field, coercing arguments
and results against the declared types, and collecting per-field errors
without aborting the whole operation unless non-null types force it to.

Parsing is delegated to the [`graphql-parser`] crate and static validation
is expected to have happened before execution; the engine walks documents it
is handed and degrades gracefully on the few things an unvalidated document
can still get wrong.

Resolvers may answer immediately or hand back a pending future. Independent
fields of a selection set are started before any of them is awaited, so a
slow resolver never delays its siblings, while response order always follows
the query, not completion timing.

## Example

```rust
use tamarack::{
    Field, ObjectMeta, Resolved, ResolvedValue, ResolverContext, SchemaBuilder, Type,
};

let schema = SchemaBuilder::new()
    .register(
        ObjectMeta::new(
            "Query",
            vec![Field::new("hello", Type::non_null_named("String"))
                .resolver(|_ctx: ResolverContext<'_>| Ok(ResolvedValue::ready("world")))],
        )
        .into_meta(),
    )
    .build("Query", None)
    .unwrap();

let root = Resolved::null();
let (data, errors) = tamarack::execute_sync(
    "{ hello }",
    None,
    &schema,
    &root,
    &Default::default(),
    None,
)
.unwrap();

assert!(errors.is_empty());
assert_eq!(
    serde_json::to_value(&data).unwrap(),
    serde_json::json!({ "hello": "world" })
);
```

Fields without an explicit resolver fall back to the default resolver, which
reads properties off plain data values or asks a [`SourceObject`]
implementation for the member named like the field.

[1]: https://graphql.org
[`graphql-parser`]: https://docs.rs/graphql-parser

*/

#![warn(missing_docs)]

use std::any::Any;
use std::fmt;

pub mod ast;
mod executor;
pub mod http;
mod integrations;
mod resolver;
mod schema;
mod value;

#[cfg(test)]
mod executor_tests;

#[doc(inline)]
pub use futures::future::BoxFuture;

pub use crate::ast::{InputValue, Operation, OperationType, Type};
pub use crate::executor::{
    execute_validated_query, ExecutionError, FieldError, FieldResult, PathSegment, ResponsePath,
    SourcePosition, Variables,
};
pub use crate::resolver::{
    default_resolve, Arguments, Member, ResolveInfo, Resolved, ResolvedValue, Resolver,
    ResolverContext, SourceObject, TypeResolveFn,
};
pub use crate::schema::meta;
pub use crate::schema::meta::{
    Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta, MetaType, ObjectMeta,
    ScalarMeta, TypeKind, UnionMeta,
};
pub use crate::schema::model::{SchemaBuilder, SchemaError, SchemaType};
pub use crate::value::{Object, Value};

/// An error that prevented query execution
#[derive(Debug)]
#[allow(missing_docs)]
pub enum GraphQLError {
    ParseError(graphql_parser::query::ParseError),
    NoOperationProvided,
    MultipleOperationsProvided,
    UnknownOperationName,
    SubscriptionsNotSupported,
    MutationsNotConfigured,
    VariableCoercionError(Vec<ExecutionError>),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GraphQLError::ParseError(ref e) => write!(f, "{}", e),
            GraphQLError::NoOperationProvided => write!(f, "Must provide an operation"),
            GraphQLError::MultipleOperationsProvided => write!(
                f,
                "Must provide operation name if query contains multiple operations"
            ),
            GraphQLError::UnknownOperationName => write!(f, "Unknown operation"),
            GraphQLError::SubscriptionsNotSupported => {
                write!(f, "Subscription operations are not supported")
            }
            GraphQLError::MutationsNotConfigured => {
                write!(f, "Schema is not configured for mutations")
            }
            GraphQLError::VariableCoercionError(ref errors) => {
                for error in errors {
                    writeln!(f, "{}", error.message())?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl From<graphql_parser::query::ParseError> for GraphQLError {
    fn from(e: graphql_parser::query::ParseError) -> GraphQLError {
        GraphQLError::ParseError(e)
    }
}

/// Execute a query in a provided schema
///
/// Parses `document_source`, selects the requested operation, coerces the
/// variable values and drives the operation's selection set against
/// `root_value`. On success the returned pair carries the response data and
/// every field error recorded along the way; fatal problems (parse errors,
/// operation selection, variable coercion) surface as [`GraphQLError`]s
/// instead and mean no field was executed.
pub async fn execute(
    document_source: &str,
    operation_name: Option<&str>,
    schema: &SchemaType,
    root_value: &Resolved,
    variables: &Variables,
    context: Option<&(dyn Any + Send + Sync)>,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    let document = graphql_parser::parse_query::<String>(document_source)?;
    execute_validated_query(
        &document,
        operation_name,
        schema,
        root_value,
        variables,
        context,
    )
    .await
}

/// Blocking variant of [`execute`], for resolvers that never return pending
/// values or callers without an async runtime.
pub fn execute_sync(
    document_source: &str,
    operation_name: Option<&str>,
    schema: &SchemaType,
    root_value: &Resolved,
    variables: &Variables,
    context: Option<&(dyn Any + Send + Sync)>,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    futures::executor::block_on(execute(
        document_source,
        operation_name,
        schema,
        root_value,
        variables,
        context,
    ))
}
