//! Utilities for building HTTP endpoints on top of the executor.

use std::any::Any;

use serde::Deserialize;

use crate::ast::InputValue;
use crate::executor::{ExecutionError, Variables};
use crate::resolver::Resolved;
use crate::schema::model::SchemaType;
use crate::value::Value;
use crate::GraphQLError;

/// The expected structure of the decoded JSON document for either POST or
/// GET requests.
#[derive(Deserialize)]
pub struct GraphQLRequest {
    query: String,
    #[serde(rename = "operationName")]
    operation_name: Option<String>,
    variables: Option<InputValue>,
}

impl GraphQLRequest {
    /// Construct a request from its parts.
    pub fn new(
        query: String,
        operation_name: Option<String>,
        variables: Option<InputValue>,
    ) -> GraphQLRequest {
        GraphQLRequest {
            query,
            operation_name,
            variables,
        }
    }

    /// The name of the operation to run, if one was given.
    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    /// The request's variable values as a variable mapping.
    pub fn variables(&self) -> Variables {
        self.variables
            .as_ref()
            .and_then(InputValue::as_object_value)
            .map(|o| o.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Execute the request against the provided schema and root value.
    pub async fn execute(
        &self,
        schema: &SchemaType,
        root_value: &Resolved,
        context: Option<&(dyn Any + Send + Sync)>,
    ) -> GraphQLResponse {
        GraphQLResponse(
            crate::execute(
                &self.query,
                self.operation_name(),
                schema,
                root_value,
                &self.variables(),
                context,
            )
            .await,
        )
    }

    /// Blocking variant of [`execute`](GraphQLRequest::execute).
    pub fn execute_sync(
        &self,
        schema: &SchemaType,
        root_value: &Resolved,
        context: Option<&(dyn Any + Send + Sync)>,
    ) -> GraphQLResponse {
        futures::executor::block_on(self.execute(schema, root_value, context))
    }
}

/// A serializable execution outcome
///
/// Serializes to the transport shape: a `data` entry plus an `errors` list
/// that is present exactly when something failed. Fatal errors produce a
/// response with no `data` entry at all.
pub struct GraphQLResponse(
    pub(crate) Result<(Value, Vec<ExecutionError>), GraphQLError>,
);

impl GraphQLResponse {
    /// Construct a response from an execution result.
    pub fn from_result(
        result: Result<(Value, Vec<ExecutionError>), GraphQLError>,
    ) -> GraphQLResponse {
        GraphQLResponse(result)
    }

    /// Was the execution fatal-error free?
    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }
}
