//! Query execution engine
//!
//! The executor drives query execution against a schema. It keeps track of
//! the per-request state - fragments, coerced variables, the caller context
//! and the accumulated errors - while the traversal itself lives in
//! [`resolve`](self) submodules.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, RwLock};

use crate::ast::{
    Definition, Document, FragmentDefinition, InputValue, Operation, OperationType,
};
use crate::resolver::Resolved;
use crate::schema::model::SchemaType;
use crate::value::Value;
use crate::GraphQLError;

mod input;
mod resolve;

pub(crate) use self::input::{bind_arguments, collect_variable_values};
use self::resolve::{collect_fields, execute_fields, execute_fields_serially, FieldGroups};

/// The map of variables used for substitution during query execution
pub type Variables = HashMap<String, InputValue>;

/// The result of resolving the value of a field of type `T`
pub type FieldResult<T> = Result<T, FieldError>;

/// A position in the query source, as reported in errors
///
/// Lines and columns are 1-based, matching what clients expect in the
/// `locations` entries of a response.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct SourcePosition {
    line: usize,
    column: usize,
}

impl SourcePosition {
    /// Construct a position from 1-based line and column numbers.
    pub fn new(line: usize, column: usize) -> SourcePosition {
        SourcePosition { line, column }
    }

    /// The 1-based line of this position.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The 1-based column of this position.
    pub fn column(&self) -> usize {
        self.column
    }
}

impl From<graphql_parser::Pos> for SourcePosition {
    fn from(pos: graphql_parser::Pos) -> SourcePosition {
        SourcePosition {
            line: pos.line,
            column: pos.column,
        }
    }
}

/// One segment of a response path: a response key or a list index.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    /// The response key of a field.
    Field(String),
    /// The index of a list element.
    Index(usize),
}

/// The path from the response root to one field
///
/// An immutable linked list, extended by prepending as the traversal
/// descends; concurrently resolving siblings share their ancestors. Every
/// execution error carries the flattened form of the path it arose at.
#[derive(Clone, Debug, Default)]
pub struct ResponsePath(Option<Arc<PathNode>>);

#[derive(Debug)]
struct PathNode {
    segment: PathSegment,
    parent: ResponsePath,
}

impl ResponsePath {
    /// The empty path of the response root.
    pub fn root() -> ResponsePath {
        ResponsePath(None)
    }

    /// The path of a field under `self`, keyed by its response key.
    pub fn field(&self, response_key: &str) -> ResponsePath {
        self.child(PathSegment::Field(response_key.to_owned()))
    }

    /// The path of the `index`th element of the list at `self`.
    pub fn index(&self, index: usize) -> ResponsePath {
        self.child(PathSegment::Index(index))
    }

    fn child(&self, segment: PathSegment) -> ResponsePath {
        ResponsePath(Some(Arc::new(PathNode {
            segment,
            parent: self.clone(),
        })))
    }

    /// Flatten the path into root-first segments.
    pub fn segments(&self) -> Vec<PathSegment> {
        let mut acc = Vec::new();
        self.construct_path(&mut acc);
        acc
    }

    fn construct_path(&self, acc: &mut Vec<PathSegment>) {
        if let Some(ref node) = self.0 {
            node.parent.construct_path(acc);
            acc.push(node.segment.clone());
        }
    }
}

/// Error type for errors that occur during field resolution
///
/// Field errors are represented by a human-readable error message. They can
/// be converted to from any type that implements [`Display`], which makes
/// error chaining with the `?` operator a breeze:
///
/// ```rust
/// # use tamarack::FieldError;
/// fn get_string(data: Vec<u8>) -> Result<String, FieldError> {
///     let s = String::from_utf8(data)?;
///     Ok(s)
/// }
/// ```
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct FieldError {
    message: String,
}

impl<T: Display> From<T> for FieldError {
    fn from(e: T) -> FieldError {
        FieldError {
            message: format!("{}", e),
        }
    }
}

impl FieldError {
    /// Construct a new error with the provided message.
    pub fn new<T: Display>(e: T) -> FieldError {
        FieldError {
            message: format!("{}", e),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error type for errors that occur during query execution
///
/// All execution errors contain the source position in the query of the field
/// that failed to resolve, and the response path leading to it.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct ExecutionError {
    location: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError,
}

impl ExecutionError {
    /// Construct a new error at the provided location and path.
    pub fn new(
        location: SourcePosition,
        path: Vec<PathSegment>,
        error: FieldError,
    ) -> ExecutionError {
        ExecutionError {
            location,
            path,
            error,
        }
    }

    pub(crate) fn at(
        location: SourcePosition,
        path: &ResponsePath,
        error: FieldError,
    ) -> ExecutionError {
        ExecutionError {
            location,
            path: path.segments(),
            error,
        }
    }

    /// The underlying field error.
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// The error message.
    pub fn message(&self) -> &str {
        self.error.message()
    }

    /// The source location _in the query_ of the field that failed to resolve.
    pub fn location(&self) -> &SourcePosition {
        &self.location
    }

    /// The path of response keys and list indices leading to the field that
    /// generated this error.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

/// Per-request execution state
///
/// Holds the schema, the document's fragments, the coerced variables, the
/// caller context and the error list. The error list is the only state
/// mutated during the traversal; appends from concurrently settling branches
/// go through the lock.
pub struct Executor<'a, 'd> {
    fragments: HashMap<&'a str, &'a FragmentDefinition<'d>>,
    variables: Variables,
    schema: &'a SchemaType,
    context: Option<&'a (dyn Any + Send + Sync)>,
    errors: RwLock<Vec<ExecutionError>>,
}

impl<'a, 'd> Executor<'a, 'd> {
    /// The schema being executed against.
    pub fn schema(&self) -> &'a SchemaType {
        self.schema
    }

    /// The operation's coerced variable values.
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// The caller-supplied request context, if any.
    pub fn context(&self) -> Option<&'a (dyn Any + Send + Sync)> {
        self.context
    }

    /// Look up a fragment definition by name.
    pub fn fragment_by_name(&self, name: &str) -> Option<&'a FragmentDefinition<'d>> {
        self.fragments.get(name).copied()
    }

    /// Append an error to the execution state.
    pub fn push_error(&self, error: ExecutionError) {
        #[cfg(feature = "tracing")]
        tracing::trace!(error = error.message(), "field error recorded");

        self.errors.write().unwrap().push(error);
    }

    fn into_errors(self) -> Vec<ExecutionError> {
        self.errors.into_inner().unwrap()
    }
}

/// Execute an already-parsed, already-validated query document.
///
/// This is the programmatic entry point for callers that parse documents
/// themselves; [`execute`](crate::execute) wraps it with parsing.
pub async fn execute_validated_query<'a, 'd>(
    document: &'a Document<'d>,
    operation_name: Option<&str>,
    schema: &'a SchemaType,
    root_value: &'a Resolved,
    variable_values: &Variables,
    context: Option<&'a (dyn Any + Send + Sync)>,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    let mut fragments = vec![];
    let mut operation = None;

    for def in &document.definitions {
        match *def {
            Definition::Operation(ref op) => {
                if operation_name.is_none() && operation.is_some() {
                    return Err(GraphQLError::MultipleOperationsProvided);
                }

                let move_op =
                    operation_name.is_none() || Operation::definition_name(op) == operation_name;

                if move_op {
                    operation = Some(op);
                }
            }
            Definition::Fragment(ref f) => fragments.push(f),
        };
    }

    let op = match operation {
        Some(op) => op,
        None if operation_name.is_some() => return Err(GraphQLError::UnknownOperationName),
        None => return Err(GraphQLError::NoOperationProvided),
    };
    let op = Operation::from_definition(op).ok_or(GraphQLError::SubscriptionsNotSupported)?;

    let variables =
        collect_variable_values(schema, op.variable_definitions, variable_values)
            .map_err(GraphQLError::VariableCoercionError)?;

    let root_type = match op.operation_type {
        OperationType::Query => schema.query_type(),
        OperationType::Mutation => schema
            .mutation_type()
            .ok_or(GraphQLError::MutationsNotConfigured)?,
    };

    let executor = Executor {
        fragments: fragments
            .iter()
            .map(|f| (f.name.as_str(), &**f))
            .collect(),
        variables,
        schema,
        context,
        errors: RwLock::new(Vec::new()),
    };

    #[cfg(feature = "tracing")]
    tracing::trace!(operation = ?op.operation_type, "executing operation");

    let mut groups = FieldGroups::new();
    let mut visited_fragments = Default::default();
    collect_fields(
        &executor,
        root_type,
        op.selection_set,
        &mut groups,
        &mut visited_fragments,
    );

    let root_path = ResponsePath::root();
    let result = match op.operation_type {
        OperationType::Query => {
            execute_fields(&executor, root_type, root_value, &root_path, &groups).await
        }
        OperationType::Mutation => {
            execute_fields_serially(&executor, root_type, root_value, &root_path, &groups).await
        }
    };

    let value = match result {
        Ok(value) => value,
        Err(error) => {
            // The failure escalated past the root; data as a whole is null.
            executor.push_error(error);
            Value::Null
        }
    };

    let mut errors = executor.into_errors();
    errors.sort();

    Ok((value, errors))
}
