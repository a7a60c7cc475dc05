//! Query document AST consumed by the execution engine.
//!
//! Parsing is delegated to the [`graphql-parser`] crate; the executor only
//! walks an already-parsed document. This module re-exports the parts of the
//! query AST the engine touches, and defines the two pieces of syntax the
//! engine keeps independently of any document: type literals and unlocated
//! input values.
//!
//! [`graphql-parser`]: https://docs.rs/graphql-parser

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

/// A parsed query document.
pub type Document<'d> = graphql_parser::query::Document<'d, String>;
/// A top-level definition in a query document.
pub type Definition<'d> = graphql_parser::query::Definition<'d, String>;
/// An operation definition in a query document.
pub type OperationDefinition<'d> = graphql_parser::query::OperationDefinition<'d, String>;
/// A selection set - the fields requested at one level of a query.
pub type SelectionSet<'d> = graphql_parser::query::SelectionSet<'d, String>;
/// A single entry in a selection set.
pub type Selection<'d> = graphql_parser::query::Selection<'d, String>;
/// A field selection.
pub type Field<'d> = graphql_parser::query::Field<'d, String>;
/// A named fragment definition.
pub type FragmentDefinition<'d> = graphql_parser::query::FragmentDefinition<'d, String>;
/// A variable declared by an operation.
pub type VariableDefinition<'d> = graphql_parser::query::VariableDefinition<'d, String>;
/// A directive attached to a selection.
pub type Directive<'d> = graphql_parser::query::Directive<'d, String>;
/// The type condition of a fragment.
pub type TypeCondition<'d> = graphql_parser::query::TypeCondition<'d, String>;

pub(crate) type AstValue<'d> = graphql_parser::query::Value<'d, String>;
pub(crate) type AstType<'d> = graphql_parser::query::Type<'d, String>;

/// A type literal
///
/// This enum carries no semantic information and might refer to types that do
/// not exist. Unlike the parser's representation it is owned, so schema
/// metadata can hold on to it without borrowing a document.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Type {
    /// A nullable named type, e.g. `String`
    Named(String),
    /// A nullable list type, e.g. `[String]`
    ///
    /// The list itself is what's nullable, the containing type might be non-null.
    List(Box<Type>),
    /// A non-null named type, e.g. `String!`
    NonNullNamed(String),
    /// A non-null list type, e.g. `[String]!`.
    ///
    /// The list itself is what's non-null, the containing type might be null.
    NonNullList(Box<Type>),
}

impl Type {
    /// Construct a nullable named type.
    pub fn named<T: Into<String>>(name: T) -> Type {
        Type::Named(name.into())
    }

    /// Construct a non-null named type.
    pub fn non_null_named<T: Into<String>>(name: T) -> Type {
        Type::NonNullNamed(name.into())
    }

    /// Construct a nullable list of the provided item type.
    pub fn list(of_type: Type) -> Type {
        Type::List(Box::new(of_type))
    }

    /// Construct a non-null list of the provided item type.
    pub fn non_null_list(of_type: Type) -> Type {
        Type::NonNullList(Box::new(of_type))
    }

    /// Get the name of a named type.
    ///
    /// Only applies to named types; lists will return `None`.
    pub fn name(&self) -> Option<&str> {
        match *self {
            Type::Named(ref n) | Type::NonNullNamed(ref n) => Some(n),
            _ => None,
        }
    }

    /// Get the innermost name by unpacking lists
    ///
    /// All type literals contain exactly one named type.
    pub fn innermost_name(&self) -> &str {
        match *self {
            Type::Named(ref n) | Type::NonNullNamed(ref n) => n,
            Type::List(ref l) | Type::NonNullList(ref l) => l.innermost_name(),
        }
    }

    /// Determines if a type only can represent non-null values.
    pub fn is_non_null(&self) -> bool {
        matches!(*self, Type::NonNullNamed(_) | Type::NonNullList(_))
    }

    /// The same type with one level of non-null stripped off.
    pub fn nullable(&self) -> Type {
        match *self {
            Type::NonNullNamed(ref n) => Type::Named(n.clone()),
            Type::NonNullList(ref l) => Type::List(l.clone()),
            ref t => t.clone(),
        }
    }

    /// The item type of a list, if this is a list type.
    pub fn list_contents(&self) -> Option<&Type> {
        match *self {
            Type::List(ref l) | Type::NonNullList(ref l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Type::Named(ref n) => write!(f, "{}", n),
            Type::NonNullNamed(ref n) => write!(f, "{}!", n),
            Type::List(ref t) => write!(f, "[{}]", t),
            Type::NonNullList(ref t) => write!(f, "[{}]!", t),
        }
    }
}

impl<'d> From<&AstType<'d>> for Type {
    fn from(ty: &AstType<'d>) -> Type {
        match *ty {
            AstType::NamedType(ref n) => Type::Named(n.clone()),
            AstType::ListType(ref inner) => Type::List(Box::new(Type::from(&**inner))),
            AstType::NonNullType(ref inner) => match Type::from(&**inner) {
                Type::Named(n) => Type::NonNullNamed(n),
                Type::List(l) => Type::NonNullList(l),
                t => t,
            },
        }
    }
}

/// A JSON-like value that can be passed into the query execution, either
/// out-of-band, or in-band as default variable values. These are _not_
/// coerced and might contain variables.
#[derive(Clone, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum InputValue {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    Variable(String),
    List(Vec<InputValue>),
    Object(IndexMap<String, InputValue>),
}

impl InputValue {
    /// Construct a null value.
    pub fn null() -> InputValue {
        InputValue::Null
    }

    /// Construct an integer value.
    pub fn int(i: i64) -> InputValue {
        InputValue::Int(i)
    }

    /// Construct a floating point value.
    pub fn float(f: f64) -> InputValue {
        InputValue::Float(f)
    }

    /// Construct a boolean value.
    pub fn boolean(b: bool) -> InputValue {
        InputValue::Boolean(b)
    }

    /// Construct a string value.
    pub fn string<T: AsRef<str>>(s: T) -> InputValue {
        InputValue::String(s.as_ref().to_owned())
    }

    /// Construct an enum value.
    pub fn enum_value<T: AsRef<str>>(s: T) -> InputValue {
        InputValue::Enum(s.as_ref().to_owned())
    }

    /// Construct a variable reference.
    pub fn variable<T: AsRef<str>>(v: T) -> InputValue {
        InputValue::Variable(v.as_ref().to_owned())
    }

    /// Construct a list value.
    pub fn list(l: Vec<InputValue>) -> InputValue {
        InputValue::List(l)
    }

    /// Construct an object value from key/value pairs.
    pub fn object<K, I>(o: I) -> InputValue
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, InputValue)>,
    {
        InputValue::Object(o.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Resolve all variables to their values.
    ///
    /// Unknown variables become null, matching the treatment of omitted
    /// nullable inputs.
    pub fn into_const(self, vars: &HashMap<String, InputValue>) -> InputValue {
        match self {
            InputValue::Variable(v) => vars.get(&v).cloned().unwrap_or(InputValue::Null),
            InputValue::List(l) => {
                InputValue::List(l.into_iter().map(|v| v.into_const(vars)).collect())
            }
            InputValue::Object(o) => InputValue::Object(
                o.into_iter().map(|(k, v)| (k, v.into_const(vars))).collect(),
            ),
            v => v,
        }
    }

    /// Does the value represent null?
    pub fn is_null(&self) -> bool {
        matches!(*self, InputValue::Null)
    }

    /// Does the value represent a variable?
    pub fn is_variable(&self) -> bool {
        matches!(*self, InputValue::Variable(_))
    }

    /// View the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        match *self {
            InputValue::String(ref s) => Some(s),
            _ => None,
        }
    }

    /// View the underlying object value, if present.
    pub fn as_object_value(&self) -> Option<&IndexMap<String, InputValue>> {
        match *self {
            InputValue::Object(ref o) => Some(o),
            _ => None,
        }
    }
}

impl<'d> From<&AstValue<'d>> for InputValue {
    fn from(value: &AstValue<'d>) -> InputValue {
        match *value {
            AstValue::Variable(ref name) => InputValue::Variable(name.clone()),
            AstValue::Int(ref n) => match n.as_i64() {
                Some(i) => InputValue::Int(i),
                None => InputValue::Null,
            },
            AstValue::Float(f) => InputValue::Float(f),
            AstValue::String(ref s) => InputValue::String(s.clone()),
            AstValue::Boolean(b) => InputValue::Boolean(b),
            AstValue::Null => InputValue::Null,
            AstValue::Enum(ref e) => InputValue::Enum(e.clone()),
            AstValue::List(ref l) => InputValue::List(l.iter().map(Into::into).collect()),
            AstValue::Object(ref o) => InputValue::Object(
                o.iter().map(|(k, v)| (k.clone(), v.into())).collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for InputValue {
    fn from(json: serde_json::Value) -> InputValue {
        match json {
            serde_json::Value::Null => InputValue::Null,
            serde_json::Value::Bool(b) => InputValue::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => InputValue::Int(i),
                None => InputValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => InputValue::String(s),
            serde_json::Value::Array(a) => {
                InputValue::List(a.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(o) => InputValue::Object(
                o.into_iter().map(|(k, v)| (k, InputValue::from(v))).collect(),
            ),
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            InputValue::Null => write!(f, "null"),
            InputValue::Int(i) => write!(f, "{}", i),
            InputValue::Float(v) => write!(f, "{}", v),
            InputValue::String(ref s) => write!(f, "{:?}", s),
            InputValue::Boolean(b) => write!(f, "{}", b),
            InputValue::Enum(ref e) => write!(f, "{}", e),
            InputValue::Variable(ref v) => write!(f, "${}", v),
            InputValue::List(ref l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            InputValue::Object(ref o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// The type of a selected operation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperationType {
    /// A read-only query; top-level fields may execute concurrently.
    Query,
    /// A mutation; top-level fields execute serially in declared order.
    Mutation,
}

/// A normalized view over the operation forms the parser produces.
pub struct Operation<'a, 'd> {
    /// Whether this is a query or a mutation.
    pub operation_type: OperationType,
    /// The variables the operation declares.
    pub variable_definitions: &'a [VariableDefinition<'d>],
    /// The top-level selection set.
    pub selection_set: &'a SelectionSet<'d>,
}

impl<'a, 'd> Operation<'a, 'd> {
    /// Normalize a parsed operation definition.
    ///
    /// Returns `None` for subscription operations, which this engine does not
    /// execute.
    pub fn from_definition(def: &'a OperationDefinition<'d>) -> Option<Operation<'a, 'd>> {
        match *def {
            OperationDefinition::SelectionSet(ref s) => Some(Operation {
                operation_type: OperationType::Query,
                variable_definitions: &[],
                selection_set: s,
            }),
            OperationDefinition::Query(ref q) => Some(Operation {
                operation_type: OperationType::Query,
                variable_definitions: &q.variable_definitions,
                selection_set: &q.selection_set,
            }),
            OperationDefinition::Mutation(ref m) => Some(Operation {
                operation_type: OperationType::Mutation,
                variable_definitions: &m.variable_definitions,
                selection_set: &m.selection_set,
            }),
            OperationDefinition::Subscription(_) => None,
        }
    }

    /// The name under which a parsed operation definition was declared.
    pub fn definition_name<'b>(def: &'b OperationDefinition<'_>) -> Option<&'b str> {
        match *def {
            OperationDefinition::SelectionSet(_) => None,
            OperationDefinition::Query(ref q) => q.name.as_deref(),
            OperationDefinition::Mutation(ref m) => m.name.as_deref(),
            OperationDefinition::Subscription(ref s) => s.name.as_deref(),
        }
    }
}
