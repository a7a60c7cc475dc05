//! Resolver-facing types: dynamic source values, the `{Ready, Pending}`
//! resolution sum, member dispatch for the default resolver, and the coerced
//! argument mapping.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::ast::Type;
use crate::executor::{FieldResult, ResponsePath, Variables};
use crate::schema::model::SchemaType;
use crate::value::Value;

/// A dynamically typed source value flowing between resolvers.
///
/// Plain data travels as [`Value`]; application objects that want to answer
/// field accesses themselves sit behind [`SourceObject`]. Lists are kept
/// unflattened so each element can carry its own representation.
#[derive(Clone)]
pub enum Resolved {
    /// Plain data; field access is a key lookup into object values.
    Value(Value),
    /// An ordered sequence of source values.
    List(Vec<Resolved>),
    /// An application object with its own member dispatch.
    Object(Arc<dyn SourceObject>),
}

impl Resolved {
    /// A null source value.
    pub fn null() -> Resolved {
        Resolved::Value(Value::Null)
    }

    /// Does this source value represent null?
    pub fn is_null(&self) -> bool {
        matches!(*self, Resolved::Value(Value::Null))
    }

    /// View the plain data behind this source value, if it is plain data.
    pub fn as_value(&self) -> Option<&Value> {
        match *self {
            Resolved::Value(ref v) => Some(v),
            _ => None,
        }
    }

    /// The concrete type name claimed by the underlying source object.
    pub fn type_name(&self) -> Option<&str> {
        match *self {
            Resolved::Object(ref o) => o.type_name(),
            _ => None,
        }
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Resolved::Value(ref v) => write!(f, "Resolved::Value({:?})", v),
            Resolved::List(ref l) => f.debug_tuple("Resolved::List").field(l).finish(),
            Resolved::Object(ref o) => write!(
                f,
                "Resolved::Object(<{}>)",
                o.type_name().unwrap_or("source object")
            ),
        }
    }
}

impl From<Value> for Resolved {
    fn from(v: Value) -> Resolved {
        Resolved::Value(v)
    }
}

impl From<&str> for Resolved {
    fn from(s: &str) -> Resolved {
        Resolved::Value(Value::from(s))
    }
}

impl From<String> for Resolved {
    fn from(s: String) -> Resolved {
        Resolved::Value(Value::String(s))
    }
}

impl From<i32> for Resolved {
    fn from(i: i32) -> Resolved {
        Resolved::Value(Value::from(i))
    }
}

impl From<i64> for Resolved {
    fn from(i: i64) -> Resolved {
        Resolved::Value(Value::Int(i))
    }
}

impl From<f64> for Resolved {
    fn from(f: f64) -> Resolved {
        Resolved::Value(Value::Float(f))
    }
}

impl From<bool> for Resolved {
    fn from(b: bool) -> Resolved {
        Resolved::Value(Value::Boolean(b))
    }
}

impl From<serde_json::Value> for Resolved {
    fn from(json: serde_json::Value) -> Resolved {
        Resolved::Value(Value::from(json))
    }
}

/// The result of one resolver invocation.
///
/// Every resolver returns this sum: either the value is available right away,
/// or a handle that will produce it. The executor is the only place that
/// suspends on pending handles, so synchronous subtrees never pay for the
/// async machinery.
pub enum ResolvedValue {
    /// The value is available immediately.
    Ready(Resolved),
    /// The value is still being produced.
    Pending(BoxFuture<'static, FieldResult<Resolved>>),
}

impl ResolvedValue {
    /// An immediately available value.
    pub fn ready<T: Into<Resolved>>(value: T) -> ResolvedValue {
        ResolvedValue::Ready(value.into())
    }

    /// An immediately available null.
    pub fn null() -> ResolvedValue {
        ResolvedValue::Ready(Resolved::null())
    }

    /// A value that settles once the provided future completes.
    ///
    /// The future must own everything it touches; the executor starts all
    /// pending siblings before awaiting any of them.
    pub fn pending<F>(future: F) -> ResolvedValue
    where
        F: std::future::Future<Output = FieldResult<Resolved>> + Send + 'static,
    {
        ResolvedValue::Pending(Box::pin(future))
    }
}

impl fmt::Debug for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ResolvedValue::Ready(ref r) => f.debug_tuple("Ready").field(r).finish(),
            ResolvedValue::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// An application object that can answer field accesses.
///
/// The default resolver asks the object for the member named like the field
/// and acts on the answer; see [`Member`].
pub trait SourceObject: Send + Sync {
    /// The concrete GraphQL type backing this object.
    ///
    /// Consulted when an interface or union type has no explicit type
    /// resolver.
    fn type_name(&self) -> Option<&str> {
        None
    }

    /// Look up the member named `name` on this object.
    fn member(&self, name: &str) -> Member<'_>;
}

/// The answer to a member lookup on a [`SourceObject`].
///
/// Exactly one capability applies per field access: an invocable member bound
/// to the object, a readable property, or nothing.
pub enum Member<'a> {
    /// A zero-argument callable bound to the object; the default resolver
    /// invokes it and uses its result.
    Invocable(Box<dyn FnOnce() -> FieldResult<ResolvedValue> + 'a>),
    /// A readable property value.
    Property(Resolved),
    /// No such member. Not an error; the field completes as null.
    Absent,
}

/// Fall back field-access strategy for fields without an explicit resolver.
///
/// Returns `Ok(None)` when the source exposes no member under the name - a
/// missing property is not a resolution failure. A null source short-circuits
/// without any member lookup.
pub fn default_resolve(source: &Resolved, field_name: &str) -> FieldResult<Option<ResolvedValue>> {
    match *source {
        Resolved::Value(Value::Null) => Ok(None),
        Resolved::Value(Value::Object(ref obj)) => Ok(obj
            .get_field_value(field_name)
            .map(|v| ResolvedValue::ready(v.clone()))),
        Resolved::Object(ref obj) => match obj.member(field_name) {
            Member::Invocable(invoke) => invoke().map(Some),
            Member::Property(value) => Ok(Some(ResolvedValue::Ready(value))),
            Member::Absent => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Coerced argument values for one field invocation
///
/// Keys are the arguments' out-names where configured, schema names
/// otherwise. Optional arguments that were not supplied and carry no default
/// are absent from the mapping rather than present as null.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    args: IndexMap<String, Value>,
}

impl Arguments {
    pub(crate) fn new() -> Arguments {
        Arguments::default()
    }

    pub(crate) fn insert<K: Into<String>>(&mut self, key: K, value: Value) {
        self.args.insert(key.into(), value);
    }

    /// Get the coerced value of an argument, under its exposed name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    /// Whether an argument was supplied (or defaulted) under the given name.
    pub fn contains_key(&self, key: &str) -> bool {
        self.args.contains_key(key)
    }

    /// The number of supplied arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Iterate over the supplied arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.args.iter()
    }
}

/// Everything a resolver gets handed for one field invocation.
pub struct ResolverContext<'a> {
    /// The source value the enclosing object resolved to.
    pub source: &'a Resolved,
    /// The coerced arguments of this invocation.
    pub args: &'a Arguments,
    /// The caller-supplied request context, if any.
    pub context: Option<&'a (dyn Any + Send + Sync)>,
    /// Positional information about the field being resolved.
    pub info: ResolveInfo<'a>,
}

/// Positional and type information describing one field invocation.
pub struct ResolveInfo<'a> {
    /// The schema name of the field (not its alias).
    pub field_name: &'a str,
    /// The field's declared output type.
    pub field_type: &'a Type,
    /// The response path at which the field's value will appear.
    pub path: &'a ResponsePath,
    /// The schema being executed against.
    pub schema: &'a SchemaType,
    /// The operation's coerced variable values.
    pub variables: &'a Variables,
}

/// The shape of a field resolver registered on the schema.
pub type Resolver =
    Arc<dyn for<'a> Fn(ResolverContext<'a>) -> FieldResult<ResolvedValue> + Send + Sync>;

/// The shape of an abstract type's concrete-type resolver.
pub type TypeResolveFn = Arc<dyn Fn(&Resolved) -> Option<String> + Send + Sync>;
