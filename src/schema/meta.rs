//! Types used to describe a GraphQL schema

use crate::ast::{InputValue, Type};
use crate::resolver::{Resolver, ResolverContext, ResolvedValue, TypeResolveFn};
use crate::executor::FieldResult;
use crate::value::Value;

use std::sync::Arc;

/// GraphQL type kind
///
/// The GraphQL specification defines a number of type kinds - the meta type
/// of a type.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum TypeKind {
    /// Scalar types appear as the leaf nodes of GraphQL queries.
    Scalar,
    /// Objects have fields and can implement interfaces.
    Object,
    /// Interface types represent overlapping fields between multiple types,
    /// and can be queried for their concrete type.
    Interface,
    /// Unions are similar to interfaces but can not contain any fields on
    /// their own.
    Union,
    /// Like scalars, enum types appear as the leaf nodes of GraphQL queries.
    Enum,
    /// Represents complex values provided in queries _into_ the system.
    InputObject,
    /// Lists of other types.
    List,
    /// In GraphQL, nullable types are the default. By putting a `!` after a
    /// type, it becomes non-nullable.
    NonNull,
}

/// The function a scalar type uses to coerce input values.
pub type ScalarParseFn = Box<dyn Fn(&InputValue) -> Result<Value, String> + Send + Sync>;

/// The function a scalar type uses to coerce resolver results for output.
pub type ScalarSerializeFn = Box<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Scalar type metadata
pub struct ScalarMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub parse_fn: ScalarParseFn,
    #[doc(hidden)]
    pub serialize_fn: ScalarSerializeFn,
}

/// Object type metadata
pub struct ObjectMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    #[doc(hidden)]
    pub interface_names: Vec<String>,
}

/// Enum type metadata
pub struct EnumMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub values: Vec<EnumValue>,
}

/// Interface type metadata
pub struct InterfaceMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    #[doc(hidden)]
    pub resolve_type_fn: Option<TypeResolveFn>,
}

/// Union type metadata
pub struct UnionMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub of_type_names: Vec<String>,
    #[doc(hidden)]
    pub resolve_type_fn: Option<TypeResolveFn>,
}

/// Input object metadata
pub struct InputObjectMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub input_fields: Vec<Argument>,
}

/// Generic type metadata
pub enum MetaType {
    #[doc(hidden)]
    Scalar(ScalarMeta),
    #[doc(hidden)]
    Object(ObjectMeta),
    #[doc(hidden)]
    Enum(EnumMeta),
    #[doc(hidden)]
    Interface(InterfaceMeta),
    #[doc(hidden)]
    Union(UnionMeta),
    #[doc(hidden)]
    InputObject(InputObjectMeta),
}

/// Metadata for a field
pub struct Field {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub arguments: Vec<Argument>,
    #[doc(hidden)]
    pub field_type: Type,
    #[doc(hidden)]
    pub resolver: Option<Resolver>,
}

/// Metadata for an argument to a field, or for an input object's field
#[derive(Clone)]
pub struct Argument {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub arg_type: Type,
    #[doc(hidden)]
    pub default_value: Option<InputValue>,
    #[doc(hidden)]
    pub out_name: Option<String>,
}

/// Metadata for a single value in an enum
#[derive(Clone, Debug)]
pub struct EnumValue {
    /// The name of the enum value
    ///
    /// This is the string literal representation of the enum in responses.
    pub name: String,
}

impl MetaType {
    /// Access the name of the type.
    pub fn name(&self) -> &str {
        match *self {
            MetaType::Scalar(ScalarMeta { ref name, .. })
            | MetaType::Object(ObjectMeta { ref name, .. })
            | MetaType::Enum(EnumMeta { ref name, .. })
            | MetaType::Interface(InterfaceMeta { ref name, .. })
            | MetaType::Union(UnionMeta { ref name, .. })
            | MetaType::InputObject(InputObjectMeta { ref name, .. }) => name,
        }
    }

    /// Construct a `TypeKind` for this type.
    pub fn type_kind(&self) -> TypeKind {
        match *self {
            MetaType::Scalar(_) => TypeKind::Scalar,
            MetaType::Object(_) => TypeKind::Object,
            MetaType::Enum(_) => TypeKind::Enum,
            MetaType::Interface(_) => TypeKind::Interface,
            MetaType::Union(_) => TypeKind::Union,
            MetaType::InputObject(_) => TypeKind::InputObject,
        }
    }

    /// Access a field's meta data given its name
    ///
    /// Only objects and interfaces have fields. This method always returns
    /// `None` for other types.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        match *self {
            MetaType::Object(ObjectMeta { ref fields, .. })
            | MetaType::Interface(InterfaceMeta { ref fields, .. }) => {
                fields.iter().find(|f| f.name == name)
            }
            _ => None,
        }
    }

    /// Access an input field's meta data given its name
    ///
    /// Only input objects have input fields. This method always returns
    /// `None` for other types.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument> {
        match *self {
            MetaType::InputObject(InputObjectMeta { ref input_fields, .. }) => {
                input_fields.iter().find(|f| f.name == name)
            }
            _ => None,
        }
    }

    /// Returns true if the type is a composite type
    ///
    /// Objects, interfaces, and unions are composite.
    pub fn is_composite(&self) -> bool {
        matches!(
            *self,
            MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_)
        )
    }

    /// Returns true if the type can occur in leaf positions in queries
    ///
    /// Only enums and scalars are leaf types.
    pub fn is_leaf(&self) -> bool {
        matches!(*self, MetaType::Scalar(_) | MetaType::Enum(_))
    }

    /// Returns true if the type can appear in input positions.
    pub fn is_input(&self) -> bool {
        matches!(
            *self,
            MetaType::Scalar(_) | MetaType::Enum(_) | MetaType::InputObject(_)
        )
    }

    /// Returns true if the type is abstract and must be resolved to a
    /// concrete object type at runtime.
    pub fn is_abstract(&self) -> bool {
        matches!(*self, MetaType::Interface(_) | MetaType::Union(_))
    }
}

impl ScalarMeta {
    /// Build a scalar type metadata with the provided coercion functions.
    pub fn new<N, P, S>(name: N, parse_fn: P, serialize_fn: S) -> ScalarMeta
    where
        N: Into<String>,
        P: Fn(&InputValue) -> Result<Value, String> + Send + Sync + 'static,
        S: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        ScalarMeta {
            name: name.into(),
            parse_fn: Box::new(parse_fn),
            serialize_fn: Box::new(serialize_fn),
        }
    }

    /// Wrap the type in a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::Scalar(self)
    }

    /// The built-in `Int` scalar. 32-bit signed range, per the GraphQL
    /// specification.
    pub fn int() -> ScalarMeta {
        ScalarMeta::new(
            "Int",
            |v| match *v {
                InputValue::Int(i) if i >= i64::from(i32::MIN) && i <= i64::from(i32::MAX) => {
                    Ok(Value::Int(i))
                }
                ref other => Err(format!(
                    "Int cannot represent non 32-bit signed integer value: {}",
                    other
                )),
            },
            |v| match *v {
                Value::Int(i) if i >= i64::from(i32::MIN) && i <= i64::from(i32::MAX) => {
                    Ok(Value::Int(i))
                }
                Value::Float(f) if f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX) => {
                    Ok(Value::Int(f as i64))
                }
                ref other => Err(format!("Int cannot represent value: {}", other)),
            },
        )
    }

    /// The built-in `Float` scalar. Integers widen losslessly.
    pub fn float() -> ScalarMeta {
        ScalarMeta::new(
            "Float",
            |v| match *v {
                InputValue::Int(i) => Ok(Value::Float(i as f64)),
                InputValue::Float(f) => Ok(Value::Float(f)),
                ref other => Err(format!("Float cannot represent value: {}", other)),
            },
            |v| match *v {
                Value::Int(i) => Ok(Value::Float(i as f64)),
                Value::Float(f) => Ok(Value::Float(f)),
                ref other => Err(format!("Float cannot represent value: {}", other)),
            },
        )
    }

    /// The built-in `String` scalar.
    ///
    /// Output coercion stringifies the other leaf representations, mirroring
    /// the reference implementation.
    pub fn string() -> ScalarMeta {
        ScalarMeta::new(
            "String",
            |v| match *v {
                InputValue::String(ref s) => Ok(Value::String(s.clone())),
                ref other => Err(format!("String cannot represent value: {}", other)),
            },
            |v| match *v {
                Value::String(ref s) => Ok(Value::String(s.clone())),
                Value::Boolean(b) => Ok(Value::String(b.to_string())),
                Value::Int(i) => Ok(Value::String(i.to_string())),
                Value::Float(f) => Ok(Value::String(f.to_string())),
                ref other => Err(format!("String cannot represent value: {}", other)),
            },
        )
    }

    /// The built-in `Boolean` scalar.
    pub fn boolean() -> ScalarMeta {
        ScalarMeta::new(
            "Boolean",
            |v| match *v {
                InputValue::Boolean(b) => Ok(Value::Boolean(b)),
                ref other => Err(format!("Boolean cannot represent value: {}", other)),
            },
            |v| match *v {
                Value::Boolean(b) => Ok(Value::Boolean(b)),
                ref other => Err(format!("Boolean cannot represent value: {}", other)),
            },
        )
    }

    /// The built-in `ID` scalar. Accepts strings and integers, always
    /// serializes as a string.
    pub fn id() -> ScalarMeta {
        ScalarMeta::new(
            "ID",
            |v| match *v {
                InputValue::String(ref s) => Ok(Value::String(s.clone())),
                InputValue::Int(i) => Ok(Value::String(i.to_string())),
                ref other => Err(format!("ID cannot represent value: {}", other)),
            },
            |v| match *v {
                Value::String(ref s) => Ok(Value::String(s.clone())),
                Value::Int(i) => Ok(Value::String(i.to_string())),
                ref other => Err(format!("ID cannot represent value: {}", other)),
            },
        )
    }
}

impl ObjectMeta {
    /// Build an object type metadata with the provided fields.
    pub fn new<N: Into<String>>(name: N, fields: Vec<Field>) -> ObjectMeta {
        ObjectMeta {
            name: name.into(),
            fields,
            interface_names: vec![],
        }
    }

    /// Set the interfaces this type implements.
    pub fn interfaces(mut self, interfaces: &[&str]) -> ObjectMeta {
        self.interface_names = interfaces.iter().map(|s| (*s).to_owned()).collect();
        self
    }

    /// Wrap the type in a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::Object(self)
    }

    /// Access a field's meta data given its name.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl EnumMeta {
    /// Build an enum type metadata with the provided values.
    pub fn new<N: Into<String>>(name: N, values: &[EnumValue]) -> EnumMeta {
        EnumMeta {
            name: name.into(),
            values: values.to_vec(),
        }
    }

    /// Wrap the type in a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::Enum(self)
    }

    pub(crate) fn has_value(&self, name: &str) -> bool {
        self.values.iter().any(|v| v.name == name)
    }
}

impl InterfaceMeta {
    /// Build an interface type metadata with the provided fields.
    pub fn new<N: Into<String>>(name: N, fields: Vec<Field>) -> InterfaceMeta {
        InterfaceMeta {
            name: name.into(),
            fields,
            resolve_type_fn: None,
        }
    }

    /// Set the function resolving values of this interface to their concrete
    /// object type name. Without one, the source object's own
    /// [`type_name`](crate::SourceObject::type_name) is consulted.
    pub fn resolve_type<F>(mut self, f: F) -> InterfaceMeta
    where
        F: Fn(&crate::resolver::Resolved) -> Option<String> + Send + Sync + 'static,
    {
        self.resolve_type_fn = Some(Arc::new(f));
        self
    }

    /// Wrap the type in a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::Interface(self)
    }
}

impl UnionMeta {
    /// Build a union type metadata over the provided member type names.
    pub fn new<N: Into<String>>(name: N, of_types: &[&str]) -> UnionMeta {
        UnionMeta {
            name: name.into(),
            of_type_names: of_types.iter().map(|s| (*s).to_owned()).collect(),
            resolve_type_fn: None,
        }
    }

    /// Set the function resolving values of this union to their concrete
    /// object type name.
    pub fn resolve_type<F>(mut self, f: F) -> UnionMeta
    where
        F: Fn(&crate::resolver::Resolved) -> Option<String> + Send + Sync + 'static,
    {
        self.resolve_type_fn = Some(Arc::new(f));
        self
    }

    /// Wrap the type in a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::Union(self)
    }
}

impl InputObjectMeta {
    /// Build an input object type metadata with the provided input fields.
    ///
    /// Field types are plain type literals resolved through the schema at
    /// coercion time, so an input field may reference its own enclosing type.
    pub fn new<N: Into<String>>(name: N, input_fields: Vec<Argument>) -> InputObjectMeta {
        InputObjectMeta {
            name: name.into(),
            input_fields,
        }
    }

    /// Wrap the type in a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::InputObject(self)
    }
}

impl Field {
    /// Build a field with the provided name and output type.
    pub fn new<N: Into<String>>(name: N, field_type: Type) -> Field {
        Field {
            name: name.into(),
            arguments: vec![],
            field_type,
            resolver: None,
        }
    }

    /// Add an argument to the field.
    pub fn argument(mut self, arg: Argument) -> Field {
        self.arguments.push(arg);
        self
    }

    /// Set the field's resolver.
    ///
    /// Fields without one fall back to the default property/member access on
    /// the source value.
    pub fn resolver<F>(mut self, f: F) -> Field
    where
        F: for<'a> Fn(ResolverContext<'a>) -> FieldResult<ResolvedValue> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(f));
        self
    }
}

impl Argument {
    /// Build an argument with the provided name and type.
    pub fn new<N: Into<String>>(name: N, arg_type: Type) -> Argument {
        Argument {
            name: name.into(),
            arg_type,
            default_value: None,
            out_name: None,
        }
    }

    /// Set the default value applied when the argument is not supplied.
    pub fn default_value(mut self, default_value: InputValue) -> Argument {
        self.default_value = Some(default_value);
        self
    }

    /// Set the name under which the coerced value is exposed to resolver
    /// code. Purely a presentation concern: lookups in documents and
    /// variables always use the schema name.
    pub fn out_name<S: Into<String>>(mut self, out_name: S) -> Argument {
        self.out_name = Some(out_name.into());
        self
    }

    /// The key under which the coerced value is exposed.
    pub fn out_key(&self) -> &str {
        self.out_name.as_deref().unwrap_or(&self.name)
    }
}

impl EnumValue {
    /// Construct an enum value with the provided name.
    pub fn new<N: Into<String>>(name: N) -> EnumValue {
        EnumValue { name: name.into() }
    }
}
