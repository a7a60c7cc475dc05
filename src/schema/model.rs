//! The schema registry and its builder.

use std::error::Error;
use std::fmt;

use fnv::FnvHashMap;

use crate::ast::Type;
use crate::schema::meta::{MetaType, ObjectMeta, ScalarMeta};

/// Metadata for a schema
///
/// A validated registry of named types plus the names of the root operation
/// types. Self-referential and mutually recursive types work because fields
/// refer to other types by name; the registry is the single point of
/// indirection.
pub struct SchemaType {
    types: FnvHashMap<String, MetaType>,
    query_type_name: String,
    mutation_type_name: Option<String>,
}

/// An error raised while assembling a schema from registered types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// Two types were registered under the same name.
    DuplicateType(String),
    /// A field, argument, interface or union member references a type that
    /// was never registered.
    UnknownType {
        /// The name of the missing type.
        referenced: String,
        /// The type whose definition references it.
        by: String,
    },
    /// A root operation type or union member is not an object type.
    NotAnObject(String),
    /// An object claims to implement a type that is not an interface.
    NotAnInterface(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SchemaError::DuplicateType(ref name) => {
                write!(f, "Type \"{}\" is registered more than once", name)
            }
            SchemaError::UnknownType {
                ref referenced,
                ref by,
            } => write!(
                f,
                "Type \"{}\" is referenced by \"{}\" but was never registered",
                referenced, by
            ),
            SchemaError::NotAnObject(ref name) => {
                write!(f, "Type \"{}\" must be an object type", name)
            }
            SchemaError::NotAnInterface(ref name) => {
                write!(f, "Type \"{}\" must be an interface type", name)
            }
        }
    }
}

impl Error for SchemaError {}

/// Collects type metadata and assembles a [`SchemaType`]
///
/// The builder starts out seeded with the built-in scalars (`Int`, `Float`,
/// `String`, `Boolean`, `ID`); everything else is registered explicitly.
pub struct SchemaBuilder {
    types: Vec<MetaType>,
}

impl SchemaBuilder {
    /// Construct a builder with the built-in scalars registered.
    pub fn new() -> SchemaBuilder {
        SchemaBuilder {
            types: vec![
                ScalarMeta::int().into_meta(),
                ScalarMeta::float().into_meta(),
                ScalarMeta::string().into_meta(),
                ScalarMeta::boolean().into_meta(),
                ScalarMeta::id().into_meta(),
            ],
        }
    }

    /// Register a type.
    pub fn register(mut self, meta: MetaType) -> SchemaBuilder {
        self.types.push(meta);
        self
    }

    /// Assemble the schema, checking that every referenced type exists and
    /// that the root operation types are objects.
    pub fn build(
        self,
        query_type_name: &str,
        mutation_type_name: Option<&str>,
    ) -> Result<SchemaType, SchemaError> {
        let mut types = FnvHashMap::default();
        for meta in self.types {
            let name = meta.name().to_owned();
            if types.insert(name.clone(), meta).is_some() {
                return Err(SchemaError::DuplicateType(name));
            }
        }

        let schema = SchemaType {
            types,
            query_type_name: query_type_name.to_owned(),
            mutation_type_name: mutation_type_name.map(str::to_owned),
        };

        schema.require_object(query_type_name)?;
        if let Some(name) = mutation_type_name {
            schema.require_object(name)?;
        }
        schema.check_references()?;

        Ok(schema)
    }
}

impl Default for SchemaBuilder {
    fn default() -> SchemaBuilder {
        SchemaBuilder::new()
    }
}

impl SchemaType {
    /// Look up a named type.
    pub fn concrete_type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// Look up the named type behind a type literal, unwrapping lists and
    /// non-null wrappers.
    pub fn concrete_type_of(&self, ty: &Type) -> Option<&MetaType> {
        self.types.get(ty.innermost_name())
    }

    /// The object type executing query operations.
    pub fn query_type(&self) -> &ObjectMeta {
        match self.types.get(&self.query_type_name) {
            Some(MetaType::Object(obj)) => obj,
            _ => panic!("Query type does not exist in schema"),
        }
    }

    /// The object type executing mutation operations, if one is configured.
    pub fn mutation_type(&self) -> Option<&ObjectMeta> {
        self.mutation_type_name.as_ref().map(|name| {
            match self.types.get(name) {
                Some(MetaType::Object(obj)) => obj,
                _ => panic!("Mutation type does not exist in schema"),
            }
        })
    }

    /// Whether `object` is a possible runtime type of the abstract type named
    /// `abstract_name`.
    pub fn is_possible_type(&self, abstract_name: &str, object: &ObjectMeta) -> bool {
        match self.types.get(abstract_name) {
            Some(MetaType::Interface(_)) => object
                .interface_names
                .iter()
                .any(|i| i == abstract_name),
            Some(MetaType::Union(u)) => u.of_type_names.iter().any(|n| n == &object.name),
            _ => false,
        }
    }

    /// Whether a fragment with the provided type condition applies to the
    /// given concrete object type.
    pub fn fragment_condition_matches(&self, condition: &str, object: &ObjectMeta) -> bool {
        condition == object.name || self.is_possible_type(condition, object)
    }

    fn require_object(&self, name: &str) -> Result<(), SchemaError> {
        match self.types.get(name) {
            Some(MetaType::Object(_)) => Ok(()),
            Some(_) => Err(SchemaError::NotAnObject(name.to_owned())),
            None => Err(SchemaError::UnknownType {
                referenced: name.to_owned(),
                by: "the schema roots".to_owned(),
            }),
        }
    }

    fn require_registered(&self, ty: &Type, by: &str) -> Result<(), SchemaError> {
        let name = ty.innermost_name();
        if self.types.contains_key(name) {
            Ok(())
        } else {
            Err(SchemaError::UnknownType {
                referenced: name.to_owned(),
                by: by.to_owned(),
            })
        }
    }

    fn check_references(&self) -> Result<(), SchemaError> {
        for meta in self.types.values() {
            match *meta {
                MetaType::Object(ObjectMeta {
                    ref name,
                    ref fields,
                    ref interface_names,
                }) => {
                    for field in fields {
                        self.require_registered(&field.field_type, name)?;
                        for arg in &field.arguments {
                            self.require_registered(&arg.arg_type, name)?;
                        }
                    }
                    for interface in interface_names {
                        match self.types.get(interface) {
                            Some(MetaType::Interface(_)) => {}
                            Some(_) => {
                                return Err(SchemaError::NotAnInterface(interface.clone()));
                            }
                            None => {
                                return Err(SchemaError::UnknownType {
                                    referenced: interface.clone(),
                                    by: name.clone(),
                                })
                            }
                        }
                    }
                }
                MetaType::Interface(ref interface) => {
                    for field in &interface.fields {
                        self.require_registered(&field.field_type, &interface.name)?;
                        for arg in &field.arguments {
                            self.require_registered(&arg.arg_type, &interface.name)?;
                        }
                    }
                }
                MetaType::Union(ref union) => {
                    for member in &union.of_type_names {
                        match self.types.get(member) {
                            Some(MetaType::Object(_)) => {}
                            Some(_) => return Err(SchemaError::NotAnObject(member.clone())),
                            None => {
                                return Err(SchemaError::UnknownType {
                                    referenced: member.clone(),
                                    by: union.name.clone(),
                                })
                            }
                        }
                    }
                }
                MetaType::InputObject(ref input) => {
                    for field in &input.input_fields {
                        self.require_registered(&field.arg_type, &input.name)?;
                    }
                }
                MetaType::Scalar(_) | MetaType::Enum(_) => {}
            }
        }
        Ok(())
    }
}
