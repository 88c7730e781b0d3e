// src/schema/mod.rs
// =============================================================================
// This module holds the read-only schema model the query builder works from.
//
// A schema is plain data here: a list of named types, each with fields, each
// field with arguments and a return type. Nothing is resolved or executed.
// The builder only asks a handful of questions of it:
// - Which object types implement `Node`?
// - What does this field return once list/non-null wrappers are peeled off?
// - Which concrete types can an interface or union be?
//
// Schemas can be built by hand (handy in tests) or loaded from the JSON an
// endpoint returns for the standard introspection query (see introspection.rs),
// and printed back as SDL (see sdl.rs).
// =============================================================================

mod introspection;
mod sdl;

pub use introspection::INTROSPECTION_QUERY;

use crate::error::SchemaError;
use std::collections::HashMap;
use std::fmt;

/// Name of the identity interface every walkable type implements.
pub const NODE_INTERFACE: &str = "Node";
/// Name of the identity field.
pub const ID_FIELD: &str = "id";
/// Name of the root lookup field, and of the field on a connection edge.
pub const NODE_FIELD: &str = "node";
/// Name of the list field on a connection type.
pub const EDGES_FIELD: &str = "edges";
/// Default name of the query root type.
pub const DEFAULT_QUERY_TYPE: &str = "Query";

/// The kind of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    /// Object, interface and union types need a selection set.
    pub fn is_composite(self) -> bool {
        matches!(self, TypeKind::Object | TypeKind::Interface | TypeKind::Union)
    }

    /// Interfaces and unions stand for one of several concrete types.
    pub fn is_abstract(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Union)
    }
}

/// A possibly wrapped reference to a named type, e.g. `[Person!]!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    /// The innermost named type, with every list/non-null wrapper removed.
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    /// Whether the outermost wrapper is non-null.
    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// An argument of a field (or a field of an input object).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValueDef {
    pub name: String,
    pub ty: TypeRef,
    /// The default value as GraphQL source text, if the schema declares one.
    pub default_value: Option<String>,
}

impl InputValueDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value: None,
        }
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// A required argument is non-null and has no default, so leaving it out
    /// (or passing null) is invalid.
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

/// A field of an object or interface type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub args: Vec<InputValueDef>,
    pub ty: TypeRef,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            ty,
        }
    }

    pub fn with_arg(mut self, arg: InputValueDef) -> Self {
        self.args.push(arg);
        self
    }

    pub fn arg(&self, name: &str) -> Option<&InputValueDef> {
        self.args.iter().find(|arg| arg.name == name)
    }
}

/// A named type in the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    pub fields: Vec<FieldDef>,
    /// Interfaces this type declares it implements.
    pub interfaces: Vec<String>,
    /// Declared members of a union, or declared implementors of an interface.
    pub possible_types: Vec<String>,
    /// Values of an enum.
    pub enum_values: Vec<String>,
}

impl TypeDef {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: Vec::new(),
            interfaces: Vec::new(),
            possible_types: Vec::new(),
            enum_values: Vec::new(),
        }
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Object)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn union(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Union)
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Scalar)
    }

    pub fn enum_type(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Enum)
    }

    pub fn input_object(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::InputObject)
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_possible_type(mut self, member: impl Into<String>) -> Self {
        self.possible_types.push(member.into());
        self
    }

    pub fn with_enum_value(mut self, value: impl Into<String>) -> Self {
        self.enum_values.push(value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|name| name == interface)
    }
}

/// A whole schema: its types in declaration order plus the query root name.
#[derive(Debug, Clone)]
pub struct Schema {
    types: Vec<TypeDef>,
    index: HashMap<String, usize>,
    query_type: String,
}

impl Schema {
    /// Builds a schema from its types. If a name is declared twice the first
    /// declaration wins.
    pub fn new(types: Vec<TypeDef>) -> Self {
        let mut index = HashMap::with_capacity(types.len());
        for (position, ty) in types.iter().enumerate() {
            index.entry(ty.name.clone()).or_insert(position);
        }

        Self {
            types,
            index,
            query_type: DEFAULT_QUERY_TYPE.to_string(),
        }
    }

    pub fn with_query_type(mut self, name: impl Into<String>) -> Self {
        self.query_type = name.into();
        self
    }

    /// Loads a schema from the JSON result of [`INTROSPECTION_QUERY`].
    ///
    /// Accepts both the full response (`{"data": {"__schema": ...}}`) and the
    /// bare data object (`{"__schema": ...}`).
    pub fn from_introspection_json(text: &str) -> Result<Self, SchemaError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_introspection_value(value)
    }

    /// Same as [`Schema::from_introspection_json`] for an already parsed value.
    pub fn from_introspection_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        introspection::schema_from_value(value)
    }

    pub fn types(&self) -> &[TypeDef] {
        &self.types
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.index.get(name).map(|&position| &self.types[position])
    }

    pub fn query_type_name(&self) -> &str {
        &self.query_type
    }

    pub fn query_type(&self) -> Option<&TypeDef> {
        self.get_type(&self.query_type)
    }

    /// Concrete object types a value of type `name` can have at runtime.
    ///
    /// - object: itself
    /// - union: its members
    /// - interface: declared implementors plus every object that declares the
    ///   interface
    ///
    /// Results follow schema declaration order without duplicates.
    pub fn possible_types(&self, name: &str) -> Vec<&TypeDef> {
        let Some(ty) = self.get_type(name) else {
            return Vec::new();
        };

        match ty.kind {
            TypeKind::Object => vec![ty],
            TypeKind::Union | TypeKind::Interface => self
                .types
                .iter()
                .filter(|candidate| candidate.kind == TypeKind::Object)
                .filter(|candidate| {
                    ty.possible_types.iter().any(|member| *member == candidate.name)
                        || (ty.kind == TypeKind::Interface && candidate.implements(&ty.name))
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Every object type implementing `Node`, checked for an `id` field.
    pub fn node_types(&self) -> Result<Vec<&TypeDef>, SchemaError> {
        match self.get_type(NODE_INTERFACE) {
            Some(node) if node.kind == TypeKind::Interface => {}
            _ => return Err(SchemaError::MissingNodeInterface(NODE_INTERFACE.to_string())),
        }

        let node_types = self.possible_types(NODE_INTERFACE);
        for ty in &node_types {
            if ty.field(ID_FIELD).is_none() {
                return Err(SchemaError::MissingIdField(ty.name.clone()));
            }
        }

        Ok(node_types)
    }

    /// Checks the query root exposes `node(id:)`.
    pub fn node_root_field(&self) -> Result<&FieldDef, SchemaError> {
        let query = self
            .query_type()
            .ok_or_else(|| SchemaError::MissingQueryType(self.query_type.clone()))?;

        query
            .field(NODE_FIELD)
            .ok_or_else(|| SchemaError::MissingNodeField(query.name.clone()))
    }
}
