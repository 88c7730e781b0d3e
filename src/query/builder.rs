// src/query/builder.rs
// =============================================================================
// Synthesizes the single generic query the walker runs against every node.
//
// The query starts from the Relay root lookup and fans out to every node type:
//
//   query($id: ID!) {
//     node(id: $id) {
//       id
//       ... on Repository {
//         qwertyuiopas: owner { ... on User { id } ... on Organization { id } }
//         asdfghjklzxc: forks(first: 5) { edges { node { id } } }
//       }
//       ... on User { ... }
//     }
//   }
//
// Rules:
// - Only node references and connections are selected, one hop deep, and only
//   their `id`s. The query stays finite no matter how deep the schema goes.
// - A field is dropped when one of its required arguments can't be supplied.
//   Dropping is silent and bubbles up: a field or fragment left with nothing
//   to select is dropped too.
// - Every field except `id` and `node` gets a random 12 letter alias so the
//   same field name in sibling fragments never collides.
// =============================================================================

use super::ast::{Argument, ArgumentValue, Document, Field, InlineFragment, Operation, Selection, VariableDefinition};
use crate::error::SchemaError;
use crate::schema::{FieldDef, Schema, TypeDef, TypeKind, TypeRef, EDGES_FIELD, ID_FIELD, NODE_FIELD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Page size requested from every connection unless configured otherwise.
pub const DEFAULT_FIRST: i64 = 5;

/// Length of the random alias put on every field except `id` and `node`.
pub const ALIAS_LENGTH: usize = 12;

/// Name of the query variable holding the node's GID.
pub const ID_VARIABLE: &str = "id";

/// Decides which node types take part in the query.
///
/// Excluded types get no fragment of their own, and references or
/// connections pointing only at excluded types are not followed.
#[derive(Clone)]
pub struct TypeFilter(Arc<dyn Fn(&TypeDef) -> bool + Send + Sync>);

impl TypeFilter {
    pub fn new(predicate: impl Fn(&TypeDef) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Keep only the named types.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: HashSet<String> = names.into_iter().map(Into::into).collect();
        Self::new(move |ty| names.contains(&ty.name))
    }

    /// Keep everything except the named types.
    pub fn except<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: HashSet<String> = names.into_iter().map(Into::into).collect();
        Self::new(move |ty| !names.contains(&ty.name))
    }

    pub fn allows(&self, ty: &TypeDef) -> bool {
        (self.0)(ty)
    }
}

impl fmt::Debug for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeFilter(..)")
    }
}

/// Options for [`QueryBuilder::build`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Arguments passed to every connection field that declares them.
    pub connection_arguments: BTreeMap<String, ArgumentValue>,
    /// Restricts the node types the query covers.
    pub type_filter: Option<TypeFilter>,
    /// Seed for alias generation. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        let mut connection_arguments = BTreeMap::new();
        connection_arguments.insert("first".to_string(), ArgumentValue::Int(DEFAULT_FIRST));

        Self {
            connection_arguments,
            type_filter: None,
            seed: None,
        }
    }
}

impl BuildOptions {
    pub fn with_connection_argument(mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) -> Self {
        self.connection_arguments.insert(name.into(), value.into());
        self
    }

    pub fn with_type_filter(mut self, filter: TypeFilter) -> Self {
        self.type_filter = Some(filter);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Builds the walker query for one schema.
pub struct QueryBuilder<'a> {
    schema: &'a Schema,
    connection_arguments: &'a BTreeMap<String, ArgumentValue>,
    node_types: Vec<&'a TypeDef>,
    node_names: HashSet<&'a str>,
    rng: StdRng,
    aliases: HashSet<String>,
}

impl<'a> QueryBuilder<'a> {
    /// Builds the query and its printed text.
    ///
    /// Fails when the schema has no `Node` interface, a node type without an
    /// `id` field, or no `node` field on its query root.
    pub fn build(schema: &'a Schema, options: &'a BuildOptions) -> Result<(Document, String), SchemaError> {
        let mut builder = Self::new(schema, options)?;
        let document = builder.document();
        let text = document.to_query_string();
        Ok((document, text))
    }

    fn new(schema: &'a Schema, options: &'a BuildOptions) -> Result<Self, SchemaError> {
        schema.node_root_field()?;

        let node_types: Vec<&TypeDef> = schema
            .node_types()?
            .into_iter()
            .filter(|ty| options.type_filter.as_ref().map_or(true, |filter| filter.allows(ty)))
            .collect();
        let node_names = node_types.iter().map(|ty| ty.name.as_str()).collect();

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            schema,
            connection_arguments: &options.connection_arguments,
            node_types,
            node_names,
            rng,
            aliases: HashSet::new(),
        })
    }

    fn document(&mut self) -> Document {
        let mut selections = vec![id_selection()];
        for ty in self.node_types.clone() {
            match self.inline_fragment(ty) {
                Some(fragment) => selections.push(Selection::InlineFragment(fragment)),
                None => debug!(node_type = %ty.name, "no references to select, fragment dropped"),
            }
        }

        info!(
            node_types = self.node_types.len(),
            fragments = selections.len() - 1,
            "built walker query"
        );

        let mut root = Field::new(NODE_FIELD);
        root.arguments
            .push(Argument::new(ID_VARIABLE, ArgumentValue::Variable(ID_VARIABLE.to_string())));
        root.selections = selections;

        Document::new(Operation {
            name: None,
            variables: vec![VariableDefinition {
                name: ID_VARIABLE.to_string(),
                ty: TypeRef::non_null(TypeRef::named("ID")),
            }],
            selections: vec![Selection::Field(root)],
        })
    }

    // One fragment per node type, selecting its references and connections.
    // None when the type has nothing to select
    fn inline_fragment(&mut self, ty: &'a TypeDef) -> Option<InlineFragment> {
        let mut selections = Vec::new();
        for field in &ty.fields {
            let selection = if self.is_node_reference(field) {
                self.node_field(field)
            } else if self.is_connection(field) {
                self.connection_field(field)
            } else {
                continue;
            };

            match selection {
                Some(selected) => selections.push(Selection::Field(selected)),
                None => debug!(
                    node_type = %ty.name,
                    field = %field.name,
                    "field dropped, required arguments can't be supplied"
                ),
            }
        }

        if selections.is_empty() {
            None
        } else {
            Some(InlineFragment {
                type_condition: ty.name.clone(),
                selections,
            })
        }
    }

    // `owner { id }`, or for interfaces and unions
    // `owner { ... on User { id } ... on Organization { id } }`
    fn node_field(&mut self, field: &FieldDef) -> Option<Field> {
        let schema = self.schema;
        let mut ast = self.field(field, &BTreeMap::new())?;
        let target = schema.get_type(field.ty.named_type())?;

        if target.kind == TypeKind::Object {
            ast.selections.push(id_selection());
        } else {
            for member in self.possible_node_types(target) {
                ast.selections.push(Selection::InlineFragment(InlineFragment {
                    type_condition: member.name.clone(),
                    selections: vec![id_selection()],
                }));
            }
        }

        if ast.selections.is_empty() {
            None
        } else {
            Some(ast)
        }
    }

    // `friends(first: 5) { edges { node { id } } }`
    fn connection_field(&mut self, field: &FieldDef) -> Option<Field> {
        let schema = self.schema;
        let connection_arguments = self.connection_arguments;
        let mut ast = self.field(field, connection_arguments)?;

        let connection = schema.get_type(field.ty.named_type())?;
        let edges_def = connection.field(EDGES_FIELD)?;
        let edges = self.edges_field(edges_def)?;

        ast.selections.push(Selection::Field(edges));
        Some(ast)
    }

    fn edges_field(&mut self, edges_def: &FieldDef) -> Option<Field> {
        let schema = self.schema;
        let mut ast = self.field(edges_def, &BTreeMap::new())?;

        let edge = schema.get_type(edges_def.ty.named_type())?;
        let node_def = edge.field(NODE_FIELD)?;
        let node = self.node_field(node_def)?;

        ast.selections.push(Selection::Field(node));
        Some(ast)
    }

    // A bare field with its arguments and alias, or None if a required
    // argument isn't in `supplied`
    fn field(&mut self, field: &FieldDef, supplied: &BTreeMap<String, ArgumentValue>) -> Option<Field> {
        let satisfiable = field
            .args
            .iter()
            .all(|arg| supplied.contains_key(&arg.name) || !arg.is_required());
        if !satisfiable {
            return None;
        }

        let mut ast = Field::new(field.name.clone());
        ast.arguments = supplied
            .iter()
            .filter(|(name, _)| field.arg(name).is_some())
            .map(|(name, value)| Argument::new(name.clone(), value.clone()))
            .collect();
        if field.name != ID_FIELD && field.name != NODE_FIELD {
            ast.alias = Some(self.random_alias());
        }
        Some(ast)
    }

    // Does this field point straight at a node, or at an interface/union that
    // can be one?
    fn is_node_reference(&self, field: &FieldDef) -> bool {
        match self.schema.get_type(field.ty.named_type()) {
            Some(ty) if ty.kind == TypeKind::Object => self.node_names.contains(ty.name.as_str()),
            Some(ty) if ty.kind.is_abstract() => !self.possible_node_types(ty).is_empty(),
            _ => false,
        }
    }

    // Does this field return something with `edges { node }` where `node` is
    // a node reference?
    fn is_connection(&self, field: &FieldDef) -> bool {
        self.schema
            .get_type(field.ty.named_type())
            .and_then(|connection| connection.field(EDGES_FIELD))
            .and_then(|edges| self.schema.get_type(edges.ty.named_type()))
            .and_then(|edge| edge.field(NODE_FIELD))
            .map_or(false, |node| self.is_node_reference(node))
    }

    fn possible_node_types(&self, ty: &TypeDef) -> Vec<&'a TypeDef> {
        let schema = self.schema;
        schema
            .possible_types(&ty.name)
            .into_iter()
            .filter(|member| self.node_names.contains(member.name.as_str()))
            .collect()
    }

    fn random_alias(&mut self) -> String {
        loop {
            let alias: String = (0..ALIAS_LENGTH)
                .map(|_| self.rng.gen_range(b'a'..=b'z') as char)
                .collect();
            if self.aliases.insert(alias.clone()) {
                return alias;
            }
        }
    }
}

fn id_selection() -> Selection {
    Selection::Field(Field::new(ID_FIELD))
}
