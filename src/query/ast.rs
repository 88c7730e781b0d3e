// src/query/ast.rs
// =============================================================================
// A small GraphQL query AST, only as big as the walker query needs:
//
//   Document
//   └── Operation (variables)
//       └── Selection = Field | InlineFragment
//           ├── Field (alias?, name, arguments, selections)
//           └── InlineFragment (type condition, selections)
//
// Printing is a pure recursive function over the tree (the Display impls
// below), producing the same 2-space indented layout GraphQL tools print.
// =============================================================================

use crate::schema::TypeRef;
use std::fmt::{self, Write};

/// A whole query document. The walker only ever builds one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub operation: Operation,
}

/// A query operation with its variable definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: Option<String>,
    pub variables: Vec<VariableDefinition>,
    pub selections: Vec<Selection>,
}

/// `$name: Type` in the operation header.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(Field),
    InlineFragment(InlineFragment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<Argument>,
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    pub type_condition: String,
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub value: ArgumentValue,
}

/// A literal or variable in argument position.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Variable(String),
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    List(Vec<ArgumentValue>),
    Object(Vec<(String, ArgumentValue)>),
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: Vec::new(),
            selections: Vec::new(),
        }
    }

    /// The key this field's value appears under in a response.
    pub fn response_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl Argument {
    pub fn new(name: impl Into<String>, value: impl Into<ArgumentValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl From<i64> for ArgumentValue {
    fn from(value: i64) -> Self {
        ArgumentValue::Int(value)
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        ArgumentValue::Boolean(value)
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        ArgumentValue::String(value.to_string())
    }
}

impl From<String> for ArgumentValue {
    fn from(value: String) -> Self {
        ArgumentValue::String(value)
    }
}

// JSON has no enums or variables, so strings stay strings
impl From<serde_json::Value> for ArgumentValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ArgumentValue::Null,
            Value::Bool(b) => ArgumentValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ArgumentValue::Int(i),
                None => ArgumentValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => ArgumentValue::String(s),
            Value::Array(items) => ArgumentValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                ArgumentValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl Document {
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }

    /// The printed query text.
    pub fn to_query_string(&self) -> String {
        self.to_string()
    }

    /// Every field in the document, depth-first in document order.
    pub fn fields(&self) -> Vec<&Field> {
        let mut fields = Vec::new();
        collect_fields(&self.operation.selections, &mut fields);
        fields
    }

    /// Drops every alias. Useful for comparing the shape of two builds, which
    /// only differ in their random aliases.
    pub fn strip_aliases(&mut self) {
        strip_aliases(&mut self.operation.selections);
    }
}

fn collect_fields<'a>(selections: &'a [Selection], out: &mut Vec<&'a Field>) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                out.push(field);
                collect_fields(&field.selections, out);
            }
            Selection::InlineFragment(fragment) => collect_fields(&fragment.selections, out),
        }
    }
}

fn strip_aliases(selections: &mut [Selection]) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                field.alias = None;
                strip_aliases(&mut field.selections);
            }
            Selection::InlineFragment(fragment) => strip_aliases(&mut fragment.selections),
        }
    }
}

// -----------------------------------------------------------------------------
// Printing
// -----------------------------------------------------------------------------

const INDENT: &str = "  ";

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = &self.operation;
        f.write_str("query")?;
        if let Some(name) = &op.name {
            write!(f, " {}", name)?;
        }
        if !op.variables.is_empty() {
            f.write_char('(')?;
            for (i, var) in op.variables.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "${}: {}", var.name, var.ty)?;
            }
            f.write_char(')')?;
        }
        f.write_char(' ')?;
        write_selection_set(f, &op.selections, 0)
    }
}

fn write_selection_set(f: &mut fmt::Formatter<'_>, selections: &[Selection], depth: usize) -> fmt::Result {
    f.write_str("{\n")?;
    for selection in selections {
        write_indent(f, depth + 1)?;
        match selection {
            Selection::Field(field) => write_field(f, field, depth + 1)?,
            Selection::InlineFragment(fragment) => {
                write!(f, "... on {} ", fragment.type_condition)?;
                write_selection_set(f, &fragment.selections, depth + 1)?;
            }
        }
        f.write_char('\n')?;
    }
    write_indent(f, depth)?;
    f.write_char('}')
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &Field, depth: usize) -> fmt::Result {
    if let Some(alias) = &field.alias {
        write!(f, "{}: ", alias)?;
    }
    f.write_str(&field.name)?;
    if !field.arguments.is_empty() {
        f.write_char('(')?;
        for (i, arg) in field.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", arg.name, arg.value)?;
        }
        f.write_char(')')?;
    }
    if !field.selections.is_empty() {
        f.write_char(' ')?;
        write_selection_set(f, &field.selections, depth)?;
    }
    Ok(())
}

fn write_indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

impl fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentValue::Variable(name) => write!(f, "${}", name),
            ArgumentValue::Null => f.write_str("null"),
            ArgumentValue::Boolean(b) => write!(f, "{}", b),
            ArgumentValue::Int(i) => write!(f, "{}", i),
            ArgumentValue::Float(x) => write!(f, "{:?}", x),
            ArgumentValue::String(s) => write_string(f, s),
            ArgumentValue::Enum(name) => f.write_str(name),
            ArgumentValue::List(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_char(']')
            }
            ArgumentValue::Object(entries) => {
                f.write_char('{')?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_char('}')
            }
        }
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04X}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut owner = Field::new("owner");
        owner.alias = Some("abc".to_string());
        owner.selections.push(Selection::Field(Field::new("id")));

        let mut node = Field::new("node");
        node.arguments.push(Argument::new("id", ArgumentValue::Variable("id".to_string())));
        node.selections = vec![
            Selection::Field(Field::new("id")),
            Selection::InlineFragment(InlineFragment {
                type_condition: "Repository".to_string(),
                selections: vec![Selection::Field(owner)],
            }),
        ];

        Document::new(Operation {
            name: None,
            variables: vec![VariableDefinition {
                name: "id".to_string(),
                ty: TypeRef::non_null(TypeRef::named("ID")),
            }],
            selections: vec![Selection::Field(node)],
        })
    }

    #[test]
    fn test_prints_indented_query() {
        let expected = "query($id: ID!) {\n  node(id: $id) {\n    id\n    ... on Repository {\n      abc: owner {\n        id\n      }\n    }\n  }\n}";
        assert_eq!(sample().to_query_string(), expected);
    }

    #[test]
    fn test_fields_are_depth_first() {
        let doc = sample();
        let names: Vec<_> = doc.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["node", "id", "owner", "id"]);
    }

    #[test]
    fn test_strip_aliases() {
        let mut doc = sample();
        doc.strip_aliases();
        assert!(doc.fields().iter().all(|f| f.alias.is_none()));
        assert!(doc.to_query_string().contains("      owner {"));
    }

    #[test]
    fn test_argument_values_print_as_graphql() {
        let value = ArgumentValue::Object(vec![
            ("field".to_string(), ArgumentValue::Enum("CREATED_AT".to_string())),
            ("direction".to_string(), ArgumentValue::String("a \"b\"\n".to_string())),
            (
                "list".to_string(),
                ArgumentValue::List(vec![
                    ArgumentValue::Int(1),
                    ArgumentValue::Float(1.5),
                    ArgumentValue::Null,
                    ArgumentValue::Boolean(true),
                ]),
            ),
        ]);
        assert_eq!(
            value.to_string(),
            r#"{field: CREATED_AT, direction: "a \"b\"\n", list: [1, 1.5, null, true]}"#
        );
    }

    #[test]
    fn test_argument_value_from_json() {
        let value: ArgumentValue = serde_json::json!({"first": 5, "after": "abc"}).into();
        assert_eq!(value.to_string(), r#"{after: "abc", first: 5}"#);
    }
}
