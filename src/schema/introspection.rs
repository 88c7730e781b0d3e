// src/schema/introspection.rs
// =============================================================================
// Loads a Schema from the JSON an endpoint returns for the standard
// introspection query.
//
// The wire shape is decoded with serde into private mirror structs, then
// converted into the public schema model. Type references arrive as nested
// `{kind, name, ofType}` chains, e.g. `[Person!]!` is
//   NON_NULL -> LIST -> NON_NULL -> OBJECT "Person"
// =============================================================================

use super::{FieldDef, InputValueDef, Schema, TypeDef, TypeKind, TypeRef, DEFAULT_QUERY_TYPE};
use crate::error::SchemaError;
use serde::Deserialize;
use serde_json::Value;

/// The query used to fetch a schema from a live endpoint. Only the parts the
/// query builder needs are requested.
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    types {
      kind
      name
      fields(includeDeprecated: true) {
        name
        args { name defaultValue type { ...TypeRef } }
        type { ...TypeRef }
      }
      interfaces { name }
      possibleTypes { name }
      enumValues(includeDeprecated: true) { name }
    }
  }
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType { kind name }
            }
          }
        }
      }
    }
  }
}"#;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum WireKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSchema {
    query_type: Option<WireName>,
    types: Vec<WireType>,
}

#[derive(Debug, Deserialize)]
struct WireName {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireType {
    kind: WireKind,
    name: String,
    fields: Option<Vec<WireField>>,
    interfaces: Option<Vec<WireName>>,
    possible_types: Option<Vec<WireName>>,
    enum_values: Option<Vec<WireName>>,
}

#[derive(Debug, Deserialize)]
struct WireField {
    name: String,
    #[serde(default)]
    args: Vec<WireInputValue>,
    #[serde(rename = "type")]
    ty: WireTypeRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInputValue {
    name: String,
    #[serde(rename = "type")]
    ty: WireTypeRef,
    default_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTypeRef {
    kind: WireKind,
    name: Option<String>,
    of_type: Option<Box<WireTypeRef>>,
}

// Finds the `__schema` object, whether it sits at the top level or inside a
// `data` envelope
fn schema_object(mut value: Value) -> Option<Value> {
    if let Some(schema) = value.get_mut("__schema") {
        return Some(schema.take());
    }
    value
        .get_mut("data")
        .and_then(|data| data.get_mut("__schema"))
        .map(Value::take)
}

pub(super) fn schema_from_value(value: Value) -> Result<Schema, SchemaError> {
    let raw = schema_object(value).ok_or(SchemaError::MissingSchemaObject)?;
    let wire: WireSchema = serde_json::from_value(raw)?;

    let mut types = Vec::with_capacity(wire.types.len());
    for wire_type in wire.types {
        types.push(convert_type(wire_type)?);
    }

    let query_type = wire
        .query_type
        .map(|named| named.name)
        .unwrap_or_else(|| DEFAULT_QUERY_TYPE.to_string());

    Ok(Schema::new(types).with_query_type(query_type))
}

fn convert_type(wire: WireType) -> Result<TypeDef, SchemaError> {
    let kind = match wire.kind {
        WireKind::Scalar => TypeKind::Scalar,
        WireKind::Object => TypeKind::Object,
        WireKind::Interface => TypeKind::Interface,
        WireKind::Union => TypeKind::Union,
        WireKind::Enum => TypeKind::Enum,
        WireKind::InputObject => TypeKind::InputObject,
        WireKind::List | WireKind::NonNull => {
            return Err(SchemaError::MalformedTypeRef(format!(
                "named type `{}` has a wrapper kind",
                wire.name
            )))
        }
    };

    let mut fields = Vec::new();
    for field in wire.fields.unwrap_or_default() {
        let mut args = Vec::with_capacity(field.args.len());
        for arg in field.args {
            args.push(InputValueDef {
                name: arg.name,
                ty: convert_ref(&arg.ty)?,
                default_value: arg.default_value,
            });
        }
        fields.push(FieldDef {
            name: field.name,
            args,
            ty: convert_ref(&field.ty)?,
        });
    }

    let names = |list: Option<Vec<WireName>>| -> Vec<String> {
        list.unwrap_or_default().into_iter().map(|n| n.name).collect()
    };

    Ok(TypeDef {
        name: wire.name,
        kind,
        fields,
        interfaces: names(wire.interfaces),
        possible_types: names(wire.possible_types),
        enum_values: names(wire.enum_values),
    })
}

fn convert_ref(wire: &WireTypeRef) -> Result<TypeRef, SchemaError> {
    match wire.kind {
        WireKind::List | WireKind::NonNull => {
            let inner = wire.of_type.as_deref().ok_or_else(|| {
                SchemaError::MalformedTypeRef(format!("{:?} without ofType", wire.kind))
            })?;
            let inner = convert_ref(inner)?;
            Ok(match wire.kind {
                WireKind::List => TypeRef::list(inner),
                _ => TypeRef::non_null(inner),
            })
        }
        _ => wire
            .name
            .clone()
            .map(TypeRef::Named)
            .ok_or_else(|| SchemaError::MalformedTypeRef(format!("{:?} without a name", wire.kind))),
    }
}
