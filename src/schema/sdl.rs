// src/schema/sdl.rs
// =============================================================================
// Prints a Schema back as GraphQL SDL, the form GraphQL tooling reads.
//
// What is printed:
// - A `schema { query: ... }` block, so a root not called `Query` still works
// - Every type except the built-in scalars and introspection types (`__Type`)
// - Objects implement every interface they declare, plus every interface
//   that lists them among its possible types
//
// Default values come out exactly as stored; introspection already hands
// them over as GraphQL literals (`10`, `ALL`, `"main"`).
// =============================================================================

use super::{FieldDef, InputValueDef, Schema, TypeDef, TypeKind};

const BUILT_IN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

impl Schema {
    /// The schema as SDL text.
    pub fn to_sdl(&self) -> String {
        let mut out = format!("schema {{\n  query: {}\n}}\n", self.query_type_name());

        for ty in self.types().iter().filter(|ty| is_printed(ty)) {
            out.push('\n');
            out.push_str(&self.type_sdl(ty));
        }
        out
    }

    fn type_sdl(&self, ty: &TypeDef) -> String {
        match ty.kind {
            TypeKind::Scalar => format!("scalar {}\n", ty.name),
            TypeKind::Object => {
                let header = format!("type {}{}", ty.name, implements_clause(&self.interfaces_of(ty)));
                with_fields(header, &ty.fields)
            }
            TypeKind::Interface => {
                let interfaces: Vec<&str> = ty.interfaces.iter().map(String::as_str).collect();
                let header = format!("interface {}{}", ty.name, implements_clause(&interfaces));
                with_fields(header, &ty.fields)
            }
            TypeKind::Union if ty.possible_types.is_empty() => format!("union {}\n", ty.name),
            TypeKind::Union => format!("union {} = {}\n", ty.name, ty.possible_types.join(" | ")),
            TypeKind::Enum if ty.enum_values.is_empty() => format!("enum {}\n", ty.name),
            TypeKind::Enum => {
                let values: String = ty.enum_values.iter().map(|value| format!("  {}\n", value)).collect();
                format!("enum {} {{\n{}}}\n", ty.name, values)
            }
            // input fields aren't part of the model
            TypeKind::InputObject => format!("input {}\n", ty.name),
        }
    }

    // Declared interfaces first, then interfaces claiming the type as an
    // implementor
    fn interfaces_of<'a>(&'a self, ty: &'a TypeDef) -> Vec<&'a str> {
        let mut interfaces: Vec<&str> = ty.interfaces.iter().map(String::as_str).collect();
        for candidate in self.types() {
            if candidate.kind == TypeKind::Interface
                && candidate.possible_types.contains(&ty.name)
                && !interfaces.contains(&candidate.name.as_str())
            {
                interfaces.push(&candidate.name);
            }
        }
        interfaces
    }
}

fn is_printed(ty: &TypeDef) -> bool {
    !ty.name.starts_with("__") && !(ty.kind == TypeKind::Scalar && BUILT_IN_SCALARS.contains(&ty.name.as_str()))
}

fn implements_clause(interfaces: &[&str]) -> String {
    if interfaces.is_empty() {
        String::new()
    } else {
        format!(" implements {}", interfaces.join(" & "))
    }
}

fn with_fields(header: String, fields: &[FieldDef]) -> String {
    if fields.is_empty() {
        return format!("{}\n", header);
    }

    let body: String = fields.iter().map(|field| format!("  {}\n", field_sdl(field))).collect();
    format!("{} {{\n{}}}\n", header, body)
}

fn field_sdl(field: &FieldDef) -> String {
    if field.args.is_empty() {
        return format!("{}: {}", field.name, field.ty);
    }

    let args: Vec<String> = field.args.iter().map(argument_sdl).collect();
    format!("{}({}): {}", field.name, args.join(", "), field.ty)
}

fn argument_sdl(arg: &InputValueDef) -> String {
    match &arg.default_value {
        Some(default) => format!("{}: {} = {}", arg.name, arg.ty, default),
        None => format!("{}: {}", arg.name, arg.ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::schema::TypeRef;

    #[test]
    fn test_person_schema_sdl() {
        let sdl = fixtures::person_schema().to_sdl();

        assert!(sdl.starts_with("schema {\n  query: Query\n}\n"));
        assert!(sdl.contains("type Person implements Node {\n  id: ID!\n"));
        assert!(sdl.contains("  friends(first: Int, after: String): PersonConnection\n"));
        assert!(sdl.contains("  node(id: ID!): Node\n"));
        assert!(!sdl.contains("scalar ID"));
    }

    #[test]
    fn test_unions_enums_and_defaults() {
        let sdl = fixtures::polymorphic_schema().to_sdl();

        assert!(sdl.contains("union SearchResult = User | Repository | Bot\n"));
        assert!(sdl.contains("enum Affiliation {\n  ALL\n  ADMIN\n  MEMBER\n}\n"));
        assert!(sdl.contains("affiliation: Affiliation! = ALL"));
        assert!(sdl.contains("type User implements Node & RepositoryOwner {"));
    }

    #[test]
    fn test_possible_types_become_implements() {
        let schema = Schema::new(vec![
            TypeDef::interface("Node")
                .with_possible_type("Thing")
                .with_field(FieldDef::new("id", TypeRef::named("ID"))),
            TypeDef::object("Thing").with_field(FieldDef::new("id", TypeRef::named("ID"))),
            TypeDef::object("Empty"),
            TypeDef::scalar("DateTime"),
        ])
        .with_query_type("Root");
        let sdl = schema.to_sdl();

        assert!(sdl.contains("query: Root"));
        assert!(sdl.contains("type Thing implements Node {"));
        assert!(sdl.contains("type Empty\n"));
        assert!(sdl.contains("scalar DateTime\n"));
    }

    #[test]
    fn test_sdl_parses() {
        for schema in [fixtures::person_schema(), fixtures::polymorphic_schema()] {
            let parsed = apollo_compiler::Schema::parse(schema.to_sdl(), "schema.graphql");
            assert!(parsed.is_ok(), "{}", schema.to_sdl());
        }
    }
}
