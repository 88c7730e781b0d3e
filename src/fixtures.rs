// src/fixtures.rs
// =============================================================================
// Hand-built schemas shared by the unit tests.
//
// - person_schema: one node type with a self-referencing connection. Small
//   enough to write expected query text by hand.
// - polymorphic_schema: a GitHub-flavoured schema with interfaces, unions,
//   required arguments and a connection to non-node types.
// =============================================================================

use crate::schema::{FieldDef, InputValueDef, Schema, TypeDef, TypeRef};

fn id_field() -> FieldDef {
    FieldDef::new("id", TypeRef::non_null(TypeRef::named("ID")))
}

fn scalar_field(name: &str, scalar: &str) -> FieldDef {
    FieldDef::new(name, TypeRef::named(scalar))
}

fn connection_field(name: &str, connection: &str) -> FieldDef {
    FieldDef::new(name, TypeRef::named(connection))
        .with_arg(InputValueDef::new("first", TypeRef::named("Int")))
        .with_arg(InputValueDef::new("after", TypeRef::named("String")))
}

fn connection_types(prefix: &str, node: &str) -> Vec<TypeDef> {
    vec![
        TypeDef::object(format!("{}Connection", prefix))
            .with_field(FieldDef::new(
                "edges",
                TypeRef::list(TypeRef::named(format!("{}Edge", prefix))),
            ))
            .with_field(FieldDef::new(
                "totalCount",
                TypeRef::non_null(TypeRef::named("Int")),
            )),
        TypeDef::object(format!("{}Edge", prefix))
            .with_field(FieldDef::new("cursor", TypeRef::non_null(TypeRef::named("String"))))
            .with_field(FieldDef::new("node", TypeRef::named(node))),
    ]
}

fn base_types() -> Vec<TypeDef> {
    vec![
        TypeDef::scalar("ID"),
        TypeDef::scalar("String"),
        TypeDef::scalar("Int"),
        TypeDef::scalar("Boolean"),
        TypeDef::interface("Node").with_field(id_field()),
        TypeDef::object("Query").with_field(
            FieldDef::new("node", TypeRef::named("Node"))
                .with_arg(InputValueDef::new("id", TypeRef::non_null(TypeRef::named("ID")))),
        ),
    ]
}

/// `Person { id, name, friends: PersonConnection }`.
pub(crate) fn person_schema() -> Schema {
    let mut types = base_types();
    types.push(
        TypeDef::object("Person")
            .with_interface("Node")
            .with_field(id_field())
            .with_field(scalar_field("name", "String"))
            .with_field(connection_field("friends", "PersonConnection")),
    );
    types.extend(connection_types("Person", "Person"));
    Schema::new(types)
}

/// Users, organizations, bots and repositories.
///
/// - `RepositoryOwner` is an interface implemented by two node types and by
///   `Bot`, which is not a node.
/// - `SearchResult` is a union of `User`, `Repository` and `Bot`.
/// - `User.starredRepositories` needs `ownedByViewer: Boolean!`, which the
///   default connection arguments don't provide.
/// - `User.followers` needs `first: Int!`, which they do provide.
/// - `Repository.lastCommitter` needs `since: String!` and is a plain node
///   reference, so it can never be selected.
/// - `Organization.bots` is a connection whose edges point at non-nodes.
pub(crate) fn polymorphic_schema() -> Schema {
    let mut types = base_types();
    types.push(
        TypeDef::interface("RepositoryOwner")
            .with_field(id_field())
            .with_field(scalar_field("login", "String")),
    );
    types.push(
        TypeDef::union("SearchResult")
            .with_possible_type("User")
            .with_possible_type("Repository")
            .with_possible_type("Bot"),
    );
    types.push(
        TypeDef::enum_type("Affiliation")
            .with_enum_value("ALL")
            .with_enum_value("ADMIN")
            .with_enum_value("MEMBER"),
    );
    types.push(
        TypeDef::object("User")
            .with_interface("Node")
            .with_interface("RepositoryOwner")
            .with_field(id_field())
            .with_field(scalar_field("login", "String"))
            .with_field(connection_field("repositories", "RepositoryConnection"))
            .with_field(
                FieldDef::new("followers", TypeRef::named("UserConnection"))
                    .with_arg(InputValueDef::new("first", TypeRef::non_null(TypeRef::named("Int")))),
            )
            .with_field(
                connection_field("starredRepositories", "RepositoryConnection").with_arg(
                    InputValueDef::new("ownedByViewer", TypeRef::non_null(TypeRef::named("Boolean"))),
                ),
            ),
    );
    types.push(
        TypeDef::object("Organization")
            .with_interface("Node")
            .with_interface("RepositoryOwner")
            .with_field(id_field())
            .with_field(scalar_field("login", "String"))
            .with_field(
                connection_field("members", "UserConnection").with_arg(
                    InputValueDef::new("affiliation", TypeRef::non_null(TypeRef::named("Affiliation")))
                        .with_default("ALL"),
                ),
            )
            .with_field(connection_field("bots", "BotConnection")),
    );
    types.push(
        TypeDef::object("Bot")
            .with_interface("RepositoryOwner")
            .with_field(id_field())
            .with_field(scalar_field("login", "String")),
    );
    types.push(
        TypeDef::object("Repository")
            .with_interface("Node")
            .with_field(id_field())
            .with_field(scalar_field("name", "String"))
            .with_field(FieldDef::new(
                "owner",
                TypeRef::non_null(TypeRef::named("RepositoryOwner")),
            ))
            .with_field(FieldDef::new("parent", TypeRef::named("Repository")))
            .with_field(FieldDef::new(
                "featured",
                TypeRef::list(TypeRef::named("SearchResult")),
            ))
            .with_field(
                FieldDef::new("lastCommitter", TypeRef::named("User"))
                    .with_arg(InputValueDef::new("since", TypeRef::non_null(TypeRef::named("String")))),
            ),
    );
    types.extend(connection_types("Repository", "Repository"));
    types.extend(connection_types("User", "User"));
    types.extend(connection_types("Bot", "Bot"));
    Schema::new(types)
}
