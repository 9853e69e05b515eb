//! Catalog fixtures
//!
//! 192 (administrator role) -> 193 (game master role) -> 194 (moderator role)
//! -> 195 (player role); each role carries a few commands.

use account_rbac::auth::rbac::{CatalogDocument, RbacCatalog};

pub const CATALOG_YAML: &str = r#"
permissions:
  - id: 192
    name: "Role: administrator"
    linked: [193, 200]
  - id: 193
    name: "Role: game master"
    linked: [194, 201]
  - id: 194
    name: "Role: moderator"
    linked: [195]
  - id: 195
    name: "Role: player"
  - id: 200
    name: "Command: reload rbac"
  - id: 201
    name: "Command: gm fly"
defaults:
  administrator: [192]
  game_master: [193]
  moderator: [194]
  player: [195]
"#;

/// The fixture catalog, built the same way a catalog file is loaded
pub fn test_catalog() -> RbacCatalog {
    CatalogDocument::parse(CATALOG_YAML)
        .and_then(CatalogDocument::into_catalog)
        .expect("Fixture catalog must parse")
}
