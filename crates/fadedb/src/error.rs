//! Mapping layer error types.

use thiserror::Error;

/// Mapping layer errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage or query error from the core engine.
    #[error("core error: {0}")]
    Core(#[from] fadedb_core::Error),

    /// Entity type not declared in the schema.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// Instance carries no identity value.
    #[error("instance of '{entity}' has no identity value")]
    MissingIdentity {
        /// Entity type name.
        entity: String,
    },

    /// Instance identity value is not a uuid.
    #[error("identity of '{entity}' is not a uuid")]
    InvalidIdentity {
        /// Entity type name.
        entity: String,
    },

    /// Relationship not declared for the entity.
    #[error("unknown relationship '{relation}' on entity '{entity}'")]
    UnknownRelation {
        /// Entity type name.
        entity: String,
        /// Relationship name.
        relation: String,
    },
}
