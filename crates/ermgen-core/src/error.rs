use thiserror::Error;

/// Core error type shared across ermgen crates.
///
/// Every variant is terminal for a generation run and carries the class and
/// attribute context needed to correct the model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// A scalar attribute type has no column equivalent.
    #[error("cannot map type '{type_name}' of {class}.{attribute} to a column type")]
    UnmappableType {
        class: String,
        attribute: String,
        type_name: String,
    },
    /// An association points at a class that is absent or produces no table.
    #[error("{class}.{attribute} references '{target}', which has no table in the model")]
    MissingReferencedEntity {
        class: String,
        attribute: String,
        target: String,
    },
    /// Two distinct classes resolve to the same table identifier.
    #[error("table name '{name}' is produced by both '{first}' and '{second}'")]
    IdentifierCollision {
        name: String,
        first: String,
        second: String,
    },
    /// An association points at a class without identity attributes.
    #[error("{class}.{attribute} references '{target}', which has no primary key")]
    KeylessReference {
        class: String,
        attribute: String,
        target: String,
    },
    /// An association needs the key of a table whose key is still being built.
    #[error("{class}.{attribute} references '{target}' while its key is still being resolved")]
    CyclicKey {
        class: String,
        attribute: String,
        target: String,
    },
    /// The model violates structural invariants.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Convenience alias for results returned by ermgen crates.
pub type Result<T> = std::result::Result<T, Error>;
