//! Entity object errors

use thiserror::Error;

/// Failures reported by entity objects.
///
/// None of these abort the caller: each is logged where it happens and
/// handed back so the caller can decide what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Input matched no grammar
    #[error("'{0}' is not a valid entity")]
    Parse(String),

    /// Grammar matched but the target could not be found
    #[error("{0}")]
    Resolution(String),

    /// Native construction failed or produced an unusable instance
    #[error("error spawning entity: {0}")]
    Spawn(String),

    /// Operation not legal in the object's current state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("unknown mechanism '{0}'")]
    UnknownMechanism(String),

    #[error("invalid value for mechanism '{name}': {reason}")]
    InvalidMechanism { name: String, reason: String },
}

impl EntityError {
    pub fn invalid_mechanism(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidMechanism {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
