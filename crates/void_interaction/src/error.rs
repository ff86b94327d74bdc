//! Error types for the interaction engine

use crate::effector::EffectorType;
use crate::object::ObjectId;
use thiserror::Error;
use void_orbital::OrbitalError;

/// Interaction errors
///
/// Only explicit calls into the [`Interactor`](crate::interactor::Interactor)
/// return these. Per-tick eligibility failures are not errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InteractionError {
    /// Object handle is unknown or was despawned
    #[error("Object not found: {0:?}")]
    ObjectNotFound(ObjectId),

    /// Object exists but is disabled
    #[error("Object disabled: {0:?}")]
    ObjectDisabled(ObjectId),

    /// No enabled slot for the effector
    #[error("Effector not available: {0}")]
    EffectorNotFound(EffectorType),

    /// Object has no target for the effector
    #[error("Object {object:?} has no target for {effector}")]
    NoTarget { object: ObjectId, effector: EffectorType },

    /// Pickup parameters on a non-pickable object
    #[error("Object is not pickable: {0:?}")]
    NotPickable(ObjectId),

    /// Another interaction already binds the actor in place
    #[error("Actor mobility is locked by {0:?}")]
    MobilityLocked(ObjectId),

    /// Configuration values are inconsistent
    #[error("Invalid interactor configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Orbital(#[from] OrbitalError),
}

impl From<serde_json::Error> for InteractionError {
    fn from(err: serde_json::Error) -> Self {
        InteractionError::Parse(err.to_string())
    }
}

/// Result type for interaction operations
pub type Result<T> = std::result::Result<T, InteractionError>;
