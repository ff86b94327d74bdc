//! Interaction events

use crate::behavior::{DropType, HoldType};
use crate::effector::EffectorType;
use crate::object::ObjectId;
use serde::{Deserialize, Serialize};

/// Something that happened during a tick, queued for the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InteractionEvent {
    /// An effector bound itself to an object
    Connected { effector: EffectorType, object: ObjectId },
    /// An effector released an object
    Disconnected { effector: EffectorType, object: ObjectId },
    /// An effector started handing off to another object
    TransferStarted {
        effector: EffectorType,
        from: ObjectId,
        to: ObjectId,
    },
    /// The hand-off blend finished
    TransferCompleted { effector: EffectorType, object: ObjectId },
    PickedUp { object: ObjectId, hold: HoldType },
    Dropped { object: ObjectId, drop: DropType },
    SwitchToggled { object: ObjectId, on: bool },
    /// A force interaction reached its target
    ForceApplied { object: ObjectId, impulse: f32 },
    /// A rotator advanced while held
    Rotated { object: ObjectId, rotation: f32 },
    CoverEntered { object: ObjectId },
    CoverExited { object: ObjectId },
    /// Orbital reach was requested but no blender or animator was available
    OrbitalDegraded { object: ObjectId },
}

impl InteractionEvent {
    /// Object the event concerns
    pub fn object(&self) -> ObjectId {
        match *self {
            InteractionEvent::Connected { object, .. }
            | InteractionEvent::Disconnected { object, .. }
            | InteractionEvent::TransferCompleted { object, .. }
            | InteractionEvent::PickedUp { object, .. }
            | InteractionEvent::Dropped { object, .. }
            | InteractionEvent::SwitchToggled { object, .. }
            | InteractionEvent::ForceApplied { object, .. }
            | InteractionEvent::Rotated { object, .. }
            | InteractionEvent::CoverEntered { object }
            | InteractionEvent::CoverExited { object }
            | InteractionEvent::OrbitalDegraded { object } => object,
            InteractionEvent::TransferStarted { to, .. } => to,
        }
    }
}
