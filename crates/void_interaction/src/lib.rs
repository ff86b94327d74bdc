//! Void Interaction - Effector Interaction Engine
//!
//! Lets an actor with several independent effectors (hands, feet, body,
//! shoulders, thighs) decide every tick which nearby objects each effector
//! may engage, and drives each engagement from free to connected to its
//! interaction-specific animation and back.
//!
//! # Features
//!
//! - Priority/distance ordered registry of objects in range
//! - Per-effector state machine with cone, orbital and line-of-sight checks
//! - Interrupt-transfer between objects without an idle gap
//! - Buttons, switches, rotators, touch, climbing, pickups, push and cover
//! - Orbital reach through `void_orbital`
//! - Event queue for gameplay code
//!
//! # Example
//!
//! ```ignore
//! use void_interaction::prelude::*;
//!
//! let mut interactor = Interactor::new(InteractorConfig::humanoid())?;
//! let door = interactor.spawn(
//!     InteractableObject::new("door", InteractionBehavior::ManualButton, door_pose)
//!         .with_targets(vec![Target::new(EffectorType::RightHand, handle)], EffectorMask::NONE),
//! );
//!
//! let mut services = Collaborators::new(&mut ik, &physics, &mut look).with_animator(&mut animator);
//! interactor.on_proximity_enter(door, &mut services);
//!
//! // Physics tick
//! interactor.fixed_update(&mut services);
//! // Frame
//! interactor.update(dt, &mut services);
//! interactor.start_stop_interaction(door, &mut services)?;
//!
//! for event in interactor.drain_events() {
//!     handle(event);
//! }
//! ```

pub mod behavior;
pub mod collaborators;
pub mod config;
pub mod context;
pub mod effector;
pub mod error;
pub mod events;
pub mod interactor;
pub mod link;
pub mod object;
pub mod probe;
pub mod registry;
pub mod transfer;

pub mod prelude {
    pub use crate::behavior::{
        Category, DistanceSettings, DropType, ForceSettings, HitSettings, HoldType, InteractionBehavior,
        InteractionKind, Mobility, PickSettings, RotatorSettings, SwitchSettings, TouchSettings,
    };
    pub use crate::collaborators::{
        ClearSight, ColliderId, Collaborators, IkDriver, LineOfSight, LookController, LookMode, NoLook, RayHit,
    };
    pub use crate::config::InteractorConfig;
    pub use crate::context::{ActorContext, Connection, DriveKey};
    pub use crate::effector::{ConeOverride, EffectorMask, EffectorRule, EffectorType, EFFECTOR_COUNT};
    pub use crate::error::{InteractionError, Result};
    pub use crate::events::InteractionEvent;
    pub use crate::interactor::Interactor;
    pub use crate::link::{EffectorLink, LinkPhase, LinkSignal, LinkState};
    pub use crate::object::{InteractableObject, ObjectId, ObjectStore, Target, MAX_PRIORITY};
    pub use crate::registry::{InteractionRegistry, RegistryEntry};
    pub use crate::transfer::Transfer;
}

pub use prelude::*;
