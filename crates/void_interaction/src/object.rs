//! Interactable objects and their targets

use crate::behavior::{InteractionBehavior, InteractionKind};
use crate::collaborators::{ColliderId, LookMode};
use crate::effector::{ConeOverride, EffectorMask, EffectorType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use void_orbital::Pose;

/// Highest priority an object can carry
pub const MAX_PRIORITY: u8 = 200;

/// Stable handle to an object in an [`ObjectStore`]
///
/// Handles are never reused, so a stale handle simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Attach point for one effector type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Effector this target is meant for
    pub effector: EffectorType,
    /// Pose relative to the owning object
    pub local: Pose,
    /// Replacement cone/radius values for this target only
    pub rules: Option<ConeOverride>,
}

impl Target {
    /// Create a new target
    pub fn new(effector: EffectorType, local: Pose) -> Self {
        Self {
            effector,
            local,
            rules: None,
        }
    }

    /// Override parts of the effector rule for this target
    pub fn with_rules(mut self, rules: ConeOverride) -> Self {
        self.rules = Some(rules);
        self
    }
}

/// A scene entity offering interaction targets
#[derive(Debug, Clone, PartialEq)]
pub struct InteractableObject {
    /// Display name, used in logs
    pub name: String,
    /// What happens when an effector engages the object
    pub behavior: InteractionBehavior,
    priority: u8,
    /// Disabled objects are dropped from the registry
    pub enabled: bool,
    pub(crate) used: bool,
    /// Ignore proximity exits while set
    pub prevent_exit: bool,
    /// Requests for this object may take over an effector mid-interaction
    pub interruptible: bool,
    /// Several effectors connect together
    pub multiple_connections: bool,
    /// Ask the IK driver to pause once at the target
    pub pause_on_interaction: bool,
    /// Reach with the orbital blend tree when the actor supports it
    pub orbital_reach: bool,
    /// When the actor looks at the object
    pub look_mode: LookMode,
    /// World pose
    pub pose: Pose,
    targets: Vec<Target>,
    pub(crate) useable: EffectorMask,
    /// Colliders that never count as obstructions
    pub allowed_colliders: Vec<ColliderId>,
    /// Test line of sight before connecting
    pub check_obstruction: bool,
}

impl InteractableObject {
    /// Create a new object
    pub fn new(name: impl Into<String>, behavior: InteractionBehavior, pose: Pose) -> Self {
        let multiple_connections = behavior.kind().connects_all();

        Self {
            name: name.into(),
            behavior,
            priority: 0,
            enabled: true,
            used: false,
            prevent_exit: false,
            interruptible: false,
            multiple_connections,
            pause_on_interaction: false,
            orbital_reach: false,
            look_mode: LookMode::NEVER,
            pose,
            targets: Vec::new(),
            useable: EffectorMask::NONE,
            allowed_colliders: Vec::new(),
            check_obstruction: false,
        }
    }

    /// Set the priority, clamped to [`MAX_PRIORITY`]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.min(MAX_PRIORITY);
        self
    }

    /// Attach targets, dropping those for excluded effectors
    ///
    /// Targets are fixed from here on.
    pub fn with_targets(mut self, targets: Vec<Target>, excluded: EffectorMask) -> Self {
        self.targets = targets
            .into_iter()
            .filter(|target| !excluded.contains(target.effector))
            .collect();
        self
    }

    pub fn with_interruptible(mut self, interruptible: bool) -> Self {
        self.interruptible = interruptible;
        self
    }

    pub fn with_pause_on_interaction(mut self, pause: bool) -> Self {
        self.pause_on_interaction = pause;
        self
    }

    pub fn with_orbital_reach(mut self, orbital: bool) -> Self {
        self.orbital_reach = orbital;
        self
    }

    pub fn with_prevent_exit(mut self, prevent_exit: bool) -> Self {
        self.prevent_exit = prevent_exit;
        self
    }

    pub fn with_look_mode(mut self, mode: LookMode) -> Self {
        self.look_mode = mode;
        self
    }

    /// Enable obstruction checks, ignoring the given colliders
    pub fn with_obstruction_check(mut self, allowed: Vec<ColliderId>) -> Self {
        self.check_obstruction = true;
        self.allowed_colliders = allowed;
        self
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn kind(&self) -> InteractionKind {
        self.behavior.kind()
    }

    /// Held by at least one effector
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Effectors that currently pass eligibility
    pub fn useable(&self) -> EffectorMask {
        self.useable
    }

    /// Enough effectors are eligible to start
    pub fn is_ready(&self) -> bool {
        self.useable.count() >= self.kind().required_effectors()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }

    /// First target for an effector
    pub fn target_for(&self, effector: EffectorType) -> Option<(usize, &Target)> {
        self.targets
            .iter()
            .enumerate()
            .find(|(_, target)| target.effector == effector)
    }

    /// World pose of a target
    pub fn target_world_pose(&self, index: usize) -> Option<Pose> {
        self.targets.get(index).map(|target| self.pose.mul_pose(&target.local))
    }

    pub(crate) fn set_target_local(&mut self, index: usize, local: Pose) {
        if let Some(target) = self.targets.get_mut(index) {
            target.local = local;
        }
    }
}

/// Owner of every interactable object an actor can see
#[derive(Debug, Default)]
pub struct ObjectStore {
    objects: HashMap<ObjectId, InteractableObject>,
    next_id: u64,
}

impl ObjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and issue its handle
    pub fn insert(&mut self, object: InteractableObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, object);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<InteractableObject> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&InteractableObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut InteractableObject> {
        self.objects.get_mut(&id)
    }

    /// Exists and is enabled
    pub fn is_live(&self, id: ObjectId) -> bool {
        self.objects.get(&id).is_some_and(|object| object.enabled)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &InteractableObject)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut InteractableObject)> {
        self.objects.iter_mut().map(|(id, object)| (*id, object))
    }
}
