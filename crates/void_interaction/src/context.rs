//! Actor-wide state shared by every effector link
//!
//! Links never reach for global state; everything they may touch during a
//! tick is passed to them through [`ActorContext`].

use crate::behavior::Mobility;
use crate::config::InteractorConfig;
use crate::effector::{EffectorMask, EffectorType, EFFECTOR_COUNT};
use crate::events::InteractionEvent;
use crate::object::{ObjectId, ObjectStore};
use crate::registry::InteractionRegistry;
use void_orbital::{OrbitalBlender, Pose};

/// Binding between an effector slot and an object target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub object: ObjectId,
    /// Index into the object's targets
    pub target: usize,
    /// Reached through an orbital drive
    pub via_orbital: bool,
}

/// Identifies the requester of an orbital drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriveKey {
    pub effector: EffectorType,
    pub object: ObjectId,
}

/// Mutable state for one actor
#[derive(Debug)]
pub struct ActorContext {
    pub(crate) config: InteractorConfig,
    pub(crate) pose: Pose,
    pub(crate) objects: ObjectStore,
    pub(crate) registry: InteractionRegistry,
    pub(crate) connections: [Option<Connection>; EFFECTOR_COUNT],
    pub(crate) orbital: Option<OrbitalBlender<DriveKey>>,
    pub(crate) selection: Option<ObjectId>,
    pub(crate) connect_all_done: bool,
    pub(crate) disconnect_all_done: bool,
    pub(crate) events: Vec<InteractionEvent>,
}

impl ActorContext {
    /// Create a new context
    pub fn new(config: InteractorConfig) -> Self {
        let orbital = config.orbital.clone().map(OrbitalBlender::new);
        Self {
            config,
            pose: Pose::IDENTITY,
            objects: ObjectStore::new(),
            registry: InteractionRegistry::new(),
            connections: [None; EFFECTOR_COUNT],
            orbital,
            selection: None,
            connect_all_done: false,
            disconnect_all_done: false,
            events: Vec::new(),
        }
    }

    pub fn connection(&self, effector: EffectorType) -> Option<&Connection> {
        self.connections[effector.index()].as_ref()
    }

    /// Effectors holding a connection to `object`
    pub fn holders(&self, object: ObjectId) -> EffectorMask {
        EffectorType::ALL
            .into_iter()
            .filter(|effector| {
                self.connections[effector.index()].is_some_and(|connection| connection.object == object)
            })
            .fold(EffectorMask::NONE, |mask, effector| mask.with(effector))
    }

    /// Store a connection and mark its object used
    pub(crate) fn connect(&mut self, effector: EffectorType, connection: Connection) {
        if let Some(previous) = self.connections[effector.index()].take() {
            self.refresh_used(previous.object);
        }
        self.connections[effector.index()] = Some(connection);
        if let Some(object) = self.objects.get_mut(connection.object) {
            object.used = true;
        }
    }

    /// Clear a connection; the object stays used while another effector holds it
    pub(crate) fn release(&mut self, effector: EffectorType) -> Option<Connection> {
        let connection = self.connections[effector.index()].take()?;
        self.refresh_used(connection.object);
        Some(connection)
    }

    fn refresh_used(&mut self, object: ObjectId) {
        let held = !self.holders(object).is_empty();
        if let Some(object) = self.objects.get_mut(object) {
            object.used = held;
        }
    }

    /// Object currently binding the actor in place
    pub fn mobility_lock(&self) -> Option<ObjectId> {
        self.connections
            .iter()
            .flatten()
            .map(|connection| connection.object)
            .find(|id| {
                self.objects
                    .get(*id)
                    .is_some_and(|object| object.kind().mobility() == Mobility::Locked)
            })
    }

    pub(crate) fn push_event(&mut self, event: InteractionEvent) {
        self.events.push(event);
    }

    /// Whether an object is still enabled and registered
    pub(crate) fn is_valid(&self, object: ObjectId) -> bool {
        self.objects.is_live(object) && self.registry.contains(object)
    }
}
