//! Registry of objects in range of the actor
//!
//! Proximity entries are kept sorted by priority (descending) then squared
//! distance (ascending). Self and distance interactions do not come from
//! proximity; each has one pinned slot that is always visited first.

use crate::behavior::InteractionKind;
use crate::object::{ObjectId, ObjectStore};
use glam::Vec3;

/// A proximity entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistryEntry {
    pub object: ObjectId,
    /// Priority at the last resort
    pub priority: u8,
    /// Squared distance to the actor at the last resort
    pub distance_sq: f32,
}

/// Ordered set of candidate objects for one actor
#[derive(Debug, Clone, Default)]
pub struct InteractionRegistry {
    entries: Vec<RegistryEntry>,
    self_slot: Option<ObjectId>,
    distance_slot: Option<ObjectId>,
}

impl InteractionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert from a proximity event
    ///
    /// Returns `true` when the object was newly added. Kinds that are not
    /// proximity driven are ignored.
    pub fn enter(&mut self, object: ObjectId, kind: InteractionKind) -> bool {
        if !kind.is_proximity_driven() || self.contains(object) {
            return false;
        }
        self.entries.push(RegistryEntry {
            object,
            priority: 0,
            distance_sq: f32::MAX,
        });
        true
    }

    /// Remove from a proximity event
    pub fn exit(&mut self, object: ObjectId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.object != object);
        self.entries.len() != before
    }

    /// Insert outside of proximity events
    ///
    /// Self and distance kinds take their pinned slot, replacing whatever
    /// held it.
    pub fn manual_add(&mut self, object: ObjectId, kind: InteractionKind) -> bool {
        match kind {
            InteractionKind::SelfInteraction => self.self_slot.replace(object) != Some(object),
            InteractionKind::Distance => self.distance_slot.replace(object) != Some(object),
            _ => {
                if self.contains(object) {
                    return false;
                }
                self.entries.push(RegistryEntry {
                    object,
                    priority: 0,
                    distance_sq: f32::MAX,
                });
                true
            }
        }
    }

    /// Remove from any slot
    pub fn manual_remove(&mut self, object: ObjectId) -> bool {
        let mut removed = self.exit(object);
        if self.self_slot == Some(object) {
            self.self_slot = None;
            removed = true;
        }
        if self.distance_slot == Some(object) {
            self.distance_slot = None;
            removed = true;
        }
        removed
    }

    /// Refresh priorities and distances, then stable-sort the proximity entries
    pub fn resort(&mut self, actor_position: Vec3, objects: &ObjectStore) {
        for entry in &mut self.entries {
            if let Some(object) = objects.get(entry.object) {
                entry.priority = object.priority();
                entry.distance_sq = object.pose.position.distance_squared(actor_position);
            }
        }
        self.entries.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.distance_sq.total_cmp(&b.distance_sq))
        });
    }

    /// Objects that are gone or disabled, in visiting order
    pub fn invalid(&self, objects: &ObjectStore) -> Vec<ObjectId> {
        self.ordered_ids()
            .into_iter()
            .filter(|id| !objects.is_live(*id))
            .collect()
    }

    /// Drop every entry whose object is gone or disabled
    pub fn retain_valid(&mut self, objects: &ObjectStore) -> Vec<ObjectId> {
        let dropped = self.invalid(objects);
        for id in &dropped {
            self.manual_remove(*id);
        }
        dropped
    }

    /// Visiting order: self slot, distance slot, sorted entries
    pub fn ordered_ids(&self) -> Vec<ObjectId> {
        self.self_slot
            .into_iter()
            .chain(self.distance_slot)
            .chain(self.entries.iter().map(|entry| entry.object))
            .collect()
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.self_slot == Some(object)
            || self.distance_slot == Some(object)
            || self.entries.iter().any(|entry| entry.object == object)
    }

    /// Sorted proximity entries
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn self_slot(&self) -> Option<ObjectId> {
        self.self_slot
    }

    pub fn distance_slot(&self) -> Option<ObjectId> {
        self.distance_slot
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.self_slot.is_some() as usize + self.distance_slot.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::InteractionBehavior;
    use crate::object::InteractableObject;
    use void_orbital::Pose;

    fn spawn(store: &mut ObjectStore, behavior: InteractionBehavior, priority: u8, z: f32) -> ObjectId {
        store.insert(
            InteractableObject::new("object", behavior, Pose::from_position(Vec3::new(0.0, 0.0, z)))
                .with_priority(priority),
        )
    }

    #[test]
    fn test_priority_beats_distance() {
        let mut store = ObjectStore::new();
        let near = spawn(&mut store, InteractionBehavior::Default, 100, 5.0);
        let far = spawn(&mut store, InteractionBehavior::Default, 150, 50.0);

        let mut registry = InteractionRegistry::new();
        registry.enter(near, InteractionKind::Default);
        registry.enter(far, InteractionKind::Default);
        registry.resort(Vec3::ZERO, &store);

        assert_eq!(registry.ordered_ids(), vec![far, near]);
    }

    #[test]
    fn test_distance_breaks_ties() {
        let mut store = ObjectStore::new();
        let far = spawn(&mut store, InteractionBehavior::Default, 50, 3.0);
        let near = spawn(&mut store, InteractionBehavior::Default, 50, 1.0);

        let mut registry = InteractionRegistry::new();
        registry.enter(far, InteractionKind::Default);
        registry.enter(near, InteractionKind::Default);
        registry.resort(Vec3::ZERO, &store);

        assert_eq!(registry.ordered_ids(), vec![near, far]);
        assert_eq!(registry.entries()[0].distance_sq, 1.0);
    }

    #[test]
    fn test_enter_is_idempotent() {
        let mut store = ObjectStore::new();
        let id = spawn(&mut store, InteractionBehavior::Default, 0, 1.0);

        let mut registry = InteractionRegistry::new();
        assert!(registry.enter(id, InteractionKind::Default));
        assert!(!registry.enter(id, InteractionKind::Default));
        assert_eq!(registry.len(), 1);
        assert!(registry.exit(id));
        assert!(!registry.exit(id));
    }

    #[test]
    fn test_enter_ignores_manual_kinds() {
        let mut registry = InteractionRegistry::new();
        assert!(!registry.enter(ObjectId(1), InteractionKind::SelfInteraction));
        assert!(!registry.enter(ObjectId(2), InteractionKind::Distance));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_pinned_slots_visit_first() {
        let mut store = ObjectStore::new();
        let nearby = spawn(&mut store, InteractionBehavior::Default, 200, 0.5);
        let own = spawn(&mut store, InteractionBehavior::SelfInteraction, 0, 0.0);
        let remote = spawn(&mut store, InteractionBehavior::Distance(Default::default()), 0, 8.0);

        let mut registry = InteractionRegistry::new();
        registry.enter(nearby, InteractionKind::Default);
        registry.manual_add(remote, InteractionKind::Distance);
        registry.manual_add(own, InteractionKind::SelfInteraction);
        registry.resort(Vec3::ZERO, &store);

        assert_eq!(registry.ordered_ids(), vec![own, remote, nearby]);
        assert!(registry.manual_remove(own));
        assert_eq!(registry.self_slot(), None);
    }

    #[test]
    fn test_retain_valid_drops_disabled() {
        let mut store = ObjectStore::new();
        let kept = spawn(&mut store, InteractionBehavior::Default, 0, 1.0);
        let disabled = spawn(&mut store, InteractionBehavior::Default, 0, 2.0);
        let gone = spawn(&mut store, InteractionBehavior::Default, 0, 3.0);

        let mut registry = InteractionRegistry::new();
        for id in [kept, disabled, gone] {
            registry.enter(id, InteractionKind::Default);
        }
        if let Some(object) = store.get_mut(disabled) {
            object.enabled = false;
        }
        store.remove(gone);

        let dropped = registry.retain_valid(&store);
        assert_eq!(dropped, vec![disabled, gone]);
        assert_eq!(registry.ordered_ids(), vec![kept]);
    }
}
