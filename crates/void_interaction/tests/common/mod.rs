//! Shared collaborator doubles for the integration tests

#![allow(dead_code)]

use glam::Vec3;
use void_interaction::*;
use void_orbital::{BlendState, BlendTreeAnimator, OrbitalParameters, Pose};

/// Physics tick length used by the tests
pub const FIXED_DT: f32 = 1.0 / 50.0;
/// Frame length used by the tests
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// Call made on the IK driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IkCall {
    Start(EffectorType, ObjectId),
    Resume(EffectorType),
    Reverse(EffectorType),
    Stop(EffectorType),
}

#[derive(Debug, Default, Clone, Copy)]
struct IkSlot {
    active: bool,
    progress: f32,
    paused: bool,
    target: Option<Pose>,
}

/// IK driver whose progress is set by the test
#[derive(Debug, Default)]
pub struct RecordingIk {
    slots: [IkSlot; EFFECTOR_COUNT],
    pub calls: Vec<IkCall>,
}

impl RecordingIk {
    pub fn set_progress(&mut self, effector: EffectorType, progress: f32) {
        self.slots[effector.index()].progress = progress;
    }

    pub fn set_paused(&mut self, effector: EffectorType, paused: bool) {
        self.slots[effector.index()].paused = paused;
    }

    pub fn is_active(&self, effector: EffectorType) -> bool {
        self.slots[effector.index()].active
    }

    pub fn target(&self, effector: EffectorType) -> Option<Pose> {
        self.slots[effector.index()].target
    }

    pub fn started(&self, effector: EffectorType) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, IkCall::Start(e, _) if *e == effector))
            .count()
    }
}

impl IkDriver for RecordingIk {
    fn start_interaction(&mut self, effector: EffectorType, target: Pose, object: ObjectId) {
        let slot = &mut self.slots[effector.index()];
        if !slot.active {
            slot.active = true;
            slot.progress = 0.01;
        }
        slot.target = Some(target);
        self.calls.push(IkCall::Start(effector, object));
    }

    fn resume_interaction(&mut self, effector: EffectorType) {
        self.slots[effector.index()].paused = false;
        self.calls.push(IkCall::Resume(effector));
    }

    fn reverse_interaction(&mut self, effector: EffectorType) {
        self.calls.push(IkCall::Reverse(effector));
    }

    fn stop_interaction(&mut self, effector: EffectorType) {
        self.slots[effector.index()] = IkSlot::default();
        self.calls.push(IkCall::Stop(effector));
    }

    fn progress(&self, effector: EffectorType) -> f32 {
        self.slots[effector.index()].progress
    }

    fn is_paused(&self, effector: EffectorType) -> bool {
        self.slots[effector.index()].paused
    }

    fn bone(&self, effector: EffectorType) -> Pose {
        self.slots[effector.index()].target.unwrap_or(Pose::IDENTITY)
    }
}

/// Line of sight with an optional blocker and an optional wall
///
/// The blocker hits every ray halfway. The wall is the plane `z = wall_z`
/// and only stops rays travelling toward +Z.
#[derive(Debug, Default)]
pub struct ScriptedSight {
    pub blocker: Option<ColliderId>,
    pub wall_z: Option<f32>,
}

impl LineOfSight for ScriptedSight {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, _layer_mask: u32) -> Option<RayHit> {
        if let Some(collider) = self.blocker {
            let distance = max_distance * 0.5;
            return Some(RayHit {
                collider,
                point: origin + direction * distance,
                distance,
            });
        }

        let wall = self.wall_z?;
        if direction.z <= 1e-6 {
            return None;
        }
        let distance = (wall - origin.z) / direction.z;
        (0.0..=max_distance).contains(&distance).then(|| RayHit {
            collider: ColliderId(0),
            point: origin + direction * distance,
            distance,
        })
    }
}

/// Look controller that records every order
#[derive(Debug, Default)]
pub struct RecordingLook {
    pub orders: Vec<(ObjectId, LookMode)>,
    pub removed: Vec<ObjectId>,
}

impl LookController for RecordingLook {
    fn new_look_order(&mut self, object: ObjectId, mode: LookMode) {
        self.orders.push((object, mode));
    }

    fn remove_look_targets(&mut self, object: ObjectId) {
        self.removed.push(object);
    }
}

/// Blend-tree animator that keeps the last written values
#[derive(Debug, Default)]
pub struct RecordingAnimator {
    pub parameters: Option<OrbitalParameters>,
    pub state: Option<BlendState>,
    pub weight: f32,
    pub rate: f32,
}

impl BlendTreeAnimator for RecordingAnimator {
    fn set_parameters(&mut self, parameters: &OrbitalParameters) {
        self.parameters = Some(*parameters);
    }

    fn cross_fade(&mut self, state: BlendState, _duration: f32) {
        self.state = Some(state);
    }

    fn set_layer_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    fn layer_weight(&self) -> f32 {
        self.weight
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    fn playback_rate(&self) -> f32 {
        self.rate
    }
}

/// Every collaborator an interactor needs, owned by the test
#[derive(Debug, Default)]
pub struct Rig {
    pub ik: RecordingIk,
    pub sight: ScriptedSight,
    pub look: RecordingLook,
    pub animator: RecordingAnimator,
}

impl Rig {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self::default()
    }

    /// Collaborators including the orbital animator
    pub fn services(&mut self) -> Collaborators<'_> {
        Collaborators::new(&mut self.ik, &self.sight, &mut self.look).with_animator(&mut self.animator)
    }

    /// Collaborators with no animator attached
    pub fn services_without_animator(&mut self) -> Collaborators<'_> {
        Collaborators::new(&mut self.ik, &self.sight, &mut self.look)
    }
}

/// Humanoid rig without orbital reach
pub fn humanoid() -> Interactor {
    Interactor::new(InteractorConfig::humanoid().with_orbital(None)).expect("humanoid config is valid")
}

/// Humanoid rig with orbital reach
pub fn orbital_humanoid() -> Interactor {
    Interactor::new(InteractorConfig::humanoid()).expect("humanoid config is valid")
}

/// Object with a single right-hand target at its origin
pub fn right_hand_object(name: &str, behavior: InteractionBehavior, position: Vec3) -> InteractableObject {
    InteractableObject::new(name, behavior, Pose::from_position(position))
        .with_targets(vec![Target::new(EffectorType::RightHand, Pose::IDENTITY)], EffectorMask::NONE)
}

/// In front of the actor at hand height, inside the right hand's cone
pub fn in_front() -> Vec3 {
    Vec3::new(0.3, 1.4, 0.5)
}

/// Spawn, register and evaluate an object
pub fn spawn_in_range(interactor: &mut Interactor, rig: &mut Rig, object: InteractableObject) -> ObjectId {
    let id = interactor.spawn(object);
    interactor.on_proximity_enter(id, &mut rig.services());
    interactor.fixed_update(&mut rig.services());
    id
}

/// Run frames until `done` holds, up to `max_frames`
pub fn run_frames(
    interactor: &mut Interactor,
    rig: &mut Rig,
    max_frames: usize,
    mut done: impl FnMut(&Interactor) -> bool,
) -> bool {
    for _ in 0..max_frames {
        if done(interactor) {
            return true;
        }
        interactor.update(FRAME_DT, &mut rig.services());
    }
    done(interactor)
}

/// Whether `used` matches the connection table for every object
pub fn used_matches_connections(interactor: &Interactor) -> bool {
    interactor
        .objects()
        .iter()
        .all(|(id, object)| object.is_used() == interactor.is_interacting_with(id))
}
