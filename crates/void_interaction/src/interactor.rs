//! The interactor: owns the effector links and arbitrates between them

use crate::behavior::{DropType, HoldType, Mobility};
use crate::collaborators::{Collaborators, IkDriver, LookMode};
use crate::config::InteractorConfig;
use crate::context::{ActorContext, Connection, DriveKey};
use crate::effector::EffectorType;
use crate::error::{InteractionError, Result};
use crate::events::InteractionEvent;
use crate::link::{EffectorLink, LinkSignal, ToggleOutcome};
use crate::object::{InteractableObject, ObjectId, ObjectStore};
use crate::registry::InteractionRegistry;
use void_orbital::{DriveSignals, OrbitalBlender, Pose};

/// Interaction arbiter for one actor
///
/// Call [`fixed_update`](Self::fixed_update) once per physics tick and
/// [`update`](Self::update) once per frame. Everything else is the public
/// start/stop surface used by input and UI code.
#[derive(Debug)]
pub struct Interactor {
    links: Vec<EffectorLink>,
    ctx: ActorContext,
}

impl Interactor {
    /// Create an interactor from a validated configuration
    pub fn new(config: InteractorConfig) -> Result<Self> {
        config.validate()?;

        let mut rules = config.effectors.clone();
        rules.sort_by_key(|rule| rule.effector.index());
        let links = rules.into_iter().map(EffectorLink::new).collect();

        log::info!(
            "Interactor created with {} effector slots (orbital reach {})",
            config.effectors.len(),
            if config.orbital.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            links,
            ctx: ActorContext::new(config),
        })
    }

    pub fn config(&self) -> &InteractorConfig {
        &self.ctx.config
    }

    /// Add an object to the world this actor can see
    pub fn spawn(&mut self, object: InteractableObject) -> ObjectId {
        self.ctx.objects.insert(object)
    }

    /// Remove an object; links holding it let go on the next physics tick
    pub fn despawn(&mut self, id: ObjectId) -> Option<InteractableObject> {
        self.ctx.objects.remove(id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&InteractableObject> {
        self.ctx.objects.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut InteractableObject> {
        self.ctx.objects.get_mut(id)
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.ctx.objects
    }

    pub fn registry(&self) -> &InteractionRegistry {
        &self.ctx.registry
    }

    pub fn orbital(&self) -> Option<&OrbitalBlender<DriveKey>> {
        self.ctx.orbital.as_ref()
    }

    pub fn actor_pose(&self) -> Pose {
        self.ctx.pose
    }

    pub fn set_actor_pose(&mut self, pose: Pose) {
        self.ctx.pose = pose;
    }

    pub fn links(&self) -> &[EffectorLink] {
        &self.links
    }

    pub fn link(&self, effector: EffectorType) -> Option<&EffectorLink> {
        self.links.iter().find(|link| link.effector() == effector)
    }

    pub fn connection(&self, effector: EffectorType) -> Option<&Connection> {
        self.ctx.connection(effector)
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.ctx.selection
    }

    /// Proximity sensor reported an object in range
    pub fn on_proximity_enter(&mut self, id: ObjectId, services: &mut Collaborators<'_>) -> bool {
        let Some(object) = self.ctx.objects.get(id) else {
            log::warn!("Proximity enter for unknown object {:?}", id);
            return false;
        };
        let look_before = object.look_mode.contains(LookMode::BEFORE);
        if !self.ctx.registry.enter(id, object.kind()) {
            return false;
        }

        log::debug!("'{}' entered interaction range", object.name);
        if look_before {
            services.look.new_look_order(id, LookMode::BEFORE);
        }
        true
    }

    /// Proximity sensor reported an object out of range
    pub fn on_proximity_exit(&mut self, id: ObjectId, services: &mut Collaborators<'_>) -> bool {
        if self.ctx.objects.get(id).is_some_and(|object| object.prevent_exit) {
            return false;
        }
        if !self.ctx.registry.entries().iter().any(|entry| entry.object == id) {
            return false;
        }

        self.disconnect_object(id, services);
        self.ctx.registry.exit(id);
        self.forget(id, services);
        log::debug!("{:?} left interaction range", id);
        true
    }

    /// Register an object without a proximity event and evaluate it immediately
    pub fn add_interaction_manual(&mut self, id: ObjectId, services: &mut Collaborators<'_>) -> Result<()> {
        let kind = self.live_object(id)?.kind();
        if self.ctx.registry.manual_add(id, kind) {
            log::debug!("{:?} added to registry manually", id);
        }
        self.reevaluate(services);
        Ok(())
    }

    /// Unregister an object, releasing every effector holding it
    pub fn remove_interaction_manual(&mut self, id: ObjectId, services: &mut Collaborators<'_>) -> Result<()> {
        if self.ctx.objects.get(id).is_none() {
            log::warn!("Manual remove of unknown object {:?}", id);
            return Err(InteractionError::ObjectNotFound(id));
        }

        self.disconnect_object(id, services);
        if self.ctx.registry.manual_remove(id) {
            self.forget(id, services);
        }
        self.reevaluate(services);
        Ok(())
    }

    /// Physics tick
    pub fn fixed_update(&mut self, services: &mut Collaborators<'_>) {
        self.ctx.connect_all_done = false;
        self.ctx.disconnect_all_done = false;

        for id in self.ctx.registry.invalid(&self.ctx.objects) {
            log::debug!("Dropping {:?} from registry: object gone or disabled", id);
            self.disconnect_object(id, services);
            if let Some(object) = self.ctx.objects.get_mut(id) {
                object.useable = Default::default();
            }
            services.look.remove_look_targets(id);
        }
        self.ctx.registry.retain_valid(&self.ctx.objects);
        self.ctx.registry.resort(self.ctx.pose.position, &self.ctx.objects);

        let ordered = self.ctx.registry.ordered_ids();
        for index in 0..self.links.len() {
            let signals = self.links[index].fixed_update(&mut self.ctx, services, &ordered);
            self.handle_signals(signals, services);
        }
    }

    /// Frame tick
    pub fn update(&mut self, delta_time: f32, services: &mut Collaborators<'_>) {
        for (_, object) in self.ctx.objects.iter_mut() {
            object.behavior.tick(delta_time);
        }

        self.advance_orbital(delta_time, services);

        for index in 0..self.links.len() {
            let signals = self.links[index].update(delta_time, &mut self.ctx, services);
            self.handle_signals(signals, services);
        }
    }

    /// Change the UI-selected object
    pub fn set_selection(&mut self, selection: Option<ObjectId>, services: &mut Collaborators<'_>) {
        if self.ctx.selection == selection {
            return;
        }

        if let Some(previous) = self.ctx.selection {
            if self.looks_on_selection(previous) {
                services.look.remove_look_targets(previous);
            }
        }
        self.ctx.selection = selection;
        if let Some(current) = selection {
            if self.looks_on_selection(current) {
                services.look.new_look_order(current, LookMode::ON_SELECTION);
            }
        }
    }

    /// Toggle the selected object; a release (`click == false`) ends held interactions
    pub fn start_stop_interactions(&mut self, click: bool, services: &mut Collaborators<'_>) -> Result<()> {
        let Some(id) = self.ctx.selection else {
            return Ok(());
        };

        if click {
            return self.start_stop_interaction(id, services);
        }

        let stops = self
            .ctx
            .objects
            .get(id)
            .is_some_and(|object| object.kind().stops_on_release());
        if stops {
            for index in self.holder_indices(id) {
                self.links[index].toggle(&mut self.ctx, services, id);
            }
        }
        Ok(())
    }

    /// Start the interaction with `id`, or stop it if already running
    pub fn start_stop_interaction(&mut self, id: ObjectId, services: &mut Collaborators<'_>) -> Result<()> {
        let object = self.live_object(id)?;
        let kind = object.kind();
        let ready = object.is_ready();

        if object.behavior.pick().is_some_and(|pick| pick.held) {
            return self.drop_object(id, DropType::default(), services);
        }

        let holders = self.holder_indices(id);
        if !holders.is_empty() {
            if kind.connects_all() {
                self.disconnect_object(id, services);
            } else {
                for index in holders {
                    self.links[index].toggle(&mut self.ctx, services, id);
                }
            }
            return Ok(());
        }

        if let Some(lock) = self.ctx.mobility_lock() {
            if kind.mobility() == Mobility::Locked && lock != id {
                log::warn!("Cannot start {:?}: mobility locked by {:?}", id, lock);
                return Err(InteractionError::MobilityLocked(lock));
            }
        }

        if kind.connects_all() {
            if !ready {
                log::debug!("{:?} not ready: too few eligible effectors", id);
                return Ok(());
            }
            self.connect_all(id, services);
            return Ok(());
        }

        for index in 0..self.links.len() {
            match self.links[index].toggle(&mut self.ctx, services, id) {
                ToggleOutcome::Connected | ToggleOutcome::Transferring | ToggleOutcome::Released => break,
                ToggleOutcome::Ignored | ToggleOutcome::Refused => {}
            }
        }
        Ok(())
    }

    /// Pick up with a hold type, or drop if already held
    pub fn start_stop_interaction_with_hold(
        &mut self,
        id: ObjectId,
        hold: HoldType,
        services: &mut Collaborators<'_>,
    ) -> Result<()> {
        let object = self.live_object_mut(id)?;
        let Some(pick) = object.behavior.pick_mut() else {
            log::warn!("Hold type given for non-pickable '{}'", object.name);
            return Err(InteractionError::NotPickable(id));
        };
        if !pick.held {
            pick.hold = hold;
        }
        self.start_stop_interaction(id, services)
    }

    /// Drop with a drop type, or pick up if not yet held
    pub fn start_stop_interaction_with_drop(
        &mut self,
        id: ObjectId,
        drop: DropType,
        services: &mut Collaborators<'_>,
    ) -> Result<()> {
        let object = self.live_object(id)?;
        let Some(pick) = object.behavior.pick() else {
            log::warn!("Drop type given for non-pickable '{}'", object.name);
            return Err(InteractionError::NotPickable(id));
        };
        if pick.held {
            self.drop_object(id, drop, services)
        } else {
            self.start_stop_interaction(id, services)
        }
    }

    /// Whether enough idle, eligible effectors exist to pick `id` up now
    pub fn can_pick(&self, id: ObjectId) -> bool {
        let Some(object) = self.ctx.objects.get(id) else {
            return false;
        };
        let Some(pick) = object.behavior.pick() else {
            return false;
        };
        if !object.enabled || pick.held || object.used {
            return false;
        }

        let available = self
            .links
            .iter()
            .filter(|link| link.is_enabled() && link.is_idle() && object.useable.contains(link.effector()))
            .count();
        available >= object.kind().required_effectors() as usize
    }

    /// Pick `id` up without waiting for per-tick discovery
    ///
    /// Uses the first idle effectors that have a target on the object. When
    /// too few are free nothing changes and `false` is returned.
    pub fn force_pick(&mut self, id: ObjectId, include_orbital: bool, services: &mut Collaborators<'_>) -> bool {
        let Some(object) = self.ctx.objects.get(id) else {
            log::warn!("Force pick of unknown object {:?}", id);
            return false;
        };
        let kind = object.kind();
        let held = object.behavior.pick().map(|pick| pick.held);
        if !object.enabled || held != Some(false) || object.used {
            return false;
        }

        let required = kind.required_effectors() as usize;
        let candidates: Vec<(usize, usize)> = self
            .links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.is_enabled() && link.is_idle())
            .filter_map(|(index, link)| object.target_for(link.effector()).map(|(target, _)| (index, target)))
            .take(required)
            .collect();
        if candidates.len() < required {
            log::debug!("Force pick of {:?} needs {} free effectors", id, required);
            return false;
        }

        let registered = self.ctx.registry.manual_add(id, kind);
        for (n, (index, target)) in candidates.iter().enumerate() {
            let allow_orbital = include_orbital && n == 0;
            if !self.links[*index].connect(&mut self.ctx, services, id, *target, allow_orbital) {
                log::debug!("Force pick of {:?} refused, rolling back", id);
                self.disconnect_object(id, services);
                if registered {
                    self.ctx.registry.manual_remove(id);
                }
                return false;
            }
        }
        true
    }

    pub fn is_interacting_with(&self, id: ObjectId) -> bool {
        !self.ctx.holders(id).is_empty()
    }

    /// First effector holding `id`
    pub fn effector_interacting_with(&self, id: ObjectId) -> Option<EffectorType> {
        self.ctx.holders(id).iter().next()
    }

    pub fn is_effector_interacting(&self, effector: EffectorType) -> bool {
        self.ctx.connection(effector).is_some()
    }

    /// Connect one effector to an object, bypassing eligibility
    ///
    /// Any current connection of the effector is released first. Returns
    /// `false` when the connection was refused.
    pub fn force_connect(
        &mut self,
        effector: EffectorType,
        id: ObjectId,
        services: &mut Collaborators<'_>,
    ) -> Result<bool> {
        let Some(index) = self.link_index(effector).filter(|index| self.links[*index].is_enabled()) else {
            log::warn!("Connect requested on missing effector {}", effector);
            return Err(InteractionError::EffectorNotFound(effector));
        };
        let object = self.live_object(id)?;
        let Some((target, _)) = object.target_for(effector) else {
            return Err(InteractionError::NoTarget { object: id, effector });
        };

        if !self.links[index].is_idle() {
            let signal = self.links[index].disconnect(&mut self.ctx, services, true);
            self.handle_signals(signal.into_iter().collect(), services);
        }
        Ok(self.links[index].connect(&mut self.ctx, services, id, target, true))
    }

    /// Whether an active interaction binds the actor in place
    pub fn mobility(&self) -> Mobility {
        match self.ctx.mobility_lock() {
            Some(_) => Mobility::Locked,
            None => Mobility::Free,
        }
    }

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.ctx.events)
    }

    fn advance_orbital(&mut self, delta_time: f32, services: &mut Collaborators<'_>) {
        let event = {
            let ActorContext {
                orbital,
                objects,
                registry,
                connections,
                ..
            } = &mut self.ctx;
            let Some(blender) = orbital.as_mut() else {
                return;
            };
            let Some(animator) = services.animator.as_deref_mut() else {
                return;
            };
            let ik: &dyn IkDriver = &*services.ik;

            blender.advance(
                delta_time,
                |key| {
                    let valid = objects.is_live(key.object)
                        && registry.contains(key.object)
                        && connections[key.effector.index()].is_some_and(|c| c.object == key.object);
                    DriveSignals::new(valid, ik.is_paused(key.effector), ik.progress(key.effector))
                },
                animator,
            )
        };

        let Some((key, event)) = event else {
            return;
        };
        let Some(index) = self.link_index(key.effector) else {
            return;
        };
        let signal = self.links[index].on_drive_event(key, event, &mut self.ctx, services);
        self.handle_signals(signal.into_iter().collect(), services);
    }

    fn drop_object(&mut self, id: ObjectId, drop: DropType, services: &mut Collaborators<'_>) -> Result<()> {
        let holders = self.holder_indices(id);
        if drop == DropType::Drop && holders.len() == 1 {
            if self.links[holders[0]].begin_release(&mut self.ctx, services) {
                log::debug!("Placing {:?} down", id);
                return Ok(());
            }
        }

        if drop == DropType::Throw {
            if let Some(pick) = self.ctx.objects.get_mut(id).and_then(|object| object.behavior.pick_mut()) {
                pick.held = false;
            }
            self.ctx.push_event(InteractionEvent::Dropped { object: id, drop });
        }
        self.disconnect_object(id, services);
        Ok(())
    }

    fn handle_signals(&mut self, signals: Vec<LinkSignal>, services: &mut Collaborators<'_>) {
        for signal in signals {
            match signal {
                LinkSignal::ConnectAll(id) => {
                    if self.ctx.connect_all_done {
                        continue;
                    }
                    self.ctx.connect_all_done = true;
                    self.connect_all(id, services);
                }
                LinkSignal::DisconnectAll(id) => {
                    if self.ctx.disconnect_all_done {
                        continue;
                    }
                    self.ctx.disconnect_all_done = true;
                    self.disconnect_object(id, services);
                }
            }
        }
    }

    /// Connect every idle, eligible effector to `id`
    fn connect_all(&mut self, id: ObjectId, services: &mut Collaborators<'_>) -> usize {
        let mut connected = 0;
        for index in 0..self.links.len() {
            let link = &self.links[index];
            if !link.is_enabled() || !link.is_idle() {
                continue;
            }
            let effector = link.effector();
            let target = self
                .ctx
                .objects
                .get(id)
                .filter(|object| object.useable.contains(effector))
                .and_then(|object| object.target_for(effector).map(|(target, _)| target));
            if let Some(target) = target {
                if self.links[index].connect(&mut self.ctx, services, id, target, true) {
                    connected += 1;
                }
            }
        }
        log::debug!("{} effectors connected to {:?}", connected, id);
        connected
    }

    /// Release every effector holding `id`
    fn disconnect_object(&mut self, id: ObjectId, services: &mut Collaborators<'_>) {
        for index in self.holder_indices(id) {
            self.links[index].disconnect(&mut self.ctx, services, true);
        }
    }

    fn reevaluate(&mut self, services: &mut Collaborators<'_>) {
        self.ctx.registry.resort(self.ctx.pose.position, &self.ctx.objects);
        let ordered = self.ctx.registry.ordered_ids();
        for index in 0..self.links.len() {
            if !self.links[index].is_enabled() || self.links[index].is_transferring() {
                continue;
            }
            let signals = self.links[index].evaluate(&mut self.ctx, services, &ordered);
            self.handle_signals(signals, services);
        }
    }

    fn forget(&mut self, id: ObjectId, services: &mut Collaborators<'_>) {
        if let Some(object) = self.ctx.objects.get_mut(id) {
            object.useable = Default::default();
        }
        services.look.remove_look_targets(id);
    }

    fn holder_indices(&self, id: ObjectId) -> Vec<usize> {
        let holders = self.ctx.holders(id);
        self.links
            .iter()
            .enumerate()
            .filter(|(_, link)| holders.contains(link.effector()))
            .map(|(index, _)| index)
            .collect()
    }

    fn link_index(&self, effector: EffectorType) -> Option<usize> {
        self.links.iter().position(|link| link.effector() == effector)
    }

    fn looks_on_selection(&self, id: ObjectId) -> bool {
        self.ctx
            .objects
            .get(id)
            .is_some_and(|object| object.look_mode.contains(LookMode::ON_SELECTION))
    }

    fn live_object(&self, id: ObjectId) -> Result<&InteractableObject> {
        match self.ctx.objects.get(id) {
            None => {
                log::warn!("Interaction requested on unknown object {:?}", id);
                Err(InteractionError::ObjectNotFound(id))
            }
            Some(object) if !object.enabled => {
                log::warn!("Interaction requested on disabled object '{}'", object.name);
                Err(InteractionError::ObjectDisabled(id))
            }
            Some(object) => Ok(object),
        }
    }

    fn live_object_mut(&mut self, id: ObjectId) -> Result<&mut InteractableObject> {
        self.live_object(id)?;
        self.ctx
            .objects
            .get_mut(id)
            .ok_or(InteractionError::ObjectNotFound(id))
    }
}
