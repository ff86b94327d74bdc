//! Per-effector state machine
//!
//! ```text
//!          connect                  reach / pick
//! Idle ──────────────▶ Connected ───────────────▶ Connected(Holding)
//!  ▲                    │     ▲                        │
//!  │    disconnect      │     │ transfer complete      │ drop
//!  └────────────────────┤     │                        ▼
//!                       └──▶ Transferring     Connected(Releasing)
//!                    interrupt
//! ```
//!
//! A link is evaluated once per physics tick against the registry, in
//! registry order, and observed once per frame while connected.

use crate::behavior::{Category, InteractionBehavior, Mobility};
use crate::collaborators::{Collaborators, LookMode};
use crate::context::{ActorContext, Connection, DriveKey};
use crate::effector::{EffectorRule, EffectorType};
use crate::events::InteractionEvent;
use crate::object::ObjectId;
use crate::probe;
use crate::transfer::Transfer;
use glam::Vec3;
use void_orbital::{DriveEvent, Pose};

/// What a connected link is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPhase {
    /// Orbital drive ramping in; IK not started yet
    Reaching,
    /// IK driver running toward the target and back
    Driving,
    /// Carrying a picked item
    Holding,
    /// Orbital drive placing a carried item down
    Releasing,
}

/// Effector link state
#[derive(Debug, Clone, PartialEq)]
pub enum LinkState {
    Idle,
    Connected(LinkPhase),
    /// Handing off to another object
    Transferring(Transfer),
}

/// Cross-effector request raised by a link, resolved by the interactor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSignal {
    /// Connect every eligible idle effector to the object
    ConnectAll(ObjectId),
    /// Release every effector still holding the object
    DisconnectAll(ObjectId),
}

/// Result of an explicit toggle on one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToggleOutcome {
    Ignored,
    Refused,
    Connected,
    Transferring,
    Released,
}

/// One effector slot and its state machine
#[derive(Debug, Clone)]
pub struct EffectorLink {
    rule: EffectorRule,
    state: LinkState,
    /// The IK driver has reported the target once for this connection
    reached: bool,
    pause_looked: bool,
    /// Automatic object whose cycle completed; not re-entered until it goes out of reach
    spent: Option<ObjectId>,
}

impl EffectorLink {
    /// Create a new idle link
    pub fn new(rule: EffectorRule) -> Self {
        Self {
            rule,
            state: LinkState::Idle,
            reached: false,
            pause_looked: false,
            spent: None,
        }
    }

    pub fn effector(&self) -> EffectorType {
        self.rule.effector
    }

    pub fn rule(&self) -> &EffectorRule {
        &self.rule
    }

    pub fn state(&self) -> &LinkState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.rule.enabled
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, LinkState::Idle)
    }

    pub fn is_transferring(&self) -> bool {
        matches!(self.state, LinkState::Transferring(_))
    }

    /// Effector origin in world space
    pub fn world_position(&self, actor: &Pose) -> Vec3 {
        actor.transform_point(self.rule.offset)
    }

    /// Physics tick: validate, then scan the registry
    pub(crate) fn fixed_update(
        &mut self,
        ctx: &mut ActorContext,
        services: &mut Collaborators<'_>,
        ordered: &[ObjectId],
    ) -> Vec<LinkSignal> {
        if !self.rule.enabled {
            return Vec::new();
        }

        let mut signals = Vec::new();
        if let Some(connection) = ctx.connection(self.effector()).copied() {
            let intact = ctx
                .objects
                .get(connection.object)
                .is_some_and(|object| object.enabled && object.target(connection.target).is_some());
            if !intact {
                log::debug!(
                    "{} lost {:?} mid-interaction, disconnecting",
                    self.effector(),
                    connection.object
                );
                signals.extend(self.disconnect(ctx, services, true));
            }
        }

        if self.is_transferring() {
            return signals;
        }

        signals.extend(self.evaluate(ctx, services, ordered));
        signals
    }

    /// Test every registered object, update useable bits and run automatic connects
    pub(crate) fn evaluate(
        &mut self,
        ctx: &mut ActorContext,
        services: &mut Collaborators<'_>,
        ordered: &[ObjectId],
    ) -> Vec<LinkSignal> {
        let effector = self.effector();
        let origin = self.world_position(&ctx.pose);
        let mut signals = Vec::new();

        for &id in ordered {
            let eligible = self.check_eligibility(ctx, services, id, origin);
            let Some(object) = ctx.objects.get_mut(id) else {
                continue;
            };
            object.useable.set(effector, eligible);

            let kind = object.kind();
            let used = object.used;
            let ready = object.is_ready();
            let target = object.target_for(effector).map(|(index, _)| index);

            if !eligible && self.spent == Some(id) {
                self.spent = None;
            }

            let connected_here = ctx
                .connection(effector)
                .is_some_and(|connection| connection.object == id);
            if connected_here {
                let releasable = matches!(
                    self.state,
                    LinkState::Connected(LinkPhase::Reaching | LinkPhase::Driving)
                );
                if !eligible && releasable && kind.releases_out_of_range() {
                    log::debug!("{} out of reach of {:?}", effector, id);
                    signals.extend(self.disconnect(ctx, services, true));
                }
                continue;
            }

            if !eligible || !self.is_idle() {
                continue;
            }

            if used && kind.connects_all() {
                signals.push(LinkSignal::ConnectAll(id));
            } else if kind.is_automatic() && ready && !used && self.spent != Some(id) {
                if let Some(target) = target {
                    self.connect(ctx, services, id, target, true);
                }
            }
        }

        signals
    }

    fn check_eligibility(
        &self,
        ctx: &mut ActorContext,
        services: &mut Collaborators<'_>,
        id: ObjectId,
        origin: Vec3,
    ) -> bool {
        let effector = self.effector();
        let actor = ctx.pose;

        let wants_orbital = match ctx.objects.get(id) {
            Some(object) if object.enabled => object.orbital_reach && effector.is_hand(),
            _ => return false,
        };
        if wants_orbital && ctx.orbital.is_none() {
            degrade_orbital(ctx, id, "actor has no orbital blender");
        }

        let selection = ctx.selection;
        let mask = ctx.config.line_of_sight_mask;
        let Some(object) = ctx.objects.get_mut(id) else {
            return false;
        };
        let Some((index, target)) = object.target_for(effector) else {
            return false;
        };
        let rules = target.rules;
        let kind = object.kind();

        if let Some(touch) = object.behavior.touch().copied() {
            let Some(direction) = probe::touch_direction(kind, &actor) else {
                return false;
            };
            let Some(hit) = probe::touch_probe(
                services.line_of_sight,
                origin,
                direction,
                touch.probe_distance,
                touch.surface_mask,
            ) else {
                return false;
            };
            let mut local = object.target(index).map(|t| t.local).unwrap_or_default();
            local.position = object.pose.inverse_transform_point(hit.point);
            object.set_target_local(index, local);
        }

        let Some(target) = object.target_world_pose(index).map(|pose| pose.position) else {
            return false;
        };

        let in_reach = match &object.behavior {
            InteractionBehavior::SelfInteraction => true,
            InteractionBehavior::Distance(settings) => {
                selection == Some(id) && origin.distance(target) <= settings.max_distance
            }
            _ => match ctx.orbital.as_ref() {
                Some(blender) if object.orbital_reach && effector.is_hand() => {
                    probe::orbital_check(blender.config(), &actor, target)
                }
                _ => probe::cone_check(&self.rule, rules.as_ref(), &actor, target),
            },
        };

        if in_reach
            && object.check_obstruction
            && !kind.skips_obstruction()
            && probe::obstructed(services.line_of_sight, origin, target, mask, &object.allowed_colliders)
        {
            return false;
        }

        in_reach
    }

    /// Bind this effector to an object target
    ///
    /// With `allow_orbital`, hands reach orbital objects through the blender
    /// and the IK driver starts once the drive arrives. Returns `false` when
    /// the connection was refused.
    pub(crate) fn connect(
        &mut self,
        ctx: &mut ActorContext,
        services: &mut Collaborators<'_>,
        id: ObjectId,
        target: usize,
        allow_orbital: bool,
    ) -> bool {
        let effector = self.effector();
        let Some(object) = ctx.objects.get(id) else {
            return false;
        };
        let Some(target_pose) = object.target_world_pose(target) else {
            return false;
        };
        let kind = object.kind();
        let was_used = object.used;
        let wants_orbital = allow_orbital && object.orbital_reach && effector.is_hand();

        if kind.mobility() == Mobility::Locked {
            if let Some(lock) = ctx.mobility_lock().filter(|lock| *lock != id) {
                log::debug!("{} cannot connect to {:?}: mobility locked by {:?}", effector, id, lock);
                return false;
            }
        }

        let mut via_orbital = false;
        let mut degrade = false;
        if wants_orbital {
            let actor = ctx.pose;
            match (ctx.orbital.as_mut(), services.animator.as_deref_mut()) {
                (Some(blender), Some(animator)) => {
                    let query = blender.query(&actor, target_pose.position);
                    let key = DriveKey { effector, object: id };
                    if let Err(err) = blender.drive(key, query, effector.is_left(), false, animator) {
                        log::debug!("{} cannot reach {:?}: {}", effector, id, err);
                        return false;
                    }
                    via_orbital = true;
                }
                _ => degrade = true,
            }
        }
        if degrade {
            degrade_orbital(ctx, id, "no blend-tree animator supplied");
        }

        if !via_orbital {
            services.ik.start_interaction(effector, target_pose, id);
        }

        ctx.connect(
            effector,
            Connection {
                object: id,
                target,
                via_orbital,
            },
        );
        self.state = LinkState::Connected(if via_orbital {
            LinkPhase::Reaching
        } else {
            LinkPhase::Driving
        });
        self.reached = false;
        self.pause_looked = false;

        ctx.push_event(InteractionEvent::Connected { effector, object: id });
        if kind.category() == Category::Cover && !was_used {
            ctx.push_event(InteractionEvent::CoverEntered { object: id });
        }
        log::debug!("{} connected to {:?} ({:?})", effector, id, kind);
        true
    }

    /// Release the connection and return to idle
    ///
    /// Returns [`LinkSignal::DisconnectAll`] when other effectors still hold
    /// an object whose effectors always release together.
    pub(crate) fn disconnect(
        &mut self,
        ctx: &mut ActorContext,
        services: &mut Collaborators<'_>,
        stop_ik: bool,
    ) -> Option<LinkSignal> {
        let effector = self.effector();
        let previous = std::mem::replace(&mut self.state, LinkState::Idle);
        self.reached = false;
        self.pause_looked = false;

        let connection = ctx.release(effector)?;
        let id = connection.object;

        match previous {
            LinkState::Connected(LinkPhase::Reaching) => {
                if let (Some(blender), Some(animator)) = (ctx.orbital.as_mut(), services.animator.as_deref_mut()) {
                    blender.reverse_early(&DriveKey { effector, object: id }, animator);
                }
            }
            LinkState::Transferring(transfer) => {
                if let Some(object) = ctx.objects.get_mut(transfer.to) {
                    object.set_target_local(transfer.target, transfer.true_local());
                }
            }
            _ => {}
        }

        if stop_ik {
            services.ik.stop_interaction(effector);
        }
        ctx.push_event(InteractionEvent::Disconnected { effector, object: id });
        log::debug!("{} disconnected from {:?}", effector, id);

        let Some(object) = ctx.objects.get_mut(id) else {
            return None;
        };
        object.useable.set(effector, false);
        let kind = object.kind();
        let still_used = object.used;
        let look_after = object.look_mode.contains(LookMode::AFTER);

        let mut events = Vec::new();
        if !still_used {
            if let Some(pick) = object.behavior.pick_mut() {
                if pick.held {
                    pick.held = false;
                    events.push(InteractionEvent::Dropped {
                        object: id,
                        drop: Default::default(),
                    });
                }
            }
            if kind.category() == Category::Cover {
                events.push(InteractionEvent::CoverExited { object: id });
            }
        }
        ctx.events.extend(events);

        if look_after {
            services.look.new_look_order(id, LookMode::AFTER);
        }

        (still_used && kind.connects_all()).then_some(LinkSignal::DisconnectAll(id))
    }

    /// Explicit start/stop request for `id` on this effector
    pub(crate) fn toggle(
        &mut self,
        ctx: &mut ActorContext,
        services: &mut Collaborators<'_>,
        id: ObjectId,
    ) -> ToggleOutcome {
        let effector = self.effector();
        if !self.rule.enabled {
            return ToggleOutcome::Ignored;
        }

        match ctx.connection(effector).copied() {
            Some(connection) if connection.object == id => self.toggle_off(ctx, services),
            Some(connection) => self.interrupt(ctx, services, connection, id),
            None => {
                let Some(object) = ctx.objects.get(id) else {
                    return ToggleOutcome::Ignored;
                };
                if !object.useable.contains(effector) || !object.is_ready() {
                    return ToggleOutcome::Ignored;
                }
                if (object.used && !object.multiple_connections) || object.behavior.is_cooling_down() {
                    return ToggleOutcome::Refused;
                }
                let Some((target, _)) = object.target_for(effector) else {
                    return ToggleOutcome::Ignored;
                };
                if self.connect(ctx, services, id, target, true) {
                    ToggleOutcome::Connected
                } else {
                    ToggleOutcome::Refused
                }
            }
        }
    }

    fn toggle_off(&mut self, ctx: &mut ActorContext, services: &mut Collaborators<'_>) -> ToggleOutcome {
        let effector = self.effector();
        match self.state {
            LinkState::Idle | LinkState::Connected(LinkPhase::Holding | LinkPhase::Releasing) => {
                ToggleOutcome::Ignored
            }
            LinkState::Connected(LinkPhase::Reaching) | LinkState::Transferring(_) => {
                self.disconnect(ctx, services, true);
                ToggleOutcome::Released
            }
            LinkState::Connected(LinkPhase::Driving) => {
                let kind = ctx
                    .connection(effector)
                    .and_then(|connection| ctx.objects.get(connection.object))
                    .map(|object| object.kind());
                let progress = services.ik.progress(effector);

                if services.ik.is_paused(effector) {
                    services.ik.resume_interaction(effector);
                    if kind.is_some_and(|kind| kind.self_terminates()) {
                        return ToggleOutcome::Released;
                    }
                    self.disconnect(ctx, services, false);
                } else if progress < 1.0 {
                    services.ik.reverse_interaction(effector);
                    self.disconnect(ctx, services, false);
                } else {
                    self.disconnect(ctx, services, true);
                }
                ToggleOutcome::Released
            }
        }
    }

    /// Hand the effector over from `current` to `next` without an idle gap
    fn interrupt(
        &mut self,
        ctx: &mut ActorContext,
        services: &mut Collaborators<'_>,
        current: Connection,
        next: ObjectId,
    ) -> ToggleOutcome {
        let effector = self.effector();
        if self.state != LinkState::Connected(LinkPhase::Driving) {
            return ToggleOutcome::Refused;
        }

        let (Some(from), Some(to)) = (ctx.objects.get(current.object), ctx.objects.get(next)) else {
            return ToggleOutcome::Ignored;
        };
        if !to.useable.contains(effector) {
            return ToggleOutcome::Ignored;
        }
        if !to.interruptible
            || to.priority() < from.priority()
            || from.kind().is_pickable()
            || to.kind().is_pickable()
            || (to.used && !to.multiple_connections)
        {
            log::debug!(
                "{} keeps {:?}: {:?} may not interrupt it",
                effector,
                current.object,
                next
            );
            return ToggleOutcome::Refused;
        }

        let (Some(current_world), Some((index, target))) =
            (from.target_world_pose(current.target), to.target_for(effector))
        else {
            return ToggleOutcome::Ignored;
        };
        let true_local = target.local;
        let snapshot = to.pose.relative(&current_world);

        if services.ik.progress(effector) > ctx.config.interrupt_reverse_threshold {
            services.ik.reverse_interaction(effector);
        }
        services.ik.start_interaction(effector, current_world, next);

        if let Some(object) = ctx.objects.get_mut(next) {
            object.set_target_local(index, snapshot);
        }
        ctx.connect(
            effector,
            Connection {
                object: next,
                target: index,
                via_orbital: false,
            },
        );
        ctx.push_event(InteractionEvent::TransferStarted {
            effector,
            from: current.object,
            to: next,
        });
        log::debug!("{} transferring {:?} -> {:?}", effector, current.object, next);

        self.state = LinkState::Transferring(Transfer::new(current.object, next, index, snapshot, true_local));
        self.reached = false;
        self.pause_looked = false;
        ToggleOutcome::Transferring
    }

    /// Frame tick: blend transfers and observe the IK driver
    pub(crate) fn update(
        &mut self,
        delta_time: f32,
        ctx: &mut ActorContext,
        services: &mut Collaborators<'_>,
    ) -> Vec<LinkSignal> {
        match self.state {
            LinkState::Transferring(_) => {
                self.advance_transfer(delta_time, ctx, services);
                Vec::new()
            }
            LinkState::Connected(LinkPhase::Driving) => self.observe(delta_time, ctx, services),
            _ => Vec::new(),
        }
    }

    fn advance_transfer(&mut self, delta_time: f32, ctx: &mut ActorContext, services: &mut Collaborators<'_>) {
        let effector = self.effector();
        let LinkState::Transferring(transfer) = &mut self.state else {
            return;
        };

        let local = transfer.advance(delta_time, ctx.config.transfer_rate);
        let done = transfer.is_complete(ctx.config.transfer_complete);
        let (to, target) = (transfer.to, transfer.target);
        let local = if done { transfer.true_local() } else { local };

        let world = ctx.objects.get_mut(to).and_then(|object| {
            object.set_target_local(target, local);
            object.target_world_pose(target)
        });
        if let Some(world) = world {
            services.ik.start_interaction(effector, world, to);
        }

        if done {
            self.state = LinkState::Connected(LinkPhase::Driving);
            ctx.push_event(InteractionEvent::TransferCompleted { effector, object: to });
            log::debug!("{} transfer to {:?} complete", effector, to);
        }
    }

    /// Watch IK progress for reach, pause and completion
    fn observe(
        &mut self,
        delta_time: f32,
        ctx: &mut ActorContext,
        services: &mut Collaborators<'_>,
    ) -> Vec<LinkSignal> {
        let effector = self.effector();
        let Some(connection) = ctx.connection(effector).copied() else {
            self.state = LinkState::Idle;
            return Vec::new();
        };
        let id = connection.object;
        let progress = services.ik.progress(effector);
        let mut paused = services.ik.is_paused(effector);
        let completion = ctx.config.completion_progress;

        let Some(object) = ctx.objects.get_mut(id) else {
            return Vec::new();
        };
        let kind = object.kind();
        let mut events = Vec::new();

        // Only objects that ask for it hold the effector at the target
        if paused && !object.pause_on_interaction {
            services.ik.resume_interaction(effector);
            paused = false;
        }

        if paused && !self.pause_looked && object.look_mode.contains(LookMode::ON_PAUSE) {
            services.look.new_look_order(id, LookMode::ON_PAUSE);
            self.pause_looked = true;
        }

        if !self.reached && progress >= 1.0 {
            self.reached = true;
            match &mut object.behavior {
                InteractionBehavior::ManualSwitch(switch) => {
                    switch.on = !switch.on;
                    events.push(InteractionEvent::SwitchToggled { object: id, on: switch.on });
                }
                InteractionBehavior::ManualForce(force) => {
                    events.push(InteractionEvent::ForceApplied {
                        object: id,
                        impulse: force.impulse,
                    });
                }
                InteractionBehavior::ManualHit(hit) => hit.remaining = hit.cooldown,
                InteractionBehavior::PickableOne(pick) | InteractionBehavior::PickableTwo(pick) => {
                    if !pick.held {
                        pick.held = true;
                        events.push(InteractionEvent::PickedUp { object: id, hold: pick.hold });
                    }
                    self.state = LinkState::Connected(LinkPhase::Holding);
                }
                _ => {}
            }
        }

        if let InteractionBehavior::ManualRotator(rotator) = &mut object.behavior {
            if paused {
                rotator.rotation += rotator.degrees_per_second * delta_time;
                events.push(InteractionEvent::Rotated {
                    object: id,
                    rotation: rotator.rotation,
                });
            }
        }
        ctx.events.extend(events);

        if kind.self_terminates() && progress >= completion {
            if kind.is_automatic() {
                self.spent = Some(id);
            }
            return self.disconnect(ctx, services, true).into_iter().collect();
        }
        Vec::new()
    }

    /// Start placing a carried item down through a returning orbital drive
    pub(crate) fn begin_release(&mut self, ctx: &mut ActorContext, services: &mut Collaborators<'_>) -> bool {
        let effector = self.effector();
        if self.state != LinkState::Connected(LinkPhase::Holding) {
            return false;
        }
        let Some(connection) = ctx.connection(effector).copied().filter(|c| c.via_orbital) else {
            return false;
        };
        let Some(target) = ctx
            .objects
            .get(connection.object)
            .and_then(|object| object.target_world_pose(connection.target))
        else {
            return false;
        };

        let actor = ctx.pose;
        let (Some(blender), Some(animator)) = (ctx.orbital.as_mut(), services.animator.as_deref_mut()) else {
            return false;
        };
        let query = blender.query(&actor, target.position);
        let key = DriveKey {
            effector,
            object: connection.object,
        };
        if blender.drive(key, query, effector.is_left(), true, animator).is_err() {
            return false;
        }

        self.state = LinkState::Connected(LinkPhase::Releasing);
        true
    }

    /// React to the orbital drive requested by this link
    pub(crate) fn on_drive_event(
        &mut self,
        key: DriveKey,
        event: DriveEvent,
        ctx: &mut ActorContext,
        services: &mut Collaborators<'_>,
    ) -> Option<LinkSignal> {
        let effector = self.effector();
        let connection = ctx
            .connection(effector)
            .copied()
            .filter(|connection| connection.object == key.object)?;

        let phase = match self.state {
            LinkState::Connected(phase) => Some(phase),
            _ => None,
        };

        match (event, phase) {
            (DriveEvent::Reached { returning: false }, Some(LinkPhase::Reaching)) => {
                let pose = ctx
                    .objects
                    .get(key.object)
                    .and_then(|object| object.target_world_pose(connection.target))?;
                services.ik.start_interaction(effector, pose, key.object);
                self.state = LinkState::Connected(LinkPhase::Driving);
                None
            }
            (DriveEvent::Reached { returning: true }, Some(LinkPhase::Releasing)) => {
                self.disconnect(ctx, services, true)
            }
            (DriveEvent::PauseTimedOut, _) => {
                services.ik.resume_interaction(effector);
                None
            }
            (DriveEvent::Cancelled, Some(LinkPhase::Reaching | LinkPhase::Releasing)) => {
                self.disconnect(ctx, services, true)
            }
            _ => None,
        }
    }
}

/// Turn off orbital reach on an object that cannot be served
fn degrade_orbital(ctx: &mut ActorContext, id: ObjectId, reason: &str) {
    let Some(object) = ctx.objects.get_mut(id) else {
        return;
    };
    if !object.orbital_reach {
        return;
    }
    object.orbital_reach = false;
    log::warn!("Orbital reach disabled on '{}': {}", object.name, reason);
    ctx.events.push(InteractionEvent::OrbitalDegraded { object: id });
}
