//! Interaction behaviors
//!
//! [`InteractionBehavior`] is a closed set. Each variant carries only the
//! settings and runtime state it needs; [`InteractionKind`] is the fieldless
//! tag used for dispatch and rule lookups.

use serde::{Deserialize, Serialize};

/// Where a picked item is carried
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldType {
    /// In the reaching hand
    #[default]
    Hand,
    /// Against the body
    Body,
}

/// How a held item is released
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropType {
    /// Put down where it is
    #[default]
    Drop,
    /// Thrown forward
    Throw,
}

/// How much an active interaction restricts actor movement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mobility {
    #[default]
    Free,
    /// The actor is bound to the object until released
    Locked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchSettings {
    /// Current switch position
    pub on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatorSettings {
    /// Rotation applied per second while held at the target
    pub degrees_per_second: f32,
    /// Accumulated rotation
    pub rotation: f32,
}

impl Default for RotatorSettings {
    fn default() -> Self {
        Self {
            degrees_per_second: 90.0,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitSettings {
    /// Seconds before the object can be hit again
    pub cooldown: f32,
    /// Seconds left on the current cooldown
    #[serde(skip)]
    pub remaining: f32,
}

impl Default for HitSettings {
    fn default() -> Self {
        Self {
            cooldown: 1.0,
            remaining: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceSettings {
    /// Impulse reported when the effector reaches the target
    pub impulse: f32,
}

impl Default for ForceSettings {
    fn default() -> Self {
        Self { impulse: 5.0 }
    }
}

/// Surface probe for touch interactions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchSettings {
    /// Length of the probe ray from the effector
    pub probe_distance: f32,
    /// Layers the probe can hit
    pub surface_mask: u32,
}

impl Default for TouchSettings {
    fn default() -> Self {
        Self {
            probe_distance: 1.0,
            surface_mask: u32::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSettings {
    /// Farthest the effector may be from the target
    pub max_distance: f32,
}

impl Default for DistanceSettings {
    fn default() -> Self {
        Self { max_distance: 10.0 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PickSettings {
    /// Carry position once picked
    pub hold: HoldType,
    /// Set while the item is carried
    #[serde(skip)]
    pub held: bool,
}

/// What an interactable object does when an effector engages it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InteractionBehavior {
    /// Reaches out automatically while in range
    Default,
    ManualButton,
    ManualSwitch(SwitchSettings),
    ManualRotator(RotatorSettings),
    ManualHit(HitSettings),
    ManualForce(ForceSettings),
    /// Touches a wall in front of the effector
    TouchVertical(TouchSettings),
    /// Touches a surface above the effector
    TouchHorizontalUp(TouchSettings),
    /// Touches a surface below the effector
    TouchHorizontalDown(TouchSettings),
    /// Touches a fixed target
    TouchStill,
    /// Selected from afar with the crosshair
    Distance(DistanceSettings),
    Climbable,
    Multiple,
    /// Targets on the actor's own body
    SelfInteraction,
    PickableOne(PickSettings),
    PickableTwo(PickSettings),
    Push,
    CoverStand,
    CoverCrouch,
}

impl InteractionBehavior {
    pub fn kind(&self) -> InteractionKind {
        match self {
            InteractionBehavior::Default => InteractionKind::Default,
            InteractionBehavior::ManualButton => InteractionKind::ManualButton,
            InteractionBehavior::ManualSwitch(_) => InteractionKind::ManualSwitch,
            InteractionBehavior::ManualRotator(_) => InteractionKind::ManualRotator,
            InteractionBehavior::ManualHit(_) => InteractionKind::ManualHit,
            InteractionBehavior::ManualForce(_) => InteractionKind::ManualForce,
            InteractionBehavior::TouchVertical(_) => InteractionKind::TouchVertical,
            InteractionBehavior::TouchHorizontalUp(_) => InteractionKind::TouchHorizontalUp,
            InteractionBehavior::TouchHorizontalDown(_) => InteractionKind::TouchHorizontalDown,
            InteractionBehavior::TouchStill => InteractionKind::TouchStill,
            InteractionBehavior::Distance(_) => InteractionKind::Distance,
            InteractionBehavior::Climbable => InteractionKind::Climbable,
            InteractionBehavior::Multiple => InteractionKind::Multiple,
            InteractionBehavior::SelfInteraction => InteractionKind::SelfInteraction,
            InteractionBehavior::PickableOne(_) => InteractionKind::PickableOne,
            InteractionBehavior::PickableTwo(_) => InteractionKind::PickableTwo,
            InteractionBehavior::Push => InteractionKind::Push,
            InteractionBehavior::CoverStand => InteractionKind::CoverStand,
            InteractionBehavior::CoverCrouch => InteractionKind::CoverCrouch,
        }
    }

    /// Touch probe settings, if this is a re-aiming touch
    pub fn touch(&self) -> Option<&TouchSettings> {
        match self {
            InteractionBehavior::TouchVertical(touch)
            | InteractionBehavior::TouchHorizontalUp(touch)
            | InteractionBehavior::TouchHorizontalDown(touch) => Some(touch),
            _ => None,
        }
    }

    pub fn pick(&self) -> Option<&PickSettings> {
        match self {
            InteractionBehavior::PickableOne(pick) | InteractionBehavior::PickableTwo(pick) => Some(pick),
            _ => None,
        }
    }

    pub fn pick_mut(&mut self) -> Option<&mut PickSettings> {
        match self {
            InteractionBehavior::PickableOne(pick) | InteractionBehavior::PickableTwo(pick) => Some(pick),
            _ => None,
        }
    }

    /// Whether a hit cooldown is still running
    pub fn is_cooling_down(&self) -> bool {
        matches!(self, InteractionBehavior::ManualHit(hit) if hit.remaining > 0.0)
    }

    /// Tick object-local timers
    pub fn tick(&mut self, delta_time: f32) {
        if let InteractionBehavior::ManualHit(hit) = self {
            hit.remaining = (hit.remaining - delta_time).max(0.0);
        }
    }
}

/// Behavior family, for rules shared across kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Default,
    Manual,
    Touch,
    Distance,
    Climbable,
    Multiple,
    SelfInteraction,
    Pickable,
    Push,
    Cover,
}

/// Fieldless tag of an [`InteractionBehavior`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    Default,
    ManualButton,
    ManualSwitch,
    ManualRotator,
    ManualHit,
    ManualForce,
    TouchVertical,
    TouchHorizontalUp,
    TouchHorizontalDown,
    TouchStill,
    Distance,
    Climbable,
    Multiple,
    SelfInteraction,
    PickableOne,
    PickableTwo,
    Push,
    CoverStand,
    CoverCrouch,
}

impl InteractionKind {
    pub fn category(self) -> Category {
        use InteractionKind as K;
        match self {
            K::Default => Category::Default,
            K::ManualButton | K::ManualSwitch | K::ManualRotator | K::ManualHit | K::ManualForce => {
                Category::Manual
            }
            K::TouchVertical | K::TouchHorizontalUp | K::TouchHorizontalDown | K::TouchStill => {
                Category::Touch
            }
            K::Distance => Category::Distance,
            K::Climbable => Category::Climbable,
            K::Multiple => Category::Multiple,
            K::SelfInteraction => Category::SelfInteraction,
            K::PickableOne | K::PickableTwo => Category::Pickable,
            K::Push => Category::Push,
            K::CoverStand | K::CoverCrouch => Category::Cover,
        }
    }

    /// Entered by proximity events rather than explicit registration
    pub fn is_proximity_driven(self) -> bool {
        !matches!(self, InteractionKind::Distance | InteractionKind::SelfInteraction)
    }

    /// Connects on its own once eligible
    pub fn is_automatic(self) -> bool {
        matches!(self.category(), Category::Default | Category::Touch)
    }

    /// Useable effectors needed before the object is ready
    pub fn required_effectors(self) -> u32 {
        match self {
            InteractionKind::PickableTwo | InteractionKind::Push => 2,
            _ => 1,
        }
    }

    /// Whether several effectors always connect together
    pub fn connects_all(self) -> bool {
        matches!(
            self,
            InteractionKind::Climbable
                | InteractionKind::Multiple
                | InteractionKind::PickableTwo
                | InteractionKind::Push
        )
    }

    /// Ends by itself once the drive completes its target-and-back cycle
    pub fn self_terminates(self) -> bool {
        !matches!(
            self.category(),
            Category::Touch | Category::Pickable | Category::Push | Category::Cover
        ) && self != InteractionKind::ManualRotator
    }

    /// Released when the effector loses eligibility while connected
    pub fn releases_out_of_range(self) -> bool {
        matches!(
            self.category(),
            Category::Default | Category::Touch | Category::Push | Category::Cover
        )
    }

    /// Held interactions stop when the use input is released
    pub fn stops_on_release(self) -> bool {
        matches!(self, InteractionKind::ManualRotator | InteractionKind::Push)
    }

    pub fn is_pickable(self) -> bool {
        self.category() == Category::Pickable
    }

    /// Skips line-of-sight checks (the probe itself finds the surface, or
    /// the target is on the actor)
    pub fn skips_obstruction(self) -> bool {
        matches!(self.category(), Category::Touch | Category::SelfInteraction)
    }

    pub fn mobility(self) -> Mobility {
        match self.category() {
            Category::Climbable | Category::Push | Category::Cover => Mobility::Locked,
            _ => Mobility::Free,
        }
    }
}
