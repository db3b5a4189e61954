//! Motion state and the Grounded/Falling state machine.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Whether the ground is currently holding the agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Support {
    /// Feet are on the ground; ground snapping keeps them there.
    #[default]
    Grounded,

    /// Nothing holds the agent; gravity applies and only a slow enough
    /// blocking hit brings it back.
    Falling,
}

/// Something that happened during a step that may change [`Support`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SupportEvent {
    /// Pending force and impulse together exceeded the grip strength.
    GripOvercome,

    /// The body move was stopped by solid geometry.
    BlockingHit {
        /// Velocity magnitude when the hit was resolved.
        speed: f32,
    },

    /// The downward snap sweep found ground and the body was moved onto it.
    Snapped,

    /// The downward snap sweep found nothing.
    SnapMissed,
}

/// A change of [`Support`] and the event that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportTransition {
    pub from: Support,
    pub to: Support,
    pub event: SupportEvent,
}

impl Support {
    /// The state after `event`.
    ///
    /// A blocking hit re-grounds only below `regrounding_speed`. Snapping
    /// never changes the state: it only runs while already grounded.
    pub fn next(self, event: SupportEvent, regrounding_speed: f32) -> Support {
        match event {
            SupportEvent::GripOvercome | SupportEvent::SnapMissed => Support::Falling,
            SupportEvent::BlockingHit { speed } if speed < regrounding_speed => Support::Grounded,
            SupportEvent::BlockingHit { .. } | SupportEvent::Snapped => self,
        }
    }

    #[inline]
    pub fn is_falling(self) -> bool {
        self == Support::Falling
    }
}

/// Per-agent motion state, mutated every step.
///
/// Created grounded at spawn. External systems (knockback, explosions) call
/// [`add_impulse`](Self::add_impulse) and [`add_force`](Self::add_force)
/// between steps; the next step consumes both buffers exactly once.
///
/// The buffers must not be written while a step runs. Since the step takes
/// the state by `&mut`, that is checked at compile time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub(crate) velocity: Vec3,
    pub(crate) pending_impulse: Vec3,
    pub(crate) pending_force: Vec3,
    pub(crate) support: Support,
    pub(crate) acceleration: Vec3,
}

impl MotionState {
    /// Create a grounded state at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state with the given support, at rest.
    pub fn with_support(support: Support) -> Self {
        Self {
            support,
            ..Default::default()
        }
    }

    /// Queue an instantaneous velocity change for the next step.
    pub fn add_impulse(&mut self, impulse: Vec3) {
        self.pending_impulse += impulse;
    }

    /// Queue a force for the next step. It is scaled by that step's `dt`.
    pub fn add_force(&mut self, force: Vec3) {
        self.pending_force += force;
    }

    /// Overwrite the velocity, e.g. when teleporting an agent.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn support(&self) -> Support {
        self.support
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        self.support.is_falling()
    }

    /// Net acceleration computed by the last step.
    #[inline]
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    #[inline]
    pub fn pending_impulse(&self) -> Vec3 {
        self.pending_impulse
    }

    #[inline]
    pub fn pending_force(&self) -> Vec3 {
        self.pending_force
    }

    /// Feed an event through the state machine.
    ///
    /// Returns the transition if the support changed.
    pub(crate) fn apply(&mut self, event: SupportEvent, regrounding_speed: f32) -> Option<SupportTransition> {
        let from = self.support;
        let to = from.next(event, regrounding_speed);
        if from == to {
            return None;
        }

        log::debug!("support {:?} -> {:?} on {:?}", from, to, event);
        self.support = to;
        Some(SupportTransition { from, to, event })
    }

    /// Take both pending buffers, leaving them zero.
    pub(crate) fn take_pending(&mut self) -> (Vec3, Vec3) {
        (
            std::mem::take(&mut self.pending_impulse),
            std::mem::take(&mut self.pending_force),
        )
    }
}
