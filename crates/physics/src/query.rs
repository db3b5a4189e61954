//! Seams between the motion core and the host.
//!
//! The core never touches geometry or input devices directly. Each step it
//! asks a [`GroundQuery`] about the environment, a [`BodyMover`] to displace
//! the body, and an [`InputSource`] for the accumulated move intent.
//!
//! All three are called synchronously from inside
//! [`MotionIntegrator::step`](crate::movement::MotionIntegrator::step), so
//! their latency is paid per agent per tick.

use glam::{Quat, Vec3};

use crate::body::AgentBody;
use crate::collision::{Hit, QueryFilter, TraceShape};

/// Read-only collision queries against the environment.
pub trait GroundQuery {
    /// Cast a ray from `origin` to `end` and report the closest blocking hit.
    ///
    /// Geometry owned by `filter.ignore_owner` is skipped, which is how an
    /// agent avoids hitting its own colliders.
    fn ray(&self, origin: Vec3, end: Vec3, filter: &QueryFilter) -> Hit;

    /// Sweep `shape` from `start` to `end`.
    ///
    /// Returns every contact in path order. Non-blocking overlaps come first
    /// and the sequence ends at the first blocking hit, if there is one. An
    /// empty sequence means nothing was touched.
    fn sweep_multi(&self, shape: TraceShape, start: Vec3, end: Vec3, filter: &QueryFilter) -> Vec<Hit>;
}

/// Moves the agent's body while respecting collision geometry.
pub trait BodyMover {
    /// Current body transform.
    fn body(&self) -> &AgentBody;

    /// Sweep the body by `delta`, stopping at the first blocking contact, and
    /// set its orientation to `rotation`.
    ///
    /// The returned hit's `time` is the fraction of `delta` actually covered.
    fn move_with_collision(&mut self, delta: Vec3, rotation: Quat) -> Hit;

    /// Continue a blocked move along the surface with normal `normal`.
    ///
    /// `time` is the unconsumed fraction of `delta`. Returns the fraction of
    /// that slide which was applied.
    fn slide_along_surface(&mut self, delta: Vec3, time: f32, normal: Vec3) -> f32;

    /// Entity whose colliders ground probes should skip.
    fn owner(&self) -> Option<u32> {
        None
    }
}

/// Source of the per-step movement intent.
pub trait InputSource {
    /// Return the input accumulated since the last call and reset it.
    fn consume_input_vector(&mut self) -> Vec3;
}

/// A bare vector works as an input buffer: consuming takes it and leaves zero.
impl InputSource for Vec3 {
    fn consume_input_vector(&mut self) -> Vec3 {
        std::mem::take(self)
    }
}
