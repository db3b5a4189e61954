//! Agent motion.
//!
//! [`MotionIntegrator`] advances one agent per call: it samples the ground,
//! blends the body toward it, integrates velocity through the grip gate and
//! gravity, and moves the body through a [`BodyMover`](crate::query::BodyMover).
//!
//! # Design
//!
//! Support is an explicit [`Support`] state changed only through
//! [`SupportEvent`]s, so every Grounded/Falling transition goes through one
//! function and shows up in the [`StepReport`].
//!
//! Stepping is deterministic: the same state, inputs and world always produce
//! the same result.

mod config;
mod controller;
mod kinematic;
mod slide_move;
mod state;

pub use config::{ConfigError, MotionConfig, OrientationBlend};
pub use controller::{MotionIntegrator, StepReport};
pub use kinematic::{KinematicBody, KinematicMover};
pub use slide_move::{compute_slide_vector, project_onto_plane, two_wall_adjust};
pub use state::{MotionState, Support, SupportEvent, SupportTransition};
