//! Antgrip Physics
//!
//! Locomotion for agents that crawl over uneven terrain: the body tilts to
//! follow the local ground, sticky feet absorb small shoves, and anything
//! stronger knocks the agent loose so it falls until it lands again.
//!
//! # Architecture
//!
//! The crate is split into a small core and the collaborators it talks to:
//!
//! - **Sensing**: [`GroundSensor`] rays down from four foot anchors and builds
//!   a target orientation from the contact points.
//! - **Movement**: [`MotionIntegrator`] turns input, friction, gravity and
//!   pending force/impulse into a velocity, then asks a [`BodyMover`] to move
//!   the body and resolves the Grounded/Falling state from the result.
//! - **Query seams**: [`GroundQuery`], [`BodyMover`] and [`InputSource`] are
//!   the only ways the core reaches the outside world.
//! - **Collision**: [`CollisionWorld`] and [`KinematicBody`] are parry3d-backed
//!   reference implementations of those seams, used by hosts and tests.
//!
//! # Conventions
//!
//! World up is +Z and gravity acts along Z. A body's local +X is forward,
//! +Y is right and +Z is up, so `up = forward.cross(right)`.

pub mod body;
pub mod collision;
pub mod movement;
pub mod query;
pub mod sensing;

pub use body::AgentBody;
pub use collision::{CollisionWorld, ContentFlags, Hit, QueryFilter, TraceShape};
pub use movement::{
    ConfigError, KinematicBody, KinematicMover, MotionConfig, MotionIntegrator, MotionState,
    OrientationBlend, StepReport, Support, SupportEvent, SupportTransition,
};
pub use query::{BodyMover, GroundQuery, InputSource};
pub use sensing::{ContactSource, Foot, FootContact, GroundSample, GroundSensor, SensorConfig};
