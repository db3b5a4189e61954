//! Agent entity and state.

use antgrip_physics::{AgentBody, KinematicBody, MotionState, Support};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::InputAccumulator;

/// Unique identifier for entities.
pub type EntityId = u32;

/// A walking agent in the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent ID.
    pub id: EntityId,

    /// Display name.
    pub name: String,

    /// Collision body and transform.
    pub body: KinematicBody,

    /// Velocity, pending force/impulse and support state.
    pub motion: MotionState,

    /// Movement intent gathered since the last tick.
    pub input: InputAccumulator,
}

impl Agent {
    /// Collision radius of an agent body.
    pub const RADIUS: f32 = 10.0;

    /// Create a grounded agent at rest.
    pub fn new(id: EntityId, name: String, position: Vec3, facing: f32) -> Self {
        let mut body = KinematicBody::new(position, Self::RADIUS).owned_by(id);
        body.body.rotation = Quat::from_rotation_z(facing);

        Self {
            id,
            name,
            body,
            motion: MotionState::new(),
            input: InputAccumulator::new(),
        }
    }

    /// Add world-space movement intent for the next tick.
    pub fn add_input(&mut self, direction: Vec3) {
        self.input.add_input(direction);
    }

    /// Queue an instantaneous velocity change.
    pub fn add_impulse(&mut self, impulse: Vec3) {
        self.motion.add_impulse(impulse);
    }

    /// Queue a force, scaled by the next tick's delta time.
    pub fn add_force(&mut self, force: Vec3) {
        self.motion.add_force(force);
    }

    #[inline]
    pub fn transform(&self) -> &AgentBody {
        &self.body.body
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.motion.velocity()
    }

    #[inline]
    pub fn support(&self) -> Support {
        self.motion.support()
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        self.motion.is_falling()
    }

    /// Put the agent back at `position`, grounded and at rest.
    pub fn respawn(&mut self, position: Vec3, facing: f32) {
        self.body.body = AgentBody::with_yaw(position, facing);
        self.motion = MotionState::new();
        self.input = InputAccumulator::new();
    }
}
