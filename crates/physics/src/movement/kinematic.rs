//! Sphere body mover over a [`CollisionWorld`].

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::body::AgentBody;
use crate::collision::{CollisionWorld, Hit, QueryFilter, TraceShape};
use crate::query::BodyMover;

use super::slide_move::{compute_slide_vector, is_meaningful_slide, two_wall_adjust};

/// Moves shorter than this only update the rotation.
const MIN_MOVE_LENGTH: f32 = 1e-4;

/// A sphere-shaped agent body that moves by sweeping through the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicBody {
    pub body: AgentBody,

    /// Shape swept for every move.
    pub shape: TraceShape,

    /// What the body collides with. Set `ignore_owner` to the agent's own
    /// entity so it doesn't collide with itself.
    pub filter: QueryFilter,
}

impl KinematicBody {
    /// Create a sphere body of `radius` at `position`.
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            body: AgentBody::new(position),
            shape: TraceShape::sphere(radius),
            filter: QueryFilter::agent_solid(),
        }
    }

    /// Same body, colliding with everything except `owner`'s brushes.
    pub fn owned_by(mut self, owner: u32) -> Self {
        self.filter = self.filter.ignoring(owner);
        self
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    /// Borrow this body together with the world it moves through.
    pub fn mover<'a>(&'a mut self, world: &'a CollisionWorld) -> KinematicMover<'a> {
        KinematicMover { body: self, world }
    }
}

/// [`BodyMover`] for a [`KinematicBody`] in a specific world.
#[derive(Debug)]
pub struct KinematicMover<'a> {
    body: &'a mut KinematicBody,
    world: &'a CollisionWorld,
}

impl KinematicMover<'_> {
    fn sweep(&mut self, delta: Vec3) -> Hit {
        let KinematicBody { body, shape, filter } = &mut *self.body;

        if delta.length() < MIN_MOVE_LENGTH {
            return Hit::miss(body.position);
        }

        let mut hit = self.world.sweep(*shape, body.position, body.position + delta, filter);

        if hit.started_in_solid {
            let resolved = self.world.resolve_penetration(body.position, *shape, filter);
            log::trace!("body started in solid at {:?}, pushed out to {:?}", body.position, resolved);
            body.position = resolved;
            hit = self.world.sweep(*shape, resolved, resolved + delta, filter);
        }

        if !hit.started_in_solid {
            body.position = hit.location;
        }
        hit
    }
}

impl BodyMover for KinematicMover<'_> {
    fn body(&self) -> &AgentBody {
        &self.body.body
    }

    fn move_with_collision(&mut self, delta: Vec3, rotation: Quat) -> Hit {
        self.body.body.rotation = rotation;
        self.sweep(delta)
    }

    fn slide_along_surface(&mut self, delta: Vec3, time: f32, normal: Vec3) -> f32 {
        let slide = compute_slide_vector(delta, time, normal);
        if !is_meaningful_slide(slide, delta) {
            return 0.0;
        }

        let hit = self.sweep(slide);
        if !hit.blocking {
            return 1.0;
        }

        let mut applied = hit.time;
        let adjusted = two_wall_adjust(slide, hit.time, hit.normal_or_up(), normal);
        if is_meaningful_slide(adjusted, delta) {
            let second = self.sweep(adjusted);
            applied += second.time * (1.0 - applied);
        }

        applied.clamp(0.0, 1.0)
    }

    fn owner(&self) -> Option<u32> {
        self.body.filter.ignore_owner
    }
}
