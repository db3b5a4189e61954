//! Terrain: collision geometry plus spawn points.

use antgrip_physics::{CollisionWorld, ContentFlags};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::agent::Agent;

/// Half-width of test course pieces across the walking direction.
const COURSE_HALF_WIDTH: f32 = 300.0;

/// Thickness of floor slabs.
const SLAB_THICKNESS: f32 = 100.0;

/// A piece of terrain agents walk over.
#[derive(Debug)]
pub struct Terrain {
    /// Terrain identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Collision world agents are stepped against.
    pub collision: CollisionWorld,

    /// Agent spawn points.
    pub spawn_points: Vec<SpawnPoint>,
}

/// A spawn point for agents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Body center in world space.
    pub position: Vec3,

    /// Initial heading (yaw in radians).
    pub facing: f32,
}

impl Terrain {
    /// Create empty terrain.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            collision: CollisionWorld::new(),
            spawn_points: Vec::new(),
        }
    }

    /// A flat square floor with its top at z=0.
    pub fn flat(half_size: f32) -> Self {
        let mut terrain = Self::new("flat", "Flat Floor");
        terrain.collision.add_box(
            Vec3::new(0.0, 0.0, -SLAB_THICKNESS / 2.0),
            Vec3::new(half_size, half_size, SLAB_THICKNESS / 2.0),
            ContentFlags::SOLID,
        );
        terrain.add_spawn(Vec3::new(0.0, 0.0, 0.5), 0.0);
        terrain
    }

    /// A course along +X exercising every ground case.
    ///
    /// In order: a flat start, a 15 degree ramp up, a plateau, a step down,
    /// a trench, a far floor and a closing wall.
    pub fn test_course() -> Self {
        let mut terrain = Self::new("test_course", "Test Course");

        let ramp_angle = 15.0_f32.to_radians();
        let ramp_run = 200.0;
        let top = ramp_run * ramp_angle.tan();
        let low = top - 20.0;

        terrain.add_slab(-200.0, 400.0, 0.0);
        terrain.add_ramp(400.0, 0.0, ramp_run, ramp_angle);
        terrain.add_slab(600.0, 900.0, top);
        terrain.add_slab(900.0, 1300.0, low);
        terrain.add_slab(1300.0, 1400.0, low - 40.0);
        terrain.add_slab(1400.0, 2000.0, low);

        // Closing wall
        terrain.collision.add_box(
            Vec3::new(2020.0, 0.0, low + 100.0),
            Vec3::new(20.0, COURSE_HALF_WIDTH, 100.0),
            ContentFlags::SOLID,
        );

        terrain.add_spawn(Vec3::new(-100.0, 0.0, 0.5), 0.0);
        terrain.add_spawn(Vec3::new(-100.0, 100.0, 0.5), 0.0);
        terrain.add_spawn(Vec3::new(-100.0, -100.0, 0.5), 0.0);

        terrain
    }

    /// Add a spawn point.
    ///
    /// `position.z` is the clearance under the body, so the stored center is
    /// lifted by the agent radius.
    pub fn add_spawn(&mut self, position: Vec3, facing: f32) {
        self.spawn_points.push(SpawnPoint {
            position: position + Vec3::Z * Agent::RADIUS,
            facing,
        });
    }

    /// Get a spawn point, wrapping around when there are fewer than `index`.
    pub fn get_spawn(&self, index: usize) -> Option<&SpawnPoint> {
        if self.spawn_points.is_empty() {
            return None;
        }
        self.spawn_points.get(index % self.spawn_points.len())
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Flat slab spanning `x0..x1` with its top at `top`.
    fn add_slab(&mut self, x0: f32, x1: f32, top: f32) -> u32 {
        self.collision.add_box(
            Vec3::new((x0 + x1) / 2.0, 0.0, top - SLAB_THICKNESS / 2.0),
            Vec3::new((x1 - x0) / 2.0, COURSE_HALF_WIDTH, SLAB_THICKNESS / 2.0),
            ContentFlags::SOLID,
        )
    }

    /// Slab rising `angle` radians toward +X from `(x0, z0)` over `run`.
    fn add_ramp(&mut self, x0: f32, z0: f32, run: f32, angle: f32) -> u32 {
        let normal = Vec3::new(-angle.sin(), 0.0, angle.cos());
        let surface_mid = Vec3::new(x0 + run / 2.0, 0.0, z0 + run * angle.tan() / 2.0);
        let half_thickness = SLAB_THICKNESS / 2.0;

        self.collision.add_oriented_box(
            surface_mid - normal * half_thickness,
            Vec3::new(run / (2.0 * angle.cos()), COURSE_HALF_WIDTH, half_thickness),
            Quat::from_rotation_y(-angle),
            ContentFlags::SOLID,
        )
    }
}
