//! Query results and swept shapes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::ContentFlags;

/// Result of a ray, sweep or body move.
///
/// Rays report the impact point as `location`; sweeps and moves report the
/// shape's center at the moment of contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Whether solid geometry stopped the query.
    pub blocking: bool,

    /// Fraction of the query path covered before contact.
    ///
    /// - `1.0` = traveled the full distance (no blocking contact)
    /// - `0.0` = blocked immediately at start
    pub time: f32,

    /// Contact location (see type docs), or the path end on a miss.
    pub location: Vec3,

    /// Surface normal pointing away from the surface. Zero on a miss.
    pub normal: Vec3,

    /// Contents of the brush that was touched.
    pub contents: ContentFlags,

    /// Owner entity of the touched brush, if any.
    pub owner: Option<u32>,

    /// Whether the query started inside blocking geometry.
    pub started_in_solid: bool,
}

impl Default for Hit {
    fn default() -> Self {
        Self::miss(Vec3::ZERO)
    }
}

impl Hit {
    /// A query that reached `end` without touching anything.
    pub fn miss(end: Vec3) -> Self {
        Self {
            blocking: false,
            time: 1.0,
            location: end,
            normal: Vec3::ZERO,
            contents: ContentFlags::EMPTY,
            owner: None,
            started_in_solid: false,
        }
    }

    /// A blocking contact on solid geometry.
    pub fn blocking(time: f32, location: Vec3, normal: Vec3) -> Self {
        Self {
            blocking: true,
            time,
            location,
            normal,
            contents: ContentFlags::SOLID,
            owner: None,
            started_in_solid: false,
        }
    }

    /// A non-blocking overlap the query passed through.
    pub fn overlap(time: f32, location: Vec3, contents: ContentFlags) -> Self {
        Self {
            blocking: false,
            time,
            location,
            normal: Vec3::ZERO,
            contents,
            owner: None,
            started_in_solid: false,
        }
    }

    /// Get the hit normal, defaulting to world up if there is none.
    #[inline]
    pub fn normal_or_up(&self) -> Vec3 {
        self.normal.try_normalize().unwrap_or(Vec3::Z)
    }
}

/// Shape swept through the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TraceShape {
    /// A sphere centered on the trace position.
    Sphere {
        /// Sphere radius.
        radius: f32,
    },

    /// A single point. Used for rays.
    Point,
}

impl TraceShape {
    /// Create a sphere shape.
    pub const fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Get the effective radius of this shape.
    pub fn radius(&self) -> f32 {
        match self {
            Self::Sphere { radius } => *radius,
            Self::Point => 0.0,
        }
    }
}
