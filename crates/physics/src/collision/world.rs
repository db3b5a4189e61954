//! Collision world containing static terrain brushes.
//!
//! The world stores collidable geometry and answers the ray and sweep queries
//! the motion core asks through [`GroundQuery`].

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::na::{Quaternion, Translation3, UnitQuaternion};
use parry3d::query::{contact, Contact, Ray};
use parry3d::shape::SharedShape;

use super::flags::{ContentFlags, QueryFilter};
use super::trace::{Hit, TraceShape};
use crate::query::GroundQuery;

/// Paths shorter than this are treated as stationary.
const MIN_TRACE_LENGTH: f32 = 1e-4;

/// Smallest sub-step used when marching a sweep along its path.
const MIN_MARCH_STEP: f32 = 0.5;

/// Upper bound on march sub-steps per sweep.
const MAX_MARCH_STEPS: usize = 256;

/// Bisection iterations used to refine a contact inside one sub-step.
const BISECTION_STEPS: usize = 12;

/// Radius used for point-shaped penetration tests.
const POINT_RADIUS: f32 = 0.001;

/// A piece of collision geometry in the world.
#[derive(Debug, Clone)]
pub struct Brush {
    /// Unique identifier for this brush.
    pub id: u32,
    /// The collision shape.
    pub shape: SharedShape,
    /// Position and orientation in world space.
    pub transform: Isometry<Real>,
    /// Content flags (solid, trigger, foliage, ...).
    pub contents: ContentFlags,
    /// Entity that owns this brush, if any.
    pub owner: Option<u32>,
}

/// The collision world containing all terrain.
///
/// Supports axis-aligned boxes, oriented boxes (ramps) and convex hulls.
///
/// # Thread Safety
///
/// The world is immutable while agents step and can be shared across threads.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    brushes: Vec<Brush>,
    next_id: u32,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            brushes: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an axis-aligned box.
    ///
    /// # Arguments
    ///
    /// * `center` - Center position of the box in world space
    /// * `half_extents` - Half-size in each axis
    /// * `contents` - Content flags for collision filtering
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, contents: ContentFlags) -> u32 {
        self.add_oriented_box(center, half_extents, Quat::IDENTITY, contents)
    }

    /// Add a box rotated by `rotation` about its center.
    pub fn add_oriented_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        contents: ContentFlags,
    ) -> u32 {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.push_brush(shape, isometry(center, rotation), contents)
    }

    /// Add a convex hull through the given world-space points.
    ///
    /// Returns the brush ID, or `None` if the hull couldn't be computed.
    pub fn add_convex_hull(&mut self, points: &[Vec3], contents: ContentFlags) -> Option<u32> {
        let parry_points: Vec<Point<Real>> = points.iter().map(|p| to_point(*p)).collect();
        let shape = SharedShape::convex_hull(&parry_points)?;
        Some(self.push_brush(shape, Isometry::identity(), contents))
    }

    /// Mark a brush as owned by an entity so that entity's queries can skip it.
    ///
    /// Returns `false` if no brush has that ID.
    pub fn set_owner(&mut self, brush_id: u32, owner: Option<u32>) -> bool {
        match self.brushes.iter_mut().find(|b| b.id == brush_id) {
            Some(brush) => {
                brush.owner = owner;
                true
            }
            None => false,
        }
    }

    /// Get the number of collision brushes.
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    /// Cast a ray from `origin` to `end` and return the closest blocking hit.
    pub fn raycast(&self, origin: Vec3, end: Vec3, filter: &QueryFilter) -> Hit {
        let delta = end - origin;
        let length = delta.length();
        if length < MIN_TRACE_LENGTH {
            return Hit::miss(end);
        }

        let dir = delta / length;
        let ray = Ray::new(to_point(origin), to_vector(dir));

        let mut closest: Option<(Real, &Brush)> = None;
        for brush in &self.brushes {
            if !filter.blocks(brush.contents, brush.owner) {
                continue;
            }

            if let Some(toi) = brush.shape.cast_ray(&brush.transform, &ray, length, true) {
                if closest.map_or(true, |(best, _)| toi < best) {
                    closest = Some((toi, brush));
                }
            }
        }

        match closest {
            Some((toi, brush)) => Hit {
                blocking: true,
                time: toi / length,
                location: origin + dir * toi,
                normal: self.ray_normal(&ray, toi, brush),
                contents: brush.contents,
                owner: brush.owner,
                started_in_solid: toi <= 0.0,
            },
            None => Hit::miss(end),
        }
    }

    /// Sweep `shape` from `start` to `end` and return the first blocking hit.
    ///
    /// The path is marched in sub-steps no longer than the shape radius, then
    /// the first penetrating sub-step is bisected. The reported location is
    /// the last clear position, so the body never ends up inside geometry.
    pub fn sweep(&self, shape: TraceShape, start: Vec3, end: Vec3, filter: &QueryFilter) -> Hit {
        let probe = probe_shape(shape);
        let delta = end - start;

        if let Some(brush) = self.first_penetrating(&probe, start, filter) {
            let normal = self
                .push_out_direction(&probe, start, filter)
                .unwrap_or_else(|| (-delta).try_normalize().unwrap_or(Vec3::Z));
            return Hit {
                blocking: true,
                time: 0.0,
                location: start,
                normal,
                contents: brush.contents,
                owner: brush.owner,
                started_in_solid: true,
            };
        }

        let distance = delta.length();
        if distance < MIN_TRACE_LENGTH {
            return Hit::miss(end);
        }

        let steps = march_steps(distance, shape);
        let mut lo = 0.0_f32;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            if self.first_penetrating(&probe, start + delta * t, filter).is_some() {
                return self.refine_contact(&probe, start, delta, lo, t, filter);
            }
            lo = t;
        }

        Hit::miss(end)
    }

    /// Sweep `shape` and report overlaps in path order, ending at the first
    /// blocking hit.
    pub fn sweep_contacts(&self, shape: TraceShape, start: Vec3, end: Vec3, filter: &QueryFilter) -> Vec<Hit> {
        let blocking = self.sweep(shape, start, end, filter);
        let reach = if blocking.blocking { blocking.time } else { 1.0 };

        let mut hits = Vec::new();
        if filter.overlap != ContentFlags::EMPTY {
            let probe = probe_shape(shape);
            let delta = end - start;
            let steps = march_steps(delta.length().max(MIN_TRACE_LENGTH), shape);

            for brush in &self.brushes {
                if !filter.overlaps(brush.contents, brush.owner) {
                    continue;
                }

                let first_touch = (0..=steps)
                    .map(|i| i as f32 / steps as f32 * reach)
                    .find(|t| touches(brush, &probe, start + delta * *t));

                if let Some(t) = first_touch {
                    let mut hit = Hit::overlap(t, start + delta * t, brush.contents);
                    hit.owner = brush.owner;
                    hits.push(hit);
                }
            }

            hits.sort_by(|a, b| a.time.total_cmp(&b.time));
        }

        if blocking.blocking {
            hits.push(blocking);
        }
        hits
    }

    /// Check if `shape` placed at `position` touches blocking geometry.
    pub fn point_in_solid(&self, position: Vec3, shape: TraceShape, filter: &QueryFilter) -> bool {
        self.first_penetrating(&probe_shape(shape), position, filter).is_some()
    }

    /// Push `shape` out of blocking geometry.
    ///
    /// Returns the corrected position.
    pub fn resolve_penetration(&self, position: Vec3, shape: TraceShape, filter: &QueryFilter) -> Vec3 {
        let probe = probe_shape(shape);
        position + self.penetration_correction(&probe, position, filter)
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn push_brush(&mut self, shape: SharedShape, transform: Isometry<Real>, contents: ContentFlags) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        self.brushes.push(Brush {
            id,
            shape,
            transform,
            contents,
            owner: None,
        });

        id
    }

    fn first_penetrating(&self, probe: &SharedShape, position: Vec3, filter: &QueryFilter) -> Option<&Brush> {
        self.brushes
            .iter()
            .filter(|b| filter.blocks(b.contents, b.owner))
            .find(|b| touches(b, probe, position))
    }

    fn penetration_correction(&self, probe: &SharedShape, position: Vec3, filter: &QueryFilter) -> Vec3 {
        let mut correction = Vec3::ZERO;

        for brush in &self.brushes {
            if !filter.blocks(brush.contents, brush.owner) {
                continue;
            }

            if let Some(c) = contact_with(brush, probe, position) {
                // normal2 points out of the brush, toward the probe
                let depth = -c.dist;
                if depth >= 0.0 {
                    correction += from_vector(c.normal2.into_inner()) * (depth + 0.001);
                }
            }
        }

        correction
    }

    fn push_out_direction(&self, probe: &SharedShape, position: Vec3, filter: &QueryFilter) -> Option<Vec3> {
        self.penetration_correction(probe, position, filter).try_normalize()
    }

    fn refine_contact(
        &self,
        probe: &SharedShape,
        start: Vec3,
        delta: Vec3,
        mut lo: f32,
        mut hi: f32,
        filter: &QueryFilter,
    ) -> Hit {
        for _ in 0..BISECTION_STEPS {
            let mid = (lo + hi) * 0.5;
            if self.first_penetrating(probe, start + delta * mid, filter).is_some() {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let penetrating = start + delta * hi;
        let normal = self
            .push_out_direction(probe, penetrating, filter)
            .unwrap_or_else(|| (-delta).try_normalize().unwrap_or(Vec3::Z));
        let (contents, owner) = self
            .first_penetrating(probe, penetrating, filter)
            .map_or((ContentFlags::SOLID, None), |b| (b.contents, b.owner));

        Hit {
            blocking: true,
            time: lo,
            location: start + delta * lo,
            normal,
            contents,
            owner,
            started_in_solid: false,
        }
    }

    fn ray_normal(&self, ray: &Ray, toi: Real, brush: &Brush) -> Vec3 {
        let fallback = -from_vector(ray.dir);
        brush
            .shape
            .cast_ray_and_get_normal(&brush.transform, ray, toi + 0.01, true)
            .map(|intersection| from_vector(intersection.normal))
            .and_then(|normal| normal.try_normalize())
            .unwrap_or(fallback)
    }
}

impl GroundQuery for CollisionWorld {
    fn ray(&self, origin: Vec3, end: Vec3, filter: &QueryFilter) -> Hit {
        self.raycast(origin, end, filter)
    }

    fn sweep_multi(&self, shape: TraceShape, start: Vec3, end: Vec3, filter: &QueryFilter) -> Vec<Hit> {
        self.sweep_contacts(shape, start, end, filter)
    }
}

fn probe_shape(shape: TraceShape) -> SharedShape {
    match shape {
        TraceShape::Sphere { radius } => SharedShape::ball(radius),
        TraceShape::Point => SharedShape::ball(POINT_RADIUS),
    }
}

fn march_steps(distance: f32, shape: TraceShape) -> usize {
    let step = shape.radius().max(MIN_MARCH_STEP);
    ((distance / step).ceil() as usize).clamp(1, MAX_MARCH_STEPS)
}

fn contact_with(brush: &Brush, probe: &SharedShape, position: Vec3) -> Option<Contact> {
    let probe_transform = isometry(position, Quat::IDENTITY);
    contact(
        &probe_transform,
        probe.as_ref(),
        &brush.transform,
        brush.shape.as_ref(),
        0.0,
    )
    .ok()
    .flatten()
}

fn touches(brush: &Brush, probe: &SharedShape, position: Vec3) -> bool {
    contact_with(brush, probe, position).is_some()
}

fn isometry(center: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z));
    Isometry::from_parts(Translation3::new(center.x, center.y, center.z), rotation)
}

#[inline]
fn to_point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

#[inline]
fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

#[inline]
fn from_vector(v: Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

// ============================================================================
// Tests
// ============================================================================
