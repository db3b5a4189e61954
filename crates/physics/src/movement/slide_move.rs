//! Slide vectors for collision response.
//!
//! When a move is blocked, the remainder is redirected along the surface. If
//! that slide hits a second surface, it is redirected again: along the crease
//! between the two planes when they form a corner, or along the new plane
//! otherwise.

use glam::Vec3;

/// Slides shorter than this are dropped.
const MIN_SLIDE_LENGTH: f32 = 1e-3;

/// Push applied off a wall hit twice with the same normal, so the next
/// sweep doesn't start touching it.
const PARALLEL_NUDGE: f32 = 0.01;

/// Remove the component of `vector` along `normal`.
#[inline]
pub fn project_onto_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    vector - normal * vector.dot(normal)
}

/// Remaining `delta` redirected along the surface with `normal`.
///
/// `time` is the unconsumed fraction of `delta`.
pub fn compute_slide_vector(delta: Vec3, time: f32, normal: Vec3) -> Vec3 {
    project_onto_plane(delta, normal) * time
}

/// Adjust a slide that was blocked by a second surface.
///
/// `delta` is the blocked slide, `time` the fraction of it that was applied
/// before hitting `normal`, and `previous_normal` the surface the slide
/// started along. Returns the next delta, which is zero when no direction
/// makes progress.
pub fn two_wall_adjust(delta: Vec3, time: f32, normal: Vec3, previous_normal: Vec3) -> Vec3 {
    let remaining = 1.0 - time;

    if previous_normal.dot(normal) <= 0.0 {
        // Corner of 90 degrees or less: follow the crease
        let crease = normal.cross(previous_normal).normalize_or_zero();
        let adjusted = crease * delta.dot(crease) * remaining;
        return if adjusted.dot(delta) < 0.0 { -adjusted } else { adjusted };
    }

    let adjusted = compute_slide_vector(delta, remaining, normal);
    if adjusted.dot(delta) <= 0.0 {
        return Vec3::ZERO;
    }

    if (normal.dot(previous_normal) - 1.0).abs() < 1e-4 {
        adjusted + normal * PARALLEL_NUDGE
    } else {
        adjusted
    }
}

/// Whether a slide is worth attempting.
#[inline]
pub(crate) fn is_meaningful_slide(slide: Vec3, delta: Vec3) -> bool {
    slide.length() > MIN_SLIDE_LENGTH && slide.dot(delta) > 0.0
}
