//! Four-foot ground sampling.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::body::{rotation_from_forward_right, AgentBody};
use crate::collision::QueryFilter;
use crate::query::GroundQuery;

/// Sampling distances for the ground sensor, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// How far ahead of and behind the body the foot anchors sit.
    pub forward_distance: f32,

    /// How far to each side of the body the foot anchors sit.
    pub lateral_distance: f32,

    /// How far below the trace origin each foot ray ends.
    pub down_distance: f32,

    /// Height above the body center the rays start from, so they don't begin
    /// inside the ground right under the agent.
    pub trace_lift: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            forward_distance: 40.0,
            lateral_distance: 30.0,
            down_distance: 30.0,
            trace_lift: 10.0,
        }
    }
}

/// One of the four sampling feet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Foot {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl Foot {
    /// All feet in sampling order.
    pub const ALL: [Foot; 4] = [Foot::FrontLeft, Foot::FrontRight, Foot::BackLeft, Foot::BackRight];

    /// Signs of the (forward, right) offsets of this foot's anchor.
    pub fn anchor_signs(self) -> (f32, f32) {
        match self {
            Foot::FrontLeft => (1.0, -1.0),
            Foot::FrontRight => (1.0, 1.0),
            Foot::BackLeft => (-1.0, -1.0),
            Foot::BackRight => (-1.0, 1.0),
        }
    }
}

/// Which probe, if any, found ground under a foot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactSource {
    /// The diagonal ray from the trace origin hit.
    Primary,
    /// The diagonal missed; the ray from its end toward the deep center probe hit.
    Fallback,
    /// Neither ray hit; the ground is assumed to continue flat.
    Extrapolated,
}

/// Where one foot's ground point ended up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootContact {
    pub foot: Foot,
    pub point: Vec3,
    pub source: ContactSource,
}

impl FootContact {
    /// Whether a ray actually touched ground for this foot.
    #[inline]
    pub fn grounded(&self) -> bool {
        self.source != ContactSource::Extrapolated
    }
}

/// Result of one ground sampling pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSample {
    /// Orientation matching the sampled ground plane.
    pub orientation: Quat,

    /// Foot contacts, indexed in [`Foot::ALL`] order.
    pub feet: [FootContact; 4],

    /// Unit direction from the back midpoint to the front midpoint.
    pub forward: Vec3,

    /// Unit direction from the left midpoint to the right midpoint.
    pub right: Vec3,
}

impl GroundSample {
    /// Contact for a single foot.
    pub fn foot(&self, foot: Foot) -> &FootContact {
        &self.feet[foot as usize]
    }

    /// Number of feet whose probes touched ground.
    pub fn contact_count(&self) -> usize {
        self.feet.iter().filter(|f| f.grounded()).count()
    }
}

/// Derives a ground-following orientation from four foot probes.
#[derive(Debug, Clone, Default)]
pub struct GroundSensor {
    pub config: SensorConfig,
}

impl GroundSensor {
    /// Create a sensor with the given sampling distances.
    pub fn new(config: SensorConfig) -> Self {
        Self { config }
    }

    /// Sample the ground under `body` and build a target orientation.
    ///
    /// Each foot casts a diagonal ray from just above the body to a point
    /// ahead/behind and left/right of it, `down_distance` below the origin.
    /// If that misses, a second ray runs from the diagonal end to a center
    /// point twice as deep, catching steps the first ray skipped past. A foot
    /// whose rays both miss assumes the ground continues flat below its
    /// diagonal end.
    ///
    /// The midpoints of the front, back, left and right foot pairs give the
    /// forward and right axes of the target. If they degenerate, the body's
    /// current orientation is returned unchanged.
    pub fn sample<Q>(&self, body: &AgentBody, world: &Q, filter: &QueryFilter) -> GroundSample
    where
        Q: GroundQuery + ?Sized,
    {
        let SensorConfig {
            forward_distance,
            lateral_distance,
            down_distance,
            trace_lift,
        } = self.config;

        let (forward, right, up) = (body.forward(), body.right(), body.up());
        let origin = body.position + up * trace_lift;
        let center_end = origin - up * (down_distance * 2.0);

        let feet = Foot::ALL.map(|foot| {
            let (forward_sign, right_sign) = foot.anchor_signs();
            let diagonal_end = origin
                + forward * (forward_distance * forward_sign)
                + right * (lateral_distance * right_sign)
                - up * down_distance;

            let primary = world.ray(origin, diagonal_end, filter);
            if primary.blocking {
                return FootContact {
                    foot,
                    point: primary.location,
                    source: ContactSource::Primary,
                };
            }

            let fallback = world.ray(diagonal_end, center_end, filter);
            if fallback.blocking {
                return FootContact {
                    foot,
                    point: fallback.location,
                    source: ContactSource::Fallback,
                };
            }

            FootContact {
                foot,
                point: diagonal_end - up * down_distance,
                source: ContactSource::Extrapolated,
            }
        });

        let [front_left, front_right, back_left, back_right] = feet.map(|f| f.point);
        let front_mid = front_left.lerp(front_right, 0.5);
        let back_mid = back_left.lerp(back_right, 0.5);
        let left_mid = front_left.lerp(back_left, 0.5);
        let right_mid = front_right.lerp(back_right, 0.5);

        let ground_forward = (front_mid - back_mid).normalize_or_zero();
        let ground_right = (right_mid - left_mid).normalize_or_zero();

        let orientation = rotation_from_forward_right(ground_forward, ground_right).unwrap_or(body.rotation);

        let sample = GroundSample {
            orientation,
            feet,
            forward: ground_forward,
            right: ground_right,
        };

        log::trace!(
            "ground sample at {:?}: {}/4 feet in contact, forward={:?}",
            body.position,
            sample.contact_count(),
            ground_forward
        );

        sample
    }
}
