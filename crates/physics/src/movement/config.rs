//! Motion configuration.
//!
//! All tunables for the integrator are grouped here for easy tuning. Units
//! are world units and seconds; the defaults assume a centimetre-scale world
//! (gravity -980).

use glam::Quat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collision::QueryFilter;
use crate::sensing::SensorConfig;

/// Errors produced when validating a [`MotionConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("orientation blend factor must lie in [0, 1], got {0}")]
    BlendFactor(f32),

    #[error("friction {coefficient} overshoots at a step of {delta_time}s: coefficient * dt^2 must stay below 2")]
    UnstableFriction { coefficient: f32, delta_time: f32 },

    #[error("step of {delta_time}s exceeds max_delta_time {max_delta_time}")]
    StepTooLong { delta_time: f32, max_delta_time: f32 },
}

/// How the body orientation chases the ground target each step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OrientationBlend {
    /// Move a fixed fraction of the way every step, regardless of `dt`.
    PerStep { factor: f32 },

    /// Frame-rate independent: alpha = 1 - exp(-rate * dt).
    TimeScaled { rate: f32 },
}

impl Default for OrientationBlend {
    fn default() -> Self {
        Self::PerStep { factor: 0.15 }
    }
}

impl OrientationBlend {
    /// Interpolation weight toward the target for a step of `delta_time`.
    pub fn alpha(&self, delta_time: f32) -> f32 {
        match *self {
            Self::PerStep { factor } => factor,
            Self::TimeScaled { rate } => 1.0 - (-rate * delta_time).exp(),
        }
    }

    /// Shortest-path blend from `current` toward `target`.
    pub fn blend(&self, current: Quat, target: Quat, delta_time: f32) -> Quat {
        current.slerp(target, self.alpha(delta_time)).normalize()
    }
}

/// Configuration for the motion integrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    // ========================================================================
    // Speeds
    // ========================================================================
    /// Nominal top walking speed (units/second).
    ///
    /// Hosts may read this for AI and animation. The integrator does not clamp
    /// to it; see `velocity_clamp`.
    pub max_speed: f32,

    /// Hard limit on velocity magnitude, applied after integration.
    pub velocity_clamp: f32,

    /// Acceleration produced by a full-length input vector (units/second²).
    pub input_acceleration: f32,

    // ========================================================================
    // Surface interaction
    // ========================================================================
    /// Scale of the in-plane friction opposing velocity.
    pub friction_coefficient: f32,

    /// Combined pending force/impulse magnitude the feet can hold against.
    pub grip_strength: f32,

    /// Speed below which a blocking hit counts as landing.
    pub regrounding_speed: f32,

    // ========================================================================
    // Gravity
    // ========================================================================
    /// Whether gravity pulls the agent while it is falling.
    pub enable_gravity: bool,

    /// Gravity acceleration along world Z (negative is down).
    pub gravity_z: f32,

    // ========================================================================
    // Orientation and sensing
    // ========================================================================
    /// How quickly the body turns toward the sampled ground orientation.
    pub orientation_blend: OrientationBlend,

    /// Foot probe distances.
    pub sensor: SensorConfig,

    /// What ground probes and snap sweeps stand on.
    pub filter: QueryFilter,

    // ========================================================================
    // Ground snap
    // ========================================================================
    /// Radius of the sphere swept down to re-attach to the ground.
    pub snap_probe_radius: f32,

    /// How far below the body the snap sweep reaches.
    pub snap_probe_depth: f32,

    // ========================================================================
    // Stepping
    // ========================================================================
    /// Optional upper bound on the step length. When set, longer steps are
    /// clamped to it; when `None` the caller's `dt` is used as given.
    ///
    /// Friction is integrated explicitly, so `friction_coefficient * dt²`
    /// must stay below 2 or velocity oscillates and grows.
    pub max_delta_time: Option<f32>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 1000.0,
            velocity_clamp: 3000.0,
            input_acceleration: 10_000.0,

            friction_coefficient: 1000.0,
            grip_strength: 100.0,
            regrounding_speed: 1000.0,

            enable_gravity: true,
            gravity_z: -980.0,

            orientation_blend: OrientationBlend::default(),
            sensor: SensorConfig::default(),
            filter: QueryFilter::ground(),

            snap_probe_radius: 10.0,
            snap_probe_depth: 30.0,

            max_delta_time: None,
        }
    }
}

impl MotionConfig {
    /// Feet that hold on through heavy knockback (wall and ceiling crawlers).
    pub fn sticky() -> Self {
        Self {
            grip_strength: 5000.0,
            regrounding_speed: 1500.0,
            snap_probe_depth: 45.0,
            ..Default::default()
        }
    }

    /// Barely any grip: the lightest shove sends the agent tumbling.
    pub fn slippery() -> Self {
        Self {
            grip_strength: 10.0,
            friction_coefficient: 250.0,
            regrounding_speed: 600.0,
            ..Default::default()
        }
    }

    /// Check every tunable is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("gravity_z", self.gravity_z)?;

        for (field, value) in [
            ("max_speed", self.max_speed),
            ("input_acceleration", self.input_acceleration),
            ("friction_coefficient", self.friction_coefficient),
            ("grip_strength", self.grip_strength),
            ("regrounding_speed", self.regrounding_speed),
            ("sensor.trace_lift", self.sensor.trace_lift),
        ] {
            non_negative(field, value)?;
        }

        for (field, value) in [
            ("velocity_clamp", self.velocity_clamp),
            ("snap_probe_radius", self.snap_probe_radius),
            ("snap_probe_depth", self.snap_probe_depth),
            ("sensor.forward_distance", self.sensor.forward_distance),
            ("sensor.lateral_distance", self.sensor.lateral_distance),
            ("sensor.down_distance", self.sensor.down_distance),
        ] {
            positive(field, value)?;
        }

        match self.orientation_blend {
            OrientationBlend::PerStep { factor } => {
                if !(0.0..=1.0).contains(&factor) {
                    return Err(ConfigError::BlendFactor(factor));
                }
            }
            OrientationBlend::TimeScaled { rate } => non_negative("orientation_blend.rate", rate)?,
        }

        if let Some(max_delta_time) = self.max_delta_time {
            positive("max_delta_time", max_delta_time)?;
            if !self.friction_stable(max_delta_time) {
                return Err(ConfigError::UnstableFriction {
                    coefficient: self.friction_coefficient,
                    delta_time: max_delta_time,
                });
            }
        }

        Ok(())
    }

    /// Check a fixed step length against `max_delta_time`.
    pub fn validate_step(&self, delta_time: f32) -> Result<(), ConfigError> {
        positive("delta_time", delta_time)?;
        match self.max_delta_time {
            Some(max_delta_time) if delta_time > max_delta_time => Err(ConfigError::StepTooLong {
                delta_time,
                max_delta_time,
            }),
            _ => Ok(()),
        }
    }

    /// Whether explicit friction settles at a step of `delta_time`.
    pub fn friction_stable(&self, delta_time: f32) -> bool {
        self.friction_coefficient * delta_time * delta_time < 2.0
    }

    /// Step length the integrator actually uses for a requested `dt`.
    ///
    /// Negative and non-finite steps become zero; positive steps pass through
    /// unless `max_delta_time` is set.
    pub fn effective_delta_time(&self, delta_time: f32) -> f32 {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return 0.0;
        }
        match self.max_delta_time {
            Some(max_delta_time) => delta_time.min(max_delta_time),
            None => delta_time,
        }
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}
