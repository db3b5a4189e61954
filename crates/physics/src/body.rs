//! Agent body transform.

use glam::{EulerRot, Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of an agent's body.
///
/// The host owns this; the motion core only reads it and asks a
/// [`BodyMover`](crate::query::BodyMover) to change it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentBody {
    /// Body center in world space.
    pub position: Vec3,

    /// Body orientation. Local +X is forward, +Y right, +Z up.
    pub rotation: Quat,
}

impl Default for AgentBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl AgentBody {
    /// Create a body at the given position with identity orientation.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a body at the given position facing `yaw` radians about +Z.
    pub fn with_yaw(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_z(yaw),
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

/// Build a rotation whose forward axis is `forward` and whose right axis is
/// as close to `right` as orthogonality allows.
///
/// Forward is kept exact; up is `forward × right` and right is rebuilt from
/// the other two. Returns `None` when either input is degenerate or the two
/// are parallel.
pub fn rotation_from_forward_right(forward: Vec3, right: Vec3) -> Option<Quat> {
    let x = forward.try_normalize()?;
    let z = x.cross(right).try_normalize()?;
    let y = z.cross(x);
    Some(Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize())
}

/// Keep only the heading (rotation about world +Z) of `rotation`.
pub fn yaw_only(rotation: Quat) -> Quat {
    let (yaw, _pitch, _roll) = rotation.to_euler(EulerRot::ZYX);
    Quat::from_rotation_z(yaw)
}
