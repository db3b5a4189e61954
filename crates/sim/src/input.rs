//! Agent input handling.
//!
//! Hosts feed movement intent in two ways: as raw world-space vectors
//! through [`InputAccumulator::add_input`], or as key states through
//! [`MoveKeys`], which are turned into a direction relative to the body.

use antgrip_physics::{AgentBody, InputSource};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Movement key states for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveKeys {
    /// Keys with only forward held.
    pub const FORWARD: Self = Self {
        forward: true,
        backward: false,
        left: false,
        right: false,
    };

    /// Forward and right axes in `[-1, 1]`, normalized on diagonals.
    pub fn axes(&self) -> (f32, f32) {
        let mut forward_move: f32 = 0.0;
        let mut right_move: f32 = 0.0;

        if self.forward {
            forward_move += 1.0;
        }
        if self.backward {
            forward_move -= 1.0;
        }
        if self.right {
            right_move += 1.0;
        }
        if self.left {
            right_move -= 1.0;
        }

        let magnitude = (forward_move * forward_move + right_move * right_move).sqrt();
        if magnitude > 1.0 {
            (forward_move / magnitude, right_move / magnitude)
        } else {
            (forward_move, right_move)
        }
    }

    /// World-space direction along the body's forward and right axes.
    ///
    /// On a slope this points along the ground, since the body is tilted to
    /// match it.
    pub fn world_direction(&self, body: &AgentBody) -> Vec3 {
        let (forward_move, right_move) = self.axes();
        body.forward() * forward_move + body.right() * right_move
    }

    /// Check if any movement key is held.
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Sums movement intent between steps.
///
/// The integrator consumes the total once per step and clamps it to unit
/// length, so adding input several times within a tick does not make the
/// agent faster than one full-length input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputAccumulator {
    pending: Vec3,
}

impl InputAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add world-space movement intent.
    pub fn add_input(&mut self, direction: Vec3) {
        self.pending += direction;
    }

    /// Input gathered so far, without consuming it.
    #[inline]
    pub fn pending(&self) -> Vec3 {
        self.pending
    }
}

impl InputSource for InputAccumulator {
    fn consume_input_vector(&mut self) -> Vec3 {
        std::mem::take(&mut self.pending)
    }
}
