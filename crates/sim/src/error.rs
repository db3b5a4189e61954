//! Host-side errors.

use antgrip_physics::ConfigError;
use thiserror::Error;

use crate::agent::EntityId;

/// Errors raised while configuring or driving a [`Simulation`](crate::Simulation).
#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to parse simulation config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid motion config: {0}")]
    InvalidMotion(#[from] ConfigError),

    #[error("tick rate must be greater than zero")]
    ZeroTickRate,

    #[error("no agent with id {0}")]
    UnknownAgent(EntityId),
}
