//! Antgrip Simulation
//!
//! A small fixed-tick host for the motion core in `antgrip-physics`:
//!
//! - Agents with a collision body, motion state and input buffer
//! - Terrain with collision geometry and spawn points
//! - A deterministic tick loop driving every agent with one integrator
//! - JSON configuration
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        Simulation                          │
//! │  ┌──────────┐    ┌─────────────────┐    ┌───────────────┐  │
//! │  │ MoveKeys │───►│ MotionIntegrator│───►│ Agents        │  │
//! │  │ forces   │    │ (sense, grip,   │    │ (body, motion │  │
//! │  └──────────┘    │  move, support) │    │  state)       │  │
//! │                  └───────┬─────────┘    └───────────────┘  │
//! │                          ▼                                 │
//! │                  Terrain collision                         │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod error;
pub mod input;
pub mod simulation;
pub mod terrain;

pub use agent::{Agent, EntityId};
pub use error::SimError;
pub use input::{InputAccumulator, MoveKeys};
pub use simulation::{AgentTransition, Simulation, SimulationConfig};
pub use terrain::{SpawnPoint, Terrain};

// Re-export physics types for convenience
pub use antgrip_physics::{
    CollisionWorld, ContentFlags, MotionConfig, MotionIntegrator, MotionState, Support, SupportEvent,
    SupportTransition,
};
