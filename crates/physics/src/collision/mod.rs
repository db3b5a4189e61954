//! Reference collision backend.
//!
//! The motion core only sees the [`GroundQuery`](crate::query::GroundQuery)
//! trait. This module provides a parry3d implementation of it so hosts and
//! tests have a concrete world to walk on.
//!
//! # Key Types
//!
//! - [`CollisionWorld`]: static brushes plus ray and sweep queries
//! - [`Hit`]: output of any query or move
//! - [`TraceShape`]: shape swept through the world (sphere or point)
//! - [`QueryFilter`]: which contents block, which overlap, whose geometry to skip

mod flags;
mod trace;
mod world;

pub use flags::{ContentFlags, QueryFilter};
pub use trace::{Hit, TraceShape};
pub use world::{Brush, CollisionWorld};
