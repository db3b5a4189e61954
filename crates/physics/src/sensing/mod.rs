//! Ground sensing.
//!
//! The agent's legs are modelled as four probe rays from just above the body
//! toward diagonal foot anchors. Where they land defines a ground plane, and
//! [`GroundSensor`] turns that plane into a target body orientation.

mod ground;

pub use ground::{ContactSource, Foot, FootContact, GroundSample, GroundSensor, SensorConfig};
