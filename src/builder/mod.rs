//! Aufbau von Lanelet-Netzen aus parallelen Randkurven-Samples.

pub mod strip;

pub use strip::{build_strip, validate_strip, StripOptions, StripReport};
