//! Basic shared types: errors, math, time.

pub mod error;
pub mod math;

pub use error::{Error, Result};
pub use math::{BBox3f, Chrono, TimeRange};
