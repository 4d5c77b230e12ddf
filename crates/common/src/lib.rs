//! Shared value types used by every umbra crate.

mod types;
mod viewport;

pub use types::{Color, Transform, clamp01};
pub use viewport::{MAX_PIXEL_RATIO, Viewport};
