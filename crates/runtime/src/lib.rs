//! Frame loop driving the scene once per display refresh.
//!
//! # Invariants
//! - Per frame: clock, animation, decal sync, camera update, render, reschedule.
//!   No step is skipped or reordered.
//! - Data flows downstream only; the renderer gets a read-only view.
//! - A render failure stops the loop; a stopped loop never draws again.

mod frame_loop;

pub use frame_loop::{FrameError, FrameLoop, FrameReport, FrameScheduler, LoopState};
