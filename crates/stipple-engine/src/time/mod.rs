//! Time subsystem.
//!
//! Frame timing utilities that stay testable without a runtime:
//! - one `FrameClock` per window (or per render loop)
//! - a `FrameDriver` that keeps requesting frames until stopped or dropped

mod driver;
mod frame_clock;

pub use driver::{FrameDriver, FrameRequest, FrameScheduler, RedrawScheduler};
pub use frame_clock::{ELAPSED_PERIOD, FrameClock, FrameTime};
