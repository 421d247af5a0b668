//! Time subsystem.
//!
//! - one `FrameClock` per window, ticked once per presented frame
//! - `IntervalTimer` for work on a fixed wall-clock cadence, independent of
//!   frame rate

mod frame_clock;
mod interval;

pub use frame_clock::{FrameClock, FrameTime};
pub use interval::IntervalTimer;
