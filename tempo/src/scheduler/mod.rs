//! Defines the frame scheduling capability used to pace animation runs.

use std::fmt::{Debug, Display};
use std::time::Duration;

use dyn_clone::DynClone;
use futures::future::BoxFuture;

pub use crate::scheduler::interval::IntervalScheduler;

mod interval;

/// Default frame interval: 60 frames per second.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

dyn_clone::clone_trait_object!(FrameScheduler);

/// Defines the capability to pace an animation run: a monotonic clock and a "next frame" signal.
///
/// A run reads the clock once per tick and then waits for the next frame before sampling again:
/// - [`IntervalScheduler`] is backed by tokio timers,
/// - `SteppedScheduler` (available with the `mocks` feature) is a deterministic fake clock.
///
/// Clones of a scheduler are expected to share the same clock.
pub trait FrameScheduler: Debug + Display + DynClone + Send + Sync {
    /// Returns the time elapsed since the scheduler origin.
    fn now(&self) -> Duration;

    /// Returns a future resolving when the next frame is due.
    fn next_frame(&self) -> BoxFuture<'static, ()>;
}
