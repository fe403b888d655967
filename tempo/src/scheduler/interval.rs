use std::fmt::{Display, Formatter};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::time::Instant;

use crate::scheduler::{FrameScheduler, DEFAULT_FRAME_INTERVAL};

/// A [`FrameScheduler`] backed by tokio timers.
///
/// Frames are due every `interval` (1000/60 ms by default). Since it relies on `tokio::time`, it
/// follows the runtime clock (including a paused test clock).
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tempo::scheduler::IntervalScheduler;
///
/// let scheduler = IntervalScheduler::from_fps(30.0);
/// assert_eq!(scheduler.get_interval(), Duration::from_secs_f64(1.0 / 30.0));
/// ```
#[derive(Clone, Debug)]
pub struct IntervalScheduler {
    origin: Instant,
    interval: Duration,
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl IntervalScheduler {
    /// Creates a scheduler whose frames are due every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            interval,
        }
    }

    /// Creates a scheduler ticking `fps` times per second.
    ///
    /// A non-positive (or non-finite) `fps` falls back to the default interval.
    pub fn from_fps(fps: f64) -> Self {
        match fps.is_finite() && fps > 0.0 {
            true => Self::new(Duration::from_secs_f64(1.0 / fps)),
            false => Self::default(),
        }
    }

    /// Returns the delay between two frames.
    pub fn get_interval(&self) -> Duration {
        self.interval
    }
}

impl FrameScheduler for IntervalScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn next_frame(&self) -> BoxFuture<'static, ()> {
        tokio::time::sleep(self.interval).boxed()
    }
}

impl Display for IntervalScheduler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "IntervalScheduler [interval={:?}]", self.interval)
    }
}
