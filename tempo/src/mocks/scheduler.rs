use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;

use crate::scheduler::FrameScheduler;

/// Mock [`FrameScheduler`] for testing purposes: a deterministic fake clock.
///
/// The clock only moves when a frame is requested: each call to `next_frame()` advances it by
/// `step` then yields once to the executor. Clones share the same clock.
#[derive(Clone, Debug)]
pub struct SteppedScheduler {
    step: Duration,
    clock: Arc<RwLock<Duration>>,
}

impl SteppedScheduler {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            clock: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward without waiting for a frame.
    pub fn advance(&self, delta: Duration) {
        *self.clock.write() += delta;
    }

    pub fn get_step(&self) -> Duration {
        self.step
    }
}

impl FrameScheduler for SteppedScheduler {
    fn now(&self) -> Duration {
        *self.clock.read()
    }

    fn next_frame(&self) -> BoxFuture<'static, ()> {
        let clock = self.clock.clone();
        let step = self.step;
        async move {
            *clock.write() += step;
            tokio::task::yield_now().await;
        }
        .boxed()
    }
}

impl Display for SteppedScheduler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SteppedScheduler [step={:?}, now={:?}]",
            self.step,
            self.now()
        )
    }
}
