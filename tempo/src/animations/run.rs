use std::time::Duration;

use log::{debug, trace};

use crate::animations::AnimationConfig;
use crate::scheduler::FrameScheduler;

/// One observation of a running animation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sample {
    /// Time elapsed since the run started.
    pub elapsed: Duration,
    /// Raw progress: `elapsed / duration`, not bounded.
    pub progress: f64,
    /// Eased value of the progress (bounded to 0.0 - 1.0 before easing).
    pub value: f64,
}

/// What a tick of the run loop does with its sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// The frame is due: the step callback is called with the eased value.
    Frame,
    /// Too early since the last frame: nothing is emitted, the loop waits for the next frame.
    Skip,
    /// The animation is over: the completion callback is called and the loop ends.
    Complete,
}

/// Runs an animation to completion.
///
/// The loop samples the animation once per frame of the `scheduler` and calls `step` with the
/// eased value each time a frame is due (roughly once per frame budget at most). Once the progress
/// reaches 1.0, `done` is called (if any) and the final [`Sample`] is returned. `step` is never
/// called after `done`.
///
/// This is the stateless counterpart of [`Driver::request()`](crate::animations::Driver::request()):
/// it runs in place and cannot be overlapped by another run.
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use tempo::animations::{run, Animation};
/// use tempo::scheduler::IntervalScheduler;
///
/// #[tempo::runtime]
/// async fn main() {
///     let config = Animation::default().set_duration(0.1).build().unwrap();
///     let values = Arc::new(Mutex::new(vec![]));
///
///     let captured = values.clone();
///     let last = run(&config, &IntervalScheduler::default(), move |value| {
///         captured.lock().unwrap().push(value);
///     }, Some(|| println!("done"))).await;
///
///     assert_eq!(last.value, 1.0);
/// }
/// ```
pub async fn run<S, D>(
    config: &AnimationConfig,
    scheduler: &dyn FrameScheduler,
    step: S,
    done: Option<D>,
) -> Sample
where
    S: FnMut(f64),
    D: FnOnce(),
{
    drive(config, scheduler, scheduler.now(), step, done, |_| ()).await
}

/// Inner run loop: same as [`run()`] from a given `start` time, with an `observe` hook called on
/// every sample (including the skipped and the final ones), before any callback.
pub(crate) async fn drive<S, D, O>(
    config: &AnimationConfig,
    scheduler: &dyn FrameScheduler,
    start: Duration,
    mut step: S,
    done: Option<D>,
    mut observe: O,
) -> Sample
where
    S: FnMut(f64),
    D: FnOnce(),
    O: FnMut(&Sample),
{
    let mut last_frame = Duration::ZERO;
    debug!("Run started: {}", config);

    loop {
        let elapsed = scheduler.now().saturating_sub(start);
        let sample = config.sample(elapsed);
        observe(&sample);

        match config.decide(elapsed, elapsed.saturating_sub(last_frame)) {
            Tick::Frame => {
                trace!("Frame at {:?}: {}", elapsed, sample.value);
                last_frame = elapsed;
                step(sample.value);
            }
            Tick::Skip => {}
            Tick::Complete => {
                debug!("Run completed after {:?}", elapsed);
                if let Some(done) = done {
                    done();
                }
                return sample;
            }
        }

        scheduler.next_frame().await;
    }
}
