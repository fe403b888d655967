use std::cell::Cell;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use parking_lot::{ReentrantMutex, RwLock};
use tokio::task::AbortHandle;

use crate::animations::run::drive;
use crate::animations::{Animation, AnimationConfig, Sample};
use crate::errors::{AlreadyRunningSnafu, CancelledSnafu, Error};
use crate::scheduler::{FrameScheduler, IntervalScheduler};
use crate::utils::task::TaskHandler;
use crate::utils::{task, Interpolate};

/// Defines what happens when a run is requested on a [`Driver`] while another one is in progress.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestMode {
    /// The request fails with an `AlreadyRunning` error (default).
    #[default]
    Reject,
    /// The run in progress is cancelled: its callbacks will never be called again.
    Replace,
}

/// Liveness of one run: its callbacks execute under this lock, so once retired a run never calls
/// back again, whatever thread it runs on.
///
/// The lock is reentrant: a callback may retire its own run (ie: cancel it, or replace it).
#[derive(Clone, Debug)]
struct RunGuard(Arc<ReentrantMutex<Cell<bool>>>);

impl RunGuard {
    fn new() -> Self {
        Self(Arc::new(ReentrantMutex::new(Cell::new(true))))
    }

    /// Calls `callback` if the run is still live.
    fn call<F: FnOnce()>(&self, callback: F) {
        let live = self.0.lock();
        if live.get() {
            callback();
        }
    }

    /// Retires the run: blocks until a callback in progress on another thread returns.
    ///
    /// Must never be called while holding the driver state lock.
    fn retire(&self) {
        self.0.lock().set(false);
    }

    #[cfg(test)]
    fn is_live(&self) -> bool {
        self.0.lock().get()
    }
}

/// Shared state of the run currently owning a [`Driver`].
#[derive(Debug, Default)]
struct RunState {
    /// Identifier of the active run, if any.
    active: Option<usize>,
    /// Liveness of the active run.
    guard: Option<RunGuard>,
    /// Abort handle of the active run task (once spawned).
    abort: Option<AbortHandle>,
    /// Scheduler time at which the active run started.
    start: Option<Duration>,
    /// Most recent sample of the latest run.
    last: Sample,
}

impl RunState {
    fn is_running(&self) -> bool {
        self.active.is_some()
            && !self
                .abort
                .as_ref()
                .is_some_and(|abort| abort.is_finished())
    }

    /// Releases the driver if still owned by run `id`: returns the guard of the released run.
    fn release(&mut self, id: usize) -> Option<RunGuard> {
        match self.active == Some(id) {
            true => {
                self.active = None;
                self.abort = None;
                self.start = None;
                self.guard.take()
            }
            false => None,
        }
    }
}

/// Drives animation runs: samples an [`AnimationConfig`] at the pace of a [`FrameScheduler`].
///
/// - A driver is reusable: each [`Driver::request()`] starts a new run from the beginning.
/// - A single run is active at a time: overlapping requests are rejected or replace the active
///   run according to the [`RequestMode`].
/// - Each run is spawned as a task (see [`task::run()`]) and is controlled by its [`RunHandle`].
///
/// # Example
///
/// Here is an animation of a value from 0 to 400 lasting 500ms:
/// ```
/// use tempo::animations::{Animation, Driver};
/// use tempo::utils::Interpolate;
///
/// #[tempo::runtime]
/// async fn main() {
///     let animation = Animation::default()
///         .set_speed(0.0, 400.0, 800.0)
///         .set_ease("easeOutQuad");
///     let driver = Driver::try_from(animation).unwrap();
///
///     let handle = driver
///         .request(
///             |value| println!("Current value: {}", 0.0f64.interpolate(400.0, value)),
///             || println!("Animation done"),
///         )
///         .unwrap();
///
///     handle.wait().await.unwrap();
///     assert_eq!(driver.interpolate(0.0, 400.0, None), 400.0);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Driver {
    /// The animation configuration.
    config: AnimationConfig,
    /// Paces the runs.
    scheduler: Box<dyn FrameScheduler>,
    /// What happens on overlapping requests.
    mode: RequestMode,

    // ########################################
    // # Volatile utility data.
    /// State of the run in progress.
    state: Arc<RwLock<RunState>>,
    /// Identifier of the next run.
    next_id: Arc<AtomicUsize>,
}

impl Driver {
    /// Creates a driver paced by the default [`IntervalScheduler`] (60 frames per second).
    pub fn new(config: AnimationConfig) -> Self {
        Self::with_scheduler(config, IntervalScheduler::default())
    }

    /// Creates a driver paced by the given scheduler.
    pub fn with_scheduler<T: FrameScheduler + 'static>(config: AnimationConfig, scheduler: T) -> Self {
        Self {
            config,
            scheduler: Box::new(scheduler),
            mode: RequestMode::default(),
            state: Arc::new(RwLock::new(RunState::default())),
            next_id: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sets what happens when a run is requested while another one is in progress.
    pub fn set_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn get_mode(&self) -> RequestMode {
        self.mode
    }
    pub fn get_config(&self) -> &AnimationConfig {
        &self.config
    }
    pub fn get_scheduler(&self) -> &dyn FrameScheduler {
        &*self.scheduler
    }

    /// Indicates if a run is in progress.
    pub fn is_running(&self) -> bool {
        self.state.read().is_running()
    }

    /// Returns the scheduler time at which the run in progress started, if any.
    pub fn get_start(&self) -> Option<Duration> {
        let state = self.state.read();
        state.start.filter(|_| state.is_running())
    }

    /// Returns the most recent sample of the latest run.
    pub fn get_last_sample(&self) -> Sample {
        self.state.read().last
    }

    /// Maps a progress onto the `initial` - `target` range.
    ///
    /// When no `progress` is given, the most recent eased value is used: this gives the "current"
    /// value of the animation outside the step callback.
    pub fn interpolate<T: Interpolate>(&self, initial: T, target: T, progress: Option<f64>) -> T {
        let progress = progress.unwrap_or_else(|| self.get_last_sample().value);
        initial.interpolate(target, progress)
    }

    /// Starts a new run.
    ///
    /// - `step` is called with the eased value (0 - 1) each time a frame is due, at most once per
    ///   frame budget.
    /// - `done` is called once the animation is over: no `step` will follow.
    ///
    /// # Errors
    /// * `AlreadyRunning`: a run is in progress and the mode is [`RequestMode::Reject`].
    /// * `RuntimeError`: not called within `#[tempo::runtime]`.
    pub fn request<S, D>(&self, step: S, done: D) -> Result<RunHandle, Error>
    where
        S: FnMut(f64) + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        self.spawn(step, Some(done))
    }

    /// Starts a new run without completion callback.
    ///
    /// See [`Driver::request()`].
    pub fn request_step<S>(&self, step: S) -> Result<RunHandle, Error>
    where
        S: FnMut(f64) + Send + 'static,
    {
        self.spawn(step, None::<fn()>)
    }

    /// Stops the run in progress (if any). Its completion callback will not be called.
    pub fn stop(&self) {
        let released = {
            let mut state = self.state.write();
            if let Some(abort) = state.abort.as_ref() {
                abort.abort();
            }
            let active = state.active;
            active.and_then(|id| state.release(id).map(|guard| (id, guard)))
        };
        if let Some((id, guard)) = released {
            guard.retire();
            debug!("Run {} stopped", id);
        }
    }

    /// Inner helper: claims the driver for a new run and spawns the run loop.
    fn spawn<S, D>(&self, mut step: S, done: Option<D>) -> Result<RunHandle, Error>
    where
        S: FnMut(f64) + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let start = self.scheduler.now();
        let guard = RunGuard::new();

        let replaced = {
            let mut state = self.state.write();
            let mut replaced = None;
            if let (true, Some(active)) = (state.is_running(), state.active) {
                match self.mode {
                    RequestMode::Reject => {
                        warn!("Run {} rejected: run {} is in progress", id, active);
                        return Err(AlreadyRunningSnafu { id: active }.build().into());
                    }
                    RequestMode::Replace => {
                        warn!("Run {} replaces run {}", id, active);
                        if let Some(abort) = state.abort.as_ref() {
                            abort.abort();
                        }
                        replaced = state.guard.take();
                    }
                }
            }
            state.active = Some(id);
            state.guard = Some(guard.clone());
            state.abort = None;
            state.start = Some(start);
            // First sample of the run, as of the request.
            state.last = self.config.sample(Duration::ZERO);
            replaced
        };
        if let Some(replaced) = replaced {
            replaced.retire();
        }

        let config = self.config.clone();
        let scheduler = self.scheduler.clone();
        let step_guard = guard.clone();
        let done_guard = guard.clone();
        let done_state = self.state.clone();
        let observe_state = self.state.clone();

        let handler = task::run(async move {
            drive(
                &config,
                &*scheduler,
                start,
                move |value| step_guard.call(|| step(value)),
                // The run is still in progress while `done` executes: it is released afterward.
                Some(move || {
                    done_guard.call(|| {
                        if let Some(done) = done {
                            done();
                        }
                    });
                    let released = done_state.write().release(id);
                    if let Some(released) = released {
                        released.retire();
                    }
                }),
                move |sample: &Sample| {
                    let mut state = observe_state.write();
                    if state.active == Some(id) {
                        state.last = *sample;
                    }
                },
            )
            .await;
            Ok::<(), Error>(())
        });

        let handler = match handler {
            Ok(handler) => handler,
            Err(error) => {
                self.state.write().release(id);
                guard.retire();
                return Err(error);
            }
        };

        {
            let mut state = self.state.write();
            if state.active == Some(id) {
                state.abort = Some(handler.abort_handle());
            }
        }

        Ok(RunHandle {
            id,
            start,
            handler,
            guard,
            state: self.state.clone(),
        })
    }
}

impl TryFrom<Animation> for Driver {
    type Error = Error;

    fn try_from(animation: Animation) -> Result<Self, Self::Error> {
        Ok(Driver::new(animation.build()?).set_mode(animation.get_mode()))
    }
}

impl Display for Driver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Driver [duration={}s, fps={}, ease={}, mode={:?}, running={}]",
            self.config.get_duration(),
            self.config.get_fps(),
            self.config.get_ease(),
            self.mode,
            self.is_running()
        )
    }
}

/// Handle to a run started by [`Driver::request()`].
#[derive(Debug)]
pub struct RunHandle {
    /// Identifier of the run (unique per driver).
    id: usize,
    /// Scheduler time at which the run started.
    start: Duration,
    /// Inner handler to the task running the loop.
    handler: TaskHandler,
    /// Liveness of the run.
    guard: RunGuard,
    /// State of the driver which started the run.
    state: Arc<RwLock<RunState>>,
}

impl RunHandle {
    pub fn get_id(&self) -> usize {
        self.id
    }

    /// Returns the scheduler time at which the run started.
    pub fn get_start(&self) -> Duration {
        self.start
    }

    /// Indicates if the run is over (completed or cancelled).
    pub fn is_finished(&self) -> bool {
        self.handler.is_finished()
    }

    /// Cancels the run: neither its step nor its completion callback will be called anymore.
    pub fn cancel(&self) {
        self.handler.abort();
        let released = self.state.write().release(self.id);
        self.guard.retire();
        if released.is_some() {
            debug!("Run {} cancelled", self.id);
        }
    }

    /// Waits for the run to be over.
    ///
    /// # Errors
    /// * `Cancelled`: the run was cancelled, replaced, or its driver stopped.
    pub async fn wait(self) -> Result<(), Error> {
        match self.handler.await {
            Ok(result) => result,
            Err(error) if error.is_cancelled() => Err(CancelledSnafu { id: self.id }.build().into()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use parking_lot::Mutex;
    use serial_test::serial;

    use crate::errors::ConfigurationError::UnknownEasing;
    use crate::errors::RunError::{AlreadyRunning, Cancelled};
    use crate::mocks::scheduler::SteppedScheduler;
    use crate::pause;

    use super::*;

    fn create_driver(seconds: f64) -> (Driver, SteppedScheduler) {
        let config = Animation::default()
            .set_duration(seconds)
            .set_fps(60.0)
            .set_ease("linear")
            .build()
            .unwrap();
        let scheduler = SteppedScheduler::new(Duration::from_millis(10));
        (Driver::with_scheduler(config, scheduler.clone()), scheduler)
    }

    #[test]
    fn test_driver() {
        let (driver, _) = create_driver(0.2);
        assert_eq!(driver.get_mode(), RequestMode::Reject);
        assert_eq!(driver.get_config().get_duration(), 0.2);
        assert_eq!(driver.get_scheduler().now(), Duration::ZERO);
        assert!(!driver.is_running());
        assert_eq!(driver.get_start(), None);
        assert_eq!(driver.get_last_sample(), Sample::default());
        assert_eq!(
            driver.to_string(),
            "Driver [duration=0.2s, fps=60, ease=linear, mode=Reject, running=false]"
        );

        let driver = driver.set_mode(RequestMode::Replace);
        assert_eq!(driver.get_mode(), RequestMode::Replace);

        let driver = Driver::try_from(
            Animation::default()
                .set_speed(0.0, 1000.0, 1.0)
                .set_mode(RequestMode::Replace),
        )
        .unwrap();
        assert_eq!(driver.get_mode(), RequestMode::Replace);
        assert_eq!(driver.get_config().get_duration(), 0.8);
    }

    #[test]
    fn test_driver_interpolate() {
        let (driver, _) = create_driver(0.2);
        assert_eq!(driver.interpolate(0.0, 100.0, Some(0.25)), 25.0);
        assert_eq!(driver.interpolate(10u8, 20u8, Some(0.5)), 15);
        // No run yet: the last sampled value is 0.
        assert_eq!(driver.interpolate(-5i32, 5i32, None), -5);
    }

    #[test]
    fn test_request_outside_runtime() {
        let (driver, _) = create_driver(0.2);
        let result = driver.request_step(|_| {});
        assert!(matches!(result, Err(Error::RuntimeError)));
        assert!(!driver.is_running());
        assert_eq!(driver.get_start(), None);
    }

    #[serial]
    #[tempo_macros::test]
    async fn test_request_to_completion() {
        let (driver, scheduler) = create_driver(0.2);
        let events = Arc::new(Mutex::new(vec![]));

        let step_events = events.clone();
        let done_events = events.clone();
        let done_driver = driver.clone();
        let handle = driver
            .request(
                move |value| step_events.lock().push(Some(value)),
                move || {
                    assert!(done_driver.is_running());
                    assert!(done_driver.get_start().is_some());
                    done_events.lock().push(None);
                },
            )
            .unwrap();
        assert!(driver.is_running());
        assert_eq!(driver.get_start(), Some(Duration::ZERO));
        assert_eq!(handle.get_start(), Duration::ZERO);

        handle.wait().await.unwrap();

        let events = events.lock().clone();
        assert_eq!(events.len(), 10);
        assert_eq!(events.last(), Some(&None), "Completion is the last event");
        let values: Vec<f64> = events.iter().flatten().copied().collect();
        assert_eq!(values.len(), 9);
        assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(values.iter().all(|value| *value < 1.0));

        // The run is over: the start timestamp is unset and the last sample is the end of the curve.
        assert!(!driver.is_running());
        assert_eq!(driver.get_start(), None);
        assert_eq!(driver.get_last_sample().value, 1.0);
        assert_eq!(driver.interpolate(0.0, 400.0, None), 400.0);
        assert_eq!(scheduler.now(), Duration::from_millis(200));

        // The driver is reusable.
        let handle = driver.request_step(|_| {}).unwrap();
        assert_eq!(handle.get_start(), Duration::from_millis(200));
        handle.wait().await.unwrap();
        assert_eq!(scheduler.now(), Duration::from_millis(400));
    }

    #[serial]
    #[tempo_macros::test]
    async fn test_request_unknown_easing() {
        let flag = Arc::new(AtomicBool::new(false));

        let captured_flag = flag.clone();
        let result = Animation::default().set_ease("doesNotExist").request(
            |_| {},
            move || captured_flag.store(true, Ordering::SeqCst),
        );

        match result {
            Err(Error::ConfigurationError {
                source: UnknownEasing { name },
            }) => assert_eq!(name, "doesNotExist"),
            other => panic!("Expected an unknown easing error, got {:?}", other),
        }
        pause!(50);
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[serial]
    #[tempo_macros::test]
    async fn test_request_rejected() {
        let (driver, _) = create_driver(0.8);

        let first = driver.request_step(|_| {}).unwrap();
        let second = driver.request(|_| {}, || {});
        match second {
            Err(Error::RunError {
                source: AlreadyRunning { id },
            }) => assert_eq!(id, first.get_id()),
            other => panic!("Expected an already running error, got {:?}", other),
        }

        first.wait().await.unwrap();
        assert!(!driver.is_running());

        let third = driver.request_step(|_| {}).unwrap();
        assert_ne!(third.get_id(), 0);
        third.wait().await.unwrap();
    }

    #[serial]
    #[tempo_macros::test]
    async fn test_request_replaced() {
        let (driver, _) = create_driver(0.8);
        let driver = driver.set_mode(RequestMode::Replace);

        let first_steps = Arc::new(AtomicUsize::new(0));
        let first_done = Arc::new(AtomicBool::new(false));
        let second_steps = Arc::new(AtomicUsize::new(0));
        let second_done = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let captured_steps = first_steps.clone();
        let captured_done = first_done.clone();
        let first = driver
            .request(
                move |_| {
                    captured_steps.fetch_add(1, Ordering::SeqCst);
                    let _ = tx.send(());
                },
                move || captured_done.store(true, Ordering::SeqCst),
            )
            .unwrap();

        // Let the first run emit a few frames.
        for _ in 0..3 {
            rx.recv().await.unwrap();
        }
        let first_steps_at_replace = first_steps.load(Ordering::SeqCst);
        assert!(first_steps_at_replace >= 3);

        let captured_steps = second_steps.clone();
        let captured_done = second_done.clone();
        let second = driver
            .request(
                move |_| {
                    captured_steps.fetch_add(1, Ordering::SeqCst);
                },
                move || captured_done.store(true, Ordering::SeqCst),
            )
            .unwrap();
        assert_ne!(first.get_id(), second.get_id());

        second.wait().await.unwrap();
        assert!(matches!(
            first.wait().await,
            Err(Error::RunError {
                source: Cancelled { .. }
            })
        ));

        assert_eq!(first_steps.load(Ordering::SeqCst), first_steps_at_replace);
        assert!(!first_done.load(Ordering::SeqCst));
        assert!(second_steps.load(Ordering::SeqCst) > 0);
        assert!(second_done.load(Ordering::SeqCst));
        assert!(!driver.is_running());
    }

    #[serial]
    #[tempo_macros::test]
    async fn test_cancel_run() {
        let (driver, _) = create_driver(0.8);
        let done = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let captured_done = done.clone();
        let handle = driver
            .request(
                move |_| {
                    let _ = tx.send(());
                },
                move || captured_done.store(true, Ordering::SeqCst),
            )
            .unwrap();

        rx.recv().await.unwrap();
        assert!(driver.is_running());
        assert!(driver.get_last_sample().value > 0.0);

        handle.cancel();
        assert!(!driver.is_running());
        assert_eq!(driver.get_start(), None);

        let result = handle.wait().await;
        assert_eq!(
            result.err().unwrap().to_string(),
            "Run error: Run 0 has been cancelled."
        );
        assert!(!done.load(Ordering::SeqCst));

        // Stopping the driver behaves the same.
        let captured_done = done.clone();
        let handle = driver
            .request(|_| {}, move || captured_done.store(true, Ordering::SeqCst))
            .unwrap();
        driver.stop();
        assert!(!driver.is_running());
        assert!(handle.wait().await.is_err());
        assert!(!done.load(Ordering::SeqCst));
    }

    #[serial]
    #[tempo_macros::test]
    async fn test_request_samples_start() {
        let config = Animation::default()
            .set_duration(0.2)
            .set_ease("reverse")
            .build()
            .unwrap();
        let driver = Driver::with_scheduler(config, SteppedScheduler::new(Duration::from_millis(10)));

        let handle = driver.request_step(|_| {}).unwrap();
        // The run loop did not run yet: the current value is the start of the curve.
        assert_eq!(driver.get_last_sample().elapsed, Duration::ZERO);
        assert_eq!(driver.get_last_sample().value, 1.0);
        assert_eq!(driver.interpolate(0.0, 100.0, None), 100.0);

        handle.wait().await.unwrap();
        assert_eq!(driver.get_last_sample().value, 0.0);
    }

    #[serial]
    #[tempo_macros::test]
    async fn test_request_panicking_step() {
        let (driver, _) = create_driver(0.2);

        let handle = driver
            .request_step(|value| {
                if value > 0.0 {
                    panic!("Step failure");
                }
            })
            .unwrap();
        assert!(driver.get_start().is_some());

        let result = handle.wait().await;
        assert!(matches!(result, Err(Error::Unknown { .. })));
        assert!(!driver.is_running());
        assert_eq!(driver.get_start(), None);

        // The driver remains usable.
        let handle = driver.request_step(|_| {}).unwrap();
        handle.wait().await.unwrap();
    }

    #[test]
    fn test_run_guard_waits_for_callback() {
        let guard = RunGuard::new();
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let finished = Arc::new(AtomicBool::new(false));

        let callback_guard = guard.clone();
        let callback_finished = finished.clone();
        let callback = std::thread::spawn(move || {
            callback_guard.call(|| {
                started_tx.send(()).unwrap();
                crate::pause_sync!(100);
                callback_finished.store(true, Ordering::SeqCst);
            });
        });

        // Retiring while a callback runs on another thread waits for it to return...
        started_rx.recv().unwrap();
        guard.retire();
        assert!(finished.load(Ordering::SeqCst));
        assert!(!guard.is_live());

        // ...and no callback is called afterward.
        let called = AtomicBool::new(false);
        guard.call(|| called.store(true, Ordering::SeqCst));
        assert!(!called.load(Ordering::SeqCst));
        callback.join().unwrap();
    }

    #[test]
    fn test_run_guard_is_reentrant() {
        let guard = RunGuard::new();
        let calls = AtomicUsize::new(0);
        guard.call(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            // A callback retiring its own run does not deadlock.
            guard.retire();
            guard.call(|| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!guard.is_live());
    }

    #[serial]
    #[tempo_macros::test]
    async fn test_request_realtime() {
        let steps = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicBool::new(false));

        let captured_steps = steps.clone();
        let captured_done = done.clone();
        let handle = Animation::default()
            .set_duration(0.1)
            .set_ease("linear")
            .request(
                move |value| {
                    assert!((0.0..1.0).contains(&value));
                    captured_steps.fetch_add(1, Ordering::SeqCst);
                },
                move || captured_done.store(true, Ordering::SeqCst),
            )
            .unwrap();

        pause!(400);
        assert!(handle.is_finished());
        assert!(done.load(Ordering::SeqCst));
        assert!(steps.load(Ordering::SeqCst) > 0);
    }
}
