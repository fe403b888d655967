use std::fmt::{Debug, Display, Formatter};
use std::time::Duration;

use crate::animations::{
    Driver, Easing, EasingFn, EasingRegistry, RequestMode, RunHandle, Sample, Tick,
};
use crate::errors::{
    ConfigurationError, Error, InvalidDurationSnafu, InvalidFpsSnafu, InvalidSpeedSnafu,
};

/// Default animation duration (in seconds).
pub const DEFAULT_DURATION: f64 = 0.4;
/// Default sampling rate (in frames per second).
pub const DEFAULT_FPS: f64 = 60.0;
/// Default easing name.
pub const DEFAULT_EASE: &str = "easeInOutCubic";
/// Lower bound (in seconds) of a speed-derived duration.
pub const MIN_SPEED_DURATION: f64 = 0.1;
/// Upper bound (in seconds) of a speed-derived duration.
pub const MAX_SPEED_DURATION: f64 = 0.8;
/// Share of the frame budget a frame may come early by (scheduler jitter).
pub const FRAME_TOLERANCE: f64 = 0.05;

/// Describes how the duration of an animation is obtained.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Timing {
    /// An explicit duration (in seconds): used as is.
    Fixed { seconds: f64 },
    /// A duration derived from a rate of change: `|target - initial| / speed` seconds, bounded to
    /// [`MIN_SPEED_DURATION`] - [`MAX_SPEED_DURATION`].
    Speed { initial: f64, target: f64, speed: f64 },
}

impl Default for Timing {
    fn default() -> Self {
        Timing::Fixed {
            seconds: DEFAULT_DURATION,
        }
    }
}

impl Timing {
    /// Resolves the duration (in seconds).
    ///
    /// # Errors
    /// * `InvalidDuration`: a fixed duration is not a finite number greater than 0.
    /// * `InvalidSpeed`: the speed is 0 or NaN, or the derived duration is NaN.
    pub fn resolve(&self) -> Result<f64, ConfigurationError> {
        match *self {
            Timing::Fixed { seconds } => match seconds.is_finite() && seconds > 0.0 {
                true => Ok(seconds),
                false => InvalidDurationSnafu { seconds }.fail(),
            },
            Timing::Speed {
                initial,
                target,
                speed,
            } => {
                let seconds = (target - initial).abs() / speed;
                match speed == 0.0 || seconds.is_nan() {
                    true => InvalidSpeedSnafu { speed }.fail(),
                    false => Ok(seconds.clamp(MIN_SPEED_DURATION, MAX_SPEED_DURATION)),
                }
            }
        }
    }
}

/// Represents the configuration of an animation, as a chainable builder.
///
/// Setters never fail: every value is validated at once by [`Animation::build()`], which produces
/// the immutable [`AnimationConfig`] used to run the animation.
///
/// # Example
///
/// Here is an animation lasting 200ms, sampled at 60fps, following a linear curve:
/// ```
/// use tempo::animations::Animation;
///
/// let config = Animation::default()
///     .set_duration(0.2)
///     .set_fps(60.0)
///     .set_ease("linear")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.get_duration(), 0.2);
/// assert_eq!(config.get_frame_budget(), 1000.0 / 60.0);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug)]
pub struct Animation {
    /// The name of the easing function (must be known by the registry).
    ease: String,
    /// The sampling rate (in frames per second).
    fps: f64,
    /// How the duration is obtained.
    timing: Timing,
    /// What happens when a run is requested while another one is in progress.
    mode: RequestMode,
    /// The easing functions available by name.
    #[cfg_attr(feature = "serde", serde(skip))]
    registry: EasingRegistry,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            ease: String::from(DEFAULT_EASE),
            fps: DEFAULT_FPS,
            timing: Timing::default(),
            mode: RequestMode::default(),
            registry: EasingRegistry::default(),
        }
    }
}

impl Animation {
    /// Sets the easing function by name (ie: `"linear"`, `"easeInOutCubic"`).
    ///
    /// The name is checked against the registry by [`Animation::build()`].
    pub fn set_ease<S: Into<String>>(mut self, ease: S) -> Self {
        self.ease = ease.into();
        self
    }

    /// Sets one of the built-in easing functions.
    pub fn set_easing(self, easing: Easing) -> Self {
        self.set_ease(easing.name())
    }

    /// Sets the sampling rate: two frames are at least `1000 / fps` milliseconds apart.
    pub fn set_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Derives the duration from a rate of change.
    ///
    /// The duration is `|target - initial| / speed` seconds, bounded to 100ms - 800ms: for instance
    /// `initial = 0, target = 400, speed = 800` lasts 500ms.
    /// Overrides any previous [`Animation::set_duration()`].
    pub fn set_speed(mut self, initial: f64, target: f64, speed: f64) -> Self {
        self.timing = Timing::Speed {
            initial,
            target,
            speed,
        };
        self
    }

    /// Sets the duration (in seconds). No bound is applied.
    /// Overrides any previous [`Animation::set_speed()`].
    pub fn set_duration(mut self, seconds: f64) -> Self {
        self.timing = Timing::Fixed { seconds };
        self
    }

    /// Sets what happens when a run is requested while another one is in progress.
    pub fn set_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the easing functions available by name.
    pub fn with_registry(mut self, registry: EasingRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn get_ease(&self) -> &str {
        &self.ease
    }
    pub fn get_fps(&self) -> f64 {
        self.fps
    }
    pub fn get_timing(&self) -> Timing {
        self.timing
    }
    pub fn get_mode(&self) -> RequestMode {
        self.mode
    }
    pub fn get_registry(&self) -> &EasingRegistry {
        &self.registry
    }

    /// Validates the configuration and freezes it.
    ///
    /// # Errors
    /// * `InvalidFps`: fps is not a finite number greater than 0.
    /// * `InvalidDuration` / `InvalidSpeed`: see [`Timing::resolve()`].
    /// * `UnknownEasing`: the easing name is not registered.
    pub fn build(&self) -> Result<AnimationConfig, Error> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(InvalidFpsSnafu { fps: self.fps }.build().into());
        }
        let duration = self.timing.resolve()?;
        let easing = self.registry.resolve(&self.ease)?;

        Ok(AnimationConfig {
            duration,
            fps: self.fps,
            frame_budget: 1000.0 / self.fps,
            ease: self.ease.clone(),
            easing,
        })
    }

    /// Builds a [`Driver`] from this animation and requests a run right away.
    ///
    /// See [`Driver::request()`].
    pub fn request<S, D>(self, step: S, done: D) -> Result<RunHandle, Error>
    where
        S: FnMut(f64) + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        Driver::try_from(self)?.request(step, done)
    }

    /// Loads an animation from a JSON document.
    ///
    /// Missing fields take their default value; the registry is always the default one.
    /// ```
    /// use tempo::animations::Animation;
    ///
    /// let animation = Animation::from_json(r#"{"ease": "linear", "timing": {"fixed": {"seconds": 0.2}}}"#).unwrap();
    /// assert_eq!(animation.get_ease(), "linear");
    /// assert_eq!(animation.build().unwrap().get_duration(), 0.2);
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Dumps the animation as a JSON document.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<Easing> for Animation {
    fn from(easing: Easing) -> Self {
        Animation::default().set_easing(easing)
    }
}

/// Represents a validated, immutable animation configuration.
///
/// Produced by [`Animation::build()`]. Durations are expressed in seconds and the frame budget in
/// milliseconds; elapsed times are [`Duration`]s.
#[derive(Clone)]
pub struct AnimationConfig {
    /// Total length of the animation (in seconds).
    duration: f64,
    /// Sampling rate (in frames per second).
    fps: f64,
    /// Minimum spacing between two frames (in milliseconds).
    frame_budget: f64,
    /// Name of the easing function.
    ease: String,
    /// The resolved easing function.
    easing: EasingFn,
}

impl AnimationConfig {
    /// Returns the duration (in seconds).
    pub fn get_duration(&self) -> f64 {
        self.duration
    }
    pub fn get_fps(&self) -> f64 {
        self.fps
    }
    /// Returns the minimum spacing between two frames (in milliseconds): `1000 / fps`.
    pub fn get_frame_budget(&self) -> f64 {
        self.frame_budget
    }
    pub fn get_ease(&self) -> &str {
        &self.ease
    }
    pub fn get_easing(&self) -> EasingFn {
        self.easing.clone()
    }

    /// Computes the raw progress at a given elapsed time: `elapsed / duration`.
    ///
    /// The result is not bounded: anything greater or equal to 1.0 means the animation is over.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        elapsed.as_secs_f64() / self.duration
    }

    /// Applies the easing function to a progress, bounded to 0.0 - 1.0 first.
    pub fn ease(&self, progress: f64) -> f64 {
        (self.easing)(progress.clamp(0.0, 1.0))
    }

    /// Samples the animation at a given elapsed time.
    pub fn sample(&self, elapsed: Duration) -> Sample {
        let progress = self.progress(elapsed);
        Sample {
            elapsed,
            progress,
            value: self.ease(progress),
        }
    }

    /// Decides what a tick should do at `elapsed`, given the time since the last emitted frame (the
    /// start of the run for the first one).
    ///
    /// - [`Tick::Complete`] once the progress reaches 1.0,
    /// - [`Tick::Frame`] when a frame budget has passed since the last frame, give or take
    ///   [`FRAME_TOLERANCE`]: a scheduler ticking at the fps rate emits a frame on every tick,
    /// - [`Tick::Skip`] otherwise.
    pub fn decide(&self, elapsed: Duration, since_last_frame: Duration) -> Tick {
        let threshold = self.frame_budget * (1.0 - FRAME_TOLERANCE);
        match self.progress(elapsed) < 1.0 {
            false => Tick::Complete,
            true => match since_last_frame.as_secs_f64() * 1000.0 > threshold {
                true => Tick::Frame,
                false => Tick::Skip,
            },
        }
    }
}

impl Debug for AnimationConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationConfig")
            .field("duration", &self.duration)
            .field("fps", &self.fps)
            .field("frame_budget", &self.frame_budget)
            .field("ease", &self.ease)
            .finish()
    }
}

impl Display for AnimationConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AnimationConfig [duration={}s, fps={}, ease={}]",
            self.duration, self.fps, self.ease
        )
    }
}

impl TryFrom<Animation> for AnimationConfig {
    type Error = Error;

    fn try_from(animation: Animation) -> Result<Self, Self::Error> {
        animation.build()
    }
}
