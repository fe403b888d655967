//! Defines time-based animations: an eased value sampled from 0 to 1 over a duration, at a bounded
//! frame rate.
//!
//! - [`Animation`] describes an animation (easing, frame rate, duration or speed) and validates it
//!   into an immutable [`AnimationConfig`].
//! - [`run()`] plays a configuration in place against a [`FrameScheduler`](crate::scheduler::FrameScheduler).
//! - [`Driver`] plays a configuration as a background task and controls the runs it starts.

mod config;
mod driver;
mod easing;
mod registry;
mod run;

pub use config::{
    Animation, AnimationConfig, Timing, DEFAULT_DURATION, DEFAULT_EASE, DEFAULT_FPS,
    FRAME_TOLERANCE, MAX_SPEED_DURATION, MIN_SPEED_DURATION,
};
pub use driver::{Driver, RequestMode, RunHandle};
pub use easing::Easing;
pub use registry::{EasingFn, EasingRegistry};
pub use run::{run, Sample, Tick};
