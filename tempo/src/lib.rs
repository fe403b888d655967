#![doc(html_root_url = "https://docs.rs/tempo/0.1.0")]

//! <h1 align="center">TEMPO - Time-based animations for Rust</h1>
//! <div style="text-align:center;font-style:italic;">Tempo drives eased values from 0 to 1 over time, at a bounded frame rate.</div>
//! <br/>
//!
//! # Features
//!
//! **Tempo** samples an easing curve over a duration and calls back with the eased value each time a
//! frame is due. The eased value is then mapped onto any numeric range by the caller (a position, an
//! opacity, a servo angle, etc.).
//!
//! - Describe an [`Animation`](animations::Animation) by its easing, frame rate, and either a fixed
//!   duration or a speed over a distance (clamped to 0.1 - 0.8 seconds)
//! - Pick one of the predefined [`Easing`](animations::Easing) curves or register your own in an
//!   [`EasingRegistry`](animations::EasingRegistry)
//! - Play animations with a reusable [`Driver`](animations::Driver) and control each run with its
//!   [`RunHandle`](animations::RunHandle)
//! - Pace runs with any [`FrameScheduler`](scheduler::FrameScheduler): tokio timers by default
//!
//! # Getting Started
//!
//! - Add the following to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! tempo = "0.1.0"
//! ```
//!
//! The following code moves a value from 0 to 400 at a speed of 800 units per second:
//! ```rust
//! use tempo::animations::Animation;
//! use tempo::utils::Interpolate;
//!
//! #[tempo::runtime]
//! async fn main() {
//!     Animation::default()
//!         .set_speed(0.0, 400.0, 800.0)
//!         .set_ease("easeOutCubic")
//!         .request(
//!             |value| println!("Position: {}", 0.0f64.interpolate(400.0, value)),
//!             || println!("Arrived"),
//!         )
//!         .unwrap();
//! }
//! ```
//!
//! # Feature flags
//!
//! - **serde** -- Enables serialize/deserialize capabilities for animation descriptions.
//! - **mocks** -- Provides a deterministic fake scheduler (useful for tests mostly).

extern crate self as tempo;

pub mod animations;
pub mod errors;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod scheduler;
pub mod utils;

pub use tempo_macros::runtime;
