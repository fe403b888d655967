pub use tokio;

pub use crate::utils::interpolate::Interpolate;

mod interpolate;
pub mod task;
