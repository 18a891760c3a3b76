#![forbid(unsafe_code)]

pub mod gate;
pub mod model;
pub mod progress;
pub mod scoring;
pub mod time;

pub use gate::GateOptions;
pub use progress::{ActiveTab, Direction, LearnerProgress, ProgressionEngine, Rejection, Transition};
pub use scoring::Score;
pub use time::Clock;
