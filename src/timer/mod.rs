pub mod commands;
pub mod controller;
pub mod error;
pub mod state;

pub use controller::TimerController;
pub use error::TimerError;
pub use state::{TimerSnapshot, TimerStatus};
