pub mod aggregate;
pub mod format;

pub use aggregate::{aggregate, TaskTimeSummary, UserTimeSummary};
pub use format::{format_duration, history};
