pub mod log;
pub mod severity;
pub mod time;

pub use log::{enabled, log};
pub use severity::LogSeverity;
