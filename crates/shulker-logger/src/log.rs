use crate::severity::LogSeverity;
use crate::time::now;
use once_cell::sync::Lazy;

/// Environment variable holding the minimum severity that gets printed.
pub const LOG_LEVEL_VAR: &str = "SHULKER_LOG";

static MIN_SEVERITY: Lazy<LogSeverity> = Lazy::new(|| {
    std::env::var(LOG_LEVEL_VAR)
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LogSeverity::Warning)
});

/// Whether a message of `log_severity` would be printed.
pub fn enabled(log_severity: LogSeverity) -> bool {
    log_severity >= *MIN_SEVERITY
}

pub fn log(msg: String, log_severity: LogSeverity) {
    if enabled(log_severity) {
        println!("[{}] {} {}", log_severity, now(), msg);
    }
}
