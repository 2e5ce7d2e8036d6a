use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

/// Display impl for LogSeverity
impl Display for LogSeverity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LogSeverity::Debug => write!(f, "DEBUG"),
            LogSeverity::Info => write!(f, "INFO"),
            LogSeverity::Warning => write!(f, "WARNING"),
            LogSeverity::Error => write!(f, "ERROR"),
            LogSeverity::Fatal => write!(f, "FATAL"),
        }
    }
}

impl FromStr for LogSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogSeverity::Debug),
            "info" => Ok(LogSeverity::Info),
            "warning" | "warn" => Ok(LogSeverity::Warning),
            "error" => Ok(LogSeverity::Error),
            "fatal" => Ok(LogSeverity::Fatal),
            other => Err(format!("Unknown log severity: {}", other)),
        }
    }
}
