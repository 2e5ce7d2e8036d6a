use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ShulkerError {
    IoError(std::io::Error),
    /// A dimension was negative or the volume exceeded the allowed maximum.
    InvalidSize(String),
    /// A required field was absent from the tree.
    MissingField(&'static str),
    /// A field was present but had the wrong tag type or an unusable value.
    InvalidField { field: &'static str, reason: String },
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    InvalidPaletteIndex { index: i32, palette_len: usize },
    InvalidBlockData(String),
    /// Every entity id up to `i64::MAX` has been issued.
    EntityIdsExhausted,
    ConfigError(String),
}

impl fmt::Display for ShulkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShulkerError::IoError(err) => write!(f, "IO error: {}", err),
            ShulkerError::InvalidSize(msg) => write!(f, "Invalid structure size: {}", msg),
            ShulkerError::MissingField(field) => write!(f, "Missing field: {}", field),
            ShulkerError::InvalidField { field, reason } => {
                write!(f, "Invalid field {}: {}", field, reason)
            }
            ShulkerError::LengthMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Length mismatch in {}: expected {}, got {}",
                field, expected, actual
            ),
            ShulkerError::InvalidPaletteIndex { index, palette_len } => write!(
                f,
                "Palette index {} out of range for palette of {} entries",
                index, palette_len
            ),
            ShulkerError::InvalidBlockData(msg) => write!(f, "Invalid block data: {}", msg),
            ShulkerError::EntityIdsExhausted => write!(f, "No entity ids left to assign"),
            ShulkerError::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl Error for ShulkerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ShulkerError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ShulkerError {
    fn from(err: std::io::Error) -> Self {
        ShulkerError::IoError(err)
    }
}
