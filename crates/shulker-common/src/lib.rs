pub mod error;
pub mod types;

pub use error::ShulkerError;
pub use types::{BlockPos, Position, Result, Size};
