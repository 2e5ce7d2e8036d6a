//! Editable model of Bedrock-style structure files: a box of voxels
//! referring to a deduplicated block palette, per-voxel block entity data,
//! and entities, mapped losslessly to and from NBT.

pub mod options;
pub mod structure;

// Re-export commonly used items
pub use options::{Compression, StructureOptions};
pub use shulker_common::{BlockPos, Position, Result, ShulkerError, Size};
pub use shulker_nbt::{Endianness, Tag};
pub use structure::codec::{decode, decode_with, encode};
pub use structure::{AddressingPolicy, Layer, Structure};
