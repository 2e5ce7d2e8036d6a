use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, crate::error::ShulkerError>;

/// Integer voxel coordinate relative to the structure's corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        BlockPos { x, y, z }
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        BlockPos { x, y, z }
    }
}

/// Real-valued coordinate, used for entity placement and box corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Position { x, y, z }
    }
}

impl From<BlockPos> for Position {
    fn from(pos: BlockPos) -> Self {
        Position {
            x: pos.x as f64,
            y: pos.y as f64,
            z: pos.z as f64,
        }
    }
}

impl From<(f64, f64, f64)> for Position {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Position { x, y, z }
    }
}

/// Axis lengths of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Size {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Size { x, y, z }
    }

    /// Voxel count, saturating at `u64::MAX`.
    pub fn volume(&self) -> u64 {
        (self.x as u64)
            .saturating_mul(self.y as u64)
            .saturating_mul(self.z as u64)
    }

    pub fn is_empty(&self) -> bool {
        self.volume() == 0
    }
}
