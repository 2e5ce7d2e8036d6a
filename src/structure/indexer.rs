use serde::Deserialize;
use shulker_common::{BlockPos, Position, Size};

/// How coordinates outside `[0, axis_length)` are brought back into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingPolicy {
    /// Saturate each axis to the nearest boundary voxel.
    #[default]
    Clamp,
    /// Reduce each axis with Euclidean modulo.
    Wrap,
}

/// Maps 3D coordinates to linear voxel indices (`z` varies fastest) and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateIndexer {
    size: Size,
    policy: AddressingPolicy,
}

impl CoordinateIndexer {
    pub fn new(size: Size, policy: AddressingPolicy) -> Self {
        CoordinateIndexer { size, policy }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn policy(&self) -> AddressingPolicy {
        self.policy
    }

    pub fn volume(&self) -> usize {
        self.size.volume() as usize
    }

    fn normalize_axis(&self, value: i64, length: u32) -> Option<i32> {
        if length == 0 {
            return None;
        }
        let length = length as i64;
        let value = match self.policy {
            AddressingPolicy::Clamp => value.clamp(0, length - 1),
            AddressingPolicy::Wrap => value.rem_euclid(length),
        };
        Some(value as i32)
    }

    fn normalize_real_axis(&self, value: f64, length: u32) -> Option<f64> {
        if length == 0 {
            return None;
        }
        let value = if value.is_nan() { 0.0 } else { value };
        let length = length as f64;
        Some(match self.policy {
            AddressingPolicy::Clamp => value.clamp(0.0, length - 1.0),
            AddressingPolicy::Wrap => value.rem_euclid(length),
        })
    }

    /// Brings `pos` into range under the configured policy. `None` when
    /// the structure has a zero-length axis.
    pub fn normalize(&self, pos: BlockPos) -> Option<BlockPos> {
        Some(BlockPos {
            x: self.normalize_axis(pos.x as i64, self.size.x)?,
            y: self.normalize_axis(pos.y as i64, self.size.y)?,
            z: self.normalize_axis(pos.z as i64, self.size.z)?,
        })
    }

    /// Floors each component, then normalizes like [`Self::normalize`].
    pub fn normalize_floored(&self, pos: Position) -> Option<BlockPos> {
        // `as` saturates and maps NaN to zero
        Some(BlockPos {
            x: self.normalize_axis(pos.x.floor() as i64, self.size.x)?,
            y: self.normalize_axis(pos.y.floor() as i64, self.size.y)?,
            z: self.normalize_axis(pos.z.floor() as i64, self.size.z)?,
        })
    }

    /// Normalizes a real-valued position without snapping it to the grid.
    pub fn normalize_real(&self, pos: Position) -> Option<Position> {
        Some(Position {
            x: self.normalize_real_axis(pos.x, self.size.x)?,
            y: self.normalize_real_axis(pos.y, self.size.y)?,
            z: self.normalize_real_axis(pos.z, self.size.z)?,
        })
    }

    /// Linear index of an already normalized position.
    pub(crate) fn linear_index(&self, pos: BlockPos) -> usize {
        let (y_len, z_len) = (self.size.y as usize, self.size.z as usize);
        pos.z as usize + z_len * (pos.y as usize + y_len * pos.x as usize)
    }

    pub fn index_of(&self, pos: BlockPos) -> Option<usize> {
        self.normalize(pos).map(|pos| self.linear_index(pos))
    }

    pub fn position_of(&self, index: usize) -> Option<BlockPos> {
        if index >= self.volume() {
            return None;
        }
        let (y_len, z_len) = (self.size.y as usize, self.size.z as usize);
        Some(BlockPos {
            x: (index / (y_len * z_len)) as i32,
            y: ((index / z_len) % y_len) as i32,
            z: (index % z_len) as i32,
        })
    }
}
