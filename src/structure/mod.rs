//! In-memory model of a structure: a box of voxels referring to a block
//! palette, per-voxel block entity data, and free-standing entities.

pub mod block_entity;
pub mod codec;
pub mod compactor;
pub mod entity;
pub mod grid;
pub mod indexer;
pub mod palette;

pub use block_entity::BlockEntityStore;
pub use entity::EntityRegistry;
pub use grid::{Layer, VoxelGrid, EMPTY};
pub use indexer::{AddressingPolicy, CoordinateIndexer};
pub use palette::BlockPalette;

use crate::options::StructureOptions;
use shulker_common::{BlockPos, Position, Result, ShulkerError, Size};
use shulker_nbt::Tag;

/// Largest number of voxels a structure may hold (2^30).
pub const MAX_VOLUME: u64 = 1 << 30;
pub const DEFAULT_FORMAT_VERSION: i32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub(crate) indexer: CoordinateIndexer,
    pub(crate) origin: BlockPos,
    pub(crate) format_version: i32,
    pub(crate) grid: VoxelGrid,
    pub(crate) palette: BlockPalette,
    pub(crate) block_entities: BlockEntityStore,
    pub(crate) entities: EntityRegistry,
    pub(crate) active_layer: Layer,
}

/// Checks dimensions and the volume cap.
pub(crate) fn validate_size(x: i32, y: i32, z: i32) -> Result<Size> {
    if x < 0 || y < 0 || z < 0 {
        return Err(ShulkerError::InvalidSize(format!(
            "negative dimension in {}x{}x{}",
            x, y, z
        )));
    }
    let size = Size::new(x as u32, y as u32, z as u32);
    if size.volume() > MAX_VOLUME {
        return Err(ShulkerError::InvalidSize(format!(
            "volume of {}x{}x{} exceeds {}",
            x, y, z, MAX_VOLUME
        )));
    }
    Ok(size)
}

impl Structure {
    /// Creates an empty structure: every voxel empty in both layers, no
    /// palette entries, no entities.
    pub fn new(x: i32, y: i32, z: i32) -> Result<Self> {
        Structure::with_options(x, y, z, &StructureOptions::default())
    }

    pub fn with_options(x: i32, y: i32, z: i32, options: &StructureOptions) -> Result<Self> {
        let size = validate_size(x, y, z)?;
        let indexer = CoordinateIndexer::new(size, options.addressing);
        Ok(Structure {
            grid: VoxelGrid::new(indexer.volume()),
            indexer,
            origin: BlockPos::default(),
            format_version: DEFAULT_FORMAT_VERSION,
            palette: BlockPalette::new(),
            block_entities: BlockEntityStore::new(),
            entities: EntityRegistry::new(),
            active_layer: Layer::Primary,
        })
    }

    pub fn size(&self) -> Size {
        self.indexer.size()
    }

    pub fn volume(&self) -> usize {
        self.indexer.volume()
    }

    pub fn origin(&self) -> BlockPos {
        self.origin
    }

    pub fn set_origin(&mut self, origin: BlockPos) {
        self.origin = origin;
    }

    pub fn format_version(&self) -> i32 {
        self.format_version
    }

    pub fn set_format_version(&mut self, version: i32) {
        self.format_version = version;
    }

    pub fn addressing(&self) -> AddressingPolicy {
        self.indexer.policy()
    }

    pub fn set_addressing(&mut self, policy: AddressingPolicy) {
        self.indexer = CoordinateIndexer::new(self.indexer.size(), policy);
    }

    /// Layer read and written by [`Self::get_block`], [`Self::set_block`]
    /// and [`Self::fill`].
    pub fn active_layer(&self) -> Layer {
        self.active_layer
    }

    pub fn set_active_layer(&mut self, layer: Layer) {
        self.active_layer = layer;
    }

    pub fn indexer(&self) -> &CoordinateIndexer {
        &self.indexer
    }

    pub fn palette(&self) -> &BlockPalette {
        &self.palette
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn block_entities(&self) -> &BlockEntityStore {
        &self.block_entities
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    /// Linear index of `pos` after addressing-policy normalization.
    pub fn index_of(&self, pos: BlockPos) -> Option<usize> {
        self.indexer.index_of(pos)
    }

    pub fn get_block(&self, pos: BlockPos) -> Option<&Tag> {
        self.get_block_in(self.active_layer, pos)
    }

    pub fn get_block_in(&self, layer: Layer, pos: BlockPos) -> Option<&Tag> {
        let index = self.index_of(pos)?;
        let slot = self.grid.get(layer, index)?;
        self.palette.get(slot)
    }

    /// Places `block` at `pos` on the active layer, reusing an equal
    /// palette entry when there is one. Returns the slot written, or `None`
    /// if the structure has no voxels.
    pub fn set_block(&mut self, pos: BlockPos, block: Tag) -> Option<u32> {
        self.set_block_in(self.active_layer, pos, block)
    }

    pub fn set_block_in(&mut self, layer: Layer, pos: BlockPos, block: Tag) -> Option<u32> {
        let index = self.index_of(pos)?;
        let slot = self.palette.resolve(block);
        self.grid.set(layer, index, Some(slot));
        Some(slot)
    }

    /// Empties the voxel at `pos` on the active layer. Palette entries are
    /// left alone until the next [`Self::make_pruned`].
    pub fn clear_block(&mut self, pos: BlockPos) -> bool {
        match self.index_of(pos) {
            Some(index) => self.grid.set(self.active_layer, index, None),
            None => false,
        }
    }

    /// Fills the inclusive box between `from` and `to` on the active layer.
    /// Returns the number of voxels written.
    pub fn fill(
        &mut self,
        from: impl Into<Position>,
        to: impl Into<Position>,
        block: Tag,
    ) -> usize {
        self.fill_in(self.active_layer, from, to, block)
    }

    pub fn fill_in(
        &mut self,
        layer: Layer,
        from: impl Into<Position>,
        to: impl Into<Position>,
        block: Tag,
    ) -> usize {
        if self.volume() == 0 {
            return 0;
        }
        let slot = self.palette.resolve(block);
        self.grid
            .fill_box(layer, &self.indexer, from.into(), to.into(), Some(slot))
    }

    /// Block entity data (`block_entity_data`) of the voxel at `pos`.
    pub fn get_block_data(&self, pos: BlockPos) -> Option<&Tag> {
        self.block_entities.get(self.index_of(pos)?)
    }

    /// Attaches block entity data to the voxel at `pos`. The stored copy
    /// gets `x`, `y`, `z` set to the voxel's coordinate minus the origin.
    /// Overwriting the voxel later does not remove this data. On a structure
    /// with no voxels nothing is stored and `Ok(())` is returned, matching
    /// the other voxel writes.
    pub fn set_block_data(&mut self, pos: BlockPos, data: Tag) -> Result<()> {
        let Some(pos) = self.indexer.normalize(pos) else {
            return Ok(());
        };
        let index = self.indexer.linear_index(pos);
        let relative = BlockPos {
            x: pos.x.wrapping_sub(self.origin.x),
            y: pos.y.wrapping_sub(self.origin.y),
            z: pos.z.wrapping_sub(self.origin.z),
        };
        self.block_entities.set(index, data, relative)
    }

    pub fn remove_block_data(&mut self, pos: BlockPos) -> Option<Tag> {
        let index = self.index_of(pos)?;
        self.block_entities.remove(index)
    }

    /// Adds an entity and returns its new id. A given `position` is
    /// normalized like voxel coordinates but keeps its fractional part.
    pub fn summon(&mut self, entity: Tag, position: Option<Position>) -> Result<i64> {
        let position = match position {
            Some(pos) => Some(self.indexer.normalize_real(pos).ok_or_else(|| {
                ShulkerError::InvalidSize("cannot place an entity in an empty structure".into())
            })?),
            None => None,
        };
        self.entities.summon(entity, position)
    }

    pub fn get_entity(&self, id: i64) -> Option<&Tag> {
        self.entities.get(id)
    }

    pub fn kill(&mut self, id: i64) -> Option<Tag> {
        self.entities.kill(id)
    }

    /// See [`compactor::make_pruned`].
    pub fn make_pruned(&mut self) -> &mut Self {
        compactor::make_pruned(self)
    }
}
