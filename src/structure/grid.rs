use super::indexer::CoordinateIndexer;
use shulker_common::Position;

/// Cell value meaning "no block assigned".
pub const EMPTY: i32 = -1;

/// One of the two parallel per-voxel reference arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layer {
    #[default]
    Primary,
    Secondary,
}

impl Layer {
    pub const ALL: [Layer; 2] = [Layer::Primary, Layer::Secondary];
}

/// Two layers of palette-slot references, each `volume` cells long.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    primary: Vec<i32>,
    secondary: Vec<i32>,
}

fn to_cell(slot: Option<u32>) -> i32 {
    slot.map_or(EMPTY, |slot| slot as i32)
}

fn from_cell(cell: i32) -> Option<u32> {
    u32::try_from(cell).ok()
}

impl VoxelGrid {
    pub fn new(volume: usize) -> Self {
        VoxelGrid {
            primary: vec![EMPTY; volume],
            secondary: vec![EMPTY; volume],
        }
    }

    /// Both layers must already have the same length.
    pub(crate) fn from_layers(primary: Vec<i32>, secondary: Vec<i32>) -> Self {
        debug_assert_eq!(primary.len(), secondary.len());
        VoxelGrid { primary, secondary }
    }

    pub fn volume(&self) -> usize {
        self.primary.len()
    }

    /// Raw cells of `layer`, with [`EMPTY`] for unassigned voxels.
    pub fn layer(&self, layer: Layer) -> &[i32] {
        match layer {
            Layer::Primary => &self.primary,
            Layer::Secondary => &self.secondary,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut [i32] {
        match layer {
            Layer::Primary => &mut self.primary,
            Layer::Secondary => &mut self.secondary,
        }
    }

    pub fn get(&self, layer: Layer, index: usize) -> Option<u32> {
        self.layer(layer).get(index).copied().and_then(from_cell)
    }

    /// Writes `slot` (or clears with `None`). Returns false when `index` is
    /// outside the grid.
    pub fn set(&mut self, layer: Layer, index: usize, slot: Option<u32>) -> bool {
        match self.layer_mut(layer).get_mut(index) {
            Some(cell) => {
                *cell = to_cell(slot);
                true
            }
            None => false,
        }
    }

    /// Assigns `slot` to every cell of the inclusive box spanned by `from`
    /// and `to`. Corners are floored and normalized by `indexer`, then each
    /// axis pair is ordered. Returns the number of cells written.
    pub fn fill_box(
        &mut self,
        layer: Layer,
        indexer: &CoordinateIndexer,
        from: Position,
        to: Position,
        slot: Option<u32>,
    ) -> usize {
        let (Some(a), Some(b)) = (indexer.normalize_floored(from), indexer.normalize_floored(to))
        else {
            return 0;
        };
        let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
        let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
        let (z0, z1) = (a.z.min(b.z), a.z.max(b.z));

        let value = to_cell(slot);
        let cells = self.layer_mut(layer);
        let mut written = 0;
        for x in x0..=x1 {
            for y in y0..=y1 {
                let row = indexer.linear_index((x, y, z0).into());
                let len = (z1 - z0) as usize + 1;
                cells[row..row + len].fill(value);
                written += len;
            }
        }
        written
    }

    /// Rewrites every non-empty cell of both layers through `remap`
    /// (indexed by old slot). Cells whose slot maps to `None` become empty.
    pub(crate) fn remap_slots(&mut self, remap: &[Option<u32>]) {
        for layer in Layer::ALL {
            for cell in self.layer_mut(layer) {
                if let Some(old) = from_cell(*cell) {
                    *cell = to_cell(remap.get(old as usize).copied().flatten());
                }
            }
        }
    }
}
