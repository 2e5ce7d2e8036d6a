use super::grid::{Layer, EMPTY};
use super::Structure;
use shulker_logger::{log, LogSeverity::Debug};

/// One bit per palette slot.
struct SlotMarks {
    words: Vec<u64>,
}

impl SlotMarks {
    fn new(len: usize) -> Self {
        SlotMarks {
            words: vec![0; len.div_ceil(64)],
        }
    }

    fn mark(&mut self, slot: usize) {
        if let Some(word) = self.words.get_mut(slot / 64) {
            *word |= 1u64 << (slot % 64);
        }
    }

    fn is_marked(&self, slot: usize) -> bool {
        self.words
            .get(slot / 64)
            .is_some_and(|word| word & (1u64 << (slot % 64)) != 0)
    }
}

/// Removes palette entries no voxel refers to, in either layer, folds
/// referenced entries that are structurally equal to an earlier referenced
/// entry into it, and renumbers the remaining slots densely in their
/// original order.
///
/// Block-entity entries keyed by the same number as a removed slot are
/// dropped with it. Returns the same structure for chaining. Running it on
/// an already compact structure changes nothing.
pub fn make_pruned(structure: &mut Structure) -> &mut Structure {
    let palette_len = structure.palette.len();
    let mut marks = SlotMarks::new(palette_len);

    for layer in Layer::ALL {
        for &cell in structure.grid.layer(layer) {
            if cell != EMPTY {
                marks.mark(cell as usize);
            }
        }
    }

    // old slot -> new slot, shared by folded duplicates
    let mut plan: Vec<Option<u32>> = vec![None; palette_len];
    let mut kept = SlotMarks::new(palette_len);
    let mut survivors: Vec<usize> = Vec::new();
    let entries = structure.palette.entries();
    for slot in (0..palette_len).filter(|&slot| marks.is_marked(slot)) {
        let entry = &entries[slot];
        match survivors
            .iter()
            .position(|&earlier| entries[earlier].structurally_eq(entry))
        {
            Some(new_slot) => plan[slot] = Some(new_slot as u32),
            None => {
                plan[slot] = Some(survivors.len() as u32);
                survivors.push(slot);
                kept.mark(slot);
            }
        }
    }

    if survivors.len() == palette_len {
        return structure;
    }

    structure
        .palette
        .remove_slots(|slot, _| !kept.is_marked(slot as usize));

    let mut dropped_data = 0;
    for slot in (0..palette_len).filter(|&slot| !kept.is_marked(slot)) {
        if structure.block_entities.remove_entry(slot) {
            dropped_data += 1;
        }
    }

    structure.grid.remap_slots(&plan);

    log(
        format!(
            "Pruned palette from {} to {} entries ({} block entity entries dropped)",
            palette_len,
            structure.palette.len(),
            dropped_data
        ),
        Debug,
    );
    structure
}
