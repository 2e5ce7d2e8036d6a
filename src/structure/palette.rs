use shulker_nbt::Tag;

/// Ordered, duplicate-free table of block descriptors. Voxels refer to
/// descriptors by slot number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockPalette {
    entries: Vec<Tag>,
}

impl BlockPalette {
    pub fn new() -> Self {
        BlockPalette::default()
    }

    /// Wraps entries read from a file. They are kept in file order, even if
    /// the file carries structurally equal duplicates.
    pub(crate) fn from_entries(entries: Vec<Tag>) -> Self {
        BlockPalette { entries }
    }

    /// Slot holding a descriptor structurally equal to `descriptor`.
    pub fn position(&self, descriptor: &Tag) -> Option<u32> {
        self.entries
            .iter()
            .position(|entry| entry.structurally_eq(descriptor))
            .map(|slot| slot as u32)
    }

    /// Returns the slot of `descriptor`, appending it when no equal entry
    /// exists. Slots are never reused.
    pub fn resolve(&mut self, descriptor: Tag) -> u32 {
        if let Some(slot) = self.position(&descriptor) {
            return slot;
        }
        self.entries.push(descriptor);
        (self.entries.len() - 1) as u32
    }

    pub fn get(&self, slot: u32) -> Option<&Tag> {
        self.entries.get(slot as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Tag] {
        &self.entries
    }

    /// Drops every entry for which `remove` returns true and returns the
    /// old-slot to new-slot mapping, `None` for dropped slots. Surviving
    /// entries keep their relative order.
    pub fn remove_slots<F>(&mut self, mut remove: F) -> Vec<Option<u32>>
    where
        F: FnMut(u32, &Tag) -> bool,
    {
        let mut remap = Vec::with_capacity(self.entries.len());
        let mut kept = Vec::with_capacity(self.entries.len());

        for (slot, entry) in std::mem::take(&mut self.entries).into_iter().enumerate() {
            if remove(slot as u32, &entry) {
                remap.push(None);
            } else {
                remap.push(Some(kept.len() as u32));
                kept.push(entry);
            }
        }

        self.entries = kept;
        remap
    }
}
