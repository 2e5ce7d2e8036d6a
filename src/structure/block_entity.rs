use shulker_common::{BlockPos, Result, ShulkerError};
use shulker_nbt::Tag;
use std::collections::{BTreeMap, HashMap};

pub const BLOCK_ENTITY_DATA: &str = "block_entity_data";

/// Sparse per-voxel auxiliary data, keyed by linear voxel index.
///
/// Each entry is the whole per-index compound of the file, so keys other
/// than `block_entity_data` survive a load/save cycle untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockEntityStore {
    entries: BTreeMap<usize, HashMap<String, Tag>>,
}

impl BlockEntityStore {
    pub fn new() -> Self {
        BlockEntityStore::default()
    }

    pub(crate) fn from_entries(entries: BTreeMap<usize, HashMap<String, Tag>>) -> Self {
        BlockEntityStore { entries }
    }

    /// The `block_entity_data` tree stored at `index`.
    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.entries.get(&index)?.get(BLOCK_ENTITY_DATA)
    }

    /// Stores `data` at `index` with its `x`, `y`, `z` fields overwritten by
    /// `relative`. Other keys of an existing entry are kept.
    pub fn set(&mut self, index: usize, mut data: Tag, relative: BlockPos) -> Result<()> {
        let type_id = data.get_type_id();
        let fields = data.as_compound_mut().ok_or_else(|| {
            ShulkerError::InvalidBlockData(format!(
                "expected a compound, got tag type {}",
                type_id
            ))
        })?;
        fields.insert("x".to_string(), Tag::Int(relative.x));
        fields.insert("y".to_string(), Tag::Int(relative.y));
        fields.insert("z".to_string(), Tag::Int(relative.z));

        self.entries
            .entry(index)
            .or_default()
            .insert(BLOCK_ENTITY_DATA.to_string(), data);
        Ok(())
    }

    /// Removes and returns the `block_entity_data` at `index`. The entry
    /// itself is dropped once nothing else is left in it.
    pub fn remove(&mut self, index: usize) -> Option<Tag> {
        let entry = self.entries.get_mut(&index)?;
        let removed = entry.remove(BLOCK_ENTITY_DATA);
        if entry.is_empty() {
            self.entries.remove(&index);
        }
        removed
    }

    /// Drops the whole entry at `index`.
    pub(crate) fn remove_entry(&mut self, index: usize) -> bool {
        self.entries.remove(&index).is_some()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &HashMap<String, Tag>)> {
        self.entries.iter().map(|(&index, entry)| (index, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn chest() -> Tag {
        let mut map = HashMap::new();
        map.insert("id".to_string(), Tag::String("Chest".to_string()));
        map.insert("Items".to_string(), Tag::List(vec![]));
        Tag::Compound(map)
    }

    #[test]
    fn test_set_writes_relative_position() {
        let mut store = BlockEntityStore::new();
        store.set(5, chest(), BlockPos::new(1, -2, 3)).unwrap();

        let data = store.get(5).unwrap().as_compound().unwrap();
        assert_eq!(data.get("x"), Some(&Tag::Int(1)));
        assert_eq!(data.get("y"), Some(&Tag::Int(-2)));
        assert_eq!(data.get("z"), Some(&Tag::Int(3)));
        assert_eq!(data.get("id"), Some(&Tag::String("Chest".to_string())));
        assert_eq!(store.get(4), None);
    }

    #[test]
    fn test_set_rejects_non_compound() {
        let mut store = BlockEntityStore::new();
        let result = store.set(0, Tag::Int(1), BlockPos::default());
        assert_matches!(result, Err(ShulkerError::InvalidBlockData(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_keeps_sibling_keys() {
        let mut tick_queue = HashMap::new();
        tick_queue.insert("tick_queue_data".to_string(), Tag::List(vec![]));
        let mut entries = BTreeMap::new();
        entries.insert(2, tick_queue);
        let mut store = BlockEntityStore::from_entries(entries);

        assert_eq!(store.get(2), None);
        store.set(2, chest(), BlockPos::default()).unwrap();
        assert!(store.get(2).is_some());

        let removed = store.remove(2);
        assert!(removed.is_some());
        // tick_queue_data is still there, so the entry stays
        assert!(store.contains(2));
        assert!(store.remove_entry(2));
        assert!(!store.contains(2));
    }

    #[test]
    fn test_remove_drops_empty_entry() {
        let mut store = BlockEntityStore::new();
        store.set(7, chest(), BlockPos::default()).unwrap();
        assert!(store.remove(7).is_some());
        assert!(store.is_empty());
        assert_eq!(store.remove(7), None);
    }
}
