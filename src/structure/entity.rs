use shulker_common::{Position, Result, ShulkerError};
use shulker_nbt::Tag;

/// Identity field written into every summoned entity.
pub const UNIQUE_ID: &str = "UniqueID";
pub const POS: &str = "Pos";

/// Identity of an entity record, if it carries one.
pub fn entity_id(entity: &Tag) -> Option<i64> {
    entity.as_compound()?.get(UNIQUE_ID)?.as_i64()
}

/// Ordered entity records plus the structure-local id counter.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRegistry {
    entities: Vec<Tag>,
    // None once i64::MAX has been handed out
    next_id: Option<i64>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        EntityRegistry {
            entities: Vec::new(),
            next_id: Some(0),
        }
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        EntityRegistry::default()
    }

    /// Adopts entities loaded from a file. The counter resumes past the
    /// largest id already present so new ids never collide with them. If
    /// that id is `i64::MAX` no further ids can be issued.
    pub(crate) fn from_entities(entities: Vec<Tag>) -> Self {
        let next_id = match entities.iter().filter_map(entity_id).max() {
            Some(max) => max.checked_add(1).map(|id| id.max(0)),
            None => Some(0),
        };
        EntityRegistry { entities, next_id }
    }

    /// Id the next `summon` will assign, `None` when the id space is used up.
    pub fn next_id(&self) -> Option<i64> {
        self.next_id
    }

    /// Appends `entity` under a fresh id. `position`, if given, is written
    /// as the `Pos` list and must already be normalized.
    pub fn summon(&mut self, mut entity: Tag, position: Option<Position>) -> Result<i64> {
        let id = self.next_id.ok_or(ShulkerError::EntityIdsExhausted)?;
        let type_id = entity.get_type_id();
        let fields = entity
            .as_compound_mut()
            .ok_or_else(|| ShulkerError::InvalidField {
                field: "structure.entities",
                reason: format!("entity must be a compound, got tag type {}", type_id),
            })?;

        if let Some(pos) = position {
            fields.insert(
                POS.to_string(),
                Tag::List(vec![
                    Tag::Float(pos.x as f32),
                    Tag::Float(pos.y as f32),
                    Tag::Float(pos.z as f32),
                ]),
            );
        }

        fields.insert(UNIQUE_ID.to_string(), Tag::Long(id));
        self.entities.push(entity);
        self.next_id = id.checked_add(1);
        Ok(id)
    }

    /// First entity with the given id, in insertion order.
    pub fn get(&self, id: i64) -> Option<&Tag> {
        self.entities.iter().find(|entity| entity_id(entity) == Some(id))
    }

    /// Removes and returns the first entity with the given id. At most one
    /// record is removed even if several share the id.
    pub fn kill(&mut self, id: i64) -> Option<Tag> {
        let index = self
            .entities
            .iter()
            .position(|entity| entity_id(entity) == Some(id))?;
        Some(self.entities.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.entities.iter()
    }

    pub fn as_slice(&self) -> &[Tag] {
        &self.entities
    }
}
