#![allow(dead_code)]

use shulker::{BlockPos, Layer, Structure, Tag};
use std::collections::HashMap;

pub fn block(name: &str) -> Tag {
    block_with_states(name, HashMap::new())
}

pub fn block_with_states(name: &str, states: HashMap<String, Tag>) -> Tag {
    let mut map = HashMap::new();
    map.insert("name".to_string(), Tag::String(name.to_string()));
    map.insert("states".to_string(), Tag::Compound(states));
    map.insert("version".to_string(), Tag::Int(18090528));
    Tag::Compound(map)
}

pub fn air() -> Tag {
    block("minecraft:air")
}

pub fn stone() -> Tag {
    block("minecraft:stone")
}

pub fn dirt() -> Tag {
    block("minecraft:dirt")
}

pub fn entity(identifier: &str) -> Tag {
    let mut map = HashMap::new();
    map.insert(
        "identifier".to_string(),
        Tag::String(identifier.to_string()),
    );
    Tag::Compound(map)
}

/// Every voxel position of `structure`, in index order.
pub fn positions(structure: &Structure) -> Vec<BlockPos> {
    (0..structure.volume())
        .map(|index| structure.indexer().position_of(index).unwrap())
        .collect()
}

/// Descriptor at every voxel of both layers, cloned so it outlives edits.
pub fn snapshot(structure: &Structure) -> Vec<(Option<Tag>, Option<Tag>)> {
    positions(structure)
        .into_iter()
        .map(|pos| {
            (
                structure.get_block_in(Layer::Primary, pos).cloned(),
                structure.get_block_in(Layer::Secondary, pos).cloned(),
            )
        })
        .collect()
}

/// A small structure touching every part of the model.
pub fn furnished_room() -> Structure {
    let mut structure = Structure::new(4, 3, 2).unwrap();
    structure.set_origin(BlockPos::new(100, 60, -40));
    structure.fill(BlockPos::new(0, 0, 0), BlockPos::new(3, 0, 1), stone());
    structure.fill(BlockPos::new(0, 1, 0), BlockPos::new(3, 2, 1), air());

    let mut facing = HashMap::new();
    facing.insert(
        "minecraft:cardinal_direction".to_string(),
        Tag::String("north".to_string()),
    );
    let chest = block_with_states("minecraft:chest", facing);
    structure.set_block(BlockPos::new(1, 1, 1), chest);

    let mut items = HashMap::new();
    items.insert("id".to_string(), Tag::String("Chest".to_string()));
    items.insert("Items".to_string(), Tag::List(vec![]));
    structure
        .set_block_data(BlockPos::new(1, 1, 1), Tag::Compound(items))
        .unwrap();

    structure.set_active_layer(Layer::Secondary);
    structure.set_block(BlockPos::new(2, 1, 0), block("minecraft:water"));
    structure.set_active_layer(Layer::Primary);

    structure
        .summon(entity("minecraft:armor_stand"), Some((1.5, 1.0, 0.5).into()))
        .unwrap();
    structure
        .summon(entity("minecraft:pig"), None)
        .unwrap();
    structure
}
