//! Mapping between [`Structure`] and its NBT tree.
//!
//! ```text
//! {
//!   format_version: Int
//!   size: [Int; 3]
//!   structure_world_origin: [Int; 3]
//!   structure: {
//!     block_indices: [[Int; volume]; 2]     primary, secondary; -1 = empty
//!     entities: [Compound]
//!     palette: {
//!       default: {
//!         block_palette: [Compound]
//!         block_position_data: { "<index>": { block_entity_data: Compound, .. } }
//!       }
//!     }
//!   }
//! }
//! ```

use super::block_entity::BlockEntityStore;
use super::entity::EntityRegistry;
use super::grid::{VoxelGrid, EMPTY};
use super::indexer::CoordinateIndexer;
use super::palette::BlockPalette;
use super::{validate_size, Layer, Structure};
use crate::options::{Compression, StructureOptions};
use shulker_common::{BlockPos, Result, ShulkerError};
use shulker_logger::{log, LogSeverity::Debug};
use shulker_nbt::{NBTFile, Tag};
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};

type Compound = HashMap<String, Tag>;

// Full field paths, used in error reports
const ROOT: &str = "<root>";
const SIZE: &str = "size";
const ORIGIN: &str = "structure_world_origin";
const FORMAT_VERSION: &str = "format_version";
const STRUCTURE: &str = "structure";
const BLOCK_INDICES: &str = "structure.block_indices";
const ENTITIES: &str = "structure.entities";
const PALETTE: &str = "structure.palette";
const PALETTE_DEFAULT: &str = "structure.palette.default";
const BLOCK_PALETTE: &str = "structure.palette.default.block_palette";
const BLOCK_POSITION_DATA: &str = "structure.palette.default.block_position_data";

fn invalid(field: &'static str, reason: impl Into<String>) -> ShulkerError {
    ShulkerError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn get<'a>(compound: &'a Compound, key: &str, path: &'static str) -> Result<&'a Tag> {
    compound.get(key).ok_or(ShulkerError::MissingField(path))
}

fn get_compound<'a>(compound: &'a Compound, key: &str, path: &'static str) -> Result<&'a Compound> {
    get(compound, key, path)?
        .as_compound()
        .ok_or_else(|| invalid(path, "expected a compound"))
}

fn get_list<'a>(compound: &'a Compound, key: &str, path: &'static str) -> Result<&'a [Tag]> {
    get(compound, key, path)?
        .as_list()
        .map(Vec::as_slice)
        .ok_or_else(|| invalid(path, "expected a list"))
}

fn get_int(compound: &Compound, key: &str, path: &'static str) -> Result<i32> {
    get(compound, key, path)?
        .as_i32()
        .ok_or_else(|| invalid(path, "expected an Int"))
}

fn int_values(list: &[Tag], path: &'static str) -> Result<Vec<i32>> {
    list.iter()
        .map(|tag| tag.as_i32().ok_or_else(|| invalid(path, "expected Int elements")))
        .collect()
}

fn get_int_triple(compound: &Compound, key: &str, path: &'static str) -> Result<[i32; 3]> {
    let list = get_list(compound, key, path)?;
    match int_values(list, path)?.as_slice() {
        &[x, y, z] => Ok([x, y, z]),
        other => Err(ShulkerError::LengthMismatch {
            field: path,
            expected: 3,
            actual: other.len(),
        }),
    }
}

fn compounds(list: &[Tag], path: &'static str) -> Result<Vec<Tag>> {
    list.iter()
        .map(|tag| match tag {
            Tag::Compound(_) => Ok(tag.clone()),
            other => Err(invalid(
                path,
                format!("expected Compound elements, got tag type {}", other.get_type_id()),
            )),
        })
        .collect()
}

fn decode_layer(tag: &Tag, volume: usize, palette_len: usize) -> Result<Vec<i32>> {
    let cells = tag
        .as_list()
        .ok_or_else(|| invalid(BLOCK_INDICES, "expected a list per layer"))?;
    if cells.len() != volume {
        return Err(ShulkerError::LengthMismatch {
            field: BLOCK_INDICES,
            expected: volume,
            actual: cells.len(),
        });
    }
    let cells = int_values(cells, BLOCK_INDICES)?;
    if let Some(&index) = cells
        .iter()
        .find(|&&cell| cell < EMPTY || (cell != EMPTY && cell as usize >= palette_len))
    {
        return Err(ShulkerError::InvalidPaletteIndex { index, palette_len });
    }
    Ok(cells)
}

fn decode_block_position_data(
    section: &Compound,
    volume: usize,
) -> Result<BTreeMap<usize, Compound>> {
    let Some(data) = section.get("block_position_data") else {
        return Ok(BTreeMap::new());
    };
    let data = data
        .as_compound()
        .ok_or_else(|| invalid(BLOCK_POSITION_DATA, "expected a compound"))?;

    let mut entries = BTreeMap::new();
    for (key, value) in data {
        let index = key
            .parse::<usize>()
            .ok()
            .filter(|&index| index < volume)
            .ok_or_else(|| {
                invalid(
                    BLOCK_POSITION_DATA,
                    format!("key {:?} is not a voxel index below {}", key, volume),
                )
            })?;
        let entry = value.as_compound().ok_or_else(|| {
            invalid(BLOCK_POSITION_DATA, format!("entry {} is not a compound", key))
        })?;
        entries.insert(index, entry.clone());
    }
    Ok(entries)
}

/// Builds a structure from its tree using the default options.
pub fn decode(tree: &Tag) -> Result<Structure> {
    decode_with(tree, &StructureOptions::default())
}

/// Builds a structure from its tree. Every field is validated here; a
/// failure returns no partial structure.
///
/// The active layer and addressing policy are not part of the file: the
/// result starts on [`Layer::Primary`] with `options.addressing`, so it
/// compares equal to the encoded structure only if that had the same modes.
pub fn decode_with(tree: &Tag, options: &StructureOptions) -> Result<Structure> {
    let root = tree
        .as_compound()
        .ok_or_else(|| invalid(ROOT, "expected a compound"))?;

    let [x, y, z] = get_int_triple(root, "size", SIZE)?;
    let size = validate_size(x, y, z)?;
    let volume = size.volume() as usize;
    let [ox, oy, oz] = get_int_triple(root, "structure_world_origin", ORIGIN)?;
    let format_version = get_int(root, "format_version", FORMAT_VERSION)?;

    let body = get_compound(root, "structure", STRUCTURE)?;
    let palette_section = get_compound(
        get_compound(body, "palette", PALETTE)?,
        "default",
        PALETTE_DEFAULT,
    )?;
    let palette = compounds(
        get_list(palette_section, "block_palette", BLOCK_PALETTE)?,
        BLOCK_PALETTE,
    )?;

    let layers = get_list(body, "block_indices", BLOCK_INDICES)?;
    let [primary, secondary] = layers else {
        return Err(ShulkerError::LengthMismatch {
            field: BLOCK_INDICES,
            expected: 2,
            actual: layers.len(),
        });
    };
    let primary = decode_layer(primary, volume, palette.len())?;
    let secondary = decode_layer(secondary, volume, palette.len())?;

    let entities = compounds(get_list(body, "entities", ENTITIES)?, ENTITIES)?;
    let block_entities = decode_block_position_data(palette_section, volume)?;

    let structure = Structure {
        indexer: CoordinateIndexer::new(size, options.addressing),
        origin: BlockPos::new(ox, oy, oz),
        format_version,
        grid: VoxelGrid::from_layers(primary, secondary),
        palette: BlockPalette::from_entries(palette),
        block_entities: BlockEntityStore::from_entries(block_entities),
        entities: EntityRegistry::from_entities(entities),
        active_layer: Layer::Primary,
    };

    log(
        format!(
            "Decoded {}x{}x{} structure: {} palette entries, {} block entities, {} entities",
            x,
            y,
            z,
            structure.palette.len(),
            structure.block_entities.len(),
            structure.entities.len()
        ),
        Debug,
    );
    Ok(structure)
}

fn int_list(values: &[i32]) -> Tag {
    Tag::List(values.iter().map(|&value| Tag::Int(value)).collect())
}

/// Produces the tree for `structure`, the exact inverse of [`decode`].
pub fn encode(structure: &Structure) -> Tag {
    let size = structure.size();
    let origin = structure.origin;

    let block_position_data: Compound = structure
        .block_entities
        .iter()
        .map(|(index, entry)| (index.to_string(), Tag::Compound(entry.clone())))
        .collect();

    let mut palette_section = HashMap::new();
    palette_section.insert(
        "block_palette".to_string(),
        Tag::List(structure.palette.entries().to_vec()),
    );
    palette_section.insert(
        "block_position_data".to_string(),
        Tag::Compound(block_position_data),
    );

    let mut palette = HashMap::new();
    palette.insert("default".to_string(), Tag::Compound(palette_section));

    let mut body = HashMap::new();
    body.insert(
        "block_indices".to_string(),
        Tag::List(
            Layer::ALL
                .iter()
                .map(|&layer| int_list(structure.grid.layer(layer)))
                .collect(),
        ),
    );
    body.insert(
        "entities".to_string(),
        Tag::List(structure.entities.as_slice().to_vec()),
    );
    body.insert("palette".to_string(), Tag::Compound(palette));

    let mut root = HashMap::new();
    root.insert(
        "format_version".to_string(),
        Tag::Int(structure.format_version),
    );
    // Dimensions were validated as non-negative i32 on the way in
    root.insert(
        "size".to_string(),
        int_list(&[size.x as i32, size.y as i32, size.z as i32]),
    );
    root.insert(
        "structure_world_origin".to_string(),
        int_list(&[origin.x, origin.y, origin.z]),
    );
    root.insert("structure".to_string(), Tag::Compound(body));

    log(
        format!(
            "Encoded {}x{}x{} structure with {} palette entries",
            size.x,
            size.y,
            size.z,
            structure.palette.len()
        ),
        Debug,
    );
    Tag::Compound(root)
}

impl Structure {
    pub fn from_tag(tree: &Tag) -> Result<Self> {
        decode(tree)
    }

    pub fn to_tag(&self) -> Tag {
        encode(self)
    }

    /// Reads a structure file, framed as `options` describe.
    pub fn read_from<R: Read>(reader: &mut R, options: &StructureOptions) -> Result<Self> {
        let file = match options.compression {
            Compression::None => NBTFile::read(reader, options.byte_order)?,
            Compression::Gzip => NBTFile::read_gzip(reader, options.byte_order)?,
        };
        decode_with(&file.root, options)
    }

    /// Writes a structure file with an unnamed root, framed as `options`
    /// describe.
    pub fn write_to<W: Write>(&self, writer: &mut W, options: &StructureOptions) -> Result<()> {
        let file = NBTFile::new(String::new(), encode(self));
        match options.compression {
            Compression::None => file.write(writer, options.byte_order)?,
            Compression::Gzip => file.write_gzip(writer, options.byte_order)?,
        }
        Ok(())
    }
}
