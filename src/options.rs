use serde::Deserialize;
use shulker_common::{Result, ShulkerError};
use shulker_nbt::Endianness;

use crate::structure::AddressingPolicy;

/// Outer framing of a structure file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

/// Settings for building, loading and saving structures.
///
/// Every field has a default matching Bedrock `.mcstructure` files, so a
/// config only needs to name what it changes:
///
/// ```
/// use shulker::{AddressingPolicy, StructureOptions};
///
/// let options = StructureOptions::from_json(r#"{ "addressing": "wrap" }"#).unwrap();
/// assert_eq!(options.addressing, AddressingPolicy::Wrap);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StructureOptions {
    pub addressing: AddressingPolicy,
    pub byte_order: Endianness,
    pub compression: Compression,
}

impl StructureOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ShulkerError::ConfigError(e.to_string()))
    }
}
