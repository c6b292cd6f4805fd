//! serde adapter serializing a [`CellIndex`] as its hex string form, the
//! identifier format used by the labeled dataset and all CSV outputs.

use h3o::CellIndex;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(cell: &CellIndex, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(cell)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<CellIndex, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<CellIndex>().map_err(serde::de::Error::custom)
}
