use h3o::CellIndex;
use serde::{Deserialize, Serialize};

use crate::model::cell::{cell_ops, LocationError};

/// a labeled cost-of-living value for one cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetRecord {
    #[serde(with = "crate::model::cell::hex_id")]
    pub cell: CellIndex,
    pub cost_of_living: f64,
}

impl TargetRecord {
    /// builds a target from the hex-string cell identifier used by the
    /// labeled dataset.
    pub fn from_hex(hex_id: &str, cost_of_living: f64) -> Result<TargetRecord, LocationError> {
        let cell = cell_ops::cell_from_hex(hex_id)?;
        Ok(TargetRecord {
            cell,
            cost_of_living,
        })
    }
}
