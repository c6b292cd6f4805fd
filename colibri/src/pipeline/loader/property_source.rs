use std::path::Path;

use colibri_core::model::record::PropertyRecord;
use h3o::Resolution;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;

/// a raw property listing row. `area_m2` and `property_type` columns are
/// optional in the source exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListingRow {
    pub lat: f64,
    pub lon: f64,
    pub price: f64,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub property_type: Option<String>,
}

/// reads the property listing file into indexed records. malformed rows,
/// non-positive prices, and un-indexable coordinates are dropped and counted.
pub fn read_property_file(
    path: &Path,
    resolution: Resolution,
) -> Result<Vec<PropertyRecord>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| PipelineError::ReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut listings: Vec<PropertyRecord> = vec![];
    let mut skipped: u64 = 0;
    for row in reader.deserialize::<RawListingRow>() {
        match row {
            Err(_) => skipped += 1,
            Ok(raw) => match try_into_listing(raw, resolution) {
                Some(listing) => listings.push(listing),
                None => skipped += 1,
            },
        }
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} property rows with missing or invalid values");
    }
    if listings.is_empty() {
        return Err(PipelineError::EmptyDataset(format!(
            "no usable property listings in '{}'",
            path.display()
        )));
    }
    log::info!(
        "loaded {} property listings from '{}'",
        listings.len(),
        path.display()
    );
    Ok(listings)
}

fn try_into_listing(raw: RawListingRow, resolution: Resolution) -> Option<PropertyRecord> {
    if !raw.price.is_finite() || raw.price <= 0.0 {
        return None;
    }
    let area = raw.area_m2.filter(|a| a.is_finite() && *a > 0.0);
    PropertyRecord::new(raw.lat, raw.lon, raw.price, area, raw.property_type, resolution).ok()
}
