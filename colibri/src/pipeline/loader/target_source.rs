use std::path::Path;

use colibri_core::model::record::TargetRecord;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;

/// a labeled row of the cost-of-living dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTargetRow {
    pub hex_id: String,
    pub cost_of_living: f64,
}

/// reads the labeled cost-of-living file. rows whose cell identifier does
/// not parse or whose value is not finite are dropped and counted.
pub fn read_target_file(path: &Path) -> Result<Vec<TargetRecord>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| PipelineError::ReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut targets: Vec<TargetRecord> = vec![];
    let mut skipped: u64 = 0;
    for row in reader.deserialize::<RawTargetRow>() {
        match row {
            Err(_) => skipped += 1,
            Ok(raw) if !raw.cost_of_living.is_finite() => skipped += 1,
            Ok(raw) => match TargetRecord::from_hex(&raw.hex_id, raw.cost_of_living) {
                Ok(target) => targets.push(target),
                Err(_) => skipped += 1,
            },
        }
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} labeled rows with invalid cell identifiers or values");
    }
    if targets.is_empty() {
        return Err(PipelineError::EmptyDataset(format!(
            "no usable cost-of-living labels in '{}'",
            path.display()
        )));
    }
    log::info!(
        "loaded {} cost-of-living labels from '{}'",
        targets.len(),
        path.display()
    );
    Ok(targets)
}

#[cfg(test)]
mod test {
    use super::*;
    use colibri_core::model::cell::cell_ops::{cell_from_coord, DEFAULT_RESOLUTION};
    use std::io::Write;

    #[test]
    fn test_read_skips_bad_cell_ids() {
        let cell = cell_from_coord(-0.18, -78.47, DEFAULT_RESOLUTION).unwrap();
        let path = std::env::temp_dir().join(format!(
            "colibri-target-fixture-{}.csv",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "hex_id,cost_of_living").unwrap();
        writeln!(file, "{cell},412.5").unwrap();
        writeln!(file, "not-a-cell,300.0").unwrap();
        drop(file);

        let targets = read_target_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].cell, cell);
        assert_eq!(targets[0].cost_of_living, 412.5);
    }
}
