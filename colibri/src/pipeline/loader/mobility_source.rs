use std::fs::File;
use std::path::Path;

use chrono::DateTime;
use colibri_core::model::record::MobilityRecord;
use h3o::Resolution;
use kdam::{Bar, BarExt};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;

/// a raw mobility trace row as stored in the parquet file. every field is
/// nullable at the source; rows missing a required value are skipped by the
/// loader. an `h3_index` column from a prior enrichment run may be present
/// and is ignored here, since cells are recomputed at the configured
/// resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTraceRow {
    pub device_id: Option<String>,
    /// epoch seconds, UTC
    pub timestamp: Option<i64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// reads the mobility trace file into indexed records, batch by batch.
/// rows with missing values, out-of-range timestamps, or coordinates that
/// cannot be placed on the cell grid are dropped and counted.
pub fn read_mobility_file(
    path: &Path,
    resolution: Resolution,
) -> Result<Vec<MobilityRecord>, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::ReadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|source| PipelineError::ParquetReaderError { source })?;
    let total_rows = builder.metadata().file_metadata().num_rows().max(0) as usize;
    let reader = builder
        .build()
        .map_err(|source| PipelineError::ParquetReaderError { source })?;

    let mut bar = Bar::builder()
        .desc("read mobility traces")
        .total(total_rows)
        .build()
        .map_err(|e| {
            PipelineError::InternalError(format!("failure building progress bar: {e}"))
        })?;

    let mut records: Vec<MobilityRecord> = Vec::with_capacity(total_rows);
    let mut skipped: u64 = 0;
    for batch_result in reader {
        let batch =
            batch_result.map_err(|source| PipelineError::RecordBatchRetrievalError { source })?;
        let rows: Vec<RawTraceRow> = serde_arrow::from_record_batch(&batch)
            .map_err(|e| PipelineError::DeserializeError(format!("Serde error: {e}")))?;
        let _ = bar.update(rows.len());
        for row in rows {
            match try_into_record(row, resolution) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }
    }
    eprintln!();

    if skipped > 0 {
        log::warn!("skipped {skipped} mobility rows with missing or invalid values");
    }
    if records.is_empty() {
        return Err(PipelineError::EmptyDataset(format!(
            "no usable mobility records in '{}'",
            path.display()
        )));
    }
    log::info!(
        "loaded {} mobility records from '{}'",
        records.len(),
        path.display()
    );
    Ok(records)
}

fn try_into_record(row: RawTraceRow, resolution: Resolution) -> Option<MobilityRecord> {
    let RawTraceRow {
        device_id,
        timestamp,
        lat,
        lon,
    } = row;
    let time = DateTime::from_timestamp(timestamp?, 0)?;
    MobilityRecord::new(device_id?, time, lat?, lon?, resolution).ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use arrow::datatypes::FieldRef;
    use parquet::arrow::ArrowWriter;
    use serde_arrow::schema::{SchemaLike, TracingOptions};

    fn write_fixture(path: &Path, rows: &[RawTraceRow]) {
        let fields = Vec::<FieldRef>::from_type::<RawTraceRow>(TracingOptions::default())
            .expect("test invariant failed: cannot trace trace-row schema");
        let batch = serde_arrow::to_record_batch(&fields, &rows)
            .expect("test invariant failed: cannot build record batch");
        let file = File::create(path).expect("test invariant failed: cannot create fixture file");
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)
            .expect("test invariant failed: cannot open parquet writer");
        writer
            .write(&batch)
            .expect("test invariant failed: cannot write fixture batch");
        writer
            .close()
            .expect("test invariant failed: cannot close parquet writer");
    }

    #[test]
    fn test_read_skips_invalid_rows() {
        let path = std::env::temp_dir().join(format!(
            "colibri-mobility-fixture-{}.parquet",
            std::process::id()
        ));
        let rows = vec![
            RawTraceRow {
                device_id: Some(String::from("device-a")),
                timestamp: Some(1_700_000_000),
                lat: Some(-0.18),
                lon: Some(-78.47),
            },
            RawTraceRow {
                device_id: Some(String::from("device-b")),
                timestamp: Some(1_700_003_600),
                lat: Some(-0.19),
                lon: Some(-78.48),
            },
            // latitude off the globe
            RawTraceRow {
                device_id: Some(String::from("device-c")),
                timestamp: Some(1_700_007_200),
                lat: Some(95.0),
                lon: Some(-78.47),
            },
            // missing device
            RawTraceRow {
                device_id: None,
                timestamp: Some(1_700_010_800),
                lat: Some(-0.18),
                lon: Some(-78.47),
            },
        ];
        write_fixture(&path, &rows);

        let records = read_mobility_file(&path, Resolution::Eight).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].device_id, "device-a");
        assert_eq!(records[0].cell.resolution(), Resolution::Eight);
    }
}
