use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use h3o::{LatLng, Resolution};
use kdam::{Bar, BarExt};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

use crate::pipeline::PipelineError;

/// name of the appended cell column.
pub const CELL_COLUMN: &str = "h3_index";

/// sentinel written when a row's coordinates cannot be placed on the cell grid.
pub const UNKNOWN_CELL: &str = "unknown";

/// rows processed per chunk when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 1_000_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub rows_written: u64,
    pub unknown_cells: u64,
    pub chunks: u64,
}

/// copies the mobility trace file chunk by chunk, appending a string column
/// with each row's cell identifier. rows whose coordinates cannot be indexed
/// get the `"unknown"` sentinel instead of being dropped, so the output row
/// count always matches the input. all input columns are carried through
/// unchanged.
pub fn enrich_trace_file(
    input: &Path,
    output: &Path,
    resolution: Resolution,
    chunk_size: usize,
) -> Result<EnrichmentSummary, PipelineError> {
    let in_file = File::open(input).map_err(|e| PipelineError::ReadError {
        path: input.to_path_buf(),
        message: e.to_string(),
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(in_file)
        .map_err(|source| PipelineError::ParquetReaderError { source })?;
    let total_rows = builder.metadata().file_metadata().num_rows().max(0) as usize;
    log::info!("total rows: {total_rows}");
    let reader = builder
        .with_batch_size(chunk_size.max(1))
        .build()
        .map_err(|source| PipelineError::ParquetReaderError { source })?;

    let mut bar = Bar::builder()
        .desc("enrich mobility traces")
        .total(total_rows)
        .build()
        .map_err(|e| {
            PipelineError::InternalError(format!("failure building progress bar: {e}"))
        })?;

    // the writer is created from the first enriched chunk's schema
    let mut writer: Option<ArrowWriter<File>> = None;
    let mut summary = EnrichmentSummary::default();
    for batch_result in reader {
        let batch =
            batch_result.map_err(|source| PipelineError::RecordBatchRetrievalError { source })?;
        let enriched = append_cell_column(&batch, resolution, &mut summary.unknown_cells)?;
        let out = match writer.as_mut() {
            Some(out) => out,
            None => {
                let out_file = File::create(output).map_err(|e| PipelineError::WriteError {
                    path: output.to_path_buf(),
                    message: e.to_string(),
                })?;
                let out = ArrowWriter::try_new(out_file, enriched.schema(), None)
                    .map_err(|source| PipelineError::ParquetWriteError { source })?;
                writer.insert(out)
            }
        };
        out.write(&enriched)
            .map_err(|source| PipelineError::ParquetWriteError { source })?;
        summary.rows_written += enriched.num_rows() as u64;
        summary.chunks += 1;
        let _ = bar.update(enriched.num_rows());
    }
    eprintln!();

    match writer {
        Some(out) => {
            out.close()
                .map_err(|source| PipelineError::ParquetWriteError { source })?;
        }
        None => {
            log::warn!(
                "input '{}' contained no record batches, no output written",
                input.display()
            );
        }
    }
    log::info!(
        "wrote {} enriched rows in {} chunks ({} unknown cells) to '{}'",
        summary.rows_written,
        summary.chunks,
        summary.unknown_cells,
        output.display()
    );
    Ok(summary)
}

fn append_cell_column(
    batch: &RecordBatch,
    resolution: Resolution,
    unknown_count: &mut u64,
) -> Result<RecordBatch, PipelineError> {
    let lat = float_column(batch, "lat")?;
    let lon = float_column(batch, "lon")?;
    let mut cells: Vec<String> = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        if lat.is_null(i) || lon.is_null(i) {
            *unknown_count += 1;
            cells.push(String::from(UNKNOWN_CELL));
            continue;
        }
        match LatLng::new(lat.value(i), lon.value(i)) {
            Ok(coord) => cells.push(coord.to_cell(resolution).to_string()),
            Err(_) => {
                *unknown_count += 1;
                cells.push(String::from(UNKNOWN_CELL));
            }
        }
    }

    let mut fields: Vec<FieldRef> = batch.schema().fields().iter().cloned().collect();
    fields.push(Arc::new(Field::new(CELL_COLUMN, DataType::Utf8, false)));
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
    columns.push(Arc::new(StringArray::from(cells)));
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(|e| {
        PipelineError::InternalError(format!("failure assembling enriched record batch: {e}"))
    })
}

fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array, PipelineError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| {
            PipelineError::ColumnError(format!("column '{name}' not found in mobility schema"))
        })?
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| {
            PipelineError::ColumnError(format!("column '{name}' is not a 64-bit float column"))
        })
}
