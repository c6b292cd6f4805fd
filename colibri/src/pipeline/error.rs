use std::path::PathBuf;

use arrow::error::ArrowError;
use colibri_core::model::cell::LocationError;
use parquet::errors::ParquetError;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidUserInput(String),
    #[error("Error reading from '{path}': {message}")]
    ReadError { path: PathBuf, message: String },
    #[error("Error writing to '{path}': {message}")]
    WriteError { path: PathBuf, message: String },
    #[error("Failed to open Parquet reader: {source}")]
    ParquetReaderError { source: ParquetError },
    #[error("Failed to write Parquet output: {source}")]
    ParquetWriteError { source: ParquetError },
    #[error("Failed to retrieve record batch from source: {source}")]
    RecordBatchRetrievalError { source: ArrowError },
    #[error("Failed to deserialize record batch into native type record: {0}")]
    DeserializeError(String),
    #[error("Required column is missing or has the wrong type: {0}")]
    ColumnError(String),
    #[error("Error writing to csv: {0}")]
    CsvWriteError(String),
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),
    #[error("Failed to fit regression model: {0}")]
    RegressionError(String),
    #[error(transparent)]
    LocationError(#[from] LocationError),
    #[error("{0}")]
    InternalError(String),
}
