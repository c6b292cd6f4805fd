mod enrich_ops;

pub use enrich_ops::{enrich_trace_file, EnrichmentSummary, CELL_COLUMN, DEFAULT_CHUNK_SIZE, UNKNOWN_CELL};
