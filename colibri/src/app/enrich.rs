use std::path::Path;

use h3o::Resolution;

use crate::pipeline::enrich::enrich_trace_file;
use crate::pipeline::PipelineError;

pub fn run(
    input_file: &str,
    output_file: &str,
    resolution: Resolution,
    chunk_size: usize,
) -> Result<(), PipelineError> {
    log::info!(
        "enriching '{input_file}' at resolution {} with chunk size {chunk_size}",
        u8::from(resolution)
    );
    let summary = enrich_trace_file(
        Path::new(input_file),
        Path::new(output_file),
        resolution,
        chunk_size,
    )?;
    if summary.unknown_cells > 0 {
        log::warn!(
            "{} rows could not be placed on the cell grid",
            summary.unknown_cells
        );
    }
    Ok(())
}
