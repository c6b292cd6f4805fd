use std::path::Path;

use colibri_core::model::feature::LocationFeatureVector;

use crate::pipeline::config::PipelineConfig;
use crate::pipeline::features::{build_location_features, FeatureBuilderParams};
use crate::pipeline::loader;
use crate::pipeline::PipelineError;

/// loads both datasets, derives one feature vector per observed cell, and
/// writes them to features.csv in the output directory.
pub fn run(config: &PipelineConfig, output_directory: &Path) -> Result<(), PipelineError> {
    let features = build_features(config)?;
    let out_path = output_directory.join("features.csv");
    write_features(&features, &out_path)?;
    log::info!(
        "wrote {} location feature vectors to '{}'",
        features.len(),
        out_path.display()
    );
    Ok(())
}

/// shared by the features and evaluate operations.
pub fn build_features(config: &PipelineConfig) -> Result<Vec<LocationFeatureVector>, PipelineError> {
    let resolution = config.features.resolution()?;
    let records = loader::read_mobility_file(Path::new(&config.input.mobility_file), resolution)?;
    let listings = loader::read_property_file(Path::new(&config.input.property_file), resolution)?;
    let params = FeatureBuilderParams {
        price_rings: config.features.price_rings(),
        price_aggregation: config.features.price_aggregation(),
    };
    build_location_features(&records, &listings, &params)
}

pub fn write_features(
    features: &[LocationFeatureVector],
    path: &Path,
) -> Result<(), PipelineError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| PipelineError::WriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    for row in features.iter() {
        writer
            .serialize(row)
            .map_err(|e| PipelineError::CsvWriteError(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| PipelineError::CsvWriteError(e.to_string()))?;
    Ok(())
}
