use std::path::Path;

use colibri_core::model::cell::cell_ops::{
    resolution_from_u8, DEFAULT_RESOLUTION, DEFAULT_RING_DISTANCES,
};
use colibri_core::model::feature::PriceAggregation;
use config::{Config, File};
use h3o::Resolution;
use serde::{Deserialize, Serialize};

use super::PipelineError;

/// input files for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// columnar mobility trace file (parquet)
    pub mobility_file: String,
    /// delimited property listing file (csv)
    pub property_file: String,
    /// labeled cost-of-living file (csv with hex_id, cost_of_living columns)
    pub target_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeatureConfig {
    // cell grid resolution. defaults to 8
    resolution: Option<u8>,
    // grid distances used for listing price imputation. defaults to [1, 2, 3, 4]
    price_rings: Option<Vec<u32>>,
    // defaults to mean
    price_aggregation: Option<PriceAggregation>,
}

impl FeatureConfig {
    pub fn resolution(&self) -> Result<Resolution, PipelineError> {
        match self.resolution {
            None => Ok(DEFAULT_RESOLUTION),
            Some(value) => resolution_from_u8(value).map_err(PipelineError::from),
        }
    }

    pub fn price_rings(&self) -> Vec<u32> {
        self.price_rings
            .clone()
            .unwrap_or_else(|| DEFAULT_RING_DISTANCES.to_vec())
    }

    pub fn price_aggregation(&self) -> PriceAggregation {
        self.price_aggregation.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelConfig {
    // held-out fraction of labeled locations. defaults to 0.2
    test_ratio: Option<f64>,
    // seed for the train/test shuffle. defaults to 0
    seed: Option<u64>,
}

impl ModelConfig {
    pub fn test_ratio(&self) -> f64 {
        self.test_ratio.unwrap_or(0.2)
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

impl PipelineConfig {
    /// reads a pipeline configuration from a TOML file.
    pub fn from_file(configuration_file: &str) -> Result<PipelineConfig, PipelineError> {
        let filepath = Path::new(configuration_file);
        let config = Config::builder()
            .add_source(File::from(filepath))
            .build()
            .map_err(|e| {
                let msg = format!("file '{configuration_file}' produced error: {e}");
                PipelineError::InvalidUserInput(msg)
            })?;
        let input = config.get::<InputConfig>("input").map_err(|e| {
            let msg = format!("error reading 'input' section in '{configuration_file}': {e}");
            PipelineError::InvalidUserInput(msg)
        })?;
        let features = config
            .get::<Option<FeatureConfig>>("features")
            .map_err(|e| {
                let msg =
                    format!("error reading 'features' section in '{configuration_file}': {e}");
                PipelineError::InvalidUserInput(msg)
            })?
            .unwrap_or_default();
        let model = config
            .get::<Option<ModelConfig>>("model")
            .map_err(|e| {
                let msg = format!("error reading 'model' section in '{configuration_file}': {e}");
                PipelineError::InvalidUserInput(msg)
            })?
            .unwrap_or_default();
        Ok(PipelineConfig {
            input,
            features,
            model,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_feature_defaults() {
        let config = FeatureConfig::default();
        assert_eq!(config.resolution().unwrap(), DEFAULT_RESOLUTION);
        assert_eq!(config.price_rings(), vec![1, 2, 3, 4]);
        assert_eq!(config.price_aggregation(), PriceAggregation::Mean);
    }

    #[test]
    fn test_feature_config_rejects_bad_resolution() {
        let config = FeatureConfig {
            resolution: Some(42),
            ..Default::default()
        };
        assert!(config.resolution().is_err());
    }

    #[test]
    fn test_model_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.test_ratio(), 0.2);
        assert_eq!(config.seed(), 0);
    }
}
