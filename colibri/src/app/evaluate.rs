use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use colibri_core::model::feature::LocationFeatureVector;
use h3o::CellIndex;
use indexmap::IndexMap;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::pipeline::config::PipelineConfig;
use crate::pipeline::loader;
use crate::pipeline::regression::{
    design_matrix, mean_absolute_error, train_test_split, LinearModel,
};
use crate::pipeline::PipelineError;

/// one held-out location in predictions.csv.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRow {
    #[serde(with = "colibri_core::model::cell::hex_id")]
    pub cell: CellIndex,
    pub cost_of_living: f64,
    pub predicted: f64,
    pub absolute_error: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationSummary {
    pub mae: f64,
    pub locations: usize,
    pub labeled_locations: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub test_ratio: f64,
    pub seed: u64,
    pub intercept: f64,
    pub coefficients: IndexMap<String, f64>,
}

/// loads the datasets, builds features, joins them with the labeled
/// cost-of-living values, fits the regression on a seeded split, and writes
/// predictions.csv and summary.json to the output directory.
pub fn run(config: &PipelineConfig, output_directory: &Path) -> Result<(), PipelineError> {
    let features = crate::app::features::build_features(config)?;
    let targets = loader::read_target_file(Path::new(&config.input.target_file))?;

    let mut target_map: HashMap<CellIndex, f64> = HashMap::new();
    let mut duplicates: u64 = 0;
    for target in targets.iter() {
        if target_map
            .insert(target.cell, target.cost_of_living)
            .is_some()
        {
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        log::warn!("{duplicates} duplicate cost-of-living labels, keeping the last value of each");
    }

    let (summary, predictions) = evaluate_features(
        &features,
        &target_map,
        config.model.test_ratio(),
        config.model.seed(),
    )?;

    log::info!(
        "mean absolute error over {} held-out locations: {:.4}",
        summary.test_size,
        summary.mae
    );

    let predictions_path = output_directory.join("predictions.csv");
    write_predictions(&predictions, &predictions_path)?;
    let summary_path = output_directory.join("summary.json");
    let summary_file = File::create(&summary_path).map_err(|e| PipelineError::WriteError {
        path: summary_path.clone(),
        message: e.to_string(),
    })?;
    serde_json::to_writer_pretty(summary_file, &summary).map_err(|e| {
        PipelineError::WriteError {
            path: summary_path.clone(),
            message: e.to_string(),
        }
    })?;
    log::info!(
        "wrote {} predictions and the evaluation summary to '{}'",
        predictions.len(),
        output_directory.display()
    );
    Ok(())
}

/// fits and scores the model over the labeled subset of `features`. pure with
/// respect to the filesystem so it can be exercised directly.
pub fn evaluate_features(
    features: &[LocationFeatureVector],
    target_map: &HashMap<CellIndex, f64>,
    test_ratio: f64,
    seed: u64,
) -> Result<(EvaluationSummary, Vec<PredictionRow>), PipelineError> {
    let labeled: Vec<(&LocationFeatureVector, f64)> = features
        .iter()
        .filter_map(|f| target_map.get(&f.cell).map(|value| (f, *value)))
        .collect();
    let unmatched = features.len() - labeled.len();
    if unmatched > 0 {
        log::warn!(
            "{unmatched} observed locations have no cost-of-living label and were excluded"
        );
    }
    if labeled.len() < 2 {
        return Err(PipelineError::EmptyDataset(format!(
            "need at least 2 labeled locations to fit and evaluate, found {}",
            labeled.len()
        )));
    }

    let labeled_features: Vec<LocationFeatureVector> =
        labeled.iter().map(|(f, _)| (*f).clone()).collect();
    let (feature_names, x) = design_matrix(&labeled_features)?;
    let y = DVector::from_iterator(labeled.len(), labeled.iter().map(|(_, value)| *value));

    let (train_idx, test_idx) = train_test_split(labeled.len(), test_ratio, seed)?;
    let x_train = select_rows(&x, &train_idx);
    let y_train = select_entries(&y, &train_idx);
    let x_test = select_rows(&x, &test_idx);
    let y_test = select_entries(&y, &test_idx);

    let model = LinearModel::fit(&x_train, &y_train, feature_names)?;
    let predicted = model.predict(&x_test)?;
    let mae = mean_absolute_error(y_test.as_slice(), predicted.as_slice())?;

    let predictions: Vec<PredictionRow> = test_idx
        .iter()
        .enumerate()
        .map(|(row, original)| {
            let actual = y_test[row];
            let estimate = predicted[row];
            PredictionRow {
                cell: labeled_features[*original].cell,
                cost_of_living: actual,
                predicted: estimate,
                absolute_error: (actual - estimate).abs(),
            }
        })
        .collect();

    let summary = EvaluationSummary {
        mae,
        locations: features.len(),
        labeled_locations: labeled.len(),
        train_size: train_idx.len(),
        test_size: test_idx.len(),
        test_ratio,
        seed,
        intercept: model.intercept,
        coefficients: model.coefficient_table(),
    };
    Ok((summary, predictions))
}

fn select_rows(x: &DMatrix<f64>, indices: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(indices.len(), x.ncols(), |i, j| x[(indices[i], j)])
}

fn select_entries(y: &DVector<f64>, indices: &[usize]) -> DVector<f64> {
    DVector::from_iterator(indices.len(), indices.iter().map(|i| y[*i]))
}

fn write_predictions(predictions: &[PredictionRow], path: &Path) -> Result<(), PipelineError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| PipelineError::WriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    for row in predictions.iter() {
        writer
            .serialize(row)
            .map_err(|e| PipelineError::CsvWriteError(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| PipelineError::CsvWriteError(e.to_string()))?;
    Ok(())
}
