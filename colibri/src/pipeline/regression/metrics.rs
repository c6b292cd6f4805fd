use crate::pipeline::PipelineError;

/// mean absolute error between labels and predictions.
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64, PipelineError> {
    if actual.len() != predicted.len() {
        return Err(PipelineError::InternalError(format!(
            "prediction length {} does not match label length {}",
            predicted.len(),
            actual.len()
        )));
    }
    if actual.is_empty() {
        return Err(PipelineError::EmptyDataset(String::from(
            "cannot compute mean absolute error over zero predictions",
        )));
    }
    let total: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(total / actual.len() as f64)
}
