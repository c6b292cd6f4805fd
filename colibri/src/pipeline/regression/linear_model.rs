use colibri_core::model::feature::LocationFeatureVector;
use indexmap::IndexMap;
use nalgebra::{DMatrix, DVector};

use crate::pipeline::PipelineError;

/// ordinary least squares over standardized features with an intercept,
/// solved by singular value decomposition. standardization keeps the solve
/// well-conditioned when feature scales differ by orders of magnitude
/// (listing prices vs. hour-of-day shares).
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    /// coefficients in standardized feature space, one per feature
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl LinearModel {
    pub fn fit(
        x: &DMatrix<f64>,
        y: &DVector<f64>,
        feature_names: Vec<String>,
    ) -> Result<LinearModel, PipelineError> {
        let (n, p) = x.shape();
        if n == 0 {
            return Err(PipelineError::EmptyDataset(String::from(
                "cannot fit a model to zero rows",
            )));
        }
        if p != feature_names.len() {
            return Err(PipelineError::InternalError(format!(
                "design matrix has {p} columns but {} feature names were provided",
                feature_names.len()
            )));
        }
        if y.len() != n {
            return Err(PipelineError::InternalError(format!(
                "design matrix has {n} rows but {} target values were provided",
                y.len()
            )));
        }

        let (means, stds) = column_moments(x);
        let design = standardized_design(x, &means, &stds);
        let svd = design.svd(true, true);
        let beta = svd
            .solve(y, 1.0e-12)
            .map_err(|e| PipelineError::RegressionError(e.to_string()))?;

        Ok(LinearModel {
            feature_names,
            coefficients: beta.iter().skip(1).copied().collect(),
            intercept: beta[0],
            means,
            stds,
        })
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>, PipelineError> {
        if x.ncols() != self.coefficients.len() {
            return Err(PipelineError::InternalError(format!(
                "prediction matrix has {} columns but the model was fit on {}",
                x.ncols(),
                self.coefficients.len()
            )));
        }
        let design = standardized_design(x, &self.means, &self.stds);
        let beta = DVector::from_iterator(
            self.coefficients.len() + 1,
            std::iter::once(self.intercept).chain(self.coefficients.iter().copied()),
        );
        Ok(&design * &beta)
    }

    /// coefficients keyed by feature name, in design-matrix order.
    pub fn coefficient_table(&self) -> IndexMap<String, f64> {
        self.feature_names
            .iter()
            .cloned()
            .zip(self.coefficients.iter().copied())
            .collect()
    }
}

/// stacks the numeric feature columns of each vector into a dense matrix,
/// returning the shared column names alongside it.
pub fn design_matrix(
    features: &[LocationFeatureVector],
) -> Result<(Vec<String>, DMatrix<f64>), PipelineError> {
    let first = features.first().ok_or_else(|| {
        PipelineError::EmptyDataset(String::from(
            "cannot build a design matrix from zero feature vectors",
        ))
    })?;
    let names: Vec<String> = first
        .model_columns()
        .keys()
        .map(|name| String::from(*name))
        .collect();
    let n = features.len();
    let p = names.len();
    let matrix = DMatrix::from_row_iterator(
        n,
        p,
        features
            .iter()
            .flat_map(|f| f.model_columns().into_iter().map(|(_, value)| value)),
    );
    Ok((names, matrix))
}

/// per-column mean and standard deviation. a column with no spread keeps a
/// unit divisor so its standardized values are zero rather than NaN.
fn column_moments(x: &DMatrix<f64>) -> (Vec<f64>, Vec<f64>) {
    let n = x.nrows() as f64;
    let mut means = Vec::with_capacity(x.ncols());
    let mut stds = Vec::with_capacity(x.ncols());
    for j in 0..x.ncols() {
        let column = x.column(j);
        let mean = column.sum() / n;
        let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        means.push(mean);
        stds.push(if std.is_finite() && std > 1.0e-12 {
            std
        } else {
            1.0
        });
    }
    (means, stds)
}

/// intercept column of ones followed by the standardized features.
fn standardized_design(x: &DMatrix<f64>, means: &[f64], stds: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(x.nrows(), x.ncols() + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            (x[(i, j - 1)] - means[j - 1]) / stds[j - 1]
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn names(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| String::from(*l)).collect()
    }

    #[test]
    fn test_recovers_noiseless_linear_target() {
        // y = 3 + 2*a - 0.5*b
        let rows: Vec<[f64; 2]> = vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [2.0, 1.0],
            [3.0, 5.0],
            [4.0, 2.0],
        ];
        let x = DMatrix::from_row_iterator(6, 2, rows.iter().flatten().copied());
        let y = DVector::from_iterator(6, rows.iter().map(|[a, b]| 3.0 + 2.0 * a - 0.5 * b));

        let model = LinearModel::fit(&x, &y, names(&["a", "b"])).unwrap();
        let predicted = model.predict(&x).unwrap();
        for (truth, estimate) in y.iter().zip(predicted.iter()) {
            assert!((truth - estimate).abs() < 1.0e-8, "{truth} vs {estimate}");
        }
    }

    #[test]
    fn test_constant_column_gets_zero_coefficient() {
        let x = DMatrix::from_row_iterator(4, 2, [1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let y = DVector::from_iterator(4, [5.0, 6.0, 7.0, 8.0]);
        let model = LinearModel::fit(&x, &y, names(&["constant", "level"])).unwrap();
        assert!(model.coefficients[0].abs() < 1.0e-9);
        let predicted = model.predict(&x).unwrap();
        for (truth, estimate) in y.iter().zip(predicted.iter()) {
            assert!((truth - estimate).abs() < 1.0e-8);
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let x = DMatrix::from_row_iterator(3, 1, [1.0, 2.0, 3.0]);
        let y = DVector::from_iterator(3, [2.0, 4.0, 6.0]);
        let a = LinearModel::fit(&x, &y, names(&["a"])).unwrap();
        let b = LinearModel::fit(&x, &y, names(&["a"])).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mismatched_names_rejected() {
        let x = DMatrix::from_row_iterator(2, 2, [1.0, 2.0, 3.0, 4.0]);
        let y = DVector::from_iterator(2, [1.0, 2.0]);
        assert!(LinearModel::fit(&x, &y, names(&["only-one"])).is_err());
    }

    #[test]
    fn test_coefficient_table_order() {
        let x = DMatrix::from_row_iterator(3, 2, [1.0, 9.0, 2.0, 8.0, 3.0, 7.0]);
        let y = DVector::from_iterator(3, [1.0, 2.0, 3.0]);
        let model = LinearModel::fit(&x, &y, names(&["first", "second"])).unwrap();
        let table = model.coefficient_table();
        let keys: Vec<&String> = table.keys().collect();
        assert_eq!(keys, vec!["first", "second"]);
    }
}
