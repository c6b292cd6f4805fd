use serde::{Deserialize, Serialize};

/// how listing prices within a cell are collapsed to a single value.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Default, PartialEq, Eq)]
pub enum PriceAggregation {
    #[serde(rename = "mean")]
    #[default]
    Mean,
    #[serde(rename = "median")]
    Median,
}

impl PriceAggregation {
    /// None when no values are present.
    pub fn aggregate(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            PriceAggregation::Mean => {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
            PriceAggregation::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 1 {
                    Some(sorted[mid])
                } else {
                    Some((sorted[mid - 1] + sorted[mid]) / 2.0)
                }
            }
        }
    }
}

impl std::fmt::Display for PriceAggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PriceAggregation::Mean => "mean",
            PriceAggregation::Median => "median",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(PriceAggregation::Mean.aggregate(&[100.0, 200.0]), Some(150.0));
    }

    #[test]
    fn test_median_odd() {
        assert_eq!(
            PriceAggregation::Median.aggregate(&[900.0, 100.0, 200.0]),
            Some(200.0)
        );
    }

    #[test]
    fn test_median_even() {
        assert_eq!(
            PriceAggregation::Median.aggregate(&[100.0, 400.0, 300.0, 200.0]),
            Some(250.0)
        );
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(PriceAggregation::Mean.aggregate(&[]), None);
        assert_eq!(PriceAggregation::Median.aggregate(&[]), None);
    }
}
