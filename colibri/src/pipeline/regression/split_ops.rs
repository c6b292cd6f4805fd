use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::pipeline::PipelineError;

/// splits `0..n` into (train, test) index sets by a seeded shuffle, so the
/// same seed and row count always produce the same partition. the test set
/// gets `round(n * test_ratio)` rows, clamped so both sides are non-empty.
/// both index lists are returned sorted.
pub fn train_test_split(
    n: usize,
    test_ratio: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), PipelineError> {
    if !test_ratio.is_finite() || test_ratio <= 0.0 || test_ratio >= 1.0 {
        return Err(PipelineError::InvalidUserInput(format!(
            "test_ratio must lie strictly between 0 and 1, got {test_ratio}"
        )));
    }
    if n < 2 {
        return Err(PipelineError::EmptyDataset(format!(
            "need at least 2 labeled locations to split, found {n}"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_ratio).round().clamp(1.0, (n - 1) as f64) as usize;
    let (test, train) = indices.split_at(n_test);
    let mut train = train.to_vec();
    let mut test = test.to_vec();
    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_is_disjoint_and_exhaustive() {
        let (train, test) = train_test_split(10, 0.3, 7).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = train_test_split(50, 0.2, 42).unwrap();
        let b = train_test_split(50, 0.2, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_split() {
        let a = train_test_split(50, 0.2, 0).unwrap();
        let b = train_test_split(50, 0.2, 1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_both_sides_non_empty_for_extreme_ratios() {
        let (train, test) = train_test_split(3, 0.01, 0).unwrap();
        assert_eq!(test.len(), 1);
        assert_eq!(train.len(), 2);
        let (train, test) = train_test_split(3, 0.99, 0).unwrap();
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 1);
    }

    #[test]
    fn test_invalid_ratio_is_rejected() {
        assert!(train_test_split(10, 0.0, 0).is_err());
        assert!(train_test_split(10, 1.0, 0).is_err());
        assert!(train_test_split(10, f64::NAN, 0).is_err());
    }

    #[test]
    fn test_too_few_rows_is_rejected() {
        assert!(matches!(
            train_test_split(1, 0.2, 0),
            Err(PipelineError::EmptyDataset(_))
        ));
    }
}
