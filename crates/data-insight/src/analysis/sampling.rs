//! Deterministic row sampling for plots.

use rand::prelude::*;

/// Pick at most `cap` row indices out of `total`, uniformly without
/// replacement, in ascending order.
///
/// When `total <= cap` every index is returned. The same seed always yields
/// the same selection.
pub fn sample_indices(total: usize, cap: usize, seed: u64) -> Vec<usize> {
    if total <= cap {
        return (0..total).collect();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, total, cap).into_vec();
    indices.sort_unstable();
    indices
}

/// Select the values at the given indices.
pub fn take_indices<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices
        .iter()
        .filter_map(|&idx| values.get(idx).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_small_inputs_are_not_sampled() {
        assert_eq!(sample_indices(4, 10, 42), vec![0, 1, 2, 3]);
        assert_eq!(sample_indices(0, 10, 42), Vec::<usize>::new());
    }

    #[test]
    fn test_sample_is_capped_sorted_and_unique() {
        let indices = sample_indices(100_000, 5_000, 42);
        assert_eq!(indices.len(), 5_000);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert!(*indices.last().unwrap() < 100_000);
    }

    #[test]
    fn test_sample_is_deterministic() {
        assert_eq!(sample_indices(1_000, 50, 42), sample_indices(1_000, 50, 42));
        assert_ne!(sample_indices(1_000, 50, 42), sample_indices(1_000, 50, 7));
    }

    #[test]
    fn test_take_indices() {
        let values = vec!["a", "b", "c", "d"];
        assert_eq!(take_indices(&values, &[0, 2]), vec!["a", "c"]);
    }
}
