//! Top-k ranking of classification scores.

use crate::core::PredictionResult;
use crate::utils::LabelTable;
use std::cmp::Ordering;

/// Pairs each score with its label by index and returns the `k` best,
/// highest score first.
///
/// * Scores and labels are zipped, so only `min(scores.len(), labels.len())`
///   classes take part.
/// * The result has `min(k, classes)` entries; `k == 0` yields an empty vector.
/// * Ties keep their original index order.
/// * NaN scores rank below every number.
///
/// # Examples
///
/// ```rust
/// use live_classifier::processors::rank_top_k;
/// use live_classifier::utils::LabelTable;
///
/// let labels = LabelTable::from_iter(["cat", "dog", "bird"]);
/// let ranked = rank_top_k(&[0.2, 0.9, 0.1], &labels, 2);
/// assert_eq!(ranked[0].label(), "dog");
/// assert_eq!(ranked[1].label(), "cat");
/// ```
pub fn rank_top_k(scores: &[f32], labels: &LabelTable, k: usize) -> Vec<PredictionResult> {
    top_k_indices(&scores[..scores.len().min(labels.len())], k)
        .into_iter()
        .filter_map(|idx| {
            labels
                .get_shared(idx)
                .map(|label| PredictionResult::new(scores[idx], label, idx))
        })
        .collect()
}

/// Returns the indexes of the `k` highest scores in descending score order.
pub fn top_k_indices(scores: &[f32], k: usize) -> Vec<usize> {
    if k == 0 || scores.is_empty() {
        return Vec::new();
    }

    let mut indexes: Vec<usize> = (0..scores.len()).collect();
    // Stable sort keeps equal scores in index order.
    indexes.sort_by(|&a, &b| descending(scores[a], scores[b]));
    indexes.truncate(k);
    indexes
}

fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animals() -> LabelTable {
        LabelTable::from_iter(["cat", "dog", "bird"])
    }

    #[test]
    fn test_rank_pairs_scores_with_labels() {
        let ranked = rank_top_k(&[0.2, 0.9, 0.1], &animals(), 2);
        let pairs: Vec<(f32, &str)> = ranked.iter().map(|r| (r.score, r.label())).collect();
        assert_eq!(pairs, vec![(0.9, "dog"), (0.2, "cat")]);
        assert_eq!(ranked[0].class_id, 1);
        assert_eq!(ranked[1].class_id, 0);
    }

    #[test]
    fn test_k_larger_than_classes() {
        let ranked = rank_top_k(&[0.2, 0.9, 0.1], &animals(), 10);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[2].label(), "bird");
    }

    #[test]
    fn test_k_zero_is_empty() {
        assert!(rank_top_k(&[0.2, 0.9, 0.1], &animals(), 0).is_empty());
    }

    #[test]
    fn test_ties_keep_index_order() {
        assert_eq!(top_k_indices(&[0.5, 0.7, 0.5, 0.5], 4), vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_nan_ranks_last() {
        assert_eq!(top_k_indices(&[f32::NAN, 0.1, 0.3], 3), vec![2, 1, 0]);
    }

    #[test]
    fn test_mismatched_lengths_use_shared_prefix() {
        let ranked = rank_top_k(&[0.1, 0.2, 0.3, 0.99], &animals(), 4);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].label(), "bird");

        let short = rank_top_k(&[0.4], &animals(), 3);
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].label(), "cat");
    }

    #[test]
    fn test_negative_logits_rank_correctly() {
        let ranked = rank_top_k(&[-3.5, -0.25, -8.0], &animals(), 1);
        assert_eq!(ranked[0].label(), "dog");
    }
}
