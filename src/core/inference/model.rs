//! The scoring capability the gate drives.

use crate::core::ClassifierResult;

/// A loaded model that turns one normalized frame into per-class scores.
///
/// Implementations own their runtime handle exclusively. The gate guarantees
/// that `predict` is never entered concurrently on the same instance, so
/// implementations need not be reentrant.
pub trait ScoreModel: Send {
    /// Scores a single normalized frame.
    ///
    /// The returned vector is aligned positionally with the label table.
    fn predict(&mut self, input: &[f32]) -> ClassifierResult<Vec<f32>>;

    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Number of input values the model expects, when known.
    ///
    /// The gate rejects buffers of any other length before calling
    /// [`ScoreModel::predict`].
    fn input_len(&self) -> Option<usize> {
        None
    }
}

impl<M: ScoreModel + ?Sized> ScoreModel for Box<M> {
    fn predict(&mut self, input: &[f32]) -> ClassifierResult<Vec<f32>> {
        (**self).predict(input)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn input_len(&self) -> Option<usize> {
        (**self).input_len()
    }
}
