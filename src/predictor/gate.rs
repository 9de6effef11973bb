//! Single-flight inference gate.
//!
//! The gate owns the only handle to the model and lets at most one frame
//! through at a time. A frame that arrives while another is being scored is
//! dropped, never queued: a camera produces frames faster than the model can
//! score them, and only the freshest result matters.

use super::stats::{GateStats, StatsManager};
use crate::core::inference::ScoreModel;
use crate::core::{ClassifierError, ClassifierResult, PredictionResult};
use crate::processors::rank_top_k;
use crate::utils::LabelTable;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, TryLockError};
use std::time::Instant;
use tracing::{debug, warn};

/// Outcome of offering one frame to the gate.
#[derive(Debug)]
pub enum Prediction {
    /// The model ran; results are sorted by descending score.
    Ranked(Vec<PredictionResult>),
    /// Another inference was in flight, so the frame was dropped without
    /// touching the model.
    Busy,
    /// The model call failed or panicked.
    Failed(ClassifierError),
}

impl Prediction {
    /// Collapses the outcome to the ranked results, treating busy and failed
    /// frames alike as `None`.
    pub fn into_results(self) -> Option<Vec<PredictionResult>> {
        match self {
            Prediction::Ranked(results) => Some(results),
            Prediction::Busy | Prediction::Failed(_) => None,
        }
    }

    /// Borrows the ranked results, if any.
    pub fn results(&self) -> Option<&[PredictionResult]> {
        match self {
            Prediction::Ranked(results) => Some(results),
            _ => None,
        }
    }

    /// The highest ranked result, if any.
    pub fn top(&self) -> Option<&PredictionResult> {
        self.results().and_then(|r| r.first())
    }

    /// Returns true if the frame was dropped.
    pub fn is_busy(&self) -> bool {
        matches!(self, Prediction::Busy)
    }

    /// Returns true if the model call failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Prediction::Failed(_))
    }
}

/// Guards a single model instance and ranks its output.
///
/// `Predictor` is `Sync` whenever the model is `Send`, so it can be shared
/// across frame-delivery threads (for example behind an `Arc`). The busy
/// state is the lock on the model itself: it is taken with `try_lock` and
/// released when the guard goes out of scope, on success, on error, and when
/// the model panics.
///
/// # Examples
///
/// ```rust
/// use live_classifier::core::{ClassifierResult, ScoreModel};
/// use live_classifier::predictor::Predictor;
/// use live_classifier::utils::LabelTable;
///
/// struct Fixed;
///
/// impl ScoreModel for Fixed {
///     fn predict(&mut self, _input: &[f32]) -> ClassifierResult<Vec<f32>> {
///         Ok(vec![0.2, 0.9, 0.1])
///     }
///     fn name(&self) -> &str {
///         "fixed"
///     }
/// }
///
/// let predictor = Predictor::new(Fixed, LabelTable::from_iter(["cat", "dog", "bird"]))?;
/// let results = predictor.predict(&[0.0; 4], 2).into_results().unwrap();
/// assert_eq!(results[0].label(), "dog");
/// assert_eq!(results[1].label(), "cat");
/// # Ok::<(), live_classifier::core::ClassifierError>(())
/// ```
pub struct Predictor<M> {
    model: Mutex<M>,
    labels: LabelTable,
    model_name: String,
    default_topk: usize,
    stats: StatsManager,
    mismatch_reported: AtomicBool,
}

impl<M> std::fmt::Debug for Predictor<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("model_name", &self.model_name)
            .field("labels", &self.labels.len())
            .field("default_topk", &self.default_topk)
            .finish()
    }
}

impl<M: ScoreModel> Predictor<M> {
    /// Wraps a loaded model and its label table.
    ///
    /// # Errors
    ///
    /// Returns an error if the label table is empty.
    pub fn new(model: M, labels: LabelTable) -> ClassifierResult<Self> {
        if labels.is_empty() {
            return Err(ClassifierError::invalid_input(
                "label table must contain at least one label",
            ));
        }
        let model_name = model.name().to_string();
        Ok(Self {
            model: Mutex::new(model),
            labels,
            model_name,
            default_topk: crate::core::config::DEFAULT_TOPK,
            stats: StatsManager::new(),
            mismatch_reported: AtomicBool::new(false),
        })
    }

    /// Sets the result count used by [`Predictor::predict_top`].
    ///
    /// A count of 0 is raised to 1 so `predict_top` always ranks something.
    pub fn with_default_topk(mut self, topk: usize) -> Self {
        self.default_topk = topk.max(1);
        self
    }

    /// Scores one normalized frame and returns the `k` best labeled results.
    ///
    /// Returns [`Prediction::Busy`] immediately, without calling the model, if
    /// another call is in flight. Returns [`Prediction::Failed`] if the buffer
    /// length does not match the model input, or if the model returns an
    /// error or panics. In every case the gate is idle again when this
    /// returns.
    pub fn predict(&self, buffer: &[f32], k: usize) -> Prediction {
        let mut model = match self.model.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                self.stats.record_dropped();
                debug!(
                    "Dropping frame: inference already in flight on '{}'",
                    self.model_name
                );
                return Prediction::Busy;
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                warn!(
                    "Recovering model '{}' after an earlier panic",
                    self.model_name
                );
                self.model.clear_poison();
                poisoned.into_inner()
            }
        };

        let start = Instant::now();
        let outcome = self.run_model(&mut *model, buffer);
        drop(model);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(scores) => {
                self.stats.record_served(elapsed_ms);
                self.check_output_len(scores.len());
                Prediction::Ranked(rank_top_k(&scores, &self.labels, k))
            }
            Err(err) => {
                self.stats.record_failed(elapsed_ms);
                debug!("Model '{}' failed on frame: {}", self.model_name, err);
                Prediction::Failed(err)
            }
        }
    }

    /// Like [`Predictor::predict`] with the configured default result count.
    pub fn predict_top(&self, buffer: &[f32]) -> Prediction {
        self.predict(buffer, self.default_topk)
    }

    fn run_model(&self, model: &mut M, buffer: &[f32]) -> ClassifierResult<Vec<f32>> {
        // Every call into the model, including the length query, stays inside
        // the unwind boundary.
        panic::catch_unwind(AssertUnwindSafe(|| {
            if let Some(expected) = model.input_len() {
                if buffer.len() != expected {
                    return Err(ClassifierError::validation_error(
                        "Predictor",
                        "buffer",
                        &format!("{} values", expected),
                        &buffer.len().to_string(),
                    ));
                }
            }
            model.predict(buffer)
        }))
        .unwrap_or_else(|payload| Err(ClassifierError::model_panic(&self.model_name, &*payload)))
    }

    fn check_output_len(&self, scores: usize) {
        if scores != self.labels.len() && !self.mismatch_reported.swap(true, Ordering::Relaxed) {
            warn!(
                "Model '{}' produced {} scores for {} labels; ranking the first {}",
                self.model_name,
                scores,
                self.labels.len(),
                scores.min(self.labels.len())
            );
        }
    }
}

impl<M> Predictor<M> {
    /// The label table results are drawn from.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Name of the wrapped model.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Result count used by `predict_top`.
    pub fn default_topk(&self) -> usize {
        self.default_topk
    }

    /// Snapshot of the gate counters.
    pub fn stats(&self) -> GateStats {
        self.stats.get_stats()
    }

    /// Resets the gate counters.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    struct FixedScores {
        scores: Vec<f32>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedScores {
        fn new(scores: Vec<f32>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    scores,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl ScoreModel for FixedScores {
        fn predict(&mut self, _input: &[f32]) -> ClassifierResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.scores.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Fails or panics on chosen calls, succeeds otherwise.
    struct Flaky {
        call: usize,
        fail_on: usize,
        panic_on: usize,
    }

    impl ScoreModel for Flaky {
        fn predict(&mut self, _input: &[f32]) -> ClassifierResult<Vec<f32>> {
            self.call += 1;
            if self.call == self.panic_on {
                panic!("runtime fault");
            }
            if self.call == self.fail_on {
                return Err(ClassifierError::inference_message("flaky", "bad input shape"));
            }
            Ok(vec![0.1, 0.7, 0.2])
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    /// Blocks inside `predict` until released, to hold the gate busy.
    struct Blocking {
        entered: mpsc::Sender<()>,
        release: mpsc::Receiver<()>,
        calls: Arc<AtomicUsize>,
    }

    impl ScoreModel for Blocking {
        fn predict(&mut self, _input: &[f32]) -> ClassifierResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.send(()).unwrap();
            self.release.recv().unwrap();
            Ok(vec![1.0, 0.0, 0.0])
        }

        fn name(&self) -> &str {
            "blocking"
        }
    }

    struct Sized4;

    impl ScoreModel for Sized4 {
        fn predict(&mut self, _input: &[f32]) -> ClassifierResult<Vec<f32>> {
            Ok(vec![0.5, 0.25, 0.25])
        }

        fn name(&self) -> &str {
            "sized"
        }

        fn input_len(&self) -> Option<usize> {
            Some(4)
        }
    }

    fn animals() -> LabelTable {
        LabelTable::from_iter(["cat", "dog", "bird"])
    }

    #[test]
    fn test_ranks_synthetic_scores() {
        let (model, _) = FixedScores::new(vec![0.2, 0.9, 0.1]);
        let predictor = Predictor::new(model, animals()).unwrap();

        let results = predictor.predict(&[0.0; 8], 2).into_results().unwrap();
        let pairs: Vec<(f32, &str)> = results.iter().map(|r| (r.score, r.label())).collect();
        assert_eq!(pairs, vec![(0.9, "dog"), (0.2, "cat")]);
    }

    #[test]
    fn test_result_count_is_min_of_k_and_classes() {
        let (model, _) = FixedScores::new(vec![0.2, 0.9, 0.1]);
        let predictor = Predictor::new(model, animals()).unwrap();

        for k in 0..=3 {
            let results = predictor.predict(&[], k).into_results().unwrap();
            assert_eq!(results.len(), k);
            assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        }
        assert_eq!(predictor.predict(&[], 7).into_results().unwrap().len(), 3);
    }

    #[test]
    fn test_repeated_calls_share_label_strings() {
        let (model, _) = FixedScores::new(vec![0.2, 0.9, 0.1]);
        let predictor = Predictor::new(model, animals()).unwrap();

        let first = predictor.predict(&[], 3).into_results().unwrap();
        let second = predictor.predict(&[], 3).into_results().unwrap();
        assert_eq!(first, second);
        for (a, b) in first.iter().zip(&second) {
            assert!(Arc::ptr_eq(&a.label, &b.label));
        }
    }

    #[test]
    fn test_sequential_calls_are_not_dropped() {
        let (model, calls) = FixedScores::new(vec![0.2, 0.9, 0.1]);
        let predictor = Predictor::new(model, animals()).unwrap();

        assert!(predictor.predict(&[], 1).results().is_some());
        assert!(predictor.predict(&[], 1).results().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_busy_gate_drops_without_calling_model() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let calls = Arc::new(AtomicUsize::new(0));
        let model = Blocking {
            entered: entered_tx,
            release: release_rx,
            calls: Arc::clone(&calls),
        };
        let predictor = Predictor::new(model, animals()).unwrap();

        std::thread::scope(|s| {
            let in_flight = s.spawn(|| predictor.predict(&[], 1));
            entered_rx.recv().unwrap();

            let dropped = predictor.predict(&[], 1);
            assert!(dropped.is_busy());
            assert_eq!(calls.load(Ordering::SeqCst), 1);

            release_tx.send(()).unwrap();
            let served = in_flight.join().unwrap();
            assert_eq!(served.top().unwrap().label(), "cat");
        });

        // The gate is idle again once the in-flight call returns.
        release_tx.send(()).unwrap();
        assert!(predictor.predict(&[], 1).results().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let stats = predictor.stats();
        assert_eq!(stats.total_frames, 3);
        assert_eq!(stats.served, 2);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_gate_released_after_model_error() {
        let model = Flaky {
            call: 0,
            fail_on: 1,
            panic_on: usize::MAX,
        };
        let predictor = Predictor::new(model, animals()).unwrap();

        let failed = predictor.predict(&[], 1);
        assert!(failed.is_failed());
        assert!(failed.into_results().is_none());

        let next = predictor.predict(&[], 1);
        assert_eq!(next.top().unwrap().label(), "dog");
    }

    #[test]
    fn test_gate_released_after_model_panic() {
        let model = Flaky {
            call: 0,
            fail_on: usize::MAX,
            panic_on: 1,
        };
        let predictor = Predictor::new(model, animals()).unwrap();

        match predictor.predict(&[], 1) {
            Prediction::Failed(ClassifierError::ModelPanic { message, .. }) => {
                assert_eq!(message, "runtime fault");
            }
            other => panic!("expected a panic failure, got {:?}", other),
        }

        let next = predictor.predict(&[], 1);
        assert_eq!(next.top().unwrap().label(), "dog");
        assert_eq!(predictor.stats().failed, 1);
    }

    #[test]
    fn test_wrong_buffer_length_is_a_failure() {
        let predictor = Predictor::new(Sized4, animals()).unwrap();

        assert!(predictor.predict(&[0.0; 3], 1).is_failed());
        assert!(predictor.predict(&[0.0; 4], 1).results().is_some());
    }

    #[test]
    fn test_empty_label_table_is_rejected() {
        let (model, _) = FixedScores::new(vec![]);
        assert!(Predictor::new(model, LabelTable::default()).is_err());
    }

    #[test]
    fn test_predict_top_uses_default_topk() {
        let (model, _) = FixedScores::new(vec![0.2, 0.9, 0.1]);
        let predictor = Predictor::new(model, animals()).unwrap();
        assert_eq!(predictor.predict_top(&[]).into_results().unwrap().len(), 2);

        let predictor = predictor.with_default_topk(1);
        assert_eq!(predictor.predict_top(&[]).into_results().unwrap().len(), 1);
    }

    /// Panics when asked for its input size on the first call only.
    struct PanickingLen {
        queried: bool,
    }

    impl ScoreModel for PanickingLen {
        fn predict(&mut self, _input: &[f32]) -> ClassifierResult<Vec<f32>> {
            Ok(vec![0.3, 0.1, 0.6])
        }

        fn name(&self) -> &str {
            "panicking_len"
        }

        fn input_len(&self) -> Option<usize> {
            if !self.queried {
                panic!("input size unavailable");
            }
            None
        }
    }

    impl PanickingLen {
        fn mark_queried(&mut self) {
            self.queried = true;
        }
    }

    #[test]
    fn test_panic_in_input_len_is_captured() {
        let predictor = Predictor::new(PanickingLen { queried: false }, animals()).unwrap();

        let first = panic::catch_unwind(AssertUnwindSafe(|| predictor.predict(&[], 1)));
        let first = first.expect("panic escaped the gate");
        match first {
            Prediction::Failed(ClassifierError::ModelPanic { message, .. }) => {
                assert_eq!(message, "input size unavailable");
            }
            other => panic!("expected a panic failure, got {:?}", other),
        }
        let stats = predictor.stats();
        assert_eq!(stats.total_frames, 1);
        assert_eq!(stats.failed, 1);

        predictor.model.lock().unwrap().mark_queried();
        let next = predictor.predict(&[], 1);
        assert_eq!(next.top().unwrap().label(), "bird");
        assert_eq!(predictor.stats().served, 1);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let (model, calls) = FixedScores::new(vec![0.2, 0.9, 0.1]);
        let predictor = Predictor::new(model, animals()).unwrap();

        std::thread::scope(|s| {
            let poisoner = s.spawn(|| {
                let _guard = predictor.model.lock().unwrap();
                panic!("poisoning the model lock");
            });
            assert!(poisoner.join().is_err());
        });
        assert!(predictor.model.is_poisoned());

        let next = predictor.predict(&[], 1);
        assert_eq!(next.top().unwrap().label(), "dog");
        assert!(!predictor.model.is_poisoned());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_default_topk_is_raised_to_one() {
        let (model, _) = FixedScores::new(vec![0.2, 0.9, 0.1]);
        let predictor = Predictor::new(model, animals()).unwrap().with_default_topk(0);

        assert_eq!(predictor.default_topk(), 1);
        let results = predictor.predict_top(&[]).into_results().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label(), "dog");
    }

    #[test]
    fn test_predictor_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Predictor<FixedScores>>();
    }
}
