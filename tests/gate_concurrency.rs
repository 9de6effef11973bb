use live_classifier::core::{ClassifierResult, ScoreModel};
use live_classifier::prelude::*;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Tracks how many calls are inside `predict` at once.
struct SlowModel {
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl ScoreModel for SlowModel {
    fn predict(&mut self, _input: &[f32]) -> ClassifierResult<Vec<f32>> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(5));
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![0.05, 0.8, 0.15])
    }

    fn name(&self) -> &str {
        "slow"
    }
}

fn slow_predictor() -> (Predictor<SlowModel>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let max_active = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let model = SlowModel {
        active: Arc::new(AtomicUsize::new(0)),
        max_active: Arc::clone(&max_active),
        calls: Arc::clone(&calls),
    };
    let labels = LabelTable::from_iter(["cat", "dog", "bird"]);
    (Predictor::new(model, labels).unwrap(), max_active, calls)
}

#[test]
fn concurrent_frames_never_overlap_in_the_model() {
    let (predictor, max_active, calls) = slow_predictor();
    let predictor = Arc::new(predictor);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let predictor = Arc::clone(&predictor);
            thread::spawn(move || {
                (0..20)
                    .map(|_| predictor.predict(&[0.0; 16], 2))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let outcomes: Vec<Prediction> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    assert_eq!(max_active.load(Ordering::SeqCst), 1);

    let served = outcomes.iter().filter(|o| o.results().is_some()).count();
    let dropped = outcomes.iter().filter(|o| o.is_busy()).count();
    assert_eq!(served + dropped, 160);
    assert_eq!(served, calls.load(Ordering::SeqCst));
    assert!(served >= 1);

    let stats = predictor.stats();
    assert_eq!(stats.total_frames, 160);
    assert_eq!(stats.served, served);
    assert_eq!(stats.dropped, dropped);
    assert_eq!(stats.failed, 0);

    for outcome in outcomes.iter().filter_map(|o| o.results()) {
        let labels: Vec<&str> = outcome.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["dog", "bird"]);
    }
}

#[test]
fn rayon_workers_share_one_gate() {
    let (predictor, max_active, _) = slow_predictor();
    let frames = vec![vec![0.0f32; 16]; 64];

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap();
    let outcomes: Vec<Prediction> =
        pool.install(|| frames.par_iter().map(|f| predictor.predict(f, 1)).collect());

    assert_eq!(outcomes.len(), 64);
    assert_eq!(max_active.load(Ordering::SeqCst), 1);
    assert!(outcomes.iter().all(|o| !o.is_failed()));
}

#[test]
fn gate_accepts_frames_after_contention_ends() {
    let (predictor, _, _) = slow_predictor();
    let predictor = Arc::new(predictor);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let predictor = Arc::clone(&predictor);
            thread::spawn(move || predictor.predict(&[], 1))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // With no other callers, every frame is served.
    for _ in 0..3 {
        let top = predictor.predict(&[], 1);
        assert_eq!(top.top().map(|r| r.label()), Some("dog"));
    }
}
