//! The inference gate.
//!
//! * [`gate`] - [`Predictor`], the single-flight gate, and its [`Prediction`] outcome
//! * [`builder`] - [`PredictorBuilder`], which loads the model and labels up front
//! * [`stats`] - served / dropped / failed frame counters

pub mod builder;
pub mod gate;
pub mod stats;

pub use builder::PredictorBuilder;
pub use gate::{Prediction, Predictor};
pub use stats::{GateStats, StatsManager};
