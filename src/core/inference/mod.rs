//! Model runtime integration.
//!
//! [`ScoreModel`] is the seam between the gate and whatever actually runs the
//! network. [`OrtModel`] implements it on top of ONNX Runtime; tests use small
//! in-memory fakes.

pub mod model;
pub mod ort_model;
pub mod session;

pub use model::ScoreModel;
pub use ort_model::OrtModel;
pub use session::{load_session, load_session_with_config};
