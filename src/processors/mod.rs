//! Frame pre- and post-processing.
//!
//! * [`normalization`] - image / BGRA buffer to normalized float tensor
//! * [`topk`] - score ranking and label pairing
//! * [`types`] - shared enums

pub mod normalization;
pub mod topk;
pub mod types;

pub use normalization::FrameNormalizer;
pub use topk::{rank_top_k, top_k_indices};
pub use types::ChannelOrder;
