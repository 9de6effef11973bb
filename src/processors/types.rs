//! Shared processor types.

use serde::{Deserialize, Serialize};

/// Specifies the order of channels in an image tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChannelOrder {
    /// Channel, Height, Width order (channel-major)
    #[default]
    CHW,
    /// Height, Width, Channel order (pixel-major)
    HWC,
}
