//! Error types for the frame router.

use crate::id::{FrameId, ViewId};
use thiserror::Error;

/// Result type for frame router operations.
pub type Result<T> = std::result::Result<T, FrameError>;

/// Errors that can occur while recording, resolving or dispatching.
///
/// Most of these never escape the controller: lookup failures degrade to
/// partial offsets or root delivery and end up on the diagnostic channel.
#[derive(Error, Debug)]
pub enum FrameError {
    /// The host does not know the top-level view.
    #[error("unknown view {0}")]
    UnknownView(ViewId),

    /// The frame handle was destroyed between resolution and delivery.
    #[error("frame {0} is no longer addressable")]
    FrameGone(FrameId),

    /// A report carried sizes outside the accepted range.
    #[error("invalid geometry from frame {frame}: {reason}")]
    InvalidGeometry { frame: FrameId, reason: String },

    /// Linking `child` under `parent` would close a loop.
    #[error("refusing to parent {child} under {parent}: chain would cycle")]
    ParentCycle { child: FrameId, parent: FrameId },

    /// An inbound message could not be decoded.
    #[error("failed to decode message: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FrameError {
    /// Whether this is the expected "frame navigated away" race.
    pub fn is_gone(&self) -> bool {
        matches!(self, FrameError::FrameGone(_))
    }
}
