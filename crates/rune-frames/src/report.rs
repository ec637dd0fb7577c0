//! Geometry reports as sent by content frames.

use crate::error::{FrameError, Result};
use crate::geometry::{Point, Rect, Size};
use crate::id::FrameId;
use serde::{Deserialize, Serialize};

/// A frame describing itself and the child frames it can see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryReport {
    pub frame_id: FrameId,
    pub url: String,
    /// Handshake token the parent embedded into this frame, echoed back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub subframes: Vec<SubframeReport>,
}

/// One child frame as seen from its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubframeReport {
    /// Document URL of the child, used to correlate with the child's own report.
    pub url: String,
    /// Handshake token the parent embedded into the child, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Child viewport in the parent's local coordinates.
    pub rect: Rect,
    /// The parent's own viewport size.
    pub viewport: Size,
    /// The parent's scroll offset.
    #[serde(default)]
    pub scroll: Point,
}

impl GeometryReport {
    pub fn new(frame_id: FrameId, url: impl Into<String>) -> Self {
        Self {
            frame_id,
            url: url.into(),
            token: None,
            subframes: Vec::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_subframe(mut self, subframe: SubframeReport) -> Self {
        self.subframes.push(subframe);
        self
    }

    /// Reject non-finite coordinates and negative sizes.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| FrameError::InvalidGeometry {
            frame: self.frame_id,
            reason,
        };
        for sub in &self.subframes {
            let values = [
                sub.rect.x,
                sub.rect.y,
                sub.rect.w,
                sub.rect.h,
                sub.viewport.width,
                sub.viewport.height,
                sub.scroll.x,
                sub.scroll.y,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(invalid(format!("non-finite value in subframe {}", sub.url)));
            }
            if sub.rect.w < 0.0 || sub.rect.h < 0.0 {
                return Err(invalid(format!("negative size for subframe {}", sub.url)));
            }
            if sub.viewport.width < 0.0 || sub.viewport.height < 0.0 {
                return Err(invalid(format!("negative parent viewport around {}", sub.url)));
            }
        }
        Ok(())
    }
}

impl SubframeReport {
    pub fn new(url: impl Into<String>, rect: Rect, viewport: Size) -> Self {
        Self {
            url: url.into(),
            token: None,
            rect,
            viewport,
            scroll: Point::ORIGIN,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_scroll(mut self, scroll: Point) -> Self {
        self.scroll = scroll;
        self
    }
}
