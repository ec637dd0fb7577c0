//! Follow-mode link aggregation across frames.
//!
//! Each frame reports its interactive elements in its own coordinates. The
//! aggregate lifts them into window-absolute space, drops the ones hidden
//! by an ancestor's viewport, and replaces stale batches.

use crate::id::{FrameId, ViewId};
use crate::registry::FrameRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    #[default]
    Url,
    Input,
    Click,
    Media,
    Other,
}

/// An interactive element as reported by its frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalLink {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub kind: LinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl LocalLink {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            width: 0.0,
            height: 0.0,
            kind: LinkKind::Url,
            url: None,
            text: String::new(),
        }
    }
}

/// A link in the global follow-mode list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Window-absolute position.
    pub x: f64,
    pub y: f64,
    pub x_in_frame: f64,
    pub y_in_frame: f64,
    pub width: f64,
    pub height: f64,
    pub kind: LinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub text: String,
    pub frame_id: FrameId,
    pub frame_width: f64,
    pub frame_height: f64,
    pub frame_usable_width: f64,
    pub frame_usable_height: f64,
}

/// Result of merging one frame's batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub clipped: usize,
    pub evicted: usize,
    /// The reporting frame had no record; links were kept at origin `(0, 0)`.
    pub unknown_frame: bool,
}

/// Global link list for one follow-mode session.
#[derive(Debug, Default, Clone)]
pub struct LinkAggregate {
    view: Option<ViewId>,
    entries: Vec<LinkEntry>,
    clip_to_usable: bool,
}

impl LinkAggregate {
    pub fn new(clip_to_usable: bool) -> Self {
        Self {
            view: None,
            entries: Vec::new(),
            clip_to_usable,
        }
    }

    /// Start a new session for `view`, dropping everything collected so far.
    pub fn reset(&mut self, view: Option<ViewId>) {
        self.view = view;
        self.entries.clear();
    }

    pub fn view(&self) -> Option<ViewId> {
        self.view
    }

    pub fn entries(&self) -> &[LinkEntry] {
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<LinkEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge the batch reported by `frame`.
    ///
    /// Prior entries of `frame`, and of any frame missing from `live`, are
    /// evicted before the new batch is appended.
    pub fn merge(
        &mut self,
        registry: &FrameRegistry,
        frame: FrameId,
        links: &[LocalLink],
        live: &HashSet<FrameId>,
    ) -> MergeStats {
        let mut stats = MergeStats::default();

        let before = self.entries.len();
        self.entries
            .retain(|entry| entry.frame_id != frame && live.contains(&entry.frame_id));
        stats.evicted = before - self.entries.len();

        let origin = registry.resolve_absolute(frame);
        let record = registry.get(frame);
        stats.unknown_frame = record.is_none();
        let (width, height, usable_width, usable_height) = record
            .map(|r| (r.width, r.height, r.usable_width, r.usable_height))
            .unwrap_or_default();
        // A main frame has nothing above it to clip against.
        let clip = self.clip_to_usable && record.is_some_and(|r| r.parent_id.is_some());

        for link in links {
            if clip && (link.x < 0.0 || link.y < 0.0 || link.x > usable_width || link.y > usable_height) {
                stats.clipped += 1;
                continue;
            }
            self.entries.push(LinkEntry {
                x: link.x + origin.x,
                y: link.y + origin.y,
                x_in_frame: link.x,
                y_in_frame: link.y,
                width: link.width,
                height: link.height,
                kind: link.kind,
                url: link.url.clone(),
                text: link.text.clone(),
                frame_id: frame,
                frame_width: width,
                frame_height: height,
                frame_usable_width: usable_width,
                frame_usable_height: usable_height,
            });
            stats.added += 1;
        }

        stats
    }
}
