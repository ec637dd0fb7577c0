//! Coordinate translation between frame-local and window-absolute space.

use crate::event::FrameEvent;
use crate::id::{FrameId, ViewHandle, ViewId};
use crate::registry::FrameRegistry;
use rune_config::TieBreak;
use serde::{Deserialize, Serialize};

/// Geometry of the frame an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameMeta {
    pub frame_id: FrameId,
    pub frame_width: f64,
    pub frame_height: f64,
    /// Parent-relative origin, as registered.
    pub frame_x: f64,
    pub frame_y: f64,
}

/// A frame event lifted into window-absolute space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteEvent {
    pub event: FrameEvent,
    /// `None` when the frame has no record.
    pub frame: Option<FrameMeta>,
    /// Top-level view owning the frame chain, if it could be resolved.
    pub view: Option<ViewId>,
}

/// Where an inbound event should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    Frame(FrameId),
    /// The view's root content area.
    Root,
}

/// An event ready for delivery, in its target's local space.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub target: Target,
    pub event: FrameEvent,
}

/// Stateless translation over a registry snapshot.
pub struct EventTranslator;

impl EventTranslator {
    /// Lift an event reported by `frame` into window-absolute space.
    ///
    /// Every position field is shifted by the frame's resolved absolute
    /// origin. The owning view is whichever live view has the chain's
    /// outermost frame as its main frame.
    pub fn to_absolute(
        registry: &FrameRegistry,
        mut event: FrameEvent,
        frame: FrameId,
        views: &[ViewHandle],
    ) -> AbsoluteEvent {
        let resolution = registry.resolve(frame);
        event.offset_by(resolution.origin);

        let meta = registry.get(frame).map(|record| FrameMeta {
            frame_id: record.id,
            frame_width: record.width,
            frame_height: record.height,
            frame_x: record.origin_x,
            frame_y: record.origin_y,
        });
        let view = views
            .iter()
            .find(|v| v.main_frame == resolution.outermost)
            .map(|v| v.id);

        AbsoluteEvent { event, frame: meta, view }
    }

    /// Bring a window-absolute event into the local space of the frame under
    /// its anchor point.
    ///
    /// Spans are anchored at their start point; both ends are made relative
    /// to the start frame even when the end lies in another frame. Events
    /// without a position, or with no frame under them, go to the root
    /// unchanged.
    pub fn to_frame_local(
        registry: &FrameRegistry,
        mut event: FrameEvent,
        root: FrameId,
        tie_break: TieBreak,
    ) -> Routed {
        let Some(anchor) = event.anchor() else {
            return Routed {
                target: Target::Root,
                event,
            };
        };
        match registry.find_frame_at(root, anchor, tie_break) {
            Some(hit) => {
                let origin = hit.bounds.origin();
                event.map_points(|p| p - origin);
                Routed {
                    target: Target::Frame(hit.id()),
                    event,
                }
            }
            None => Routed {
                target: Target::Root,
                event,
            },
        }
    }
}
