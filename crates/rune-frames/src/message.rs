//! Wire messages between content frames and the controller.

use crate::error::Result;
use crate::event::{FrameEvent, KeyEvent};
use crate::id::FrameId;
use crate::links::LocalLink;
use crate::report::GeometryReport;
use serde::{Deserialize, Serialize};

/// Which elements frames should report in follow mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowFilter {
    #[default]
    All,
    Links,
    Inputs,
    Media,
}

/// Frame → controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Inbound {
    ReportGeometry(GeometryReport),
    ReportLinks {
        frame_id: FrameId,
        #[serde(default)]
        links: Vec<LocalLink>,
    },
    ReportEvent {
        frame_id: FrameId,
        event: FrameEvent,
    },
}

impl Inbound {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The frame that sent this message.
    pub fn frame_id(&self) -> FrameId {
        match self {
            Inbound::ReportGeometry(report) => report.frame_id,
            Inbound::ReportLinks { frame_id, .. } | Inbound::ReportEvent { frame_id, .. } => *frame_id,
        }
    }
}

/// Controller → frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Outbound {
    /// A synthetic event in the receiving frame's local space.
    DeliverEvent { event: FrameEvent },
    /// Lightweight copy of a key event already sent through the native
    /// pipeline, for frame-local listeners.
    KeyNotification { event: KeyEvent },
    StartFollowMode { filter: FollowFilter },
    StopFollowMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_geometry_decodes() {
        let msg = Inbound::from_json(
            r#"{"type":"report-geometry","frame_id":"1-1","url":"https://root.test/",
                "subframes":[{"url":"https://child.test/",
                              "rect":{"x":100.0,"y":50.0,"w":300.0,"h":200.0},
                              "viewport":{"width":800.0,"height":600.0}}]}"#,
        )
        .unwrap();
        let Inbound::ReportGeometry(report) = &msg else {
            panic!("wrong variant");
        };
        assert_eq!(report.subframes.len(), 1);
        assert_eq!(msg.frame_id(), FrameId::new(1, 1));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = Inbound::from_json(r#"{"type":"report-nothing"}"#).unwrap_err();
        assert!(matches!(err, crate::FrameError::Decode(_)));
    }

    #[test]
    fn outbound_is_tagged() {
        let json = serde_json::to_string(&Outbound::StopFollowMode).unwrap();
        assert_eq!(json, r#"{"type":"stop-follow-mode"}"#);
    }
}
