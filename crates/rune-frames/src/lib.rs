//! Cross-frame coordinate registry and spatial event router.
//!
//! A browser controller only sees its content frames through the geometry
//! they report, each in its own coordinate space, asynchronously and out of
//! order. This crate rebuilds absolute positions from those reports, finds
//! the innermost frame under a window point, translates events between
//! frame-local and window-absolute space, aggregates follow-mode links, and
//! routes synthetic input to the right frame.
//!
//! [`FrameController`] owns all state. The hosting runtime plugs in through
//! [`FrameHost`].

mod controller;
mod diagnostics;
mod dispatch;
mod error;
mod event;
mod geometry;
mod host;
mod id;
mod links;
mod message;
mod registry;
mod report;
mod scope;
mod translate;

pub use controller::{ControllerEvent, FollowSession, FrameController, RouterOptions};
pub use diagnostics::Diagnostics;
pub use dispatch::{Dispatched, Dispatcher};
pub use error::{FrameError, Result};
pub use event::{FrameEvent, KeyEvent, KeyEventKind, Modifiers, MouseButton};
pub use geometry::{Point, Rect, Size};
pub use hit_test::FrameHit;
pub use host::{Delivery, FrameHost, RecordingHost};
pub use id::{FrameId, ParseFrameIdError, ViewHandle, ViewId};
pub use links::{LinkAggregate, LinkEntry, LinkKind, LocalLink, MergeStats};
pub use message::{FollowFilter, Inbound, Outbound};
pub use registry::{DEFAULT_MAX_DEPTH, FrameRecord, FrameRegistry, RecordSummary, Resolution};
pub use report::{GeometryReport, SubframeReport};
pub use scope::ViewScope;
pub use rune_config::TieBreak;
pub use translate::{AbsoluteEvent, EventTranslator, FrameMeta, Routed, Target};
