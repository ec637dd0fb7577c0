//! The seam between the controller and the hosting runtime.

use crate::error::{FrameError, Result};
use crate::event::KeyEvent;
use crate::id::{FrameId, ViewHandle, ViewId};
use crate::message::Outbound;
use std::collections::{BTreeMap, HashSet};

/// Hosting runtime as seen by the controller.
pub trait FrameHost {
    /// Live top-level views.
    fn views(&self) -> Vec<ViewHandle>;

    /// Current frame enumeration of a view, main frame included.
    fn live_frames(&self, view: ViewId) -> Vec<FrameId>;

    /// Post a message to one frame's channel.
    ///
    /// Returns [`FrameError::FrameGone`] when the frame was destroyed.
    fn send(&mut self, frame: FrameId, message: Outbound) -> Result<()>;

    /// Feed a key event through the view's native input pipeline.
    fn send_native_key(&mut self, view: ViewId, event: &KeyEvent) -> Result<()>;

    /// Surface a diagnostic on the notification channel.
    fn notify(&mut self, diagnostic: &str);

    fn view(&self, id: ViewId) -> Option<ViewHandle> {
        self.views().into_iter().find(|v| v.id == id)
    }
}

/// A message the [`RecordingHost`] accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Frame { frame: FrameId, message: Outbound },
    NativeKey { view: ViewId, event: KeyEvent },
}

/// In-memory host that records everything sent to it.
#[derive(Debug, Default)]
pub struct RecordingHost {
    views: BTreeMap<ViewId, (FrameId, Vec<FrameId>)>,
    gone: HashSet<FrameId>,
    pub deliveries: Vec<Delivery>,
    pub notifications: Vec<String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view; `frames` should list the main frame too.
    pub fn add_view(&mut self, id: ViewId, main_frame: FrameId, frames: Vec<FrameId>) {
        self.views.insert(id, (main_frame, frames));
    }

    pub fn remove_view(&mut self, id: ViewId) {
        self.views.remove(&id);
    }

    /// Mark a frame destroyed: it drops out of enumeration and rejects sends.
    pub fn destroy_frame(&mut self, frame: FrameId) {
        self.gone.insert(frame);
        for (_, frames) in self.views.values_mut() {
            frames.retain(|f| *f != frame);
        }
    }

    /// Messages delivered to one frame, in order.
    pub fn sent_to(&self, frame: FrameId) -> Vec<&Outbound> {
        self.deliveries
            .iter()
            .filter_map(|d| match d {
                Delivery::Frame { frame: f, message } if *f == frame => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn take_deliveries(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.deliveries)
    }
}

impl FrameHost for RecordingHost {
    fn views(&self) -> Vec<ViewHandle> {
        self.views
            .iter()
            .map(|(id, (main_frame, _))| ViewHandle {
                id: *id,
                main_frame: *main_frame,
            })
            .collect()
    }

    fn live_frames(&self, view: ViewId) -> Vec<FrameId> {
        self.views
            .get(&view)
            .map(|(_, frames)| frames.clone())
            .unwrap_or_default()
    }

    fn send(&mut self, frame: FrameId, message: Outbound) -> Result<()> {
        if self.gone.contains(&frame) {
            return Err(FrameError::FrameGone(frame));
        }
        self.deliveries.push(Delivery::Frame { frame, message });
        Ok(())
    }

    fn send_native_key(&mut self, view: ViewId, event: &KeyEvent) -> Result<()> {
        if !self.views.contains_key(&view) {
            return Err(FrameError::UnknownView(view));
        }
        self.deliveries.push(Delivery::NativeKey {
            view,
            event: event.clone(),
        });
        Ok(())
    }

    fn notify(&mut self, diagnostic: &str) {
        self.notifications.push(diagnostic.to_string());
    }
}
