//! Host-side view membership, as far as the registry needs to know it.

use crate::host::FrameHost;
use crate::id::{FrameId, ViewHandle, ViewId};
use std::collections::HashMap;

/// Which frames the host currently enumerates, and under which view.
///
/// Reports alone cannot tell two pages apart when they embed the same URL,
/// so the registry consults this before placing a child under a parent.
/// An empty scope knows nothing and permits every placement.
#[derive(Debug, Default, Clone)]
pub struct ViewScope {
    mains: HashMap<FrameId, ViewId>,
    members: HashMap<FrameId, ViewId>,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the host's views and their live frames.
    pub fn from_host<H: FrameHost + ?Sized>(host: &H) -> Self {
        let mut scope = Self::new();
        for view in host.views() {
            scope.add_view(view, host.live_frames(view.id));
        }
        scope
    }

    pub fn add_view(&mut self, view: ViewHandle, frames: impl IntoIterator<Item = FrameId>) {
        self.mains.insert(view.main_frame, view.id);
        self.members.insert(view.main_frame, view.id);
        for frame in frames {
            self.members.insert(frame, view.id);
        }
    }

    /// Whether `id` roots one of the host's views.
    pub fn is_main(&self, id: FrameId) -> bool {
        self.mains.contains_key(&id)
    }

    /// The view enumerating `id`, if any.
    pub fn view_of(&self, id: FrameId) -> Option<ViewId> {
        self.members.get(&id).copied()
    }

    pub fn is_live_in(&self, id: FrameId, view: ViewId) -> bool {
        self.view_of(id) == Some(view)
    }

    /// Whether `child` may be placed under `parent`.
    ///
    /// Main frames never get a parent. Frames enumerated under different
    /// views are never linked; frames the host does not enumerate yet are
    /// given the benefit of the doubt.
    pub fn may_parent(&self, parent: FrameId, child: FrameId) -> bool {
        if self.is_main(child) {
            return false;
        }
        match (self.view_of(parent), self.view_of(child)) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}
