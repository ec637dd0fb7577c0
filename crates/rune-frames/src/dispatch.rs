//! Outbound routing of synthetic events to frame channels.

use crate::diagnostics::Diagnostics;
use crate::event::{FrameEvent, KeyEvent};
use crate::host::FrameHost;
use crate::id::{FrameId, ViewHandle};
use crate::message::Outbound;
use crate::registry::FrameRegistry;
use crate::translate::{EventTranslator, Target};
use rune_config::TieBreak;
use tracing::{debug, info};

/// Where a dispatched event ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Delivered to the frame under the event's anchor point.
    Frame(FrameId),
    /// No frame under the point; delivered unchanged to the main frame.
    Root(FrameId),
    /// Sent to every frame of the view that was still addressable.
    Broadcast { delivered: usize },
    /// The target vanished before delivery, or the view is unknown.
    Dropped,
}

/// Routes events for one view. Holds no state of its own.
pub struct Dispatcher;

impl Dispatcher {
    /// Route `event`, given in window-absolute space, into `view`.
    pub fn dispatch<H: FrameHost + ?Sized>(
        host: &mut H,
        registry: &FrameRegistry,
        view: ViewHandle,
        event: FrameEvent,
        tie_break: TieBreak,
        diagnostics: &mut Diagnostics,
    ) -> Dispatched {
        if let FrameEvent::Key(key) = &event {
            return Self::dispatch_key(host, view, key, diagnostics);
        }

        let kind = event.kind();
        let routed = EventTranslator::to_frame_local(registry, event, view.main_frame, tie_break);
        let (frame, dispatched) = match routed.target {
            Target::Frame(id) => (id, Dispatched::Frame(id)),
            Target::Root => (view.main_frame, Dispatched::Root(view.main_frame)),
        };
        if diagnostics.traces_routing() {
            info!(kind, view = %view.id, target = %frame, "routing event");
        }

        if Self::deliver(host, frame, Outbound::DeliverEvent { event: routed.event }, diagnostics) {
            dispatched
        } else {
            Dispatched::Dropped
        }
    }

    /// Send `message` to every live frame of `view`.
    pub fn broadcast<H: FrameHost + ?Sized>(
        host: &mut H,
        view: ViewHandle,
        message: &Outbound,
        include_main: bool,
        diagnostics: &mut Diagnostics,
    ) -> usize {
        let mut delivered = 0;
        for frame in host.live_frames(view.id) {
            if !include_main && frame == view.main_frame {
                continue;
            }
            if Self::deliver(host, frame, message.clone(), diagnostics) {
                delivered += 1;
            }
        }
        delivered
    }

    // Native pipeline first so the runtime's own key handling fires, then a
    // notification to every subframe.
    fn dispatch_key<H: FrameHost + ?Sized>(
        host: &mut H,
        view: ViewHandle,
        key: &KeyEvent,
        diagnostics: &mut Diagnostics,
    ) -> Dispatched {
        if let Err(e) = host.send_native_key(view.id, key) {
            diagnostics.push(format!("native key {:?} not accepted: {}", key.key, e));
        }
        let notification = Outbound::KeyNotification { event: key.clone() };
        let delivered = Self::broadcast(host, view, &notification, false, diagnostics);
        Dispatched::Broadcast { delivered }
    }

    fn deliver<H: FrameHost + ?Sized>(
        host: &mut H,
        frame: FrameId,
        message: Outbound,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        match host.send(frame, message) {
            Ok(()) => true,
            Err(e) if e.is_gone() => {
                debug!(%frame, "dropping delivery to destroyed frame");
                false
            }
            Err(e) => {
                diagnostics.push(format!("delivery to frame {} failed: {}", frame, e));
                false
            }
        }
    }
}
