//! The controller owning all frame state for the application.
//!
//! Inbound messages, follow-mode commands and dispatches are handled one at
//! a time; nothing here is shared or locked. Every public operation ends by
//! flushing diagnostics to the host.

use crate::diagnostics::Diagnostics;
use crate::dispatch::{Dispatched, Dispatcher};
use crate::event::FrameEvent;
use crate::host::FrameHost;
use crate::id::{FrameId, ViewHandle, ViewId};
use crate::links::{LinkAggregate, LinkEntry, LocalLink};
use crate::message::{FollowFilter, Inbound, Outbound};
use crate::registry::FrameRegistry;
use crate::report::GeometryReport;
use crate::scope::ViewScope;
use crate::translate::{AbsoluteEvent, EventTranslator};
use rune_config::{RuneConfig, TieBreak};
use std::collections::HashSet;
use tracing::debug;

/// Behavior switches, usually built from [`RuneConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    pub tie_break: TieBreak,
    pub strict_validation: bool,
    pub max_depth: usize,
    pub prune_on_follow: bool,
    pub clip_links: bool,
    pub notify: bool,
    /// Echo every routing decision at info level.
    pub trace_routing: bool,
}

impl From<&RuneConfig> for RouterOptions {
    fn from(config: &RuneConfig) -> Self {
        Self {
            tie_break: config.routing.tie_break,
            strict_validation: config.registry.strict_validation,
            max_depth: config.registry.max_depth,
            prune_on_follow: config.registry.prune_on_follow,
            clip_links: config.links.clip_to_usable,
            notify: config.diagnostics.notify,
            trace_routing: config.diagnostics.enabled("frames"),
        }
    }
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self::from(&RuneConfig::default())
    }
}

/// An active follow-mode session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowSession {
    pub view: ViewId,
    pub filter: FollowFilter,
}

/// What handling an inbound message produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// A geometry report was recorded.
    Geometry { frame: FrameId, placed: Vec<FrameId> },
    /// The global link list after merging a frame's batch.
    Links(Vec<LinkEntry>),
    /// A frame event lifted into window-absolute space.
    Event(AbsoluteEvent),
}

pub struct FrameController {
    registry: FrameRegistry,
    links: LinkAggregate,
    session: Option<FollowSession>,
    diagnostics: Diagnostics,
    options: RouterOptions,
}

impl Default for FrameController {
    fn default() -> Self {
        Self::new(RouterOptions::default())
    }
}

impl FrameController {
    pub fn new(options: RouterOptions) -> Self {
        Self {
            registry: FrameRegistry::with_limits(options.max_depth, options.strict_validation),
            links: LinkAggregate::new(options.clip_links),
            session: None,
            diagnostics: Diagnostics::new(options.trace_routing),
            options,
        }
    }

    pub fn from_config(config: &RuneConfig) -> Self {
        Self::new(RouterOptions::from(config))
    }

    pub fn registry(&self) -> &FrameRegistry {
        &self.registry
    }

    pub fn links(&self) -> &LinkAggregate {
        &self.links
    }

    pub fn session(&self) -> Option<FollowSession> {
        self.session
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Handle one inbound frame message.
    pub fn handle<H: FrameHost + ?Sized>(
        &mut self,
        host: &mut H,
        message: Inbound,
    ) -> Option<ControllerEvent> {
        let result = match message {
            Inbound::ReportGeometry(report) => self.on_geometry(host, &report),
            Inbound::ReportLinks { frame_id, links } => self.on_links(host, frame_id, &links),
            Inbound::ReportEvent { frame_id, event } => self.on_event(host, frame_id, event),
        };
        self.flush(host);
        result
    }

    /// Decode and handle a JSON message. Undecodable input is a diagnostic.
    pub fn handle_json<H: FrameHost + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
    ) -> Option<ControllerEvent> {
        match Inbound::from_json(text) {
            Ok(message) => self.handle(host, message),
            Err(e) => {
                self.diagnostics.push(e.to_string());
                self.flush(host);
                None
            }
        }
    }

    fn on_geometry<H: FrameHost + ?Sized>(
        &mut self,
        host: &H,
        report: &GeometryReport,
    ) -> Option<ControllerEvent> {
        let scope = ViewScope::from_host(host);
        match self.registry.record_in(report, &scope) {
            Ok(summary) => {
                for refused in summary.refused {
                    self.diagnostics.push(refused.to_string());
                }
                if !summary.deferred.is_empty() {
                    debug!(frame = %report.frame_id, deferred = ?summary.deferred, "children not registered yet");
                }
                Some(ControllerEvent::Geometry {
                    frame: report.frame_id,
                    placed: summary.placed,
                })
            }
            Err(e) => {
                self.diagnostics.push(e.to_string());
                None
            }
        }
    }

    fn on_links<H: FrameHost + ?Sized>(
        &mut self,
        host: &mut H,
        frame: FrameId,
        links: &[LocalLink],
    ) -> Option<ControllerEvent> {
        let Some(session) = self.session else {
            debug!(%frame, "links reported outside follow mode");
            return None;
        };
        let Some(view) = host.view(session.view) else {
            self.diagnostics
                .push(format!("follow-mode view {} is gone", session.view));
            return None;
        };

        let live: HashSet<FrameId> = host.live_frames(view.id).into_iter().collect();
        if !live.contains(&frame) && self.registry.outermost(frame) != view.main_frame {
            debug!(%frame, view = %view.id, "ignoring links from a frame outside the follow-mode view");
            return None;
        }

        let stats = self.links.merge(&self.registry, frame, links, &live);
        if stats.unknown_frame {
            self.diagnostics
                .push(format!("links reported by unregistered frame {}", frame));
        }
        debug!(
            %frame,
            added = stats.added,
            clipped = stats.clipped,
            evicted = stats.evicted,
            "merged follow-mode links"
        );
        Some(ControllerEvent::Links(self.links.snapshot()))
    }

    fn on_event<H: FrameHost + ?Sized>(
        &mut self,
        host: &mut H,
        frame: FrameId,
        event: FrameEvent,
    ) -> Option<ControllerEvent> {
        let resolution = self.registry.resolve(frame);
        if resolution.truncated {
            self.diagnostics
                .push(format!("parent chain of frame {} does not terminate", frame));
        } else if let Some(missing) = resolution.missing {
            if missing == frame {
                self.diagnostics
                    .push(format!("{} event from unregistered frame {}", event.kind(), frame));
            } else {
                self.diagnostics.push(format!(
                    "frame {} has no record for ancestor {}",
                    frame, missing
                ));
            }
        }

        let absolute = EventTranslator::to_absolute(&self.registry, event, frame, &host.views());
        Some(ControllerEvent::Event(absolute))
    }

    /// Begin a follow-mode session in `view`.
    ///
    /// Clears the global link list before any frame can report, then asks
    /// every frame of the view to report. Returns how many frames were told.
    pub fn start_follow_mode<H: FrameHost + ?Sized>(
        &mut self,
        host: &mut H,
        view: ViewId,
        filter: FollowFilter,
    ) -> usize {
        let Some(handle) = host.view(view) else {
            self.diagnostics
                .push(format!("cannot start follow mode in unknown view {}", view));
            self.flush(host);
            return 0;
        };

        if self.options.prune_on_follow {
            self.prune_handle(host, handle);
        }
        self.links.reset(Some(view));
        self.session = Some(FollowSession { view, filter });

        let delivered = Dispatcher::broadcast(
            host,
            handle,
            &Outbound::StartFollowMode { filter },
            true,
            &mut self.diagnostics,
        );
        self.flush(host);
        delivered
    }

    /// End the current follow-mode session. The link list is kept until the
    /// next session starts.
    pub fn stop_follow_mode<H: FrameHost + ?Sized>(&mut self, host: &mut H) -> usize {
        let Some(session) = self.session.take() else {
            return 0;
        };
        let delivered = match host.view(session.view) {
            Some(handle) => Dispatcher::broadcast(
                host,
                handle,
                &Outbound::StopFollowMode,
                true,
                &mut self.diagnostics,
            ),
            None => 0,
        };
        self.flush(host);
        delivered
    }

    pub fn reset_links(&mut self) {
        self.links.reset(self.session.map(|s| s.view));
    }

    /// Route a window-absolute event into `view`.
    pub fn dispatch<H: FrameHost + ?Sized>(
        &mut self,
        host: &mut H,
        view: ViewId,
        event: FrameEvent,
    ) -> Dispatched {
        let Some(handle) = host.view(view) else {
            self.diagnostics
                .push(format!("dispatch to unknown view {}", view));
            self.flush(host);
            return Dispatched::Dropped;
        };
        let dispatched = Dispatcher::dispatch(
            host,
            &self.registry,
            handle,
            event,
            self.options.tie_break,
            &mut self.diagnostics,
        );
        self.flush(host);
        dispatched
    }

    /// Forget every frame of a closed view, plus records no remaining view
    /// accounts for. Takes the handle because the host may already have
    /// dropped the view.
    pub fn close_view<H: FrameHost + ?Sized>(&mut self, host: &mut H, view: ViewHandle) -> usize {
        let mut removed = self.registry.remove_view(view.main_frame);
        removed.extend(self.registry.prune_detached(&ViewScope::from_host(host)));
        if self.session.is_some_and(|s| s.view == view.id) {
            self.session = None;
            self.links.reset(None);
        }
        debug!(view = %view.id, removed = removed.len(), "closed view");
        self.flush(host);
        removed.len()
    }

    /// Drop records of frames the host no longer enumerates for `view`.
    pub fn prune_view<H: FrameHost + ?Sized>(&mut self, host: &mut H, view: ViewId) -> usize {
        let removed = match host.view(view) {
            Some(handle) => self.prune_handle(host, handle),
            None => {
                self.diagnostics
                    .push(format!("cannot prune unknown view {}", view));
                0
            }
        };
        self.flush(host);
        removed
    }

    fn prune_handle<H: FrameHost + ?Sized>(&mut self, host: &H, view: ViewHandle) -> usize {
        let removed = self.registry.prune(view.main_frame, &ViewScope::from_host(host));
        if !removed.is_empty() {
            debug!(view = %view.id, removed = ?removed, "pruned stale frame records");
        }
        removed.len()
    }

    fn flush<H: FrameHost + ?Sized>(&mut self, host: &mut H) {
        let notify = self.options.notify;
        for message in self.diagnostics.drain() {
            if notify {
                host.notify(&message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;

    #[test]
    fn options_follow_config() {
        let mut config = RuneConfig::default();
        config.routing.tie_break = TieBreak::Deepest;
        config.diagnostics.notify = false;
        config.diagnostics.categories = vec!["frames".into()];
        let options = RouterOptions::from(&config);
        assert!(options.trace_routing);
        assert_eq!(options.tie_break, TieBreak::Deepest);
        assert!(!options.notify);
        assert!(options.clip_links);
    }

    #[test]
    fn muted_diagnostics_stay_off_the_host() {
        let mut options = RouterOptions::default();
        options.notify = false;
        let mut controller = FrameController::new(options);
        let mut host = RecordingHost::new();
        assert!(controller.handle_json(&mut host, "not json").is_none());
        assert!(host.notifications.is_empty());
    }
}
