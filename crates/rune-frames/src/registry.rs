//! Frame registry: per-frame geometry rebuilt incrementally from reports.
//!
//! Frames report asynchronously and out of order. A parent can only describe
//! the children it sees, by URL (or by handshake token when it planted one),
//! while each child announces its own id independently. The registry
//! upserts by id, matches children by token or URL, and keeps placements for
//! children that have not registered yet so that arrival order never matters.

use crate::error::{FrameError, Result};
use crate::geometry::{Point, Size};
use crate::id::FrameId;
use crate::report::{GeometryReport, SubframeReport};
use crate::scope::ViewScope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default bound on parent hops.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Geometry of one live content frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub id: FrameId,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Viewport origin relative to the immediate parent frame.
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
    /// Size minus whatever overflows the parent's viewport.
    pub usable_width: f64,
    pub usable_height: f64,
    /// Scroll offset carried with the parent's report.
    pub page_x: f64,
    pub page_y: f64,
    pub parent_id: Option<FrameId>,
}

impl FrameRecord {
    fn new(id: FrameId, url: String) -> Self {
        Self {
            id,
            url,
            token: None,
            origin_x: 0.0,
            origin_y: 0.0,
            width: 0.0,
            height: 0.0,
            usable_width: 0.0,
            usable_height: 0.0,
            page_x: 0.0,
            page_y: 0.0,
            parent_id: None,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.origin_x, self.origin_y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn usable_size(&self) -> Size {
        Size::new(self.usable_width, self.usable_height)
    }

    fn place(&mut self, placement: &Placement) {
        self.origin_x = placement.origin.x;
        self.origin_y = placement.origin.y;
        self.width = placement.size.width;
        self.height = placement.size.height;
        self.usable_width = placement.usable.width;
        self.usable_height = placement.usable.height;
        self.page_x = placement.page.x;
        self.page_y = placement.page.y;
        self.parent_id = Some(placement.parent);
    }
}

/// Where a parent says one of its children sits.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    parent: FrameId,
    origin: Point,
    size: Size,
    usable: Size,
    page: Point,
}

impl Placement {
    fn from_subframe(parent: FrameId, sub: &SubframeReport) -> Self {
        let overflow_x = (sub.rect.x + sub.rect.w - sub.viewport.width).max(0.0);
        let overflow_y = (sub.rect.y + sub.rect.h - sub.viewport.height).max(0.0);
        Self {
            parent,
            origin: sub.rect.origin(),
            size: Size::new(sub.rect.w, sub.rect.h),
            usable: Size::new(
                (sub.rect.w - overflow_x).max(0.0),
                (sub.rect.h - overflow_y).max(0.0),
            ),
            page: sub.scroll,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PendingKey {
    Token(String),
    Url(String),
}

/// What a single [`FrameRegistry::record`] call changed.
#[derive(Debug, Default)]
pub struct RecordSummary {
    /// Child records that received new geometry.
    pub placed: Vec<FrameId>,
    /// Child URLs that matched no record yet and were kept for later.
    pub deferred: Vec<String>,
    /// Placements refused because they would create a parent cycle.
    pub refused: Vec<FrameError>,
}

/// Outcome of walking a frame's parent chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Accumulated window-absolute origin.
    pub origin: Point,
    /// Last id reached; may lack a record when the chain is broken.
    pub outermost: FrameId,
    /// Parent hops taken.
    pub depth: usize,
    /// First id in the chain with no record, if any.
    pub missing: Option<FrameId>,
    /// The walk hit the hop limit (a cycle or an absurdly deep tree).
    pub truncated: bool,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.missing.is_none() && !self.truncated
    }
}

/// Keyed store of frame records.
///
/// Enumeration order is the [`FrameId`] order, which keeps hit-testing and
/// snapshots deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRegistry {
    records: BTreeMap<FrameId, FrameRecord>,
    /// Placements for children that matched no record, keyed by parent.
    pending: BTreeMap<(FrameId, PendingKey), Placement>,
    max_depth: usize,
    strict: bool,
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_DEPTH, false)
    }

    /// Registry with an explicit hop bound and optional strict validation.
    pub fn with_limits(max_depth: usize, strict: bool) -> Self {
        Self {
            records: BTreeMap::new(),
            pending: BTreeMap::new(),
            max_depth,
            strict,
        }
    }

    pub fn get(&self, id: FrameId) -> Option<&FrameRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: FrameId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameRecord> {
        self.records.values()
    }

    /// Copy of every record in enumeration order.
    pub fn snapshot(&self) -> Vec<FrameRecord> {
        self.records.values().cloned().collect()
    }

    /// Number of child placements waiting for their frame to register.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Apply a geometry report with no knowledge of the host's views.
    pub fn record(&mut self, report: &GeometryReport) -> Result<RecordSummary> {
        self.record_in(report, &ViewScope::default())
    }

    /// Apply a geometry report.
    ///
    /// Upserts the reporter, then places every record matching each
    /// sub-report (all of them on URL ties) that `scope` allows under the
    /// reporter. An unplaced reporter, or one that navigated, picks up a
    /// pending placement another frame left for it. Only strict validation
    /// makes this fail; everything else is reported through the summary.
    pub fn record_in(&mut self, report: &GeometryReport, scope: &ViewScope) -> Result<RecordSummary> {
        if self.strict {
            report.validate()?;
        }

        let reporter = report.frame_id;
        let record = self
            .records
            .entry(reporter)
            .or_insert_with(|| FrameRecord::new(reporter, report.url.clone()));
        let navigated = record.url != report.url;
        record.url = report.url.clone();
        if report.token.is_some() {
            record.token = report.token.clone();
        }
        let unplaced = record.parent_id.is_none();

        let mut summary = RecordSummary::default();

        if unplaced || navigated {
            if let Some(placement) = self.find_pending(reporter, scope) {
                self.apply(reporter, &placement, &mut summary);
            }
        }

        // Deferred placements only ever reflect the parent's latest report.
        self.pending.retain(|(parent, _), _| *parent != reporter);

        for sub in &report.subframes {
            let placement = Placement::from_subframe(reporter, sub);
            let children = self.match_children(reporter, sub, scope);
            if children.is_empty() {
                let key = match &sub.token {
                    Some(token) => PendingKey::Token(token.clone()),
                    None => PendingKey::Url(sub.url.clone()),
                };
                self.pending.insert((reporter, key), placement);
                summary.deferred.push(sub.url.clone());
                continue;
            }
            for child in children {
                self.apply(child, &placement, &mut summary);
            }
        }

        Ok(summary)
    }

    fn match_children(&self, reporter: FrameId, sub: &SubframeReport, scope: &ViewScope) -> Vec<FrameId> {
        let allowed = |r: &&FrameRecord| r.id != reporter && scope.may_parent(reporter, r.id);
        if let Some(token) = &sub.token {
            let by_token: Vec<FrameId> = self
                .records
                .values()
                .filter(allowed)
                .filter(|r| r.token.as_deref() == Some(token.as_str()))
                .map(|r| r.id)
                .collect();
            if !by_token.is_empty() {
                return by_token;
            }
        }
        self.records
            .values()
            .filter(allowed)
            .filter(|r| r.url == sub.url)
            .map(|r| r.id)
            .collect()
    }

    /// A deferred placement for `id`, by token first, then by URL.
    ///
    /// Entries are not consumed: every frame sharing the URL gets the same
    /// placement, as a direct match would have given it.
    fn find_pending(&self, id: FrameId, scope: &ViewScope) -> Option<Placement> {
        let record = self.records.get(&id)?;
        let lookup = |key: &PendingKey| {
            self.pending
                .iter()
                .filter(|((parent, k), _)| k == key && *parent != id && scope.may_parent(*parent, id))
                .map(|(_, placement)| *placement)
                .next()
        };
        record
            .token
            .clone()
            .map(PendingKey::Token)
            .and_then(|key| lookup(&key))
            .or_else(|| lookup(&PendingKey::Url(record.url.clone())))
    }

    fn apply(&mut self, child: FrameId, placement: &Placement, summary: &mut RecordSummary) {
        if self.is_in_chain(child, placement.parent) {
            summary.refused.push(FrameError::ParentCycle {
                child,
                parent: placement.parent,
            });
            return;
        }
        if let Some(record) = self.records.get_mut(&child) {
            record.place(placement);
            summary.placed.push(child);
        }
    }

    /// Whether `needle` is `start` or one of its ancestors.
    fn is_in_chain(&self, needle: FrameId, start: FrameId) -> bool {
        let mut current = start;
        for _ in 0..=self.records.len() {
            if current == needle {
                return true;
            }
            match self.records.get(&current).and_then(|r| r.parent_id) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        // Already cyclic; treat as a cycle so nothing gets worse.
        true
    }

    /// Walk the parent chain of `id`, accumulating local origins.
    ///
    /// Missing records contribute `(0, 0)`; the walk stops at the first one.
    pub fn resolve(&self, id: FrameId) -> Resolution {
        let limit = self.max_depth.min(self.records.len());
        let mut origin = Point::ORIGIN;
        let mut current = id;
        let mut depth = 0;
        let mut missing = None;
        let mut truncated = false;

        loop {
            let Some(record) = self.records.get(&current) else {
                missing = Some(current);
                break;
            };
            origin = origin + record.origin();
            let Some(parent) = record.parent_id else {
                break;
            };
            if depth >= limit {
                truncated = true;
                break;
            }
            depth += 1;
            current = parent;
        }

        Resolution {
            origin,
            outermost: current,
            depth,
            missing,
            truncated,
        }
    }

    /// Window-absolute top-left of the frame's viewport.
    pub fn resolve_absolute(&self, id: FrameId) -> Point {
        self.resolve(id).origin
    }

    /// The outermost id reachable from `id` by following parents.
    pub fn outermost(&self, id: FrameId) -> FrameId {
        self.resolve(id).outermost
    }

    pub fn depth(&self, id: FrameId) -> usize {
        self.resolve(id).depth
    }

    /// Records whose chain ends at `root`, excluding `root` itself.
    pub fn descendants(&self, root: FrameId) -> impl Iterator<Item = &FrameRecord> {
        self.records
            .values()
            .filter(move |r| r.id != root && self.resolve(r.id).outermost == root)
    }

    /// Drop every record rooted at `main_frame`, the main frame included.
    /// Used when the owning view closes.
    pub fn remove_view(&mut self, main_frame: FrameId) -> Vec<FrameId> {
        let doomed: Vec<FrameId> = self
            .records
            .values()
            .filter(|r| self.resolve(r.id).outermost == main_frame)
            .map(|r| r.id)
            .collect();
        self.remove_all(&doomed);
        doomed
    }

    /// Drop records rooted at `main_frame` that the host no longer
    /// enumerates for its view, plus every detached record.
    pub fn prune(&mut self, main_frame: FrameId, scope: &ViewScope) -> Vec<FrameId> {
        let view = scope.view_of(main_frame);
        let doomed: Vec<FrameId> = self
            .records
            .values()
            .filter(|r| {
                let outermost = self.resolve(r.id).outermost;
                if outermost == main_frame {
                    view.is_none_or(|v| !scope.is_live_in(r.id, v))
                } else {
                    Self::is_detached(r.id, outermost, scope)
                }
            })
            .map(|r| r.id)
            .collect();
        self.remove_all(&doomed);
        doomed
    }

    /// Drop records whose chain reaches no view's main frame and that no
    /// view enumerates, such as children destroyed before their parent
    /// ever placed them.
    pub fn prune_detached(&mut self, scope: &ViewScope) -> Vec<FrameId> {
        let doomed: Vec<FrameId> = self
            .records
            .values()
            .filter(|r| Self::is_detached(r.id, self.resolve(r.id).outermost, scope))
            .map(|r| r.id)
            .collect();
        self.remove_all(&doomed);
        doomed
    }

    fn is_detached(id: FrameId, outermost: FrameId, scope: &ViewScope) -> bool {
        !scope.is_main(outermost) && scope.view_of(id).is_none()
    }

    fn remove_all(&mut self, ids: &[FrameId]) {
        for id in ids {
            self.records.remove(id);
        }
        let records = &self.records;
        self.pending
            .retain(|(parent, _), _| records.contains_key(parent));
    }
}
