//! Application state and the rules for applying fetch results to it.
//!
//! [`App`] is the single owner of the collection, the update detector and
//! every piece of view state.  It never performs I/O: actions queue
//! [`Request`]s that the main loop hands to the worker, and completions
//! come back through [`App::apply`].

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use ratatui::widgets::ListState;

use crate::catalog::{PageResult, ScriptItem, SourceView};
use crate::detect::UpdateDetector;
use crate::poll::{LoadOrigin, Request, RequestSeq, Response};
use crate::schedule::{PollSchedule, Transient, NOTICE_DURATION};

/// Which key map is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    /// Typed characters edit the search query.
    Search,
}

/// Lazy source state for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceState {
    Loading,
    Loaded(SourceView),
    /// Placeholder text shown in place of the source.
    Failed(String),
}

const SOURCE_FAILED: &str = "Failed to load script source.";
const SOURCE_MISSING: &str = "No source available for this script.";

pub struct App {
    /// Every item currently known, newest first.
    pub items: Vec<ScriptItem>,
    /// Indices into `items` that match the current query.
    visible: Vec<usize>,
    /// Selection within `visible`.
    pub list_state: ListState,
    pub query: String,
    pub mode: Mode,

    /// Page the collection came from (or was requested, while loading).
    pub page: u32,
    /// Last reported page count, if the catalog sent one.
    pub max_page: Option<u32>,
    /// A page load is in flight.
    pub loading: bool,

    pub detector: UpdateDetector,
    pub schedule: PollSchedule,
    /// Count of items found by the last productive poll.
    pub badge: Transient<usize>,
    /// Short-lived error message.
    pub notice: Transient<String>,
    /// Persistent status line.
    pub status: String,

    revealed: HashSet<String>,
    sources: HashMap<String, SourceState>,

    page_seq: RequestSeq,
    poll_seq: RequestSeq,
    outbox: Vec<Request>,

    /// Whether the user has requested to quit.
    pub quit: bool,
}

impl App {
    pub fn new(schedule: PollSchedule, start_page: u32) -> Self {
        Self {
            items: Vec::new(),
            visible: Vec::new(),
            list_state: ListState::default(),
            query: String::new(),
            mode: Mode::Browse,
            page: start_page.max(1),
            max_page: None,
            loading: false,
            detector: UpdateDetector::new(),
            schedule,
            badge: Transient::new(NOTICE_DURATION),
            notice: Transient::new(NOTICE_DURATION),
            status: "Starting…".into(),
            revealed: HashSet::new(),
            sources: HashMap::new(),
            page_seq: RequestSeq::default(),
            poll_seq: RequestSeq::default(),
            outbox: Vec::new(),
            quit: false,
        }
    }

    /// Queue the initial page load.
    pub fn start(&mut self) {
        self.load_page(self.page, LoadOrigin::Startup);
    }

    /// Take every request queued since the last call.
    pub fn drain_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.outbox)
    }

    // -- timers --------------------------------------------------------------

    /// Advance timers: issue a poll when one is due and drop expired
    /// badges and notices.
    pub fn tick(&mut self, now: Instant) {
        if self.schedule.poll_due(now) {
            let seq = self.poll_seq.issue();
            tracing::debug!(seq, "scheduled poll");
            self.outbox.push(Request::Poll { seq });
        }
        self.badge.expire(now);
        self.notice.expire(now);
    }

    pub fn toggle_auto_refresh(&mut self, now: Instant) {
        let enabled = !self.schedule.enabled();
        self.schedule.set_enabled(enabled, now);
        tracing::info!(enabled, "auto-refresh toggled");
    }

    pub fn poll_faster(&mut self, now: Instant) {
        self.schedule.faster(now);
        tracing::info!(interval = ?self.schedule.interval(), "poll interval changed");
    }

    pub fn poll_slower(&mut self, now: Instant) {
        self.schedule.slower(now);
        tracing::info!(interval = ?self.schedule.interval(), "poll interval changed");
    }

    // -- pages ---------------------------------------------------------------

    fn load_page(&mut self, page: u32, origin: LoadOrigin) {
        let seq = self.page_seq.issue();
        self.page = page;
        self.loading = true;
        self.status = format!("Loading page {page}…");
        self.outbox.push(Request::LoadPage { seq, page, origin });
    }

    pub fn can_prev_page(&self) -> bool {
        self.page > 1
    }

    pub fn can_next_page(&self) -> bool {
        self.max_page.is_some_and(|max| self.page < max)
    }

    pub fn next_page(&mut self) {
        if self.can_next_page() {
            self.load_page(self.page + 1, LoadOrigin::Navigate);
        }
    }

    pub fn prev_page(&mut self) {
        if self.can_prev_page() {
            self.load_page(self.page - 1, LoadOrigin::Navigate);
        }
    }

    /// Reload the current page.
    pub fn refresh(&mut self) {
        self.load_page(self.page, LoadOrigin::ManualRefresh);
    }

    // -- completions ---------------------------------------------------------

    /// Apply one worker completion.
    pub fn apply(&mut self, response: Response, now: Instant) {
        match response {
            Response::Page { seq, page, origin, result } => {
                if !self.page_seq.is_latest(seq) {
                    tracing::debug!(seq, page, "discarding stale page load");
                    return;
                }
                self.loading = false;
                match result {
                    Ok(result) => self.apply_page(page, result),
                    Err(e) => {
                        tracing::warn!(page, error = %e, "page load failed");
                        self.apply_page(page, PageResult::empty());
                        self.status = "Failed to load scripts".into();
                        if origin == LoadOrigin::ManualRefresh {
                            self.notice.show(format!("Refresh failed: {e}"), now);
                        }
                    }
                }
            }
            Response::Poll { seq, result } => {
                if !self.poll_seq.is_latest(seq) {
                    tracing::debug!(seq, "discarding stale poll");
                    return;
                }
                self.apply_poll(PageResult::or_empty(result), now);
            }
            Response::Source { id, result } => {
                let state = match result {
                    Ok(view) => SourceState::Loaded(view),
                    Err(e) => {
                        tracing::warn!(%id, error = %e, "source load failed");
                        SourceState::Failed(SOURCE_FAILED.into())
                    }
                };
                self.sources.insert(id, state);
            }
        }
    }

    fn apply_page(&mut self, requested: u32, result: PageResult) {
        self.page = result.info.current.unwrap_or(requested);
        self.max_page = result.info.max;
        if requested == 1 {
            self.detector.prime(&result.items);
        }
        self.items = result.items;
        self.status = format!("Loaded {} scripts", self.items.len());
        tracing::info!(page = self.page, max = ?self.max_page, count = self.items.len(), "page loaded");
        self.refilter(None);
    }

    fn apply_poll(&mut self, page: PageResult, now: Instant) {
        if page.is_empty() {
            return;
        }
        let fresh = self.detector.scan(&page.items);
        if fresh.is_empty() {
            tracing::debug!(watermark = ?self.detector.watermark(), "poll found nothing new");
            return;
        }

        let count = fresh.len();
        let selected = self.selected_id();
        // `fresh` is oldest first; each goes to the front in turn.
        for item in fresh {
            self.items.insert(0, item);
        }
        self.badge.show(count, now);
        tracing::info!(count, watermark = ?self.detector.watermark(), "new scripts merged");
        self.refilter(selected);
    }

    // -- search --------------------------------------------------------------

    pub fn begin_search(&mut self) {
        self.mode = Mode::Search;
    }

    /// Leave search mode, keeping the query.
    pub fn commit_search(&mut self) {
        self.mode = Mode::Browse;
    }

    /// Leave search mode and clear the query.
    pub fn cancel_search(&mut self) {
        self.mode = Mode::Browse;
        if !self.query.is_empty() {
            let selected = self.selected_id();
            self.query.clear();
            self.refilter(selected);
        }
    }

    pub fn push_query(&mut self, c: char) {
        let selected = self.selected_id();
        self.query.push(c);
        self.refilter(selected);
    }

    pub fn pop_query(&mut self) {
        let selected = self.selected_id();
        if self.query.pop().is_some() {
            self.refilter(selected);
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_item().map(|i| i.id.clone())
    }

    /// Recompute the visible list.  `keep` is the id selected before
    /// `items` or the query changed; it stays selected if it still
    /// matches, otherwise the first item is selected.
    fn refilter(&mut self, keep: Option<String>) {

        let needle = self.query.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches_query(item, &needle))
            .map(|(i, _)| i)
            .collect();

        let position = keep
            .and_then(|id| self.visible_items().position(|item| item.id == id))
            .or_else(|| (!self.visible.is_empty()).then_some(0));
        self.list_state.select(position);
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &ScriptItem> + '_ {
        self.visible.iter().map(|&i| &self.items[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected_item(&self) -> Option<&ScriptItem> {
        let pos = self.list_state.selected()?;
        self.visible.get(pos).map(|&i| &self.items[i])
    }

    // -- source reveal -------------------------------------------------------

    /// Show or hide the selected item's source.  The first reveal queues
    /// the load; later reveals reuse whatever came back.
    pub fn toggle_source(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let id = item.id.clone();
        let raw_url = item.raw_url.clone();

        if self.revealed.remove(&id) {
            return;
        }
        self.revealed.insert(id.clone());
        if self.sources.contains_key(&id) {
            return;
        }

        match raw_url {
            Some(raw_url) => {
                self.sources.insert(id.clone(), SourceState::Loading);
                self.outbox.push(Request::LoadSource { id, raw_url });
            }
            None => {
                self.sources.insert(id, SourceState::Failed(SOURCE_MISSING.into()));
            }
        }
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.revealed.contains(id)
    }

    pub fn source(&self, id: &str) -> Option<&SourceState> {
        self.sources.get(id)
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.visible.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.visible.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.visible.is_empty() {
            self.list_state.select(Some(self.visible.len() - 1));
        }
    }
}

/// Case-insensitive substring match over the searchable fields.
/// `needle` must already be lowercase.
fn matches_query(item: &ScriptItem, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let hit = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(needle));
    hit(Some(item.title.as_str()))
        || hit(item.description.as_deref())
        || hit(item.creator.as_deref())
        || hit(item.author.as_ref().map(|a| a.name.as_str()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
