//! Compact search widget controller.
//!
//! Keystrokes go through the debouncer; the surviving value is classified and
//! handed to the fetcher on a background task. Completions come back through
//! an event channel and are applied only when they belong to the last issued
//! query, so a slow response for superseded input never replaces newer
//! results.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::debounce::{DebounceFire, Debouncer};
use crate::dismissal::{DismissReason, DropdownState, OutsideInteraction, OutsideSubscription};
use crate::fetcher::{DualFetcher, FetchOutcome, FetchPlan};
use crate::model::{ItemKind, SearchableItem};
use crate::navigation::{Navigator, Route};
use crate::query::{passes_min_length, within_max_length, SearchQuery};
use crate::source::{CatalogSource, PromptOrder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Debouncing { input: String },
    Fetching { query: String },
    Results(Vec<SearchableItem>),
    Empty,
    ShortcutRedirecting { route: Route },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    FetchCompleted {
        seq: u64,
        query: String,
        outcome: FetchOutcome,
    },
    Dismiss(DismissReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub kind: ItemKind,
    pub title: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub href: String,
}

impl From<&SearchableItem> for ResultEntry {
    fn from(item: &SearchableItem) -> Self {
        Self {
            kind: item.kind(),
            title: item.title().to_string(),
            slug: item.slug().to_string(),
            image_url: item.image_url().map(str::to_string),
            href: item.destination().path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Hidden,
    /// Spinner in place of the search icon with no earlier results to keep open.
    Loading,
    Dropdown(Vec<ResultEntry>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub debounce: Duration,
    pub min_query_chars: usize,
    pub plan: FetchPlan,
}

impl SessionSettings {
    pub fn compact(config: &Config) -> Self {
        Self {
            debounce: config.debounce(),
            min_query_chars: config.min_query_chars,
            plan: FetchPlan {
                limits: config.compact_limits,
                prompt_order: PromptOrder::Insertion,
            },
        }
    }
}

struct InFlight {
    seq: u64,
    cancel: CancellationToken,
}

pub struct SearchSession<S, N> {
    fetcher: DualFetcher<S>,
    navigator: N,
    settings: SessionSettings,
    input: String,
    state: SearchState,
    /// Last successful result set; survives debouncing and refetching.
    results: Vec<SearchableItem>,
    dropdown: DropdownState,
    last_issued: Option<String>,
    debouncer: Debouncer<String>,
    debounce_rx: mpsc::UnboundedReceiver<DebounceFire<String>>,
    awaiting_fire: Option<u64>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    in_flight: Option<InFlight>,
    next_seq: u64,
    outside: Option<OutsideSubscription>,
}

impl<S: CatalogSource, N: Navigator> SearchSession<S, N> {
    pub fn new(source: Arc<S>, navigator: N, settings: SessionSettings) -> Self {
        let (debouncer, debounce_rx) = Debouncer::new(settings.debounce);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            fetcher: DualFetcher::new(source),
            navigator,
            settings,
            input: String::new(),
            state: SearchState::Idle,
            results: Vec::new(),
            dropdown: DropdownState::default(),
            last_issued: None,
            debouncer,
            debounce_rx,
            awaiting_fire: None,
            events_tx,
            events_rx,
            in_flight: None,
            next_seq: 0,
            outside: None,
        }
    }

    /// Routes outside pointer-downs from `surface` into this session until it
    /// is dropped.
    pub fn attach_outside(&mut self, surface: &impl OutsideInteraction) {
        let tx = self.events_tx.clone();
        self.outside = Some(surface.on_outside(Arc::new(move || {
            let _ = tx.send(SessionEvent::Dismiss(DismissReason::OutsidePointer));
        })));
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn input_text(&self) -> &str {
        &self.input
    }

    pub fn is_dropdown_visible(&self) -> bool {
        self.dropdown.is_visible()
    }

    pub fn results(&self) -> &[SearchableItem] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SearchState::Fetching { .. })
    }

    pub fn is_busy(&self) -> bool {
        self.awaiting_fire.is_some() || self.in_flight.is_some()
    }

    pub fn presentation(&self) -> Presentation {
        if self.dropdown.is_visible() && !self.results.is_empty() {
            return Presentation::Dropdown(self.results.iter().map(ResultEntry::from).collect());
        }
        if self.is_loading() {
            Presentation::Loading
        } else {
            Presentation::Hidden
        }
    }

    /// Keystroke handler; `raw` is the whole current field value.
    pub fn input(&mut self, raw: &str) {
        self.input = raw.to_string();

        if !within_max_length(raw) {
            tracing::debug!(chars = raw.chars().count(), "input over query limit; not searching");
            self.debouncer.cancel();
            self.awaiting_fire = None;
            self.cancel_in_flight();
            self.last_issued = None;
            self.state = SearchState::Idle;
            return;
        }

        if !passes_min_length(raw, self.settings.min_query_chars) {
            self.debouncer.cancel();
            self.awaiting_fire = None;
            self.cancel_in_flight();
            self.last_issued = None;
            self.results.clear();
            self.state = SearchState::Idle;
            self.dropdown.set_visible(false);
            return;
        }

        let generation = self.debouncer.schedule(raw.to_string());
        self.awaiting_fire = Some(generation);
        self.state = SearchState::Debouncing {
            input: raw.to_string(),
        };
    }

    /// Waits for the next timer fire or completion and applies it.
    pub async fn next_event(&mut self) {
        tokio::select! {
            Some(fire) = self.debounce_rx.recv() => self.handle_fire(fire),
            Some(event) = self.events_rx.recv() => self.handle_event(event),
            else => {}
        }
    }

    /// Processes events until no timer or fetch is outstanding.
    pub async fn settle(&mut self) {
        while self.is_busy() {
            self.next_event().await;
        }
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_fire(&mut self, fire: DebounceFire<String>) {
        if !self.debouncer.is_current(fire.generation) {
            tracing::debug!(value = %fire.value, "dropping superseded debounce fire");
            return;
        }
        self.awaiting_fire = None;
        self.issue(fire.value);
    }

    fn issue(&mut self, raw: String) {
        let Some(query) = SearchQuery::parse(&raw) else {
            self.state = SearchState::Idle;
            return;
        };

        self.cancel_in_flight();
        let cancel = CancellationToken::new();
        self.next_seq += 1;
        let seq = self.next_seq;
        self.in_flight = Some(InFlight {
            seq,
            cancel: cancel.clone(),
        });
        self.last_issued = Some(raw.clone());
        self.state = SearchState::Fetching { query: raw.clone() };
        tracing::debug!(%raw, shortcut = query.is_code_shortcut(), "issuing search");

        let fetcher = self.fetcher.clone();
        let plan = self.settings.plan;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = fetcher.fetch(&query, plan, &cancel).await;
            let _ = tx.send(SessionEvent::FetchCompleted {
                seq,
                query: raw,
                outcome,
            });
        });
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::FetchCompleted {
                seq,
                query,
                outcome,
            } => self.apply(seq, query, outcome),
            SessionEvent::Dismiss(reason) => {
                self.dropdown.dismiss(reason);
            }
        }
    }

    fn apply(&mut self, seq: u64, query: String, outcome: FetchOutcome) {
        if self.last_issued.as_deref() != Some(query.as_str()) {
            tracing::debug!(%query, "dropping stale search response");
            return;
        }
        if outcome == FetchOutcome::Cancelled {
            return;
        }
        if self.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
            self.in_flight = None;
        }

        match outcome {
            FetchOutcome::Shortcut(Some(prompt)) => {
                let route = Route::Prompt { slug: prompt.slug };
                self.clear_input();
                self.dropdown.dismiss(DismissReason::Navigated);
                self.state = SearchState::ShortcutRedirecting {
                    route: route.clone(),
                };
                tracing::info!(path = %route.path(), "code shortcut redirect");
                self.navigator.navigate(&route);
            }
            FetchOutcome::Shortcut(None) => {
                self.results.clear();
                self.state = SearchState::Empty;
                self.dropdown.set_visible(false);
            }
            FetchOutcome::Merged(items) if items.is_empty() => {
                self.results.clear();
                self.state = SearchState::Empty;
                self.dropdown.set_visible(false);
            }
            FetchOutcome::Merged(items) => {
                self.results = items.clone();
                self.state = SearchState::Results(items);
                self.dropdown.set_visible(true);
            }
            FetchOutcome::Cancelled => {}
        }
    }

    /// Opens the entry at `index` of the result set on screen, which may be
    /// the previous one while a refetch is pending.
    pub fn select(&mut self, index: usize) -> Option<Route> {
        let route = self.results.get(index)?.destination();

        self.clear_input();
        self.state = SearchState::Idle;
        self.dropdown.dismiss(DismissReason::Navigated);
        self.navigator.navigate(&route);
        Some(route)
    }

    /// Explicit form submit: always goes to the search page for non-empty input.
    pub fn submit(&mut self) -> Option<Route> {
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            return None;
        }
        let route = Route::Search {
            query: trimmed.to_string(),
        };

        self.clear_input();
        self.state = SearchState::Idle;
        self.dropdown.dismiss(DismissReason::Navigated);
        self.navigator.navigate(&route);
        Some(route)
    }

    pub fn escape(&mut self) -> bool {
        self.dropdown.on_escape()
    }

    pub fn outside_pointer(&mut self) -> bool {
        self.dropdown.on_outside_pointer()
    }

    /// Reopens from memory; never refetches.
    pub fn focus(&mut self) -> bool {
        self.dropdown.on_focus(!self.results.is_empty())
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.results.clear();
        self.debouncer.cancel();
        self.awaiting_fire = None;
        self.cancel_in_flight();
        self.last_issued = None;
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
        }
    }
}

impl<S, N> Drop for SearchSession<S, N> {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
        }
    }
}
