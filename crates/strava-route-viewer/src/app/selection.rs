//! Search and selection flow
//!
//! Remote calls run as tokio tasks and report back through an unbounded channel
//! that the UI drains once per frame. Every request carries a ticket; a response
//! is committed only while its ticket is still the current one, so a slow answer
//! to an old request can never overwrite a newer one.

use crate::api::{ApiResult, RouteApi};
use crate::app::state::AppState;
use std::sync::Arc;
use strava_route_lib::{RouteDetails, RouteId, RouteStats, RouteSummary};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

pub const SEARCH_FAILED: &str = "Failed to search routes. Please try again.";
pub const DETAILS_FAILED: &str = "Failed to load route details";

/// Identifies one search request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Identifies one route selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket {
    pub generation: u64,
    pub route_id: RouteId,
}

/// Outcome of a remote call, tagged with the request it answers
#[derive(Debug)]
pub enum ApiEvent {
    SearchFinished {
        ticket: SearchTicket,
        result: ApiResult<Vec<RouteSummary>>,
    },
    DetailsLoaded {
        ticket: SelectionTicket,
        result: ApiResult<RouteDetails>,
    },
    /// `None` when the route has no stats or they could not be fetched
    StatsLoaded {
        ticket: SelectionTicket,
        stats: Option<RouteStats>,
    },
}

impl AppState {
    /// Start a search for the current query; blank queries are ignored
    pub fn begin_search(&mut self) -> Option<(SearchTicket, String)> {
        let query = self.search.query.trim();
        if query.is_empty() {
            return None;
        }
        let query = query.to_string();

        self.search.generation += 1;
        let ticket = SearchTicket(self.search.generation);
        self.search.current = Some(ticket);
        self.search.loading = true;
        self.search.error = None;
        Some((ticket, query))
    }

    /// Start loading a route, superseding any selection in flight
    pub fn begin_selection(&mut self, route_id: RouteId) -> SelectionTicket {
        self.selection_generation += 1;
        let ticket = SelectionTicket {
            generation: self.selection_generation,
            route_id,
        };
        self.selection = Some(ticket);
        self.stats = None;
        self.loading_details = true;
        self.loading_stats = false;
        self.error = None;
        ticket
    }

    /// Commit a response; returns `false` if it was stale and dropped
    pub fn apply_event(&mut self, event: ApiEvent) -> bool {
        match event {
            ApiEvent::SearchFinished { ticket, result } => {
                if self.search.current != Some(ticket) {
                    tracing::debug!("Dropping stale search response {:?}", ticket);
                    return false;
                }
                self.search.current = None;
                self.search.loading = false;
                match result {
                    Ok(results) => {
                        tracing::debug!("Search returned {} routes", results.len());
                        self.search.results = results;
                    }
                    Err(err) => {
                        tracing::warn!("Search failed: {}", err);
                        self.search.error = Some(SEARCH_FAILED.to_string());
                    }
                }
                true
            }
            ApiEvent::DetailsLoaded { ticket, result } => {
                if self.selection != Some(ticket) {
                    tracing::debug!("Dropping stale details for route {}", ticket.route_id);
                    return false;
                }
                self.loading_details = false;
                match result {
                    Ok(details) => {
                        tracing::info!("Loaded route {} ({})", details.id(), details.name());
                        self.selected_route = Some(details);
                        self.loading_stats = true;
                    }
                    Err(err) => {
                        tracing::error!("Failed to load route {}: {}", ticket.route_id, err);
                        self.error = Some(DETAILS_FAILED.to_string());
                        self.selection = None;
                    }
                }
                true
            }
            ApiEvent::StatsLoaded { ticket, stats } => {
                if self.selection != Some(ticket) {
                    tracing::debug!("Dropping stale stats for route {}", ticket.route_id);
                    return false;
                }
                self.selection = None;
                self.loading_stats = false;
                self.stats = stats;
                true
            }
        }
    }
}

/// Run a search and report its outcome
pub async fn search_task(
    api: Arc<dyn RouteApi>,
    ticket: SearchTicket,
    query: String,
    tx: EventSender,
) {
    let result = api.search(&query).await;
    tx.send(ApiEvent::SearchFinished { ticket, result });
}

/// Fetch details, then stats, of the selected route
///
/// Stats are only requested once details succeeded, and their failure is not an
/// error: the selection completes without stats.
pub async fn selection_task(
    api: Arc<dyn RouteApi>,
    ticket: SelectionTicket,
    tx: EventSender,
) {
    let result = api.get_details(ticket.route_id).await;
    let loaded = result.is_ok();
    tx.send(ApiEvent::DetailsLoaded { ticket, result });
    if !loaded {
        return;
    }

    let stats = match api.get_stats(ticket.route_id).await {
        Ok(stats) => Some(stats),
        Err(err) => {
            tracing::info!("Stats not available for route {}: {}", ticket.route_id, err);
            None
        }
    };
    tx.send(ApiEvent::StatsLoaded { ticket, stats });
}

/// Channel end held by tasks; wakes the UI up after each event
#[derive(Clone)]
pub struct EventSender {
    tx: UnboundedSender<ApiEvent>,
    repaint: Option<egui::Context>,
}

impl EventSender {
    pub fn new(tx: UnboundedSender<ApiEvent>, repaint: Option<egui::Context>) -> Self {
        Self { tx, repaint }
    }

    fn send(&self, event: ApiEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("UI is gone, dropping API event");
            return;
        }
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }
    }
}

/// Spawns remote calls and hands their outcomes to the UI thread
pub struct RouteLoader {
    api: Arc<dyn RouteApi>,
    runtime: Handle,
    tx: EventSender,
    rx: UnboundedReceiver<ApiEvent>,
}

impl RouteLoader {
    pub fn new(api: Arc<dyn RouteApi>, runtime: Handle, repaint: Option<egui::Context>) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            api,
            runtime,
            tx: EventSender::new(tx, repaint),
            rx,
        }
    }

    /// Search for the current query of `state`
    pub fn search(&self, state: &mut AppState) {
        let Some((ticket, query)) = state.begin_search() else {
            return;
        };
        tracing::debug!("Searching routes for {:?}", query);
        self.runtime
            .spawn(search_task(self.api.clone(), ticket, query, self.tx.clone()));
    }

    /// Select `route_id` and start loading it
    pub fn select(&self, state: &mut AppState, route_id: RouteId) {
        let ticket = state.begin_selection(route_id);
        tracing::debug!("Selecting route {}", route_id);
        self.runtime
            .spawn(selection_task(self.api.clone(), ticket, self.tx.clone()));
    }

    /// Apply every event received so far; returns how many were committed
    pub fn drain(&mut self, state: &mut AppState) -> usize {
        let mut committed = 0;
        while let Ok(event) = self.rx.try_recv() {
            if state.apply_event(event) {
                committed += 1;
            }
        }
        committed
    }
}
