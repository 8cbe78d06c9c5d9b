//! Listing pagination
//!
//! [`PaginationState`] holds the posts loaded so far, in the order the API
//! returned them, together with the cursor of the next page. It only changes
//! through [`PaginationState::append_page`] and the load methods built on it.
//!
//! Loads are split into [`PaginationState::begin_load`] and
//! [`PaginationState::complete_load`] so that a caller driving the fetch
//! itself cannot run two loads at once or apply a response that arrives
//! after the state moved on: every change bumps a generation counter, and a
//! ticket from an older generation is reported as [`LoadOutcome::Stale`].

use crate::client::{ClientError, ContentClient};
use crate::content::{ApiPage, ContentError, PostSummary};

/// Result of a load attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was applied; holds the number of posts appended
    Appended(usize),
    /// No cursor left, nothing was fetched
    Exhausted,
    /// Another load is still pending, nothing was fetched
    InFlight,
    /// The response belonged to an older state and was discarded
    Stale,
}

/// Permission to fetch one page
#[derive(Debug)]
pub struct LoadTicket {
    id: u64,
    generation: u64,
    cursor: String,
}

impl LoadTicket {
    /// URL to fetch
    pub fn cursor(&self) -> &str {
        &self.cursor
    }
}

/// Posts accumulated so far and the cursor of the next page
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    items: Vec<PostSummary>,
    next_page: Option<String>,
    generation: u64,
    next_ticket: u64,
    in_flight: Option<u64>,
}

impl PaginationState {
    /// Start from the first page of a listing query
    pub fn from_first_page(page: ApiPage) -> Result<Self, ContentError> {
        let mut state = Self::default();
        state.append_page(page)?;
        Ok(state)
    }

    pub fn items(&self) -> &[PostSummary] {
        &self.items
    }

    pub fn into_items(self) -> Vec<PostSummary> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cursor of the next page; `None` once the listing is exhausted
    pub fn current_cursor(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Map and append a fetched page, then take over its cursor
    ///
    /// All results are mapped before anything is appended, so a malformed
    /// document leaves the state untouched.
    pub fn append_page(&mut self, page: ApiPage) -> Result<usize, ContentError> {
        let summaries = page
            .results
            .iter()
            .map(PostSummary::from_document)
            .collect::<Result<Vec<_>, _>>()?;

        let appended = summaries.len();
        self.items.extend(summaries);
        self.next_page = page.next_page;
        self.generation += 1;

        Ok(appended)
    }

    /// Discard everything and start over from `first_page`
    ///
    /// Outstanding tickets become stale.
    pub fn reset(&mut self, first_page: ApiPage) -> Result<(), ContentError> {
        let fresh = Self::from_first_page(first_page)?;
        self.items = fresh.items;
        self.next_page = fresh.next_page;
        self.generation += 1;
        self.in_flight = None;
        Ok(())
    }

    /// Reserve the next page for fetching
    ///
    /// Returns `None` when there is no cursor or a load is already pending.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        let cursor = self.next_page.clone()?;

        self.next_ticket += 1;
        self.in_flight = Some(self.next_ticket);

        Some(LoadTicket {
            id: self.next_ticket,
            generation: self.generation,
            cursor,
        })
    }

    /// Apply the fetch result for `ticket`
    ///
    /// Failures leave items and cursor unchanged; the caller may retry with
    /// a new ticket.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<ApiPage, ClientError>,
    ) -> crate::error::Result<LoadOutcome> {
        if self.in_flight == Some(ticket.id) {
            self.in_flight = None;
        }

        if ticket.generation != self.generation {
            tracing::debug!("Discarding stale page response for {}", ticket.cursor);
            return Ok(LoadOutcome::Stale);
        }

        let page = result.map_err(|e| {
            tracing::warn!("Failed to load {}: {}", ticket.cursor, e);
            e
        })?;

        let appended = self.append_page(page).map_err(|e| {
            tracing::warn!("Page {} has a malformed post: {}", ticket.cursor, e);
            e
        })?;

        tracing::debug!(
            "Loaded {} more posts ({} total, more: {})",
            appended,
            self.items.len(),
            self.has_more()
        );

        Ok(LoadOutcome::Appended(appended))
    }

    /// Fetch the next page through `client` and append it
    pub async fn load_more<C>(&mut self, client: &C) -> crate::error::Result<LoadOutcome>
    where
        C: ContentClient + ?Sized,
    {
        if !self.has_more() {
            return Ok(LoadOutcome::Exhausted);
        }
        let Some(ticket) = self.begin_load() else {
            return Ok(LoadOutcome::InFlight);
        };

        let result = client.fetch_page(ticket.cursor()).await;
        self.complete_load(ticket, result)
    }
}
