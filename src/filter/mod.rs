//! Client-side filtering of the application collection.
//!
//! [`FilterController`] is the orchestrator: it reads the current inputs,
//! picks the filter mode from which of them are populated ("smart" dispatch),
//! ensures the cache is usable, evaluates the predicates, and stores the
//! result set for re-rendering and export. State lives for one session and
//! is never persisted.

pub mod group;
pub mod predicate;

use std::fmt;

use jiff::civil;

use crate::api::TicketSource;
use crate::cache::TicketCache;
use crate::error::{CheckError, Result};
use crate::types::Ticket;

pub use group::{group_by_day, DayBucket, DayKey};
pub use predicate::{matches_date, matches_text};

/// Which filter is in effect. Derived from input presence on every apply,
/// never stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    None,
    TextOnly,
    DateOnly,
    Combined,
}

impl FilterMode {
    pub fn from_inputs(term: &str, date: Option<civil::Date>) -> Self {
        match (term.is_empty(), date.is_some()) {
            (true, false) => FilterMode::None,
            (false, false) => FilterMode::TextOnly,
            (true, true) => FilterMode::DateOnly,
            (false, true) => FilterMode::Combined,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterMode::None => write!(f, "none"),
            FilterMode::TextOnly => write!(f, "text"),
            FilterMode::DateOnly => write!(f, "date"),
            FilterMode::Combined => write!(f, "text+date"),
        }
    }
}

/// Session-scoped filter state.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    /// Normalized (trimmed, lowercased) free-text query, or empty.
    pub search_term: String,
    /// Selected calendar day, if any.
    pub selected_date: Option<civil::Date>,
    /// Last-computed result set; reused for re-render and export.
    pub results: Vec<Ticket>,
    /// True once any filter has been successfully applied.
    pub active: bool,
}

impl FilterState {
    pub fn mode(&self) -> FilterMode {
        FilterMode::from_inputs(&self.search_term, self.selected_date)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Outcome of a successful filter application. An empty result set is a
/// valid, reportable outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterReport {
    pub mode: FilterMode,
    pub matched: usize,
}

impl FilterReport {
    pub fn is_empty(&self) -> bool {
        self.matched == 0
    }
}

/// Orchestrates cache freshness, predicate evaluation, and filter state.
pub struct FilterController<S> {
    cache: TicketCache<S>,
    state: FilterState,
}

impl<S: TicketSource> FilterController<S> {
    pub fn new(cache: TicketCache<S>) -> Self {
        Self {
            cache,
            state: FilterState::default(),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn results(&self) -> &[Ticket] {
        &self.state.results
    }

    /// Dispatch on which inputs are populated: text-only, date-only, or
    /// combined. Both empty is an error and makes no network call.
    pub async fn smart_filter(
        &mut self,
        term: &str,
        date: Option<civil::Date>,
    ) -> Result<FilterReport> {
        let term = term.trim().to_lowercase();
        match (term.is_empty(), date) {
            (true, None) => Err(CheckError::EmptyFilterInput),
            (false, None) => self.apply_text_filter(&term).await,
            (true, Some(day)) => self.apply_date_filter(day).await,
            (false, Some(day)) => self.apply_combined_filter(&term, day).await,
        }
    }

    async fn apply_text_filter(&mut self, term: &str) -> Result<FilterReport> {
        let tickets = self.cache.ensure_fresh().await?;
        let results: Vec<Ticket> = tickets
            .into_iter()
            .filter(|t| matches_text(t, term))
            .collect();
        Ok(self.install(term.to_string(), None, results, FilterMode::TextOnly))
    }

    async fn apply_date_filter(&mut self, day: civil::Date) -> Result<FilterReport> {
        let tickets = self.cache.ensure_fresh().await?;
        let results: Vec<Ticket> = tickets
            .into_iter()
            .filter(|t| matches_date(t, day))
            .collect();
        Ok(self.install(String::new(), Some(day), results, FilterMode::DateOnly))
    }

    /// Both predicates ANDed. Evaluation order is irrelevant: each is an
    /// independent per-item check.
    async fn apply_combined_filter(
        &mut self,
        term: &str,
        day: civil::Date,
    ) -> Result<FilterReport> {
        let tickets = self.cache.ensure_fresh().await?;
        let results: Vec<Ticket> = tickets
            .into_iter()
            .filter(|t| matches_text(t, term) && matches_date(t, day))
            .collect();
        Ok(self.install(term.to_string(), Some(day), results, FilterMode::Combined))
    }

    /// Clear every filter input and result, then reload the full
    /// collection for the following render.
    pub async fn reset_all(&mut self) -> Result<Vec<Ticket>> {
        self.state.reset();
        self.cache.force_reload().await
    }

    fn install(
        &mut self,
        term: String,
        date: Option<civil::Date>,
        results: Vec<Ticket>,
        mode: FilterMode,
    ) -> FilterReport {
        let matched = results.len();
        self.state.search_term = term;
        self.state.selected_date = date;
        self.state.results = results;
        self.state.active = true;
        tracing::debug!(%mode, matched, "filter applied");
        FilterReport { mode, matched }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_mode_from_inputs() {
        assert_eq!(FilterMode::from_inputs("", None), FilterMode::None);
        assert_eq!(FilterMode::from_inputs("gsm", None), FilterMode::TextOnly);
        assert_eq!(
            FilterMode::from_inputs("", Some(date(2024, 1, 1))),
            FilterMode::DateOnly
        );
        assert_eq!(
            FilterMode::from_inputs("gsm", Some(date(2024, 1, 1))),
            FilterMode::Combined
        );
    }

    #[test]
    fn test_state_reset_is_idempotent() {
        let mut state = FilterState {
            search_term: "gsm".to_string(),
            selected_date: Some(date(2024, 1, 1)),
            results: vec![crate::types::blank(1)],
            active: true,
        };

        state.reset();
        let once = state.clone();
        state.reset();

        assert!(!state.active);
        assert!(state.results.is_empty());
        assert!(state.search_term.is_empty());
        assert!(state.selected_date.is_none());
        assert_eq!(state.search_term, once.search_term);
        assert_eq!(state.selected_date, once.selected_date);
        assert_eq!(state.active, once.active);
        assert_eq!(state.results.len(), once.results.len());
    }
}
