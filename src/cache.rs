//! In-memory application cache.
//!
//! Single source of truth for the fetched application collection. The cache
//! holds the last successful full fetch plus its timestamp; filter paths
//! reuse it while it is younger than the configured freshness window, and
//! mutations (delete, reset) invalidate it explicitly.
//!
//! Loads are guarded by a monotonically increasing sequence token: a fetch
//! only installs its result while its token is still the latest issued, so
//! a slow response can never overwrite state left by a newer load or an
//! invalidation that happened while it was in flight.

use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::RwLock;

use crate::api::TicketSource;
use crate::error::Result;
use crate::types::Ticket;

#[derive(Debug, Default)]
struct Slot {
    items: Option<Vec<Ticket>>,
    fetched_at: Option<Timestamp>,
    seq: u64,
}

/// Shared application cache over a [`TicketSource`].
///
/// Clones share the same underlying slot.
pub struct TicketCache<S> {
    source: Arc<S>,
    ttl_secs: i64,
    slot: Arc<RwLock<Slot>>,
}

impl<S> Clone for TicketCache<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            ttl_secs: self.ttl_secs,
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<S: TicketSource> TicketCache<S> {
    pub fn new(source: S, ttl_secs: u64) -> Self {
        Self {
            source: Arc::new(source),
            ttl_secs: ttl_secs as i64,
            slot: Arc::new(RwLock::new(Slot::default())),
        }
    }

    /// Return cached items, fetching only if nothing is loaded yet.
    ///
    /// On fetch failure the slot is left untouched (all-or-nothing replace).
    pub async fn ensure_loaded(&self) -> Result<Vec<Ticket>> {
        {
            let slot = self.slot.read().await;
            if let Some(items) = &slot.items {
                return Ok(items.clone());
            }
        }
        self.load().await
    }

    /// Return cached items, refetching when empty or older than the
    /// freshness window.
    pub async fn ensure_fresh(&self) -> Result<Vec<Ticket>> {
        {
            let slot = self.slot.read().await;
            if let (Some(items), Some(at)) = (&slot.items, slot.fetched_at)
                && Timestamp::now().as_second() - at.as_second() < self.ttl_secs
            {
                return Ok(items.clone());
            }
        }
        self.load().await
    }

    /// Discard any cached state and fetch a fresh collection.
    pub async fn force_reload(&self) -> Result<Vec<Ticket>> {
        self.invalidate().await;
        self.load().await
    }

    /// Drop cached items without fetching; the next read reloads.
    ///
    /// Also bumps the sequence token so an in-flight fetch started before
    /// the invalidation cannot repopulate the slot with pre-mutation data.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        slot.seq += 1;
        slot.items = None;
        slot.fetched_at = None;
    }

    /// Timestamp of the last successful load, if any.
    pub async fn fetched_at(&self) -> Option<Timestamp> {
        self.slot.read().await.fetched_at
    }

    async fn load(&self) -> Result<Vec<Ticket>> {
        let token = {
            let mut slot = self.slot.write().await;
            slot.seq += 1;
            slot.seq
        };

        // No lock held across the await: concurrent loads race on the token.
        let items = self.source.fetch_all().await?;

        let mut slot = self.slot.write().await;
        if slot.seq == token {
            slot.items = Some(items.clone());
            slot.fetched_at = Some(Timestamp::now());
            Ok(items)
        } else {
            tracing::debug!(token, current = slot.seq, "stale fetch discarded");
            match &slot.items {
                Some(current) => Ok(current.clone()),
                None => Ok(items),
            }
        }
    }
}
