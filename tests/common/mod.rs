//! Shared test fixtures: an in-memory ticket source and fixture builders.
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use appcheck::{CheckError, Result, Ticket, TicketSource};

/// In-memory [`TicketSource`] with a fetch counter and a failure switch.
/// Clones share state, so tests keep a handle after handing one to the
/// cache.
#[derive(Clone, Default)]
pub struct MemorySource {
    tickets: Arc<Mutex<Vec<Ticket>>>,
    fetch_count: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl MemorySource {
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        Self {
            tickets: Arc::new(Mutex::new(tickets)),
            ..Self::default()
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn guard(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CheckError::Load("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TicketSource for MemorySource {
    async fn fetch_all(&self) -> Result<Vec<Ticket>> {
        self.guard()?;
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.tickets.lock().unwrap().clone())
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Ticket>> {
        self.guard()?;
        let mut tickets = self.tickets.lock().unwrap().clone();
        tickets.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        tickets.truncate(limit);
        Ok(tickets)
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Ticket> {
        self.guard()?;
        self.tickets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| CheckError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.guard()?;
        let mut tickets = self.tickets.lock().unwrap();
        let before = tickets.len();
        tickets.retain(|t| t.id != id);
        if tickets.len() == before {
            return Err(CheckError::Delete(id, "HTTP 404 Not Found".to_string()));
        }
        Ok(())
    }
}

/// Bare application with nothing but an id.
pub fn blank_ticket(id: i64) -> Ticket {
    Ticket {
        id,
        application_number: None,
        engineer: None,
        gsm_level: None,
        internet_level: None,
        internet_reason: None,
        installation_date: None,
        inspector: None,
        comments: None,
        resolution: false,
        last_updated: None,
    }
}

/// Application with a number and an optional last-edit timestamp.
pub fn ticket(id: i64, number: &str, updated: Option<&str>) -> Ticket {
    Ticket {
        application_number: Some(number.to_string()),
        last_updated: updated.map(String::from),
        ..blank_ticket(id)
    }
}
