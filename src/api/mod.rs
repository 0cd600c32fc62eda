//! HTTP client for the application-tracker backend.
//!
//! The backend is a plain REST/JSON service. [`TicketSource`] is the seam
//! between the filter/cache machinery and the network: production code uses
//! [`HttpTicketSource`], tests inject an in-memory source.
//!
//! # Security note
//!
//! Basic-auth passwords are held in a [`SecretBox`] so they cannot leak
//! through `Debug` formatting if request logging is enabled.

pub mod error;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretBox};
use url::Url;

use crate::config::Config;
use crate::error::{CheckError, Result};
use crate::types::Ticket;

pub use error::ApiError;

/// Default number of applications the recent view asks for.
pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Read/mutate operations the filter core needs from the backend.
#[async_trait]
pub trait TicketSource: Send + Sync {
    /// Fetch the full application collection.
    async fn fetch_all(&self) -> Result<Vec<Ticket>>;

    /// Fetch the most recently updated applications.
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Ticket>>;

    /// Fetch a single application by server id.
    async fn fetch_by_id(&self, id: i64) -> Result<Ticket>;

    /// Delete an application. 2xx means deleted.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Shared connection state: one configured client plus the resolved base URL
/// and credentials. Cheap to share between the ticket source and the export
/// bridge.
pub struct ApiConnection {
    client: Client,
    base_url: Url,
    auth: Option<(String, SecretBox<String>)>,
}

impl ApiConnection {
    /// Build a connection from config.
    ///
    /// The client gets a 30s connect timeout and the configured total
    /// timeout so a stuck backend call errors instead of hanging forever.
    pub fn from_config(config: &Config) -> Result<Self> {
        // A trailing slash keeps Url::join from eating the last path segment
        // of a base like "http://host/tracker".
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        let auth = config
            .auth
            .as_ref()
            .map(|a| (a.username.clone(), SecretBox::new(Box::new(a.password.clone()))));

        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    /// Resolve an API path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Start a GET request with credentials applied.
    pub fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.authorize(self.client.get(url))
    }

    /// Start a POST request with credentials applied.
    pub fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.authorize(self.client.post(url))
    }

    /// Start a DELETE request with credentials applied.
    pub fn delete(&self, url: Url) -> reqwest::RequestBuilder {
        self.authorize(self.client.delete(url))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some((username, password)) => {
                builder.basic_auth(username, Some(password.expose_secret()))
            }
            None => builder,
        }
    }
}

/// [`TicketSource`] over the live backend.
#[derive(Clone)]
pub struct HttpTicketSource {
    conn: Arc<ApiConnection>,
}

impl HttpTicketSource {
    pub fn new(conn: Arc<ApiConnection>) -> Self {
        Self { conn }
    }

    async fn fetch_list(&self, url: Url) -> Result<Vec<Ticket>> {
        let context = url.path().to_string();
        let response = self.conn.get(url).send().await.map_err(|e| {
            CheckError::Load(format!("request to {context} failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Load(format!("{context} returned HTTP {status}")));
        }

        response
            .json::<Vec<Ticket>>()
            .await
            .map_err(|e| CheckError::Load(format!("invalid response from {context}: {e}")))
    }
}

#[async_trait]
impl TicketSource for HttpTicketSource {
    async fn fetch_all(&self) -> Result<Vec<Ticket>> {
        let url = self.conn.endpoint("api/applications")?;
        self.fetch_list(url).await
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Ticket>> {
        let mut url = self.conn.endpoint("api/applications/recent")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        self.fetch_list(url).await
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Ticket> {
        let url = self.conn.endpoint(&format!("api/applications/{id}"))?;
        let response = self.conn.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let err = ApiError::with_status("failed to fetch application", status);
            if err.is_not_found() {
                return Err(CheckError::NotFound(id.to_string()));
            }
            return Err(err.into());
        }

        Ok(response.json::<Ticket>().await?)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let url = self.conn.endpoint(&format!("api/applications/{id}"))?;
        let response = self
            .conn
            .delete(url)
            .send()
            .await
            .map_err(|e| CheckError::Delete(id, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Delete(id, format!("HTTP {status}")));
        }

        tracing::debug!(id, "application deleted");
        Ok(())
    }
}
