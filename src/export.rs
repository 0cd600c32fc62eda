//! Server-side export downloads.
//!
//! The backend renders Excel files; on failure it answers with a short
//! plain-text message instead of a file. Status and content-type are
//! checked first, and only textual bodies fall back to matching the
//! backend's fixed set of "not found" phrases. That fragile contract is
//! isolated here, in [`DownloadOutcome::classify`] — nothing outside this
//! module inspects response bodies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jiff::civil;
use reqwest::header;
use reqwest::Response;

use crate::api::ApiConnection;
use crate::error::{CheckError, Result};
use crate::types::Ticket;

/// Error phrases the backend writes into an export response body instead of
/// a file. Matching any of these means "no file was produced".
const NOT_FOUND_PHRASES: [&str; 3] = ["Заявки не найдены", "Нет заявок", "Неверный формат"];

/// What an export request actually produced.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// A file arrived and was written to disk.
    Saved { path: PathBuf, bytes: u64 },
    /// The server answered with a known "nothing to export" message.
    Rejected { reason: String },
}

/// Classified response payload, before anything touches the filesystem.
enum Payload {
    File {
        suggested_name: Option<String>,
        bytes: Vec<u8>,
    },
    Rejected(String),
}

impl DownloadOutcome {
    /// Decide whether an export response is a file or a server-side
    /// rejection.
    ///
    /// Non-2xx is an outright error. A non-text content type is always a
    /// file. Text bodies are scanned for the known phrases; anything else
    /// is assumed to be a (textual) file, faithful to the backend contract.
    async fn classify(response: Response) -> Result<Payload> {
        let status = response.status();
        if !status.is_success() {
            return Err(crate::api::ApiError::with_status("export failed", status).into());
        }

        let suggested_name = attachment_filename(&response);
        let is_text = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/"));

        if is_text {
            let body = response.text().await?;
            if let Some(phrase) = NOT_FOUND_PHRASES.iter().copied().find(|p| body.contains(*p)) {
                let line = body
                    .lines()
                    .find(|l| l.contains(phrase))
                    .unwrap_or(phrase)
                    .trim()
                    .to_string();
                return Ok(Payload::Rejected(line));
            }
            return Ok(Payload::File {
                suggested_name,
                bytes: body.into_bytes(),
            });
        }

        let bytes = response.bytes().await?.to_vec();
        Ok(Payload::File {
            suggested_name,
            bytes,
        })
    }
}

/// Triggers export downloads and writes them to the download directory.
pub struct ExportBridge {
    conn: Arc<ApiConnection>,
    out_dir: PathBuf,
}

impl ExportBridge {
    pub fn new(conn: Arc<ApiConnection>, out_dir: PathBuf) -> Self {
        Self { conn, out_dir }
    }

    /// Export the current filtered result set.
    ///
    /// Refuses on an empty set without touching the network. Otherwise the
    /// application ids go to the search-export endpoint as a JSON-encoded
    /// list plus the derived file name.
    pub async fn export_search_results(
        &self,
        results: &[Ticket],
        search_name: &str,
    ) -> Result<DownloadOutcome> {
        if results.is_empty() {
            return Err(CheckError::ExportPrecondition);
        }

        let ids: Vec<i64> = results.iter().map(|t| t.id).collect();
        let url = self.conn.endpoint("api/applications/export/search")?;
        let form = [
            ("searchResults", serde_json::to_string(&ids)?),
            ("searchName", search_name.to_string()),
        ];

        let response = self.conn.post(url).form(&form).send().await?;
        self.finish(response, &format!("{search_name}.xlsx")).await
    }

    /// Export one application by its human-facing number.
    pub async fn export_single(&self, number: &str) -> Result<DownloadOutcome> {
        let mut url = self.conn.endpoint("api/applications/export")?;
        url.query_pairs_mut().append_pair("number", number);

        let response = self.conn.get(url).send().await?;
        let fallback = format!("application_{}.xlsx", sanitize_name_part(number));
        self.finish(response, &fallback).await
    }

    /// Export the entire collection.
    pub async fn export_all(&self) -> Result<DownloadOutcome> {
        let url = self.conn.endpoint("api/applications/export")?;
        let response = self.conn.get(url).send().await?;
        self.finish(response, "applications.xlsx").await
    }

    /// Export every application last edited on the given day.
    pub async fn export_by_date(&self, day: civil::Date) -> Result<DownloadOutcome> {
        let url = self
            .conn
            .endpoint(&format!("api/applications/export/date/{day}"))?;
        let response = self.conn.get(url).send().await?;
        let fallback = format!("applications_{}.xlsx", compact_date(day));
        self.finish(response, &fallback).await
    }

    async fn finish(&self, response: Response, fallback_name: &str) -> Result<DownloadOutcome> {
        match DownloadOutcome::classify(response).await? {
            Payload::Rejected(reason) => {
                tracing::warn!(%reason, "export rejected by server");
                Ok(DownloadOutcome::Rejected { reason })
            }
            Payload::File {
                suggested_name,
                bytes,
            } => {
                let name = suggested_name.as_deref().unwrap_or(fallback_name);
                let path = self.out_dir.join(name);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, &bytes)?;
                Ok(DownloadOutcome::Saved {
                    path,
                    bytes: bytes.len() as u64,
                })
            }
        }
    }
}

/// Derive the search-export file name from the active filter inputs:
/// whitespace runs in the term become underscores, date dashes are
/// stripped. With no inputs the name falls back to plain "applications".
pub fn search_export_name(term: &str, date: Option<civil::Date>) -> String {
    let mut name = String::from("applications");
    let term = term.trim();
    if !term.is_empty() {
        name.push('_');
        name.push_str(&sanitize_name_part(term));
    }
    if let Some(day) = date {
        name.push('_');
        name.push_str(&compact_date(day));
    }
    name
}

fn sanitize_name_part(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join("_")
}

fn compact_date(day: civil::Date) -> String {
    day.to_string().replace('-', "")
}

/// Pull a file name out of a Content-Disposition header, if the server
/// sent one.
fn attachment_filename(response: &Response) -> Option<String> {
    let raw = response
        .headers()
        .get(header::CONTENT_DISPOSITION)?
        .to_str()
        .ok()?;
    let name = raw
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?
        .trim_matches('"');
    // Defuse anything that could escape the download directory.
    let name = Path::new(name).file_name()?.to_str()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
