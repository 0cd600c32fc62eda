//! Command implementations for the CLI.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use jiff::civil;
use owo_colors::OwoColorize;

use crate::api::{ApiConnection, HttpTicketSource, TicketSource};
use crate::cache::TicketCache;
use crate::config::Config;
use crate::display;
use crate::error::{CheckError, Result};
use crate::export::{search_export_name, DownloadOutcome, ExportBridge};
use crate::filter::{FilterController, FilterMode};

/// Search results up to this size render flat; larger sets get day grouping.
const FLAT_RESULT_LIMIT: usize = 10;

/// Everything a command needs: one connection, the shared cache, the filter
/// controller, and the export bridge.
pub struct App {
    pub source: HttpTicketSource,
    pub cache: TicketCache<HttpTicketSource>,
    pub controller: FilterController<HttpTicketSource>,
    pub exporter: ExportBridge,
}

impl App {
    pub fn from_config(config: &Config) -> Result<Self> {
        let conn = Arc::new(ApiConnection::from_config(config)?);
        let source = HttpTicketSource::new(Arc::clone(&conn));
        let cache = TicketCache::new(source.clone(), config.cache_ttl);
        let controller = FilterController::new(cache.clone());
        let out_dir = config
            .export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let exporter = ExportBridge::new(conn, out_dir);

        Ok(Self {
            source,
            cache,
            controller,
            exporter,
        })
    }
}

/// Parse a CLI-supplied calendar day.
pub fn parse_cli_date(raw: &str) -> Result<civil::Date> {
    raw.trim()
        .parse()
        .map_err(|_| CheckError::InvalidDate(raw.to_string()))
}

/// Show the most recently updated applications.
pub async fn cmd_recent(app: &App, limit: usize, output_json: bool) -> Result<()> {
    let tickets = app.source.fetch_recent(limit).await?;

    if output_json {
        println!("{}", serde_json::to_string_pretty(&tickets)?);
        return Ok(());
    }

    if tickets.is_empty() {
        println!("No applications yet.");
        return Ok(());
    }

    println!("{}", display::render_table(&tickets));
    println!("{} applications", tickets.len());
    Ok(())
}

/// Show the full collection grouped by day. Doubles as the "reset"
/// affordance: any session filter state is cleared and the collection is
/// reloaded.
pub async fn cmd_ls(app: &mut App, output_json: bool) -> Result<()> {
    let tickets = app.controller.reset_all().await?;

    if output_json {
        println!("{}", serde_json::to_string_pretty(&tickets)?);
        return Ok(());
    }

    if tickets.is_empty() {
        println!("No applications yet.");
        return Ok(());
    }

    print!("{}", display::render_grouped(&tickets));
    println!("{}", display::totals_line(&tickets));
    Ok(())
}

/// Smart filter: text-only, date-only, or combined, depending on which
/// inputs are present. Optionally exports the result set afterwards.
pub async fn cmd_filter(
    app: &mut App,
    term: &str,
    date: Option<&str>,
    export: bool,
    output_json: bool,
) -> Result<()> {
    let date = date.map(parse_cli_date).transpose()?;
    let report = app.controller.smart_filter(term, date).await?;

    if output_json {
        println!(
            "{}",
            serde_json::to_string_pretty(app.controller.results())?
        );
        return Ok(());
    }

    if report.is_empty() {
        println!("{}", no_results_message(report.mode, app));
        println!("Run `appcheck ls` to see all applications.");
        return Ok(());
    }

    println!(
        "{} {}",
        format!("Found {} applications", report.matched).green(),
        filter_description(app).dimmed()
    );

    let results = app.controller.results();
    if results.len() <= FLAT_RESULT_LIMIT {
        println!("{}", display::render_table(results));
    } else {
        print!("{}", display::render_grouped(results));
    }

    if export {
        let state = app.controller.state();
        let name = search_export_name(&state.search_term, state.selected_date);
        let results = app.controller.results().to_vec();
        let outcome = app.exporter.export_search_results(&results, &name).await?;
        report_download(&outcome);
    }

    Ok(())
}

/// Display one application.
pub async fn cmd_show(app: &App, id: i64, output_json: bool) -> Result<()> {
    let ticket = app.source.fetch_by_id(id).await?;

    if output_json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
        return Ok(());
    }

    print!("{}", display::render_detail(&ticket));
    Ok(())
}

/// Delete an application and invalidate the cached collection so the next
/// read refetches.
pub async fn cmd_delete(app: &App, id: i64, skip_confirm: bool) -> Result<()> {
    if !skip_confirm
        && !confirm(&format!("Delete application {id}? This cannot be undone."))?
    {
        println!("Aborted.");
        return Ok(());
    }

    let result = app.source.delete(id).await;
    // Backend state is unknown after a failed delete; drop the cache either way.
    app.cache.invalidate().await;
    result?;

    println!("{}", format!("Application {id} deleted").green());
    Ok(())
}

/// Export the full collection.
pub async fn cmd_export_all(app: &App) -> Result<()> {
    let outcome = app.exporter.export_all().await?;
    report_download(&outcome);
    Ok(())
}

/// Export one application by number.
pub async fn cmd_export_number(app: &App, number: &str) -> Result<()> {
    let outcome = app.exporter.export_single(number).await?;
    report_download(&outcome);
    Ok(())
}

/// Export all applications edited on the given day.
pub async fn cmd_export_date(app: &App, date: &str) -> Result<()> {
    let day = parse_cli_date(date)?;
    let outcome = app.exporter.export_by_date(day).await?;
    report_download(&outcome);
    Ok(())
}

/// Show current configuration. Passwords are never printed.
pub fn cmd_config_show() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "Configuration:".cyan().bold());
    println!("  base_url: {}", config.base_url);
    println!("  timeout: {}s", config.timeout);
    println!("  cache_ttl: {}s", config.cache_ttl);
    match &config.export_dir {
        Some(dir) => println!("  export_dir: {}", dir.display()),
        None => println!("  export_dir: {}", "current directory".dimmed()),
    }
    match &config.auth {
        Some(auth) => println!("  auth: {} (password set)", auth.username),
        None => println!("  auth: {}", "not configured".dimmed()),
    }
    println!("  config file: {}", Config::config_path()?.display());
    Ok(())
}

/// Set a configuration value and persist it.
pub fn cmd_config_set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    println!("{key} updated");
    Ok(())
}

/// Print a single configuration value.
pub fn cmd_config_get(key: &str) -> Result<()> {
    let config = Config::load()?;
    println!("{}", config.get(key)?);
    Ok(())
}

fn filter_description(app: &App) -> String {
    let state = app.controller.state();
    let mut parts = Vec::new();
    if !state.search_term.is_empty() {
        parts.push(format!("search: \"{}\"", state.search_term));
    }
    if let Some(day) = state.selected_date {
        parts.push(format!("date: {day}"));
    }
    parts.join(" | ")
}

fn no_results_message(mode: FilterMode, app: &App) -> String {
    let state = app.controller.state();
    match mode {
        FilterMode::TextOnly => {
            format!("Nothing found for \"{}\"", state.search_term)
        }
        FilterMode::DateOnly => match state.selected_date {
            Some(day) => format!("No applications edited on {day}"),
            None => "No applications matched".to_string(),
        },
        FilterMode::Combined => match state.selected_date {
            Some(day) => format!(
                "No applications for \"{}\" on {day}",
                state.search_term
            ),
            None => "No applications matched".to_string(),
        },
        FilterMode::None => "No applications matched".to_string(),
    }
}

fn report_download(outcome: &DownloadOutcome) {
    match outcome {
        DownloadOutcome::Saved { path, bytes } => {
            println!(
                "{}",
                format!("Saved {} ({bytes} bytes)", path.display()).green()
            );
        }
        DownloadOutcome::Rejected { reason } => {
            println!("{}", format!("Server declined the export: {reason}").yellow());
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
