//! Terminal rendering for application lists.

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::filter::group::{group_by_day, DayKey};
use crate::types::Ticket;
use jiff::Zoned;

const COMMENTS_WIDTH: usize = 48;

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Engineer")]
    engineer: String,
    #[tabled(rename = "GSM")]
    gsm: String,
    #[tabled(rename = "Internet")]
    internet: String,
    #[tabled(rename = "Installed")]
    installed: String,
    #[tabled(rename = "Inspector")]
    inspector: String,
    #[tabled(rename = "Comments")]
    comments: String,
    #[tabled(rename = "Result")]
    result: String,
}

impl From<&Ticket> for TicketRow {
    fn from(ticket: &Ticket) -> Self {
        Self {
            number: ticket.application_number.clone().unwrap_or_default(),
            engineer: ticket.engineer.clone().unwrap_or_default(),
            gsm: ticket.gsm_level.clone().unwrap_or_default(),
            internet: ticket.internet_level.clone().unwrap_or_default(),
            installed: ticket.installation_date.clone().unwrap_or_default(),
            inspector: ticket.inspector.clone().unwrap_or_default(),
            comments: truncate(ticket.comments.as_deref().unwrap_or(""), COMMENTS_WIDTH),
            result: resolution_tag(ticket),
        }
    }
}

/// Render a flat table of applications.
pub fn render_table(tickets: &[Ticket]) -> String {
    let rows: Vec<TicketRow> = tickets.iter().map(TicketRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}

/// Render applications grouped by calendar day, newest first, with a
/// heading and count per bucket.
pub fn render_grouped(tickets: &[Ticket]) -> String {
    let mut out = String::new();
    for bucket in group_by_day(tickets) {
        let heading = day_heading(&bucket.key);
        let count = bucket.tickets.len();
        out.push_str(&format!(
            "{} ({count})\n",
            heading.cyan().bold()
        ));
        out.push_str(&render_table(&bucket.tickets));
        out.push('\n');
    }
    out
}

/// Totals line: overall count plus OK/NOK split.
pub fn totals_line(tickets: &[Ticket]) -> String {
    let total = tickets.len();
    let ok = tickets.iter().filter(|t| t.resolution).count();
    let nok = total - ok;
    format!(
        "Total: {} | OK: {} | NOK: {}",
        total.bold(),
        ok.green(),
        nok.red()
    )
}

/// Key/value detail view for a single application.
pub fn render_detail(ticket: &Ticket) -> String {
    let mut out = String::new();
    let mut field = |label: &str, value: &str| {
        let padded = format!("{:<12}", format!("{label}:"));
        out.push_str(&format!("{} {}\n", padded.cyan(), value));
    };

    field("id", &ticket.id.to_string());
    field(
        "number",
        ticket.application_number.as_deref().unwrap_or("-"),
    );
    field("engineer", ticket.engineer.as_deref().unwrap_or("-"));
    field("gsm", ticket.gsm_level.as_deref().unwrap_or("-"));
    field("internet", ticket.internet_level.as_deref().unwrap_or("-"));
    field(
        "reason",
        ticket.internet_reason.as_deref().unwrap_or("-"),
    );
    field(
        "installed",
        ticket.installation_date.as_deref().unwrap_or("-"),
    );
    field("inspector", ticket.inspector.as_deref().unwrap_or("-"));
    field("comments", ticket.comments.as_deref().unwrap_or("-"));
    field("updated", ticket.last_updated.as_deref().unwrap_or("-"));
    field("result", &resolution_tag(ticket));
    out
}

/// Day-bucket heading: "Today"/"Yesterday" for the two most recent days,
/// the ISO date otherwise.
pub fn day_heading(key: &DayKey) -> String {
    let DayKey::Dated(day) = key else {
        return "No date".to_string();
    };

    let today = Zoned::now().date();
    if *day == today {
        return "Today".to_string();
    }
    if let Ok(yesterday) = today.yesterday()
        && *day == yesterday
    {
        return "Yesterday".to_string();
    }
    day.to_string()
}

fn resolution_tag(ticket: &Ticket) -> String {
    if ticket.resolution {
        "OK".green().to_string()
    } else {
        "NOK".red().to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
