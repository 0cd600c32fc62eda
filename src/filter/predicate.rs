//! Per-application filter predicates.

use jiff::civil;

use crate::types::Ticket;

/// Case-insensitive substring match over the application's search fields.
///
/// `normalized_term` must already be trimmed and lowercased; callers guard
/// against passing an empty term. Evaluation is field-by-field and
/// short-circuits on the first hit.
pub fn matches_text(ticket: &Ticket, normalized_term: &str) -> bool {
    debug_assert!(!normalized_term.is_empty(), "callers filter out empty terms");
    ticket
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(normalized_term))
}

/// Calendar-day equality against the application's last-edit day in local
/// time. Time of day is ignored; applications without a parseable
/// `lastUpdated` never match.
pub fn matches_date(ticket: &Ticket, selected: civil::Date) -> bool {
    ticket.updated_day().is_some_and(|day| day == selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{blank, Ticket};
    use jiff::civil::date;

    fn sample() -> Ticket {
        Ticket {
            application_number: Some("A-100".to_string()),
            engineer: Some("Petrov".to_string()),
            comments: Some("GSM weak".to_string()),
            last_updated: Some("2024-05-01T23:59:00".to_string()),
            ..blank(1)
        }
    }

    #[test]
    fn test_text_match_is_case_insensitive() {
        assert!(matches_text(&sample(), "gsm"));
        assert!(matches_text(&sample(), "petrov"));
    }

    #[test]
    fn test_text_match_substring_in_any_field() {
        // "a-10" hits applicationNumber, "weak" hits comments
        assert!(matches_text(&sample(), "a-10"));
        assert!(matches_text(&sample(), "weak"));
        assert!(!matches_text(&sample(), "fiber"));
    }

    #[test]
    fn test_text_match_checks_exactly_the_eight_fields() {
        let mut ticket = blank(9);
        ticket.last_updated = Some("2024-05-01T10:00:00".to_string());
        // lastUpdated is not a search field
        assert!(!matches_text(&ticket, "2024"));

        ticket.installation_date = Some("15.12.2024".to_string());
        assert!(matches_text(&ticket, "2024"));
    }

    #[test]
    fn test_text_match_missing_fields_never_match() {
        assert!(!matches_text(&blank(2), "anything"));
    }

    #[test]
    fn test_date_match_ignores_time_of_day() {
        assert!(matches_date(&sample(), date(2024, 5, 1)));
        assert!(!matches_date(&sample(), date(2024, 5, 2)));
    }

    #[test]
    fn test_date_match_absent_last_updated_is_false() {
        assert!(!matches_date(&blank(3), date(2024, 5, 1)));
    }
}
