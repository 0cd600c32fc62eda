//! Calendar-day grouping for display.
//!
//! Buckets are keyed by [`DayKey`], a tagged union instead of a raw string,
//! so the "no date" bucket has an explicit position (always last) rather
//! than landing wherever a sentinel string happens to collate.

use std::collections::BTreeMap;
use std::fmt;

use jiff::civil;

use crate::types::Ticket;

/// Key of one day bucket.
///
/// Variant order matters: `Undated` is declared first so the derived `Ord`
/// ranks it below every dated key, which puts it last once buckets are
/// emitted newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayKey {
    Undated,
    Dated(civil::Date),
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayKey::Dated(day) => write!(f, "{day}"),
            DayKey::Undated => write!(f, "no date"),
        }
    }
}

/// One day's worth of applications, in input order.
#[derive(Debug, Clone)]
pub struct DayBucket {
    pub key: DayKey,
    pub tickets: Vec<Ticket>,
}

/// Group applications into calendar-day buckets, newest day first, the
/// undated bucket last. Relative order within a bucket matches the input.
pub fn group_by_day(tickets: &[Ticket]) -> Vec<DayBucket> {
    let mut buckets: BTreeMap<DayKey, Vec<Ticket>> = BTreeMap::new();

    for ticket in tickets {
        let key = ticket
            .updated_day()
            .map(DayKey::Dated)
            .unwrap_or(DayKey::Undated);
        buckets.entry(key).or_default().push(ticket.clone());
    }

    buckets
        .into_iter()
        .rev()
        .map(|(key, tickets)| DayBucket { key, tickets })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::blank;
    use jiff::civil::date;

    fn on_day(id: i64, day: &str) -> Ticket {
        Ticket {
            last_updated: Some(format!("{day}T10:00:00")),
            ..blank(id)
        }
    }

    #[test]
    fn test_groups_emitted_newest_first() {
        let tickets = vec![
            on_day(1, "2024-01-01"),
            on_day(2, "2024-03-15"),
            on_day(3, "2024-02-10"),
        ];

        let buckets = group_by_day(&tickets);
        let keys: Vec<DayKey> = buckets.iter().map(|b| b.key).collect();
        assert_eq!(
            keys,
            vec![
                DayKey::Dated(date(2024, 3, 15)),
                DayKey::Dated(date(2024, 2, 10)),
                DayKey::Dated(date(2024, 1, 1)),
            ]
        );
    }

    #[test]
    fn test_undated_bucket_sorts_last() {
        let tickets = vec![blank(1), on_day(2, "2024-06-01"), blank(3)];

        let buckets = group_by_day(&tickets);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, DayKey::Dated(date(2024, 6, 1)));
        assert_eq!(buckets[1].key, DayKey::Undated);
        assert_eq!(buckets[1].tickets.len(), 2);
    }

    #[test]
    fn test_grouping_preserves_every_ticket_exactly_once() {
        let tickets = vec![
            on_day(1, "2024-01-01"),
            on_day(2, "2024-01-01"),
            blank(3),
            on_day(4, "2024-01-02"),
        ];

        let buckets = group_by_day(&tickets);
        let total: usize = buckets.iter().map(|b| b.tickets.len()).sum();
        assert_eq!(total, tickets.len());

        let mut seen: Vec<i64> = buckets
            .iter()
            .flat_map(|b| b.tickets.iter().map(|t| t.id))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_order_within_bucket_is_stable() {
        let tickets = vec![
            on_day(10, "2024-01-01"),
            on_day(5, "2024-01-01"),
            on_day(8, "2024-01-01"),
        ];

        let buckets = group_by_day(&tickets);
        let ids: Vec<i64> = buckets[0].tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![10, 5, 8]);
    }

    #[test]
    fn test_empty_input_yields_no_buckets() {
        assert!(group_by_day(&[]).is_empty());
    }

    #[test]
    fn test_day_key_display() {
        assert_eq!(DayKey::Dated(date(2024, 5, 1)).to_string(), "2024-05-01");
        assert_eq!(DayKey::Undated.to_string(), "no date");
    }
}
