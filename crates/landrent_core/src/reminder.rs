//! Contract expiry reminders.
//!
//! Pure computation over entries already read from storage; scheduling the
//! daily scan and showing the OS notification stay with the caller.

use crate::model::entry::{format_date, Entry, EntryId};
use chrono::NaiveDate;

/// Days ahead of the end date a contract starts being reported.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Title for the notification built from [`notification_body`].
pub const NOTIFICATION_TITLE: &str = "End dates approaching!";

/// One contract ending soon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryNotice {
    pub entry_id: EntryId,
    pub name: String,
    pub end: NaiveDate,
    /// Whole days from `today` to `end`, always in `1..=window_days`.
    pub days_left: i64,
}

impl ExpiryNotice {
    pub fn message(&self) -> String {
        format!(
            "{} ends in {} days ({})",
            self.name,
            self.days_left,
            format_date(self.end)
        )
    }
}

/// Entries ending after `today` but within `window_days`, soonest first.
///
/// Contracts ending today or already ended are not reported. Unsaved entries
/// (no id) are skipped.
pub fn find_expiring(entries: &[Entry], today: NaiveDate, window_days: i64) -> Vec<ExpiryNotice> {
    let mut notices: Vec<ExpiryNotice> = entries
        .iter()
        .filter_map(|entry| {
            let entry_id = entry.id?;
            let days_left = entry.end.signed_duration_since(today).num_days();
            (days_left > 0 && days_left <= window_days).then(|| ExpiryNotice {
                entry_id,
                name: entry.name.clone(),
                end: entry.end,
                days_left,
            })
        })
        .collect();
    notices.sort_by_key(|notice| (notice.days_left, notice.entry_id));
    notices
}

/// Newline-joined notice messages, or `None` when there is nothing to report.
pub fn notification_body(notices: &[ExpiryNotice]) -> Option<String> {
    if notices.is_empty() {
        return None;
    }
    Some(
        notices
            .iter()
            .map(ExpiryNotice::message)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::{find_expiring, notification_body};
    use crate::model::entry::Entry;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn saved(id: i64, name: &str, end: NaiveDate) -> Entry {
        let mut entry = Entry::new(name, date(2020, 1, 1), end);
        entry.id = Some(id);
        entry
    }

    #[test]
    fn reports_only_contracts_inside_the_window() {
        let today = date(2025, 6, 1);
        let entries = vec![
            saved(1, "Ends today", today),
            saved(2, "Tomorrow", date(2025, 6, 2)),
            saved(3, "Edge", date(2025, 7, 1)),
            saved(4, "Too far", date(2025, 7, 2)),
            saved(5, "Already ended", date(2025, 5, 20)),
        ];

        let notices = find_expiring(&entries, today, 30);
        let ids: Vec<i64> = notices.iter().map(|n| n.entry_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(notices[0].days_left, 1);
        assert_eq!(notices[1].days_left, 30);
    }

    #[test]
    fn skips_unsaved_entries() {
        let mut entry = saved(1, "Draft", date(2025, 6, 10));
        entry.id = None;
        assert!(find_expiring(&[entry], date(2025, 6, 1), 30).is_empty());
    }

    #[test]
    fn body_lists_one_line_per_notice() {
        let today = date(2025, 6, 1);
        let entries = vec![
            saved(7, "South Field", date(2025, 6, 21)),
            saved(3, "North Field", date(2025, 6, 11)),
        ];
        let body = notification_body(&find_expiring(&entries, today, 30)).unwrap();
        assert_eq!(
            body,
            "North Field ends in 10 days (11-06-2025)\nSouth Field ends in 20 days (21-06-2025)"
        );
        assert_eq!(notification_body(&[]), None);
    }
}
