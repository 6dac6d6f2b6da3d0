//! Label-change planner.
//!
//! Pure pass over the fetched PR list: every PR whose title carries a
//! due-date marker within the window gets a [`LabelChange`] bringing its
//! `D-<n>` label in line with the computed D-day.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::debug;

use crate::{
    dday::{dday, extract_due_date},
    types::{LabelChange, PullRequest},
};

static DDAY_LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^D-(\d+)$").expect("invalid countdown-label regex"));

/// True if `name` is a countdown label (`D-<digits>`).
///
/// Note the digits are unsigned: a negative label such as `D--3`, while
/// producible by [`dday_label`], is never recognized here.
pub fn is_dday_label(name: &str) -> bool {
    DDAY_LABEL_PATTERN.is_match(name)
}

/// Formats the countdown label for a D-day value.
///
/// Zero and negative values render literally as `D-0` and `D--3`.
pub fn dday_label(dday: i64) -> String {
    format!("D-{dday}")
}

/// Computes the label delta for every PR whose due date falls within
/// `window` days of `now`.
///
/// PRs without a marker are excluded; so are PRs whose due date is more than
/// `window` days out, even when they carry a stale `D-<n>` label. Stale
/// labels outside the window are deliberately left untouched.
pub fn plan_label_changes(
    prs: &[PullRequest],
    now: NaiveDateTime,
    window: i64,
) -> Vec<LabelChange> {
    prs.iter()
        .filter_map(|pr| plan_for_pr(pr, now, window))
        .collect()
}

fn plan_for_pr(pr: &PullRequest, now: NaiveDateTime, window: i64) -> Option<LabelChange> {
    let due = extract_due_date(&pr.title, now)?;
    let days = dday(due, now);

    if days > window {
        debug!(pr = pr.number, %due, days, "due date outside window, skipping");
        return None;
    }

    // At most one countdown label exists per PR; first match wins if that
    // invariant is ever violated.
    let current = pr.labels.iter().find(|name| is_dday_label(name)).cloned();
    let next = dday_label(days);

    if current.as_deref() == Some(next.as_str()) {
        return None;
    }

    Some(LabelChange {
        number: pr.number,
        current,
        next: Some(next),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 12, 20)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn pr(number: u64, title: &str, labels: &[&str]) -> PullRequest {
        PullRequest {
            number,
            title: title.to_string(),
            url: format!("https://github.com/owner/repo/pull/{number}"),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn label_pattern_matches_digits_only() {
        assert!(is_dday_label("D-0"));
        assert!(is_dday_label("D-10"));
        assert!(!is_dday_label("D--3"));
        assert!(!is_dday_label("D-"));
        assert!(!is_dday_label("d-5"));
        assert!(!is_dday_label("D-5x"));
    }

    #[test]
    fn label_formats_literally_for_zero_and_negative() {
        assert_eq!(dday_label(5), "D-5");
        assert_eq!(dday_label(0), "D-0");
        assert_eq!(dday_label(-3), "D--3");
    }

    #[test]
    fn unmarked_pr_produces_no_change() {
        let prs = vec![pr(3, "No marker here", &["D-2"])];
        assert!(plan_label_changes(&prs, now(), 10).is_empty());
    }

    #[test]
    fn fresh_pr_gets_add_only_change() {
        let prs = vec![pr(1, "Fix bug (~12/25)", &["bug"])];
        let changes = plan_label_changes(&prs, now(), 10);
        assert_eq!(
            changes,
            vec![LabelChange {
                number: 1,
                current: None,
                next: Some("D-5".to_string()),
            }]
        );
    }

    #[test]
    fn stale_label_gets_swap_change() {
        let prs = vec![pr(2, "Feature (~12/26)", &["D-8", "feature"])];
        let changes = plan_label_changes(&prs, now(), 10);
        assert_eq!(
            changes,
            vec![LabelChange {
                number: 2,
                current: Some("D-8".to_string()),
                next: Some("D-6".to_string()),
            }]
        );
    }

    #[test]
    fn correct_label_produces_no_change() {
        let prs = vec![pr(4, "Fix bug (~12/25)", &["D-5"])];
        assert!(plan_label_changes(&prs, now(), 10).is_empty());
    }

    #[test]
    fn window_boundary_is_inclusive() {
        // D-10 is within the default window, D-11 is not.
        let prs = vec![
            pr(5, "At boundary (~12/30)", &[]),
            pr(6, "Past boundary (~12/31)", &["D-4"]),
        ];
        let changes = plan_label_changes(&prs, now(), 10);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].number, 5);
        assert_eq!(changes[0].next.as_deref(), Some("D-10"));
    }

    #[test]
    fn first_countdown_label_wins_when_invariant_violated() {
        let prs = vec![pr(7, "Doubly labelled (~12/25)", &["D-9", "D-7"])];
        let changes = plan_label_changes(&prs, now(), 10);
        assert_eq!(changes[0].current.as_deref(), Some("D-9"));
    }

    #[test]
    fn custom_window_is_honoured() {
        let prs = vec![pr(8, "Soon (~12/23)", &[])];
        assert!(plan_label_changes(&prs, now(), 2).is_empty());
        assert_eq!(plan_label_changes(&prs, now(), 3).len(), 1);
    }
}
