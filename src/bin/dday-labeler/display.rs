use std::io::{self, IsTerminal, Write};

use anyhow::Result;
use chrono::{NaiveDateTime, NaiveTime};
use chrono_humanize::HumanTime;
use dday_labeler::{LabelChange, PullRequest, SyncReport, extract_due_date};

const TABLE_HEADERS: &[&str] = &["PR", "LABEL", "DUE", "TITLE"];
const TITLE_COLUMN_INDEX: usize = TABLE_HEADERS.len() - 1;
const COLUMN_SEPARATOR: &str = "  ";
const TITLE_TRUNCATION_SUFFIX: &str = "...";
const MIN_TITLE_WIDTH_FOR_TRUNCATION: usize = 3;

/// Prints affected PR numbers only, one per line.
pub fn display_changes_quiet<W: Write>(changes: &[LabelChange], writer: &mut W) -> Result<()> {
    for change in changes {
        writeln!(writer, "{}", change.number)?;
    }
    Ok(())
}

/// Prints the planned label changes as an aligned table.
pub fn display_plan_table<W: Write>(
    report: &SyncReport,
    now: NaiveDateTime,
    writer: &mut W,
) -> Result<()> {
    display_plan_table_with_width(report, now, writer, None)
}

fn get_terminal_width(width_override: Option<usize>) -> usize {
    if let Some(width) = width_override {
        width
    } else if io::stdout().is_terminal() {
        terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(usize::MAX)
    } else {
        usize::MAX
    }
}

fn format_label_delta(change: &LabelChange) -> String {
    format!(
        "{} -> {}",
        change.current.as_deref().unwrap_or("-"),
        change.next.as_deref().unwrap_or("-")
    )
}

fn format_due(pr: &PullRequest, now: NaiveDateTime) -> String {
    match extract_due_date(&pr.title, now) {
        Some(due) => {
            let offset = HumanTime::from(due.and_time(NaiveTime::MIN) - now);
            format!("{due} ({offset})")
        }
        None => "-".to_string(),
    }
}

fn change_to_table_row(
    change: &LabelChange,
    prs: &[PullRequest],
    now: NaiveDateTime,
) -> Vec<String> {
    let pr = prs.iter().find(|pr| pr.number == change.number);

    vec![
        format!("#{}", change.number),
        format_label_delta(change),
        pr.map_or_else(|| "-".to_string(), |pr| format_due(pr, now)),
        pr.map_or_else(String::new, |pr| pr.title.clone()),
    ]
}

fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    widths
}

fn apply_title_truncation(rows: &mut [Vec<String>], widths: &mut [usize], terminal_width: usize) {
    if terminal_width == usize::MAX {
        return;
    }

    let separator_width = COLUMN_SEPARATOR.len() * (widths.len() - 1);
    let non_title_width: usize =
        widths[..TITLE_COLUMN_INDEX].iter().sum::<usize>() + separator_width;

    if non_title_width >= terminal_width {
        return;
    }

    let available_title_width = terminal_width - non_title_width - COLUMN_SEPARATOR.len();
    let max_title_width = rows
        .iter()
        .map(|row| row.get(TITLE_COLUMN_INDEX).map_or(0, |s| s.len()))
        .max()
        .unwrap_or(0);

    if max_title_width > available_title_width
        && available_title_width > MIN_TITLE_WIDTH_FOR_TRUNCATION
    {
        widths[TITLE_COLUMN_INDEX] = available_title_width;

        for row in rows {
            if let Some(title) = row.get_mut(TITLE_COLUMN_INDEX)
                && title.len() > available_title_width
            {
                let truncate_at = available_title_width - TITLE_TRUNCATION_SUFFIX.len();
                *title = format!("{}{}", &title[..truncate_at], TITLE_TRUNCATION_SUFFIX);
            }
        }
    }
}

fn render_table_headers<W: Write>(
    headers: &[&str],
    widths: &[usize],
    writer: &mut W,
) -> Result<()> {
    for (i, header) in headers.iter().enumerate() {
        write!(writer, "{:<width$}", header, width = widths[i])?;
        if i < headers.len() - 1 {
            write!(writer, "{COLUMN_SEPARATOR}")?;
        }
    }
    writeln!(writer)?;
    Ok(())
}

fn render_table_separator<W: Write>(widths: &[usize], writer: &mut W) -> Result<()> {
    for (i, &width) in widths.iter().enumerate() {
        write!(writer, "{}", "-".repeat(width))?;
        if i < widths.len() - 1 {
            write!(writer, "{COLUMN_SEPARATOR}")?;
        }
    }
    writeln!(writer)?;
    Ok(())
}

fn render_table_rows<W: Write>(rows: &[Vec<String>], widths: &[usize], writer: &mut W) -> Result<()> {
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            write!(writer, "{:<width$}", cell, width = widths[i])?;
            if i < row.len() - 1 {
                write!(writer, "{COLUMN_SEPARATOR}")?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn display_plan_table_with_width<W: Write>(
    report: &SyncReport,
    now: NaiveDateTime,
    writer: &mut W,
    width_override: Option<usize>,
) -> Result<()> {
    if report.changes.is_empty() {
        writeln!(
            writer,
            "No label changes needed ({} open PRs scanned)",
            report.prs.len()
        )?;
        return Ok(());
    }

    let terminal_width = get_terminal_width(width_override);
    let mut rows: Vec<Vec<String>> = report
        .changes
        .iter()
        .map(|change| change_to_table_row(change, &report.prs, now))
        .collect();
    let mut widths = calculate_column_widths(TABLE_HEADERS, &rows);

    apply_title_truncation(&mut rows, &mut widths, terminal_width);

    render_table_headers(TABLE_HEADERS, &widths, writer)?;
    render_table_separator(&widths, writer)?;
    render_table_rows(&rows, &widths, writer)?;

    Ok(())
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

    fn swap(number: u64, current: &str, next: &str) -> LabelChange {
        LabelChange {
            number,
            current: Some(current.to_string()),
            next: Some(next.to_string()),
        }
    }

    #[test]
    fn quiet_mode_prints_numbers_only() {
        let changes = vec![swap(12, "D-8", "D-6"), swap(7, "D-3", "D-2")];
        let mut out = Vec::new();
        display_changes_quiet(&changes, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "12\n7\n");
    }

    #[test]
    fn empty_plan_prints_summary_line() {
        let report = SyncReport {
            prs: vec![pr(1, "No marker", &[])],
            changes: vec![],
            updated: 0,
        };
        let mut out = Vec::new();
        display_plan_table(&report, now(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "No label changes needed (1 open PRs scanned)\n"
        );
    }

    #[test]
    fn table_contains_delta_and_due_date() {
        let report = SyncReport {
            prs: vec![pr(1, "Fix bug (~12/25)", &["D-8"])],
            changes: vec![swap(1, "D-8", "D-5")],
            updated: 0,
        };
        let mut out = Vec::new();
        display_plan_table_with_width(&report, now(), &mut out, Some(usize::MAX)).unwrap();
        let rendered = String::from_utf8(out).unwrap();

        assert!(rendered.contains("#1"));
        assert!(rendered.contains("D-8 -> D-5"));
        assert!(rendered.contains("2024-12-25"));
        assert!(rendered.contains("Fix bug (~12/25)"));
    }

    #[test]
    fn add_only_change_renders_placeholder_current() {
        let change = LabelChange {
            number: 3,
            current: None,
            next: Some("D-2".to_string()),
        };
        assert_eq!(format_label_delta(&change), "- -> D-2");
    }

    #[test]
    fn long_titles_truncate_to_terminal_width() {
        let long_title = format!("Very long title (~12/25) {}", "x".repeat(120));
        let report = SyncReport {
            prs: vec![pr(1, &long_title, &[])],
            changes: vec![LabelChange {
                number: 1,
                current: None,
                next: Some("D-5".to_string()),
            }],
            updated: 0,
        };
        let mut out = Vec::new();
        display_plan_table_with_width(&report, now(), &mut out, Some(80)).unwrap();
        let rendered = String::from_utf8(out).unwrap();

        assert!(rendered.lines().all(|line| line.len() <= 80));
        assert!(rendered.contains("..."));
    }
}
