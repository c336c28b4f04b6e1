use std::borrow::Cow;

use tasknest_core::{Category, Task, TaskStats, ViewSummary};
use time::OffsetDateTime;
use time::macros::format_description;
use unicode_segmentation::UnicodeSegmentation;

const TITLE_WIDTH: usize = 40;

pub(super) fn task_table(tasks: &[Task], now: OffsetDateTime) -> String {
    let mut lines = vec![
        "ID       | Done | Priority | Category | Title | Due | Tags".to_owned(),
        "-------- | ---- | -------- | -------- | ----- | --- | ----".to_owned(),
    ];
    for task in tasks {
        let done = if task.completed { "x" } else { " " };
        let due = task.due_date.map_or_else(
            || "-".to_owned(),
            |due| {
                let date = format_date(due);
                if task.is_overdue(now) {
                    format!("{date} (overdue)")
                } else {
                    date
                }
            },
        );
        let tags = if task.tags.is_empty() {
            "-".to_owned()
        } else {
            task.tags.join(", ")
        };
        let mut title = truncate_with_ellipsis(&task.text, TITLE_WIDTH).into_owned();
        if task.archived {
            title.push_str(" [archived]");
        }
        lines.push(format!(
            "{} | {done:^4} | {:<8} | {:<8} | {title} | {due} | {tags}",
            task.id.short(),
            task.priority.as_str(),
            task.category.label(),
        ));
    }
    lines.join("\n")
}

pub(super) fn summary_line(summary: ViewSummary) -> String {
    format!("Showing {} of {} tasks", summary.shown, summary.total)
}

pub(super) fn stats_report(stats: &TaskStats) -> String {
    let mut lines = vec![
        format!(
            "Total: {}  Completed: {}  Remaining: {}  Progress: {:.0}%",
            stats.total,
            stats.completed,
            stats.remaining,
            stats.completion_percent()
        ),
        String::new(),
    ];
    for category in Category::ALL {
        let entry = stats.category(category);
        lines.push(format!(
            "{:<9} {}/{} ({:.0}%)",
            category.label(),
            entry.completed,
            entry.total,
            entry.completion_percent()
        ));
    }
    lines.join("\n")
}

pub(super) fn format_date(value: OffsetDateTime) -> String {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| value.date().to_string())
}

pub(super) fn truncate_with_ellipsis(input: &str, max_graphemes: usize) -> Cow<'_, str> {
    const ELLIPSIS: &str = "...";
    const ELLIPSIS_GRAPHEMES: usize = 3;

    if max_graphemes == 0 {
        return Cow::Owned(String::new());
    }

    let grapheme_count = UnicodeSegmentation::graphemes(input, true).count();
    if grapheme_count <= max_graphemes {
        return Cow::Borrowed(input);
    }

    if max_graphemes <= ELLIPSIS_GRAPHEMES {
        let truncated: String = UnicodeSegmentation::graphemes(input, true)
            .take(max_graphemes)
            .collect();
        return Cow::Owned(truncated);
    }

    let keep = max_graphemes - ELLIPSIS_GRAPHEMES;
    let mut truncated: String = UnicodeSegmentation::graphemes(input, true).take(keep).collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasknest_core::{FixedClock, TaskDraft, TaskStore};
    use time::Duration;
    use time::macros::datetime;

    #[test]
    fn truncate_respects_graphemes() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("abcdefghij", 6), "abc...");
        assert_eq!(truncate_with_ellipsis("abcdef", 2), "ab");
        assert_eq!(truncate_with_ellipsis("anything", 0), "");
        // Family emoji is a single grapheme made of several code points.
        let family = "👨‍👩‍👧‍👦👨‍👩‍👧‍👦👨‍👩‍👧‍👦👨‍👩‍👧‍👦👨‍👩‍👧‍👦";
        assert_eq!(truncate_with_ellipsis(family, 4), "👨‍👩‍👧‍👦...");
    }

    #[test]
    fn table_marks_overdue_and_archived_rows() {
        let now = datetime!(2025-09-10 12:00 UTC);
        let mut store = TaskStore::with_clock(FixedClock::new(now));
        let late = store
            .create(TaskDraft::new("Late").due(now - Duration::days(1)).tags(["x", "y"]))
            .unwrap_or_else(|err| panic!("create: {err}"));
        let old = store
            .create(TaskDraft::new("Old"))
            .unwrap_or_else(|err| panic!("create: {err}"));
        store
            .toggle_archive(old)
            .unwrap_or_else(|err| panic!("archive: {err}"));

        let table = task_table(store.tasks(), now);
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[2].starts_with(&late.short()));
        assert!(rows[2].contains("2025-09-09 (overdue)"));
        assert!(rows[2].contains("x, y"));
        assert!(rows[3].contains("Old [archived]"));
    }

    #[test]
    fn stats_report_lists_every_category() {
        let report = stats_report(&TaskStats::default());
        assert!(report.starts_with("Total: 0  Completed: 0  Remaining: 0  Progress: 0%"));
        for category in Category::ALL {
            assert!(report.contains(category.label()));
        }
    }

    #[test]
    fn summary_line_reads_naturally() {
        assert_eq!(summary_line(ViewSummary { shown: 2, total: 5 }), "Showing 2 of 5 tasks");
    }
}
