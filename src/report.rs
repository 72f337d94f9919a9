use std::fmt::Write;

use serde::Serialize;

use crate::calendar::{GridCell, MonthGrid};
use crate::locale::Locale;
use crate::models::{ChipTone, DayStatus};
use crate::schedule::{DateBucket, ListView};

const LEGEND: [ChipTone; 4] = [
    ChipTone::Attended,
    ChipTone::Missed,
    ChipTone::Upcoming,
    ChipTone::Today,
];

fn tone_marker(tone: ChipTone) -> &'static str {
    match tone {
        ChipTone::Attended => "[+]",
        ChipTone::Missed => "[x]",
        ChipTone::Today => "[*]",
        ChipTone::Upcoming => "[ ]",
    }
}

/// Keeps free text from breaking a Markdown table row.
fn cell_text(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

pub fn render_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn render_day(output: &mut String, cell: &GridCell<'_>, locale: Locale) {
    let GridCell::Day(day) = cell else {
        output.push_str("  ");
        return;
    };

    match day.status {
        DayStatus::Today => {
            let _ = write!(output, " **{}**", day.day);
        }
        DayStatus::Past => {
            let _ = write!(output, " _{}_", day.day);
        }
        DayStatus::Future => {
            let _ = write!(output, " {}", day.day);
        }
    }

    for (session, tone) in day.chips() {
        let (start, _) = session.time_range();
        let _ = write!(
            output,
            "<br>{} {} {}",
            tone_marker(tone),
            start,
            cell_text(session.display_title(locale.calendar_default_title()))
        );
    }

    if day.overflow() > 0 {
        let _ = write!(output, "<br>{}", locale.overflow_label(day.overflow()));
    }
    output.push(' ');
}

pub fn render_calendar(grid: &MonthGrid<'_>, locale: Locale) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "# {}",
        locale.month_heading(grid.month.year(), grid.month.month())
    );
    let _ = writeln!(output);

    let headers = locale.weekday_headers();
    let _ = writeln!(output, "| {} |", headers.join(" | "));
    let _ = writeln!(output, "|{}", "---|".repeat(headers.len()));

    for week in grid.weeks() {
        output.push('|');
        for cell in week {
            render_day(&mut output, cell, locale);
            output.push('|');
        }
        for _ in week.len()..7 {
            output.push_str("  |");
        }
        output.push('\n');
    }

    let _ = writeln!(output);
    let legend: Vec<String> = LEGEND
        .iter()
        .map(|tone| format!("{} {}", tone_marker(*tone), locale.legend_label(*tone)))
        .collect();
    let _ = writeln!(output, "{}", legend.join(" · "));

    output
}

fn render_bucket(output: &mut String, bucket: &DateBucket<'_>, locale: Locale) {
    let marker = match bucket.status {
        DayStatus::Past => " _(past)_",
        DayStatus::Today | DayStatus::Future => "",
    };
    let _ = writeln!(output, "## {} · {}{}", bucket.header, bucket.long_label, marker);

    for entry in &bucket.entries {
        let session = entry.session;
        let (start, end) = session.time_range();
        let _ = write!(
            output,
            "- {start}-{end} **{}**",
            session.display_title(locale.list_default_title())
        );
        if let Some(badge) = entry.badge {
            let _ = write!(output, " [{}]", locale.badge_label(badge));
        }
        if let Some(location) = session.location() {
            let _ = write!(output, " · {location}");
        }
        if let Some(coach) = session.coach_name() {
            let _ = write!(output, " · {}", locale.coach_label(coach));
        }
        let _ = writeln!(output);
    }
    let _ = writeln!(output);
}

pub fn render_list(view: &ListView<'_>, locale: Locale) -> String {
    let mut output = String::new();

    match view {
        ListView::NotLoaded => {
            let _ = writeln!(output, "{}", locale.not_loaded());
        }
        ListView::Empty => {
            let (title, detail) = locale.empty_schedule();
            let _ = writeln!(output, "# {title}");
            let _ = writeln!(output);
            let _ = writeln!(output, "{detail}");
        }
        ListView::Days(buckets) => {
            for bucket in buckets {
                render_bucket(&mut output, bucket, locale);
            }
        }
    }

    output
}
