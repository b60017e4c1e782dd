//! Some utility functions

use std::fmt::Write;

use crate::app::{DayPanel, MonthView};
use crate::task::Task;

/// Render a month grid as text, one week per line.
///
/// `*` marks the selected day, `()` marks padding days. Days with tasks show their count, with `✓` when they are all completed.
pub fn format_grid(view: &MonthView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.title);
    let _ = writeln!(out, "{}", view.weekday_labels.iter().map(|l| format!("{:>8}", l)).collect::<String>());

    for week in view.cells.chunks(7) {
        for cell in week {
            let number = cell.day.date().format("%d").to_string();
            let number = if cell.day.in_month() { number } else { format!("({})", number) };
            let selection = if cell.day.is_selected() { "*" } else { " " };
            let indicator = match &cell.summary {
                None => "  ".to_string(),
                Some(summary) if summary.all_completed() => format!("{}✓", summary.count()),
                Some(summary) => format!("{} ", summary.count()),
            };
            let _ = write!(out, "{:>5}{}{}", number, selection, indicator);
        }
        let _ = writeln!(out);
    }
    out
}

/// A debug utility that pretty-prints a month grid
pub fn print_grid(view: &MonthView) {
    print!("{}", format_grid(view));
}

/// A debug utility that pretty-prints the tasks of a day
pub fn print_day_panel(panel: &DayPanel) {
    println!("{}", panel.title);
    for task in panel.pending.iter().chain(panel.completed.iter()) {
        print_task(task);
    }
}

pub fn print_task(task: &Task) {
    let completion = if task.completed() { "✓" } else { " " };
    println!("    {} {}\t{}\t{}", completion, task.text(), task.date(), task.id());
}
