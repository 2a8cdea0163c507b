//! Best-effort date detection in document text, for the recency gate.

use chrono::NaiveDate;
use regex::Regex;

const MONTHS: &[(&str, u32)] = &[
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// How much leading text is scanned for a date. Circulars carry their date
/// near the top.
const DATE_SCAN_CHARS: usize = 1000;

/// Detect the first plausible date in the leading text.
///
/// Recognized forms: `YYYY-MM-DD`, `DD-MM-YYYY` (also `/` and `.`
/// separators), `Month DD, YYYY` and `DD Month YYYY`.
pub fn detect_date(text: &str) -> Option<NaiveDate> {
    let head: String = text.chars().take(DATE_SCAN_CHARS).collect();

    let iso = Regex::new(r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\b").unwrap();
    if let Some(cap) = iso.captures(&head) {
        if let Some(date) = ymd(&cap[1], &cap[2], &cap[3]) {
            return Some(date);
        }
    }

    let dmy = Regex::new(r"\b(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})\b").unwrap();
    if let Some(cap) = dmy.captures(&head) {
        if let Some(date) = ymd(&cap[3], &cap[2], &cap[1]) {
            return Some(date);
        }
    }

    let month_first = Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2}),?\s+(\d{4})\b",
    )
    .unwrap();
    if let Some(cap) = month_first.captures(&head) {
        if let Some(month) = month_number(&cap[1]) {
            if let Some(date) = ymd_nums(cap[3].parse().ok()?, month, cap[2].parse().ok()?) {
                return Some(date);
            }
        }
    }

    let day_first = Regex::new(
        r"(?i)\b(\d{1,2})\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{4})\b",
    )
    .unwrap();
    if let Some(cap) = day_first.captures(&head) {
        if let Some(month) = month_number(&cap[2]) {
            if let Some(date) = ymd_nums(cap[3].parse().ok()?, month, cap[1].parse().ok()?) {
                return Some(date);
            }
        }
    }

    None
}

/// True when `date` is at most `window_days` old relative to `today`.
/// Future-dated documents count as within the window.
pub fn within_window(date: NaiveDate, today: NaiveDate, window_days: i64) -> bool {
    (today - date).num_days() <= window_days
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    ymd_nums(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn ymd_nums(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(2000..=2100).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.to_lowercase();
    MONTHS
        .iter()
        .find(|(m, _)| prefix.starts_with(m))
        .map(|(_, n)| *n)
}
