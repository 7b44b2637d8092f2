//! Due-date extraction.
//!
//! Three formats, tried in order: ISO (`2025-12-17`), separator numeric
//! (`17/12/2025`, `17.12.25`), and month name (`Dec 17`, `17 December`).
//! Separator dates are resolved by the configured locale only; a date that
//! is invalid under that locale is treated as absent rather than silently
//! re-read in the other field order.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());
static RE_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[/.](\d{1,2})[/.](\d{2,4})\b").unwrap());

const MONTH_ALT: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?\
            |jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

static RE_MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTH_ALT})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b"
    ))
    .unwrap()
});
static RE_DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+({MONTH_ALT})\b"
    ))
    .unwrap()
});

/// Field order for ambiguous numeric dates like `03/04/2025`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateLocale {
    /// `DD/MM/YYYY`.
    DayFirst,
    /// `MM/DD/YYYY` (US convention).
    #[default]
    MonthFirst,
}

/// A recognized date, carrying the matched span so the caller can strip
/// it from the task name.
pub(crate) struct DateMatch {
    pub date: NaiveDate,
    pub span: (usize, usize),
    /// Count of date-shaped candidates seen on the line, for the
    /// ambiguity penalty.
    pub candidates: usize,
}

pub(crate) fn find_date(text: &str, locale: DateLocale) -> Option<DateMatch> {
    let candidates = count_candidates(text);

    if let Some(caps) = RE_ISO.captures(text) {
        let m = caps.get(0)?;
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )?;
        return Some(DateMatch {
            date,
            span: (m.start(), m.end()),
            candidates,
        });
    }

    if let Some(caps) = RE_NUMERIC.captures(text) {
        let m = caps.get(0)?;
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year = expand_year(caps[3].parse().ok()?);
        let (day, month) = match locale {
            DateLocale::DayFirst => (first, second),
            DateLocale::MonthFirst => (second, first),
        };
        // Invalid under the configured locale means no date at all.
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some(DateMatch {
            date,
            span: (m.start(), m.end()),
            candidates,
        });
    }

    find_month_name(text, candidates)
}

fn find_month_name(text: &str, candidates: usize) -> Option<DateMatch> {
    let year = Local::now().year();

    if let Some(caps) = RE_MONTH_DAY.captures(text) {
        let m = caps.get(0)?;
        let month = month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some(DateMatch {
            date,
            span: (m.start(), m.end()),
            candidates,
        });
    }

    if let Some(caps) = RE_DAY_MONTH.captures(text) {
        let m = caps.get(0)?;
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some(DateMatch {
            date,
            span: (m.start(), m.end()),
            candidates,
        });
    }

    None
}

fn count_candidates(text: &str) -> usize {
    RE_ISO.find_iter(text).count()
        + RE_NUMERIC.find_iter(text).count()
        + RE_MONTH_DAY.find_iter(text).count()
        + RE_DAY_MONTH.find_iter(text).count()
}

fn expand_year(year: i32) -> i32 {
    if year < 100 {
        2000 + year
    } else {
        year
    }
}

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

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_lowercase();
    MONTHS.iter().find(|(m, _)| *m == prefix).map(|(_, n)| *n)
}
