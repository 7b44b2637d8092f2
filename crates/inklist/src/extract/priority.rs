//! Priority extraction.
//!
//! Exclamation runs and keywords both contribute; when several markers
//! appear the highest severity wins. Lines without any marker default to
//! medium, which is why medium itself has no marker vocabulary.

use std::sync::LazyLock;

use regex::Regex;

use crate::task::Priority;

static RE_BANGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!+").unwrap());
static RE_URGENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:urgent|asap|critical)\b").unwrap());
static RE_HIGH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:high|important)\b").unwrap());
static RE_LOW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:low|minor|whenever)\b").unwrap());

/// Detected priority plus the spans of every marker so the caller strips
/// them all from the name, not just the winning one.
pub(crate) struct PriorityMatch {
    pub priority: Priority,
    pub spans: Vec<(usize, usize)>,
}

fn bang_priority(len: usize) -> Priority {
    match len {
        0 => Priority::Medium,
        1 => Priority::Low,
        2 => Priority::High,
        _ => Priority::Urgent,
    }
}

pub(crate) fn find_priority(text: &str) -> PriorityMatch {
    let mut priority = Priority::Medium;
    let mut spans = Vec::new();

    for m in RE_BANGS.find_iter(text) {
        priority = priority.max(bang_priority(m.len()));
        spans.push((m.start(), m.end()));
    }
    for (re, level) in [
        (&RE_URGENT, Priority::Urgent),
        (&RE_HIGH, Priority::High),
        (&RE_LOW, Priority::Low),
    ] {
        for m in re.find_iter(text) {
            priority = priority.max(level);
            spans.push((m.start(), m.end()));
        }
    }

    PriorityMatch { priority, spans }
}
