//! Layered field extraction over segmented line groups.
//!
//! Fields are pulled out of a group's primary line in a fixed order:
//! assignee, then due date, then priority. Each successful match removes
//! its text from the line, so later layers never re-read an earlier
//! field's notation; whatever survives all three layers becomes the task
//! name. Continuation lines are never mined for fields, only joined into
//! the description.

pub mod assignee;
pub mod date;
pub mod priority;

pub use date::DateLocale;

use chrono::NaiveDate;

use crate::task::{Priority, MAX_NAME_LEN};

/// Fields pulled from one line group, before scoring attaches confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub name: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    /// Fields where more than one candidate matched; each costs a
    /// confidence deduction downstream.
    pub ambiguous_fields: usize,
}

pub struct FieldExtractor {
    locale: DateLocale,
}

impl FieldExtractor {
    pub fn new(locale: DateLocale) -> Self {
        Self { locale }
    }

    pub fn extract(&self, primary: &str, continuations: &[String]) -> ExtractedFields {
        let mut remainder = primary.to_string();
        let mut ambiguous_fields = 0;

        let assignee = assignee::find_assignee(&remainder).map(|m| {
            if m.candidates > 1 {
                ambiguous_fields += 1;
            }
            remove_span(&mut remainder, m.span);
            m.name
        });

        let due_date = date::find_date(&remainder, self.locale).map(|m| {
            if m.candidates > 1 {
                ambiguous_fields += 1;
            }
            remove_span(&mut remainder, m.span);
            m.date
        });

        let priority_match = priority::find_priority(&remainder);
        // Spans are disjoint; removing back-to-front keeps earlier offsets
        // valid.
        let mut spans = priority_match.spans;
        spans.sort_unstable();
        for span in spans.iter().rev() {
            remove_span(&mut remainder, *span);
        }

        let name = clean_name(&remainder);

        let description = if continuations.is_empty() {
            None
        } else {
            Some(continuations.join(" "))
        };

        ExtractedFields {
            name,
            description,
            assignee,
            due_date,
            priority: priority_match.priority,
            ambiguous_fields,
        }
    }
}

fn remove_span(text: &mut String, span: (usize, usize)) {
    text.replace_range(span.0..span.1, " ");
}

/// Strips residual notation glyphs and collapses whitespace. An empty
/// result falls back to a placeholder so a task is never nameless.
fn clean_name(raw: &str) -> String {
    let trimmed: String = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let trimmed = trimmed
        .trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '-' | '–' | ':' | ';' | ',' | '.' | '→' | '>' | '|')
        })
        .trim();

    if trimmed.is_empty() {
        return "Untitled Task".to_string();
    }

    if trimmed.chars().count() > MAX_NAME_LEN {
        trimmed.chars().take(MAX_NAME_LEN).collect()
    } else {
        trimmed.to_string()
    }
}
