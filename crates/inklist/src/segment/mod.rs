//! Groups raw recognition lines into per-task line groups.
//!
//! A line opening with a task marker (bullet, numbering, checkbox, or a
//! TODO/Task prefix) starts a new group; unmarked lines that follow attach
//! to the open group as continuations. A blank line closes the open group,
//! so unmarked text after a blank is treated as noise, exactly like
//! headings before the first marker.

use std::sync::LazyLock;

use regex::Regex;

use crate::recognition::RawLine;
use crate::task::BoundingBox;

static RE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^\s*(?:
            [-*•‣▪]\s+
          | \d{1,3}[.)]\s+
          | [A-Za-z][.)]\s+
          | [☐□☑✔✓]\s*
          | \[[\ xX]?\]\s*
          | (?i:todo)\b[:\s]*
          | (?i:task):\s*
        )",
    )
    .unwrap()
});

/// One task-to-be: the marker-stripped primary line plus any continuation
/// lines, with whatever geometry and confidence the backend supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGroup {
    pub primary: String,
    pub continuations: Vec<String>,
    pub bbox: Option<BoundingBox>,
    pub confidences: Vec<f32>,
}

impl LineGroup {
    fn open(primary: String, line: &RawLine) -> Self {
        Self {
            primary,
            continuations: Vec::new(),
            bbox: line.bbox,
            confidences: line.confidence.into_iter().collect(),
        }
    }

    fn attach(&mut self, line: &RawLine) {
        self.continuations.push(line.text.trim().to_string());
        if let Some(bbox) = line.bbox {
            self.bbox = Some(match self.bbox {
                Some(existing) => existing.union(&bbox),
                None => bbox,
            });
        }
        if let Some(conf) = line.confidence {
            self.confidences.push(conf);
        }
    }
}

#[derive(Default)]
pub struct TaskSegmenter;

impl TaskSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// Returns the marker-stripped text when the line opens a task.
    fn strip_marker(text: &str) -> Option<String> {
        RE_MARKER
            .find(text)
            .map(|m| text[m.end()..].trim().to_string())
    }

    pub fn segment(&self, lines: &[RawLine]) -> Vec<LineGroup> {
        let mut groups: Vec<LineGroup> = Vec::new();
        let mut open = false;

        for line in lines {
            if line.text.trim().is_empty() {
                open = false;
                continue;
            }

            if let Some(primary) = Self::strip_marker(&line.text) {
                groups.push(LineGroup::open(primary, line));
                open = true;
            } else if open {
                if let Some(group) = groups.last_mut() {
                    group.attach(line);
                }
            }
            // Unmarked line with no open group: heading or stray noise.
        }

        groups
    }
}
