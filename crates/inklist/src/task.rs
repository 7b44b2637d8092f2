//! Structured task records produced by the extraction pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of an extracted task name.
pub const MAX_NAME_LEN: usize = 100;

/// Task priority. Always one of four values, never absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Urgent => write!(f, "urgent"),
        }
    }
}

/// Axis-aligned rectangle in source-image pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle enclosing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        BoundingBox {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }

    /// Row-ladder estimate for backends that supply no geometry: tasks are
    /// assumed to occupy successive rows below a top margin.
    pub fn estimate(position_index: usize, image_width: u32, image_height: u32) -> BoundingBox {
        const ROW_HEIGHT: u32 = 80;
        const TOP_MARGIN: u32 = 100;
        const LEFT_MARGIN: u32 = 50;

        let y = TOP_MARGIN + (position_index as u32) * ROW_HEIGHT;
        BoundingBox {
            x: LEFT_MARGIN,
            y: y.min(image_height.saturating_sub(ROW_HEIGHT)),
            width: (image_width as f32 * 0.8) as u32,
            height: ROW_HEIGHT - 20,
        }
    }
}

/// A single structured action item extracted from a job's image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// 0-based reading-order position within the job.
    pub position_index: usize,
    /// Task name, cleaned of marker glyphs, assignee, date and priority text.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Normalized calendar date, serialized as ISO-8601 (YYYY-MM-DD).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    /// Combined recognition/extraction confidence, 0.0–1.0.
    pub confidence: f32,
    /// Set when confidence fell below the configured threshold. Flagged
    /// tasks are still delivered, never dropped.
    pub low_confidence: bool,
    pub bbox: BoundingBox,
    pub created_at: DateTime<Utc>,
}
