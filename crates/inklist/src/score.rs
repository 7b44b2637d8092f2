//! Confidence scoring for extracted tasks.
//!
//! A task's base score is the mean of the per-line confidences its group
//! carried, falling back to the backend's overall confidence when the
//! backend produced no line-level numbers. Each ambiguous field then costs
//! a flat deduction. Scores below the configured threshold only flag the
//! task; nothing is ever dropped here.

const AMBIGUITY_PENALTY: f32 = 0.1;

pub struct ConfidenceScorer {
    threshold: f32,
}

impl ConfidenceScorer {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Score for one task. `line_confidences` comes from the task's line
    /// group, `backend_confidence` from the whole-image recognition.
    pub fn score(
        &self,
        line_confidences: &[f32],
        backend_confidence: f32,
        ambiguous_fields: usize,
    ) -> (f32, bool) {
        let base = if line_confidences.is_empty() {
            backend_confidence
        } else {
            line_confidences.iter().sum::<f32>() / line_confidences.len() as f32
        };

        let score = (base - ambiguous_fields as f32 * AMBIGUITY_PENALTY).clamp(0.0, 1.0);
        (score, score < self.threshold)
    }

    /// Job-level confidence: mean of the task scores, or the backend's
    /// confidence when the image yielded no tasks at all.
    pub fn aggregate(&self, task_scores: &[f32], backend_confidence: f32) -> f32 {
        if task_scores.is_empty() {
            backend_confidence
        } else {
            task_scores.iter().sum::<f32>() / task_scores.len() as f32
        }
    }
}
