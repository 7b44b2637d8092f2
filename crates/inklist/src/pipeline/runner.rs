use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info_span};

use crate::broadcast::job_progress::JobPhase;
use crate::extract::FieldExtractor;
use crate::recognition::BackendSelector;
use crate::sanitize;
use crate::score::ConfidenceScorer;
use crate::segment::TaskSegmenter;
use crate::task::{BoundingBox, Task};
use crate::worker::job::JobResult;

use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::PipelineError;
use super::progress::{ProgressEvent, ProgressReporter};

pub struct Pipeline {
    selector: BackendSelector,
    segmenter: TaskSegmenter,
    extractor: FieldExtractor,
    scorer: ConfidenceScorer,
}

impl Pipeline {
    /// Production constructor — builds all sub-components from config.
    pub fn from_config(config: Arc<PipelineConfig>) -> Self {
        let selector = BackendSelector::from_config(&config.recognition);
        Self::with_selector(config, selector)
    }

    /// Constructor with an injected selector, for tests that need
    /// scripted backends.
    pub fn with_selector(config: Arc<PipelineConfig>, selector: BackendSelector) -> Self {
        Self {
            selector,
            segmenter: TaskSegmenter::new(),
            extractor: FieldExtractor::new(config.date_locale),
            scorer: ConfidenceScorer::new(config.confidence_threshold),
        }
    }

    /// Run the full pipeline for a single job.
    /// Returns a (JobResult, PipelineContext) pair.
    pub fn run(
        &self,
        mut ctx: PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> (JobResult, PipelineContext) {
        let filename = sanitize::redact_filename(&ctx.job.filename);
        let _pipeline_span = info_span!("pipeline",
            job_id = %ctx.job.id,
            filename = %filename,
        )
        .entered();

        // Step 1: Decode image
        {
            let _step = info_span!("decode").entered();
            progress.report(ProgressEvent::Phase {
                phase: JobPhase::Decoding,
                message: "Decoding image...".to_string(),
            });
            if let Err(e) = self.step_decode(&mut ctx) {
                return self.fail(ctx, e, progress);
            }
        }

        // Step 2: Recognize text
        {
            let _step = info_span!("recognize").entered();
            progress.report(ProgressEvent::Phase {
                phase: JobPhase::Recognizing,
                message: "Running text recognition...".to_string(),
            });
            if let Err(e) = self.step_recognize(&mut ctx) {
                return self.fail(ctx, e, progress);
            }
        }

        // Step 3: Segment lines into task groups
        {
            let _step = info_span!("segment").entered();
            progress.report(ProgressEvent::Phase {
                phase: JobPhase::Segmenting,
                message: "Segmenting task lines...".to_string(),
            });
            self.step_segment(&mut ctx);
        }

        // Steps 4+5: Extract fields and score
        {
            let _step = info_span!("extract_and_score").entered();
            progress.report(ProgressEvent::Phase {
                phase: JobPhase::Extracting,
                message: "Extracting task fields...".to_string(),
            });
            self.step_extract_and_score(&mut ctx, progress);
        }

        // Build success result
        let recognition = ctx.recognition.as_ref().expect("step 2 completed");
        let backend = recognition.backend.clone();
        let confidence = ctx.confidence.expect("step 5 completed");
        let tasks = ctx.tasks.clone();

        debug!(
            "Job {} extracted {} task(s) via {} (confidence {:.2})",
            ctx.job.id,
            tasks.len(),
            backend,
            confidence
        );

        progress.report(ProgressEvent::Completed {
            tasks: tasks.clone(),
            confidence,
            backend: backend.clone(),
        });

        let result = JobResult::completed(&ctx.job, tasks, confidence, backend);
        (result, ctx)
    }

    fn fail(
        &self,
        ctx: PipelineContext,
        error: PipelineError,
        progress: &dyn ProgressReporter,
    ) -> (JobResult, PipelineContext) {
        let message = error.to_string();
        progress.report(ProgressEvent::Failed {
            error: message.clone(),
        });
        let result = JobResult::failure(&ctx.job, message, format!("{:?}", error));
        (result, ctx)
    }

    fn step_decode(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let image = image::load_from_memory(&ctx.job.image_data)
            .map_err(|e| PipelineError::InvalidImage(e.to_string()))?;
        ctx.image = Some(image);
        Ok(())
    }

    fn step_recognize(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let image = ctx.image.as_ref().expect("step 1 completed");
        let selected = self.selector.recognize(image)?;
        ctx.recognition = Some(selected);
        Ok(())
    }

    fn step_segment(&self, ctx: &mut PipelineContext) {
        let recognition = ctx.recognition.as_ref().expect("step 2 completed");
        ctx.groups = self.segmenter.segment(&recognition.recognition.lines);
    }

    fn step_extract_and_score(&self, ctx: &mut PipelineContext, progress: &dyn ProgressReporter) {
        let recognition = ctx.recognition.as_ref().expect("step 2 completed");
        let backend_confidence = recognition.recognition.confidence;
        let image = ctx.image.as_ref().expect("step 1 completed");
        let (width, height) = (image.width(), image.height());

        progress.report(ProgressEvent::Phase {
            phase: JobPhase::Scoring,
            message: "Scoring task confidence...".to_string(),
        });

        let mut tasks = Vec::with_capacity(ctx.groups.len());
        let mut scores = Vec::with_capacity(ctx.groups.len());

        for (position_index, group) in ctx.groups.iter().enumerate() {
            let fields = self.extractor.extract(&group.primary, &group.continuations);
            let (confidence, low_confidence) = self.scorer.score(
                &group.confidences,
                backend_confidence,
                fields.ambiguous_fields,
            );
            let bbox = group
                .bbox
                .unwrap_or_else(|| BoundingBox::estimate(position_index, width, height));

            scores.push(confidence);
            tasks.push(Task {
                position_index,
                name: fields.name,
                description: fields.description,
                assignee: fields.assignee,
                due_date: fields.due_date,
                priority: fields.priority,
                confidence,
                low_confidence,
                bbox,
                created_at: Utc::now(),
            });
        }

        ctx.confidence = Some(self.scorer.aggregate(&scores, backend_confidence));
        ctx.tasks = tasks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecognitionConfig;
    use crate::extract::DateLocale;
    use crate::pipeline::progress::NoopProgress;
    use crate::task::Priority;
    use crate::worker::job::Job;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::DynamicImage::new_rgb8(width, height);
        let mut bytes = Vec::new();
        image
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        bytes
    }

    fn stub_config() -> Arc<PipelineConfig> {
        Arc::new(PipelineConfig {
            recognition: RecognitionConfig {
                preference: vec!["stub".to_string()],
                ..Default::default()
            },
            confidence_threshold: 0.6,
            date_locale: DateLocale::DayFirst,
        })
    }

    #[test]
    fn test_full_pipeline_with_stub_backend() {
        let pipeline = Pipeline::from_config(stub_config());
        let job = Job::new(png_bytes(800, 600), "notes.png");
        let ctx = PipelineContext::new(job);

        let (result, ctx) = pipeline.run(ctx, &NoopProgress);

        assert!(result.success, "pipeline failed: {:?}", result.error);
        assert_eq!(result.backend.as_deref(), Some("stub"));
        assert_eq!(result.tasks.len(), 3);

        let first = &result.tasks[0];
        assert_eq!(first.position_index, 0);
        assert_eq!(first.name, "Review project proposal");
        assert_eq!(first.assignee.as_deref(), Some("John"));
        assert_eq!(first.priority, Priority::High);
        assert!(first.description.is_some());

        assert!(ctx.confidence.is_some());
    }

    #[test]
    fn test_tasks_keep_reading_order() {
        let pipeline = Pipeline::from_config(stub_config());
        let job = Job::new(png_bytes(800, 600), "notes.png");

        let (result, _ctx) = pipeline.run(PipelineContext::new(job), &NoopProgress);

        let indices: Vec<usize> = result.tasks.iter().map(|t| t.position_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_invalid_image_fails_job() {
        let pipeline = Pipeline::from_config(stub_config());
        let job = Job::new(vec![0xde, 0xad, 0xbe, 0xef], "garbage.bin");

        let (result, _ctx) = pipeline.run(PipelineContext::new(job), &NoopProgress);

        assert!(!result.success);
        assert!(result.error.as_ref().unwrap().contains("image"));
        assert!(result.error_trace.is_some());
        assert!(result.tasks.is_empty());
    }

    #[test]
    fn test_reprocessing_is_deterministic() {
        let pipeline = Pipeline::from_config(stub_config());
        let bytes = png_bytes(800, 600);

        let (first, _) = pipeline.run(
            PipelineContext::new(Job::new(bytes.clone(), "notes.png")),
            &NoopProgress,
        );
        let (second, _) = pipeline.run(
            PipelineContext::new(Job::new(bytes, "notes.png")),
            &NoopProgress,
        );

        assert_eq!(first.tasks.len(), second.tasks.len());
        for (a, b) in first.tasks.iter().zip(second.tasks.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.assignee, b.assignee);
            assert_eq!(a.priority, b.priority);
            assert_eq!(a.confidence, b.confidence);
        }
        assert_eq!(first.confidence, second.confidence);
    }

    #[test]
    fn test_backend_geometry_beats_estimate() {
        let pipeline = Pipeline::from_config(stub_config());
        let job = Job::new(png_bytes(800, 600), "notes.png");

        let (result, _ctx) = pipeline.run(PipelineContext::new(job), &NoopProgress);

        // The stub supplies real line geometry.
        assert_eq!(result.tasks[0].bbox, BoundingBox::new(50, 100, 400, 60));
    }
}
