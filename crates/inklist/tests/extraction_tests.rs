//! End-to-end extraction tests driven through the full pipeline with
//! scripted recognition backends.

use std::io::Cursor;
use std::sync::Arc;

use chrono::NaiveDate;
use image::DynamicImage;

use inklist::pipeline::{NoopProgress, Pipeline, PipelineConfig, PipelineContext};
use inklist::recognition::{
    BackendSelector, RawLine, RawRecognition, RecognitionBackend,
};
use inklist::{DateLocale, Job, Priority, RecognitionConfig, RecognitionError};

/// Backend that replays a fixed set of recognized lines.
struct ScriptedBackend {
    name: &'static str,
    available: bool,
    lines: Vec<&'static str>,
    confidence: f32,
}

impl ScriptedBackend {
    fn new(lines: Vec<&'static str>) -> Self {
        Self {
            name: "scripted",
            available: true,
            lines,
            confidence: 0.9,
        }
    }
}

impl RecognitionBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<RawRecognition, RecognitionError> {
        Ok(RawRecognition {
            lines: self.lines.iter().map(|l| RawLine::new(*l)).collect(),
            confidence: self.confidence,
        })
    }
}

fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::new_rgb8(800, 600);
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn pipeline_config(locale: DateLocale) -> Arc<PipelineConfig> {
    Arc::new(PipelineConfig {
        recognition: RecognitionConfig::default(),
        confidence_threshold: 0.6,
        date_locale: locale,
    })
}

fn run_lines(lines: Vec<&'static str>, locale: DateLocale) -> inklist::JobResult {
    let selector = BackendSelector::new(vec![Box::new(ScriptedBackend::new(lines))], None);
    let pipeline = Pipeline::with_selector(pipeline_config(locale), selector);

    let job = Job::new(png_bytes(), "notes.png");
    let (result, _ctx) = pipeline.run(PipelineContext::new(job), &NoopProgress);
    result
}

#[test]
fn handwritten_list_with_arrows_dates_and_priority() {
    let result = run_lines(
        vec![
            "- Write requirements → Aykut",
            "- Get approval → Hasan 17/12/2025",
            "- Convert to Farsi → Hasan !!",
        ],
        DateLocale::DayFirst,
    );

    assert!(result.success, "job failed: {:?}", result.error);
    assert_eq!(result.tasks.len(), 3);

    let first = &result.tasks[0];
    assert_eq!(first.position_index, 0);
    assert_eq!(first.name, "Write requirements");
    assert_eq!(first.assignee.as_deref(), Some("Aykut"));
    assert!(first.due_date.is_none());
    assert_eq!(first.priority, Priority::Medium);

    let second = &result.tasks[1];
    assert_eq!(second.name, "Get approval");
    assert_eq!(second.assignee.as_deref(), Some("Hasan"));
    assert_eq!(second.due_date, NaiveDate::from_ymd_opt(2025, 12, 17));
    assert_eq!(second.priority, Priority::Medium);

    let third = &result.tasks[2];
    assert_eq!(third.name, "Convert to Farsi");
    assert_eq!(third.assignee.as_deref(), Some("Hasan"));
    assert_eq!(third.priority, Priority::High);
}

#[test]
fn headings_and_stray_text_produce_no_tasks() {
    let result = run_lines(
        vec!["Team sync agenda", "just some scribbles"],
        DateLocale::DayFirst,
    );

    assert!(result.success);
    assert!(result.tasks.is_empty());
    // With no tasks the job confidence is the backend's own estimate.
    assert!((result.confidence - 0.9).abs() < 1e-6);
}

#[test]
fn continuation_lines_become_descriptions() {
    let result = run_lines(
        vec![
            "- Review proposal → John",
            "covers the Q1 scope",
            "and the draft budget",
            "- Update docs",
        ],
        DateLocale::DayFirst,
    );

    assert_eq!(result.tasks.len(), 2);
    assert_eq!(
        result.tasks[0].description.as_deref(),
        Some("covers the Q1 scope and the draft budget")
    );
    assert!(result.tasks[1].description.is_none());
}

#[test]
fn month_first_locale_reads_us_dates() {
    let result = run_lines(vec!["- File taxes 04/15/2026"], DateLocale::MonthFirst);

    assert_eq!(result.tasks.len(), 1);
    assert_eq!(
        result.tasks[0].due_date,
        NaiveDate::from_ymd_opt(2026, 4, 15)
    );
}

#[test]
fn tasks_without_geometry_get_row_estimates() {
    let result = run_lines(
        vec!["- First task", "- Second task"],
        DateLocale::DayFirst,
    );

    let a = result.tasks[0].bbox;
    let b = result.tasks[1].bbox;
    assert_eq!(a.x, 50);
    assert_eq!(a.y, 100);
    assert!(b.y > a.y);
    // 80% of the 800px test image.
    assert_eq!(a.width, 640);
}

#[test]
fn selector_falls_back_past_broken_backends() {
    struct Failing;
    impl RecognitionBackend for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn is_available(&self) -> bool {
            true
        }
        fn recognize(&self, _image: &DynamicImage) -> Result<RawRecognition, RecognitionError> {
            Err(RecognitionError::Failed("engine crashed".to_string()))
        }
    }

    let selector = BackendSelector::new(
        vec![
            Box::new(ScriptedBackend {
                name: "offline",
                available: false,
                lines: vec![],
                confidence: 0.0,
            }),
            Box::new(Failing),
            Box::new(ScriptedBackend::new(vec!["- Only survivor"])),
        ],
        None,
    );
    let pipeline = Pipeline::with_selector(pipeline_config(DateLocale::DayFirst), selector);

    let (result, _ctx) = pipeline.run(
        PipelineContext::new(Job::new(png_bytes(), "notes.png")),
        &NoopProgress,
    );

    assert!(result.success);
    assert_eq!(result.backend.as_deref(), Some("scripted"));
    assert_eq!(result.tasks[0].name, "Only survivor");
}

#[test]
fn exhausted_backends_fail_the_job() {
    let selector = BackendSelector::new(
        vec![Box::new(ScriptedBackend {
            name: "offline",
            available: false,
            lines: vec![],
            confidence: 0.0,
        })],
        None,
    );
    let pipeline = Pipeline::with_selector(pipeline_config(DateLocale::DayFirst), selector);

    let (result, _ctx) = pipeline.run(
        PipelineContext::new(Job::new(png_bytes(), "notes.png")),
        &NoopProgress,
    );

    assert!(!result.success);
    assert!(result.error.as_ref().unwrap().contains("backend"));
}

#[test]
fn forced_backend_errors_instead_of_falling_back() {
    let selector = BackendSelector::new(
        vec![
            Box::new(ScriptedBackend {
                name: "offline",
                available: false,
                lines: vec![],
                confidence: 0.0,
            }),
            Box::new(ScriptedBackend::new(vec!["- Should not run"])),
        ],
        Some("offline".to_string()),
    );
    let pipeline = Pipeline::with_selector(pipeline_config(DateLocale::DayFirst), selector);

    let (result, _ctx) = pipeline.run(
        PipelineContext::new(Job::new(png_bytes(), "notes.png")),
        &NoopProgress,
    );

    assert!(!result.success);
    assert!(result.error.as_ref().unwrap().contains("offline"));
}

#[test]
fn ambiguous_fields_lower_confidence() {
    let clean = run_lines(vec!["- Ship release → Ada"], DateLocale::DayFirst);
    let ambiguous = run_lines(
        vec!["- Ship release → Ada cc @grace"],
        DateLocale::DayFirst,
    );

    assert!(ambiguous.tasks[0].confidence < clean.tasks[0].confidence);
}
