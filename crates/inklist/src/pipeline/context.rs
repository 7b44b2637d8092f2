use image::DynamicImage;

use crate::recognition::SelectedRecognition;
use crate::segment::LineGroup;
use crate::task::Task;
use crate::worker::job::Job;

pub struct PipelineContext {
    // Input
    pub job: Job,

    // Step 1 result — guaranteed Some after step_decode
    pub image: Option<DynamicImage>,

    // Step 2 result — guaranteed Some after step_recognize
    pub recognition: Option<SelectedRecognition>,

    // Step 3 result
    pub groups: Vec<LineGroup>,

    // Steps 4+5 result
    pub tasks: Vec<Task>,

    // Step 5 result — guaranteed Some after step_score
    pub confidence: Option<f32>,
}

impl PipelineContext {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            image: None,
            recognition: None,
            groups: Vec::new(),
            tasks: Vec::new(),
            confidence: None,
        }
    }
}
