use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info};
use tracing_subscriber::EnvFilter;

use inklist::pipeline::PipelineConfig;
use inklist::worker::{Job, WorkerPool};
use inklist::Config;

fn init_logging() {
    // Route `log` macros through tracing so both APIs end up in one
    // subscriber.
    let _ = tracing_log::LogTracer::init();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(image_path: &str, config_path: Option<&str>) -> Result<(), inklist::InklistError> {
    let config = match config_path {
        Some(path) => inklist::load_config(path)?,
        None => Config::default(),
    };

    let image_data = std::fs::read(image_path).map_err(|e| {
        inklist::WorkerError::Rejected(format!("cannot read image '{}': {}", image_path, e))
    })?;
    let filename = std::path::Path::new(image_path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| image_path.to_string());

    let pipeline_config = Arc::new(PipelineConfig::from_config(&config));
    let pool = WorkerPool::new(pipeline_config, 1);
    let store = pool.store();

    let job = Job::new(image_data, filename);
    let job_id = job.id.clone();
    pool.submit(job)?;

    let result = pool.recv_result().ok_or(inklist::WorkerError::ChannelClosed)?;
    pool.shutdown();
    pool.wait();

    if let Some(stored) = store.get(&job_id) {
        match serde_json::to_string_pretty(&stored) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize job record: {}", e),
        }
    }

    if result.success {
        info!(
            "Extracted {} task(s) with confidence {:.2}",
            result.tasks.len(),
            result.confidence
        );
        Ok(())
    } else {
        Err(inklist::WorkerError::Rejected(
            result.error.unwrap_or_else(|| "processing failed".to_string()),
        )
        .into())
    }
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let (image_path, config_path) = match args.len() {
        2 => (args[1].as_str(), None),
        3 => (args[1].as_str(), Some(args[2].as_str())),
        _ => {
            eprintln!("Usage: {} <image> [config.json]", args[0]);
            return ExitCode::from(2);
        }
    };

    info!("inklist v{}", env!("CARGO_PKG_VERSION"));

    match run(image_path, config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
