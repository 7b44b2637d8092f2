use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, info};
use tokio::sync::broadcast;

use crate::broadcast::job_progress::{JobPhase, JobProgressEvent};
use crate::pipeline::progress::{BroadcastProgress, NoopProgress};
use crate::pipeline::{Pipeline, PipelineConfig, PipelineContext};
use crate::store::{JobStore, ResultSink};
use crate::worker::job::{Job, JobResult};

pub struct WorkerPool {
    job_sender: Sender<Job>,
    result_receiver: Receiver<JobResult>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    store: Arc<JobStore>,
    job_progress_sender: Option<Arc<broadcast::Sender<JobProgressEvent>>>,
}

impl WorkerPool {
    pub fn new(config: Arc<PipelineConfig>, worker_count: usize) -> Self {
        Self::with_progress_sender(config, worker_count, None)
    }

    /// Creates a new worker pool with an optional job progress broadcaster.
    ///
    /// # Panics
    /// Panics if `worker_count` is 0.
    pub fn with_progress_sender(
        config: Arc<PipelineConfig>,
        worker_count: usize,
        job_progress_sender: Option<Arc<broadcast::Sender<JobProgressEvent>>>,
    ) -> Self {
        assert!(worker_count > 0, "worker_count must be > 0");
        let (job_sender, job_receiver) = bounded::<Job>(worker_count * 2);
        let (result_sender, result_receiver) = bounded::<JobResult>(worker_count * 2);
        let shutdown = Arc::new(AtomicBool::new(false));
        let store = Arc::new(JobStore::new());

        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let result_tx = result_sender.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_config = Arc::clone(&config);
            let worker_store = Arc::clone(&store);
            let progress_sender = job_progress_sender.clone();

            let handle = thread::spawn(move || {
                run_worker(
                    worker_id,
                    job_rx,
                    result_tx,
                    shutdown_flag,
                    worker_config,
                    worker_store,
                    progress_sender,
                );
            });

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Self {
            job_sender,
            result_receiver,
            workers,
            shutdown,
            store,
            job_progress_sender,
        }
    }

    /// Queues a job. The store records it as pending before it enters the
    /// channel, so a status read immediately after submit always finds it.
    pub fn submit(&self, job: Job) -> Result<(), crate::error::WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(crate::error::WorkerError::ChannelClosed);
        }

        self.store.insert_pending(&job);

        if let Some(ref sender) = self.job_progress_sender {
            let event = JobProgressEvent::new(
                &job.id,
                &job.filename,
                JobPhase::Queued,
                "Job queued for processing",
            );
            let _ = sender.send(event);
        }

        self.job_sender
            .send(job)
            .map_err(|_| crate::error::WorkerError::ChannelClosed)
    }

    /// Status-read handle shared with the workers.
    pub fn store(&self) -> Arc<JobStore> {
        Arc::clone(&self.store)
    }

    pub fn try_recv_result(&self) -> Option<JobResult> {
        self.result_receiver.try_recv().ok()
    }

    pub fn recv_result(&self) -> Option<JobResult> {
        self.result_receiver.recv().ok()
    }

    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn wait(self) {
        // Drop sender to signal workers to exit
        drop(self.job_sender);

        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

fn run_worker(
    worker_id: usize,
    job_receiver: Receiver<Job>,
    result_sender: Sender<JobResult>,
    shutdown: Arc<AtomicBool>,
    config: Arc<PipelineConfig>,
    store: Arc<JobStore>,
    progress_sender: Option<Arc<broadcast::Sender<JobProgressEvent>>>,
) {
    debug!("Worker {} started", worker_id);

    let pipeline = Pipeline::from_config(config);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match job_receiver.recv_timeout(std::time::Duration::from_millis(100)) {
            Ok(job) => {
                debug!("Worker {} processing job {}", worker_id, job.id);
                store.mark_processing(&job.id);

                let result = if let Some(ref sender) = progress_sender {
                    let progress =
                        BroadcastProgress::new(&job.id, &job.filename, Arc::clone(sender));
                    let ctx = PipelineContext::new(job);
                    let (result, _ctx) = pipeline.run(ctx, &progress);
                    result
                } else {
                    let ctx = PipelineContext::new(job);
                    let (result, _ctx) = pipeline.run(ctx, &NoopProgress);
                    result
                };

                store.write_result(&result);

                if let Err(e) = result_sender.send(result) {
                    error!("Worker {} failed to send result: {}", worker_id, e);
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}
