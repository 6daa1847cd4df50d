use crate::backend::{ComputeBackend, ComputeError};
use crate::results::{ResultLog, ResultSummary, SINGLE_SHOT_CAPACITY, STREAM_CAPACITY};
use crate::types::{TestRequestSpec, TestResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Cadence of continuous-mode dispatches.
pub const DISPATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Cadence of the throughput sampler.
pub const RATE_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Compute request failed: {0}")]
    Compute(#[from] ComputeError),

    #[error("Continuous stream is active; stop it before dispatching")]
    StreamActive,
}

/// Live (or post-mortem) counters of a continuous run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamStats {
    pub running: bool,
    pub request_count: u64,
    pub current_rps: f64,
}

/// Counters shared between the two stream timer tasks and any request tasks
/// still in flight. The rate cell stores f64 bits so the sampler and readers
/// never contend on a lock.
struct StreamShared {
    request_count: AtomicU64,
    rps_bits: AtomicU64,
}

impl StreamShared {
    fn new() -> Self {
        Self {
            request_count: AtomicU64::new(0),
            rps_bits: AtomicU64::new(0f64.to_bits()),
        }
    }

    fn record_success(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    fn store_rps(&self, rps: f64) {
        self.rps_bits.store(rps.to_bits(), Ordering::Relaxed);
    }

    fn current_rps(&self) -> f64 {
        f64::from_bits(self.rps_bits.load(Ordering::Relaxed))
    }
}

struct StreamRun {
    run_id: Uuid,
    shared: Arc<StreamShared>,
    dispatch_task: JoinHandle<()>,
    sampler_task: JoinHandle<()>,
}

impl Drop for StreamRun {
    fn drop(&mut self) {
        self.dispatch_task.abort();
        self.sampler_task.abort();
    }
}

/// Orchestration core. Issues test requests in one of three mutually
/// exclusive modes (single, fixed-size batch, open-ended stream) and feeds
/// completed results into the shared result log.
///
/// While a stream is live, `run_single` and `run_batch` refuse with
/// [`DispatchError::StreamActive`]; mode transitions go through `&mut self`,
/// so they are serialized by ownership.
pub struct Dispatcher<B> {
    backend: Arc<B>,
    results: Arc<Mutex<ResultLog>>,
    stream: Option<StreamRun>,
    last_stream: Option<Arc<StreamShared>>,
}

impl<B: ComputeBackend + 'static> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            results: Arc::new(Mutex::new(ResultLog::new())),
            stream: None,
            last_stream: None,
        }
    }

    /// Shared handle to the backend, for collaborators such as the
    /// telemetry poller.
    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    pub fn summary(&self) -> ResultSummary {
        self.results.lock().unwrap().summary()
    }

    /// Up to `k` most recent results, newest first.
    pub fn recent_results(&self, k: usize) -> Vec<TestResult> {
        self.results.lock().unwrap().latest(k)
    }

    /// Issues exactly one request and records its result. A failed request
    /// records nothing and is not retried.
    pub async fn run_single(&self, spec: &TestRequestSpec) -> Result<TestResult, DispatchError> {
        if self.stream.is_some() {
            return Err(DispatchError::StreamActive);
        }

        debug!("Dispatching single request, intensity {}", spec.intensity);

        match self.backend.run_compute(spec).await {
            Ok(result) => {
                self.results
                    .lock()
                    .unwrap()
                    .append(result.clone(), SINGLE_SHOT_CAPACITY);
                Ok(result)
            }
            Err(e) => {
                warn!("Single request failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Fires `n` identical requests simultaneously and waits for all of
    /// them. All-or-nothing: the result log is cleared when the batch
    /// starts, and only a fully successful batch replaces it. Results come
    /// back in issue order, not completion order.
    pub async fn run_batch(
        &self,
        n: usize,
        spec: &TestRequestSpec,
    ) -> Result<Vec<TestResult>, DispatchError> {
        if self.stream.is_some() {
            return Err(DispatchError::StreamActive);
        }

        let batch_id = Uuid::new_v4();
        info!(
            "Dispatching batch {}: {} concurrent requests, intensity {}",
            batch_id, n, spec.intensity
        );

        self.results.lock().unwrap().clear();

        let calls = (0..n).map(|_| self.backend.run_compute(spec));
        let outcomes = futures::future::join_all(calls).await;

        let mut results = Vec::with_capacity(n);
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Batch {} failed: {}", batch_id, e);
                    return Err(e.into());
                }
            }
        }

        info!("Batch {} completed: {} results", batch_id, results.len());
        self.results.lock().unwrap().replace(results.clone());

        Ok(results)
    }

    /// Starts the continuous stream: one request immediately, then one per
    /// second, with an independent per-second throughput sampler. Starting
    /// while already running is a no-op.
    pub fn start_continuous(&mut self, spec: TestRequestSpec) {
        if self.stream.is_some() {
            debug!("Continuous stream already running; ignoring start");
            return;
        }

        let run_id = Uuid::new_v4();
        info!(
            "Starting continuous stream {}, intensity {}",
            run_id, spec.intensity
        );

        self.last_stream = None;
        let shared = Arc::new(StreamShared::new());
        let started_at = Instant::now();

        let dispatch_task = {
            let backend = Arc::clone(&self.backend);
            let results = Arc::clone(&self.results);
            let shared = Arc::clone(&shared);
            tokio::spawn(async move {
                let mut ticker = interval(DISPATCH_INTERVAL);
                loop {
                    ticker.tick().await;

                    // Each request runs on its own task so a slow response
                    // never delays the next scheduled dispatch.
                    let backend = Arc::clone(&backend);
                    let results = Arc::clone(&results);
                    let shared = Arc::clone(&shared);
                    let spec = spec.clone();
                    tokio::spawn(async move {
                        match backend.run_compute(&spec).await {
                            Ok(result) => {
                                let count = shared.record_success();
                                results.lock().unwrap().append(result, STREAM_CAPACITY);
                                debug!("Continuous request {} completed", count);
                            }
                            Err(e) => {
                                warn!("Continuous request failed: {}", e);
                            }
                        }
                    });
                }
            })
        };

        let sampler_task = {
            let shared = Arc::clone(&shared);
            tokio::spawn(async move {
                let mut ticker = interval(RATE_SAMPLE_INTERVAL);
                // Consume the immediate first tick; the first sample lands
                // one full interval after start.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let elapsed = started_at.elapsed().as_secs_f64();
                    let rps = if elapsed > 0.0 {
                        shared.request_count() as f64 / elapsed
                    } else {
                        0.0
                    };
                    shared.store_rps(rps);
                }
            })
        };

        self.stream = Some(StreamRun {
            run_id,
            shared,
            dispatch_task,
            sampler_task,
        });
    }

    /// Cancels both stream timers. Requests already in flight still
    /// complete and land in the counter and the log, which are kept as a
    /// post-mortem snapshot until the next start.
    pub fn stop_continuous(&mut self) {
        if let Some(run) = self.stream.take() {
            info!(
                "Stopping continuous stream {}: {} requests completed",
                run.run_id,
                run.shared.request_count()
            );
            self.last_stream = Some(Arc::clone(&run.shared));
            // Dropping the run aborts both timer tasks.
        }
    }

    pub fn stream_stats(&self) -> StreamStats {
        if let Some(run) = &self.stream {
            StreamStats {
                running: true,
                request_count: run.shared.request_count(),
                current_rps: run.shared.current_rps(),
            }
        } else if let Some(shared) = &self.last_stream {
            StreamStats {
                running: false,
                request_count: shared.request_count(),
                current_rps: shared.current_rps(),
            }
        } else {
            StreamStats {
                running: false,
                request_count: 0,
                current_rps: 0.0,
            }
        }
    }
}
