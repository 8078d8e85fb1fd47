//! Sequential extraction executor

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::model::{ExtractionOutcome, ExtractionRequest};
use crate::engine::{EventSender, ExecutorState, ExtractionEvent, RunSummary};
use crate::error::{ClipError, ClipResult};
use crate::ports::EncoderPort;

/// Requests teardown of a running executor
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Stop after the current encoder invocation and go silent
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Runs one plan, one request at a time
pub struct ExtractionExecutor {
    encoder: Arc<dyn EncoderPort>,
    state: Mutex<ExecutorState>,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl ExtractionExecutor {
    /// Create an idle executor around an encoder
    pub fn new(encoder: Arc<dyn EncoderPort>) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Self {
            encoder,
            state: Mutex::new(ExecutorState::Idle),
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.cancel_tx),
        }
    }

    pub fn state(&self) -> ExecutorState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, next: ExecutorState) {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    /// Move the executor onto a worker task
    pub fn spawn(
        self,
        plan: Vec<ExtractionRequest>,
        source: PathBuf,
        observer: EventSender,
    ) -> JoinHandle<ClipResult<RunSummary>> {
        tokio::spawn(async move { self.run(plan, &source, observer).await })
    }

    /// Execute the plan to completion.
    ///
    /// Emits `Progress`/`ClipProduced` per request, at most one `Error`, and a
    /// trailing `Finished` unless the run was cancelled.
    pub async fn run(
        &self,
        plan: Vec<ExtractionRequest>,
        source: &Path,
        observer: EventSender,
    ) -> ClipResult<RunSummary> {
        {
            let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if *state != ExecutorState::Idle {
                return Err(ClipError::RunInProgress);
            }
            *state = ExecutorState::Running;
        }

        let started = Instant::now();
        info!("Starting extraction of {} clip(s) from {}", plan.len(), source.display());

        let summary = self.run_requests(plan, source, &observer).await;
        self.set_state(summary.result);

        match summary.result {
            ExecutorState::Cancelled => {
                info!("Extraction cancelled after {} clip(s)", summary.produced());
            }
            _ => {
                self.emit(&observer, ExtractionEvent::Finished);
                info!(
                    "Extraction finished: {} clip(s) in {:.2}s",
                    summary.produced(),
                    started.elapsed().as_secs_f64()
                );
            }
        }

        self.set_state(ExecutorState::Terminated);
        Ok(summary)
    }

    async fn run_requests(
        &self,
        plan: Vec<ExtractionRequest>,
        source: &Path,
        observer: &EventSender,
    ) -> RunSummary {
        let total = plan.len();
        let mut outcomes = Vec::with_capacity(total);

        if total == 0 {
            self.emit(observer, ExtractionEvent::Progress("No events to process.".to_string()));
            return RunSummary {
                outcomes,
                result: ExecutorState::Completed,
            };
        }

        for request in plan {
            if self.is_cancelled() || observer.is_closed() {
                return RunSummary {
                    outcomes,
                    result: ExecutorState::Cancelled,
                };
            }

            self.emit(
                observer,
                ExtractionEvent::Progress(format!("Processing {}/{} ...", request.index, total)),
            );

            match self.invoke(&request, source).await {
                Ok(()) => {
                    outcomes.push(ExtractionOutcome::Success {
                        path: request.output_path.clone(),
                        start_time_seconds: request.start_time_seconds,
                    });
                    self.emit(
                        observer,
                        ExtractionEvent::ClipProduced {
                            filename: request.output_filename(),
                            start_time_seconds: request.start_time_seconds,
                        },
                    );
                }
                Err(err) => {
                    error!("Request {} failed: {}", request.index, err);
                    let reason = err.to_string();
                    outcomes.push(ExtractionOutcome::Failure {
                        reason: reason.clone(),
                        request_index: request.index,
                    });
                    if self.is_cancelled() {
                        return RunSummary {
                            outcomes,
                            result: ExecutorState::Cancelled,
                        };
                    }
                    self.emit(observer, ExtractionEvent::Error(reason));
                    return RunSummary {
                        outcomes,
                        result: ExecutorState::Failed,
                    };
                }
            }
        }

        if self.is_cancelled() {
            return RunSummary {
                outcomes,
                result: ExecutorState::Cancelled,
            };
        }

        self.emit(observer, ExtractionEvent::Progress("All clips generated.".to_string()));
        RunSummary {
            outcomes,
            result: ExecutorState::Completed,
        }
    }

    /// Run one encoder call on its own task so a panic becomes an error
    async fn invoke(&self, request: &ExtractionRequest, source: &Path) -> ClipResult<()> {
        debug!("Extracting {}", request);
        let encoder = Arc::clone(&self.encoder);
        let task_request = request.clone();
        let task_source = source.to_path_buf();

        match tokio::spawn(async move { encoder.extract(&task_request, &task_source).await }).await {
            Ok(result) => result,
            Err(join_err) => {
                let message = if join_err.is_panic() {
                    let payload = join_err.into_panic();
                    payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "encoder task panicked".to_string())
                } else {
                    "encoder task was aborted".to_string()
                };
                Err(ClipError::UnexpectedWorkerFailure { message })
            }
        }
    }

    fn emit(&self, observer: &EventSender, event: ExtractionEvent) {
        if self.is_cancelled() {
            debug!("Dropping {:?} after cancellation", event);
            return;
        }
        if observer.send(event).is_err() {
            warn!("Extraction observer went away; event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::event_channel;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records calls and fails (or panics) on a chosen ordinal
    struct ScriptedEncoder {
        calls: Mutex<Vec<usize>>,
        fail_on: Option<usize>,
        panic_on: Option<usize>,
        delay: Option<Duration>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedEncoder {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: None,
                panic_on: None,
                delay: None,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EncoderPort for ScriptedEncoder {
        async fn extract(&self, request: &ExtractionRequest, _source: &Path) -> ClipResult<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(request.index);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.panic_on == Some(request.index) {
                panic!("encoder exploded");
            }
            if self.fail_on == Some(request.index) {
                return Err(ClipError::ToolExecutionFailed {
                    output_filename: request.output_filename(),
                    exit_code: Some(1),
                });
            }
            Ok(())
        }
    }

    fn plan(count: usize) -> Vec<ExtractionRequest> {
        (1..=count)
            .map(|index| ExtractionRequest {
                index,
                start_time_seconds: (index * 10) as f64,
                duration_seconds: 10.0,
                output_path: PathBuf::from("clips")
                    .join(ExtractionRequest::clip_filename(index, (index * 10 + 5) as u64)),
            })
            .collect()
    }

    async fn collect(mut rx: crate::engine::EventReceiver) -> Vec<ExtractionEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_empty_plan_reports_and_finishes() {
        let executor = ExtractionExecutor::new(Arc::new(ScriptedEncoder::new()));
        let (tx, rx) = event_channel();

        let summary = executor.run(Vec::new(), Path::new("vod.mp4"), tx).await.unwrap();
        let events = collect(rx).await;

        assert_eq!(
            events,
            vec![
                ExtractionEvent::Progress("No events to process.".to_string()),
                ExtractionEvent::Finished,
            ]
        );
        assert_eq!(summary.result, ExecutorState::Completed);
        assert!(summary.outcomes.is_empty());
        assert_eq!(executor.state(), ExecutorState::Terminated);
    }

    #[tokio::test]
    async fn test_successful_run_event_order() {
        let encoder = Arc::new(ScriptedEncoder::new());
        let executor = ExtractionExecutor::new(encoder.clone());
        let (tx, rx) = event_channel();

        let summary = executor.run(plan(2), Path::new("vod.mp4"), tx).await.unwrap();
        let events = collect(rx).await;

        assert_eq!(
            events,
            vec![
                ExtractionEvent::Progress("Processing 1/2 ...".to_string()),
                ExtractionEvent::ClipProduced {
                    filename: "clip_01_15s.mp4".to_string(),
                    start_time_seconds: 10.0,
                },
                ExtractionEvent::Progress("Processing 2/2 ...".to_string()),
                ExtractionEvent::ClipProduced {
                    filename: "clip_02_25s.mp4".to_string(),
                    start_time_seconds: 20.0,
                },
                ExtractionEvent::Progress("All clips generated.".to_string()),
                ExtractionEvent::Finished,
            ]
        );
        assert_eq!(summary.produced(), 2);
        assert_eq!(encoder.calls(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_failure_stops_queue_and_still_finishes() {
        let encoder = Arc::new(ScriptedEncoder {
            fail_on: Some(3),
            ..ScriptedEncoder::new()
        });
        let executor = ExtractionExecutor::new(encoder.clone());
        let (tx, rx) = event_channel();

        let summary = executor.run(plan(5), Path::new("vod.mp4"), tx).await.unwrap();
        let events = collect(rx).await;

        let tail = &events[events.len() - 3..];
        assert_eq!(tail[0], ExtractionEvent::Progress("Processing 3/5 ...".to_string()));
        assert_eq!(
            tail[1],
            ExtractionEvent::Error("FFmpeg failed for clip_03_35s.mp4".to_string())
        );
        assert_eq!(tail[2], ExtractionEvent::Finished);

        let produced = events
            .iter()
            .filter(|e| matches!(e, ExtractionEvent::ClipProduced { .. }))
            .count();
        assert_eq!(produced, 2);
        assert!(!events.contains(&ExtractionEvent::Progress("Processing 4/5 ...".to_string())));
        assert_eq!(encoder.calls(), vec![1, 2, 3]);
        assert_eq!(summary.result, ExecutorState::Failed);
        assert_eq!(
            summary.outcomes.last(),
            Some(&ExtractionOutcome::Failure {
                reason: "FFmpeg failed for clip_03_35s.mp4".to_string(),
                request_index: 3,
            })
        );
    }

    #[tokio::test]
    async fn test_panicking_encoder_becomes_error_event() {
        let encoder = Arc::new(ScriptedEncoder {
            panic_on: Some(1),
            ..ScriptedEncoder::new()
        });
        let executor = ExtractionExecutor::new(encoder);
        let (tx, rx) = event_channel();

        let summary = executor.run(plan(2), Path::new("vod.mp4"), tx).await.unwrap();
        let events = collect(rx).await;

        assert_eq!(events.len(), 3);
        match &events[1] {
            ExtractionEvent::Error(message) => assert!(message.contains("encoder exploded")),
            other => panic!("expected error event, got {other:?}"),
        }
        assert_eq!(events[2], ExtractionEvent::Finished);
        assert_eq!(summary.result, ExecutorState::Failed);
    }

    #[tokio::test]
    async fn test_requests_never_overlap() {
        let encoder = Arc::new(ScriptedEncoder {
            delay: Some(Duration::from_millis(5)),
            ..ScriptedEncoder::new()
        });
        let executor = ExtractionExecutor::new(encoder.clone());
        let (tx, _rx) = event_channel();

        executor.run(plan(4), Path::new("vod.mp4"), tx).await.unwrap();
        assert_eq!(encoder.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(encoder.calls(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_second_run_is_rejected() {
        let encoder = Arc::new(ScriptedEncoder {
            delay: Some(Duration::from_millis(20)),
            ..ScriptedEncoder::new()
        });
        let executor = ExtractionExecutor::new(encoder);
        let (tx1, _rx1) = event_channel();
        let (tx2, mut rx2) = event_channel();

        let (first, second) = tokio::join!(
            executor.run(plan(2), Path::new("vod.mp4"), tx1),
            executor.run(plan(2), Path::new("vod.mp4"), tx2),
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(ClipError::RunInProgress)));
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_stops_scheduling_and_silences_events() {
        let encoder = Arc::new(ScriptedEncoder {
            delay: Some(Duration::from_millis(50)),
            ..ScriptedEncoder::new()
        });
        let executor = ExtractionExecutor::new(encoder.clone());
        let cancel = executor.cancel_handle();
        let (tx, mut rx) = event_channel();

        let handle = executor.spawn(plan(5), PathBuf::from("vod.mp4"), tx);

        // First progress event means request 1 is in flight
        let first = rx.recv().await.unwrap();
        assert_eq!(first, ExtractionEvent::Progress("Processing 1/5 ...".to_string()));
        cancel.cancel();

        let summary = handle.await.unwrap().unwrap();
        let rest = collect(rx).await;

        assert!(rest.is_empty(), "no events after teardown, got {rest:?}");
        assert_eq!(summary.result, ExecutorState::Cancelled);
        assert_eq!(encoder.calls(), vec![1]);
        assert!(cancel.is_cancelled());
    }
}
