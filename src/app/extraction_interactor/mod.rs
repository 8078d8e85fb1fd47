// Extraction interactor - Orchestrates one clip extraction run

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::model::{ExtractionRequest, PlaylistEntry, RunConfiguration};
use crate::engine::{
    event_channel, CancelHandle, EventReceiver, ExecutorState, ExtractionEvent,
    ExtractionExecutor, RunSummary,
};
use crate::error::{ClipError, ClipResult};
use crate::planner::ClipWindowPlanner;
use crate::playlist::PlaylistSession;
use crate::ports::EncoderPort;

/// Result of a run as seen from the interactive side
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub summary: RunSummary,
    /// Message of the `Error` event, if one arrived
    pub error: Option<String>,
    /// Number of clips appended to the playlist
    pub clips_added: usize,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.summary.result == ExecutorState::Completed
    }
}

/// Clears the busy flag when the worker task exits
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// A run in flight: the worker task plus the receiving end of its events
pub struct RunHandle {
    events: EventReceiver,
    worker: JoinHandle<ClipResult<RunSummary>>,
    cancel: CancelHandle,
    output_dir: PathBuf,
}

impl RunHandle {
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Drain worker events in arrival order, feeding produced clips to the playlist.
    ///
    /// `on_event` sees each event after the playlist has been updated for it.
    pub async fn drive<F>(mut self, playlist: &mut PlaylistSession, mut on_event: F) -> ClipResult<RunReport>
    where
        F: FnMut(&ExtractionEvent, &PlaylistSession),
    {
        let mut error_message = None;
        let mut clips_added = 0;

        while let Some(event) = self.events.recv().await {
            if self.cancel.is_cancelled() {
                continue;
            }
            match &event {
                ExtractionEvent::Progress(message) => debug!("{}", message),
                ExtractionEvent::ClipProduced {
                    filename,
                    start_time_seconds,
                } => {
                    playlist.append(PlaylistEntry::from_produced(
                        &self.output_dir,
                        filename,
                        *start_time_seconds,
                    ));
                    clips_added += 1;
                }
                ExtractionEvent::Error(message) => {
                    error!("{}", message);
                    error_message = Some(message.clone());
                }
                ExtractionEvent::Finished => debug!("Done."),
            }
            on_event(&event, playlist);
        }

        let summary = match self.worker.await {
            Ok(result) => result?,
            Err(join_err) => {
                return Err(ClipError::UnexpectedWorkerFailure {
                    message: join_err.to_string(),
                })
            }
        };

        Ok(RunReport {
            summary,
            error: error_message,
            clips_added,
        })
    }
}

/// Interactor for the extract use case
pub struct ExtractionInteractor {
    encoder: Arc<dyn EncoderPort>,
    planner: ClipWindowPlanner,
    busy: Arc<AtomicBool>,
    active: Mutex<Option<CancelHandle>>,
}

impl ExtractionInteractor {
    /// Create new extraction interactor with injected encoder
    pub fn new(encoder: Arc<dyn EncoderPort>) -> Self {
        Self {
            encoder,
            planner: ClipWindowPlanner::new(),
            busy: Arc::new(AtomicBool::new(false)),
            active: Mutex::new(None),
        }
    }

    /// Whether a run currently owns the worker
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Dry-run planning
    pub fn plan(&self, config: &RunConfiguration) -> Vec<ExtractionRequest> {
        self.planner.plan(config)
    }

    /// Start a run on a worker task.
    ///
    /// Validates the source, creates the output directory, resets the playlist
    /// and spawns the executor. Fails with `RunInProgress` while another run is active.
    pub fn start(
        &self,
        config: RunConfiguration,
        playlist: &mut PlaylistSession,
    ) -> ClipResult<RunHandle> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected extraction request while another run is active");
            return Err(ClipError::RunInProgress);
        }
        let guard = BusyGuard {
            flag: Arc::clone(&self.busy),
        };

        config.validate_source()?;
        std::fs::create_dir_all(&config.output_dir)?;

        info!(
            vod = %config.vod_path.display(),
            offset = config.match_start_offset_seconds,
            pre = config.pre_seconds,
            post = config.post_seconds,
            "Generating clips..."
        );
        for event in &config.events {
            info!("Event at {}s: {}", event.time, event.event_type);
        }

        playlist.reset();
        let plan = self.planner.plan(&config);

        let executor = ExtractionExecutor::new(Arc::clone(&self.encoder));
        let cancel = executor.cancel_handle();
        let (tx, rx) = event_channel();
        let run = executor.spawn(plan, config.vod_path.clone(), tx);
        // The flag stays set until the worker exits, even if the handle is dropped
        let worker = tokio::spawn(async move {
            let _busy = guard;
            run.await.unwrap_or_else(|join_err| {
                Err(ClipError::UnexpectedWorkerFailure {
                    message: join_err.to_string(),
                })
            })
        });

        *self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(cancel.clone());

        Ok(RunHandle {
            events: rx,
            worker,
            cancel,
            output_dir: config.output_dir,
        })
    }

    /// Start a run and drive it to completion
    pub async fn extract<F>(
        &self,
        config: RunConfiguration,
        playlist: &mut PlaylistSession,
        on_event: F,
    ) -> ClipResult<RunReport>
    where
        F: FnMut(&ExtractionEvent, &PlaylistSession),
    {
        let handle = self.start(config, playlist)?;
        let report = handle.drive(playlist, on_event).await;
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        report
    }

    /// Tear down the active run, if any
    pub fn cancel(&self) {
        if let Some(handle) = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
        {
            info!("Cancelling active extraction run");
            handle.cancel();
        }
    }
}
