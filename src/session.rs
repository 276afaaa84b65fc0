use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::dialog::{
    ControlId, Decision, DialogHandle, DialogSnapshot, InsertionDialogTracker, SessionId,
    StateResult,
};
use crate::error::AppResult;
use crate::reconcile::OrphanReconciler;
use crate::storage::FsBlobStore;
use crate::upload::{
    AssetRef, BlobStore, HttpBlobStore, TaskSpawner, ThreadSpawner, UploadError, UploadLimits,
    UploadRegistry, UploadResult, UploadService, UploadTicket, WorkerEvent,
};

/// What the editing surface should hear about after draining worker results.
#[derive(Debug)]
pub enum SessionNotice {
    /// The editor should write `reference` into the dialog's source field.
    UploadCompleted {
        ticket: UploadTicket,
        reference: AssetRef,
    },
    UploadFailed {
        ticket: UploadTicket,
        error: UploadError,
    },
    Decided(Decision),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmountReport {
    /// Uploads never confirmed nor deleted; left for server-side cleanup.
    pub unconfirmed: Vec<AssetRef>,
    /// Uploads still in flight when the grace period ran out.
    pub abandoned_uploads: usize,
    pub open_session: Option<SessionId>,
    pub settling_sessions: usize,
}

/// Per-mount coordinator for the post editor. Owns the upload service, the
/// dialog tracker and the reconciler, and is the only place worker results
/// are applied.
#[derive(Debug)]
pub struct EditorSession {
    uploads: UploadService,
    tracker: InsertionDialogTracker,
    reconciler: OrphanReconciler,
    pending: HashMap<UploadTicket, Option<SessionId>>,
    events: Receiver<WorkerEvent>,
}

impl EditorSession {
    pub fn mount(config: &AppConfig) -> AppResult<Self> {
        let store: Arc<dyn BlobStore> = match &config.local_store {
            Some(local) => {
                tracing::info!(dir = ?local.dir, "using local image store");
                Arc::new(FsBlobStore::new(
                    local.dir.clone(),
                    local.public_prefix.clone(),
                )?)
            }
            None => {
                let store = HttpBlobStore::new(config)?;
                tracing::info!(upload = store.upload_url(), "using blog image endpoint");
                Arc::new(store)
            }
        };
        Ok(Self::with_store(
            store,
            Arc::new(ThreadSpawner),
            config.upload_limits,
        ))
    }

    pub fn with_store(
        store: Arc<dyn BlobStore>,
        spawner: Arc<dyn TaskSpawner>,
        limits: UploadLimits,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            uploads: UploadService::new(store, spawner, limits, tx),
            tracker: InsertionDialogTracker::new(),
            reconciler: OrphanReconciler::new(),
            pending: HashMap::new(),
            events: rx,
        }
    }

    pub fn tracker(&self) -> &InsertionDialogTracker {
        &self.tracker
    }

    pub fn registry(&self) -> &UploadRegistry {
        self.reconciler.registry()
    }

    pub fn has_pending_work(&self) -> bool {
        !self.pending.is_empty() || self.reconciler.deletes_in_flight() > 0
    }

    /// Starts an upload. A blob failing preflight is rejected here and never
    /// attaches to the open dialog.
    pub fn begin_upload(&mut self, filename: &str, bytes: Vec<u8>) -> UploadResult<UploadTicket> {
        let ticket = self.uploads.store(filename, bytes)?;
        let owner = self.tracker.upload_started();
        self.pending.insert(ticket, owner);
        Ok(ticket)
    }

    pub fn dialog_opened(&mut self, snapshot: &DialogSnapshot) -> StateResult<Option<SessionId>> {
        self.tracker.dialog_opened(snapshot)
    }

    pub fn field_changed(&mut self, handle: DialogHandle, value: &str) -> bool {
        self.tracker.field_changed(handle, value)
    }

    pub fn control_activated(&mut self, handle: DialogHandle, control: ControlId) -> bool {
        self.tracker.control_activated(handle, control)
    }

    pub fn primary_action_activated(&mut self, handle: DialogHandle) -> bool {
        self.tracker.primary_action_activated(handle)
    }

    /// Returns the decision when it can be made right away. A session with
    /// uploads in flight is decided later from [`Self::process_pending_events`].
    pub fn dialog_closed(&mut self, handle: DialogHandle) -> AppResult<Option<Decision>> {
        let decision = self
            .tracker
            .dialog_closed(handle, self.reconciler.registry_mut())?;
        if let Some(decision) = &decision {
            self.reconciler.apply(decision, &self.uploads);
        }
        Ok(decision)
    }

    /// Applies every worker result that has arrived so far without blocking.
    pub fn process_pending_events(&mut self) -> AppResult<Vec<SessionNotice>> {
        let mut notices = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => self.handle_event(event, &mut notices)?,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        Ok(notices)
    }

    /// Blocks up to `timeout` for the next worker result, then drains the rest.
    pub fn wait_for_event(&mut self, timeout: Duration) -> AppResult<Vec<SessionNotice>> {
        let mut notices = Vec::new();
        match self.events.recv_timeout(timeout) {
            Ok(event) => self.handle_event(event, &mut notices)?,
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return Ok(notices),
        }
        notices.extend(self.process_pending_events()?);
        Ok(notices)
    }

    fn handle_event(
        &mut self,
        event: WorkerEvent,
        notices: &mut Vec<SessionNotice>,
    ) -> AppResult<()> {
        match event {
            WorkerEvent::StoreFinished { ticket, result } => {
                let owner = match self.pending.remove(&ticket) {
                    Some(owner) => owner,
                    None => {
                        tracing::warn!(%ticket, "result for an unknown upload ticket");
                        None
                    }
                };
                let settled = match self.uploads.complete_store(
                    ticket,
                    result,
                    owner,
                    self.reconciler.registry_mut(),
                ) {
                    Ok(reference) => {
                        notices.push(SessionNotice::UploadCompleted {
                            ticket,
                            reference: reference.clone(),
                        });
                        Some(reference)
                    }
                    Err(error) => {
                        notices.push(SessionNotice::UploadFailed { ticket, error });
                        None
                    }
                };

                let Some(session) = owner else {
                    return Ok(());
                };
                let decision = self.tracker.upload_settled(
                    session,
                    settled.as_ref(),
                    self.reconciler.registry_mut(),
                )?;
                if let Some(decision) = decision {
                    self.reconciler.apply(&decision, &self.uploads);
                    notices.push(SessionNotice::Decided(decision));
                }
            }
            WorkerEvent::DeleteFinished { reference, result } => {
                self.reconciler
                    .delete_finished(&reference, result, &self.uploads);
            }
        }
        Ok(())
    }

    /// Tears the session down, waiting up to `grace` for in-flight work.
    pub fn unmount(mut self, grace: Duration) -> UnmountReport {
        let deadline = Instant::now() + grace;
        while self.has_pending_work() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if let Err(err) = self.wait_for_event(deadline - now) {
                tracing::warn!(%err, "failed to apply worker result during unmount");
            }
        }

        let report = UnmountReport {
            unconfirmed: self.registry().unconfirmed(),
            abandoned_uploads: self.pending.len(),
            open_session: self.tracker.active_session(),
            settling_sessions: self.tracker.settling_sessions(),
        };
        for reference in &report.unconfirmed {
            let owner = self
                .registry()
                .get(reference)
                .and_then(|asset| asset.owner);
            tracing::info!(%reference, ?owner, "unconfirmed upload left for server cleanup");
        }
        if report.abandoned_uploads > 0 || report.settling_sessions > 0 {
            tracing::warn!(
                abandoned = report.abandoned_uploads,
                settling = report.settling_sessions,
                "editor unmounted with uploads still in flight"
            );
        }
        tracing::debug!(?report, "editor session unmounted");
        report
    }
}
