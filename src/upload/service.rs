use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::worker::{spawn_worker_action, TaskSpawner};
use super::{
    AssetRef, BlobStore, DeleteResult, ImageBlob, UploadLimits, UploadRegistry, UploadResult,
};
use crate::dialog::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploadTicket(u64);

impl fmt::Display for UploadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upload#{}", self.0)
    }
}

/// Results posted back from worker threads to the thread that owns the editor session.
#[derive(Debug)]
pub enum WorkerEvent {
    StoreFinished {
        ticket: UploadTicket,
        result: UploadResult<AssetRef>,
    },
    DeleteFinished {
        reference: AssetRef,
        result: DeleteResult<()>,
    },
}

pub struct UploadService {
    store: Arc<dyn BlobStore>,
    spawner: Arc<dyn TaskSpawner>,
    limits: UploadLimits,
    events: Sender<WorkerEvent>,
    next_ticket: u64,
}

impl fmt::Debug for UploadService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadService")
            .field("limits", &self.limits)
            .field("next_ticket", &self.next_ticket)
            .finish_non_exhaustive()
    }
}

impl UploadService {
    pub fn new(
        store: Arc<dyn BlobStore>,
        spawner: Arc<dyn TaskSpawner>,
        limits: UploadLimits,
        events: Sender<WorkerEvent>,
    ) -> Self {
        Self {
            store,
            spawner,
            limits,
            events,
            next_ticket: 1,
        }
    }

    /// Checks the blob against the upload limits and starts the store call.
    /// Preflight failures are returned directly; network failures arrive later
    /// as [`WorkerEvent::StoreFinished`].
    pub fn store(&mut self, filename: &str, bytes: Vec<u8>) -> UploadResult<UploadTicket> {
        let blob = ImageBlob::new(filename, bytes, &self.limits)?;
        let ticket = UploadTicket(self.next_ticket);
        self.next_ticket += 1;

        tracing::debug!(
            %ticket,
            filename,
            mime = blob.mime_type(),
            size = blob.bytes().len(),
            "starting image upload"
        );
        let store = Arc::clone(&self.store);
        spawn_worker_action(
            self.spawner.as_ref(),
            move || WorkerEvent::StoreFinished {
                ticket,
                result: store.store(&blob),
            },
            self.events.clone(),
        );
        Ok(ticket)
    }

    /// Records a finished store. Only successful uploads enter the registry.
    pub fn complete_store(
        &self,
        ticket: UploadTicket,
        result: UploadResult<AssetRef>,
        owner: Option<SessionId>,
        registry: &mut UploadRegistry,
    ) -> UploadResult<AssetRef> {
        match result {
            Ok(reference) => {
                registry.register(reference.clone(), owner)?;
                tracing::info!(%ticket, %reference, ?owner, "image uploaded");
                Ok(reference)
            }
            Err(err) => {
                tracing::warn!(%ticket, %err, "image upload failed");
                Err(err)
            }
        }
    }

    /// Fire-and-forget delete. The outcome comes back as
    /// [`WorkerEvent::DeleteFinished`] and is only ever logged.
    pub fn delete(&self, reference: AssetRef) {
        tracing::debug!(%reference, "deleting uploaded image");
        let store = Arc::clone(&self.store);
        spawn_worker_action(
            self.spawner.as_ref(),
            move || {
                let result = store.delete(&reference);
                WorkerEvent::DeleteFinished { reference, result }
            },
            self.events.clone(),
        );
    }

    pub fn complete_delete(&self, reference: &AssetRef, result: DeleteResult<()>) {
        match result {
            Ok(()) => tracing::info!(%reference, "orphaned image deleted"),
            Err(err) => tracing::warn!(
                %reference,
                %err,
                "failed to delete orphaned image; leaving it for server cleanup"
            ),
        }
    }
}
