use crate::dialog::{Decision, Verdict};
use crate::upload::{AssetRef, DeleteResult, UploadRegistry, UploadService};

/// Carries out rollback decisions and owns the set of uploads made during
/// this editor mount.
#[derive(Debug, Default)]
pub struct OrphanReconciler {
    registry: UploadRegistry,
    deletes_in_flight: usize,
}

impl OrphanReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &UploadRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut UploadRegistry {
        &mut self.registry
    }

    pub fn deletes_in_flight(&self) -> usize {
        self.deletes_in_flight
    }

    /// Returns true when a delete was issued.
    pub fn apply(&mut self, decision: &Decision, uploads: &UploadService) -> bool {
        let Verdict::Cancelled { reference } = &decision.verdict else {
            return false;
        };
        // The tombstone is written before the delete is issued.
        if !self.registry.retire(reference) {
            tracing::warn!(
                session = %decision.session,
                %reference,
                "rollback requested for a reference that is not an unconfirmed upload"
            );
            return false;
        }
        tracing::info!(
            session = %decision.session,
            %reference,
            "rolling back cancelled image insert"
        );
        self.deletes_in_flight += 1;
        uploads.delete(reference.clone());
        true
    }

    pub fn delete_finished(
        &mut self,
        reference: &AssetRef,
        result: DeleteResult<()>,
        uploads: &UploadService,
    ) {
        self.deletes_in_flight = self.deletes_in_flight.saturating_sub(1);
        uploads.complete_delete(reference, result);
    }
}
