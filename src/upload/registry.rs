use std::collections::HashMap;

use thiserror::Error;

use super::AssetRef;
use crate::dialog::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Uploaded,
    Confirmed,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub reference: AssetRef,
    pub status: AssetStatus,
    /// Dialog session that was open when the upload started.
    pub owner: Option<SessionId>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("reference {reference} was already deleted and cannot be reused")]
    ReferenceRetired { reference: AssetRef },
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Everything uploaded during one editor mount. Only references in
/// [`AssetStatus::Uploaded`] are candidates for rollback.
#[derive(Debug, Default)]
pub struct UploadRegistry {
    assets: HashMap<AssetRef, UploadedAsset>,
}

impl UploadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        reference: AssetRef,
        owner: Option<SessionId>,
    ) -> RegistryResult<&UploadedAsset> {
        if let Some(existing) = self.assets.get(&reference) {
            if existing.status == AssetStatus::Deleted {
                return Err(RegistryError::ReferenceRetired { reference });
            }
            tracing::debug!(
                %reference,
                status = ?existing.status,
                "upload returned a known reference"
            );
        }

        let asset = self
            .assets
            .entry(reference.clone())
            .or_insert_with(|| UploadedAsset {
                reference,
                status: AssetStatus::Uploaded,
                owner,
            });
        Ok(&*asset)
    }

    pub fn status(&self, reference: &AssetRef) -> Option<AssetStatus> {
        self.assets.get(reference).map(|asset| asset.status)
    }

    pub fn get(&self, reference: &AssetRef) -> Option<&UploadedAsset> {
        self.assets.get(reference)
    }

    /// True when we uploaded the reference ourselves and nobody confirmed it yet.
    pub fn is_unconfirmed(&self, reference: &AssetRef) -> bool {
        self.status(reference) == Some(AssetStatus::Uploaded)
    }

    /// Uploaded → Confirmed. Returns false for unknown, confirmed, or deleted references.
    pub fn confirm(&mut self, reference: &AssetRef) -> bool {
        self.transition(reference, AssetStatus::Confirmed)
    }

    /// Uploaded → Deleted. The reference stays as a tombstone so it is never re-registered.
    pub fn retire(&mut self, reference: &AssetRef) -> bool {
        self.transition(reference, AssetStatus::Deleted)
    }

    fn transition(&mut self, reference: &AssetRef, next: AssetStatus) -> bool {
        match self.assets.get_mut(reference) {
            Some(asset) if asset.status == AssetStatus::Uploaded => {
                asset.status = next;
                true
            }
            _ => false,
        }
    }

    /// Unconfirmed references, sorted for stable reporting.
    pub fn unconfirmed(&self) -> Vec<AssetRef> {
        let mut references: Vec<AssetRef> = self
            .assets
            .values()
            .filter(|asset| asset.status == AssetStatus::Uploaded)
            .map(|asset| asset.reference.clone())
            .collect();
        references.sort();
        references
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(raw: &str) -> AssetRef {
        AssetRef::parse(raw).expect("test reference should be non-empty")
    }

    #[test]
    fn registered_asset_starts_unconfirmed() {
        let mut registry = UploadRegistry::new();
        let registered = registry
            .register(asset("img-1"), Some(SessionId::new(3)))
            .expect("fresh reference should register");
        assert_eq!(registered.status, AssetStatus::Uploaded);
        assert_eq!(registered.owner, Some(SessionId::new(3)));
        assert!(registry.is_unconfirmed(&asset("img-1")));
    }

    #[test]
    fn confirmed_asset_is_no_longer_a_rollback_candidate() {
        let mut registry = UploadRegistry::new();
        registry.register(asset("img-1"), None).unwrap();

        assert!(registry.confirm(&asset("img-1")));
        assert!(!registry.is_unconfirmed(&asset("img-1")));
        assert!(!registry.retire(&asset("img-1")));
        assert_eq!(registry.status(&asset("img-1")), Some(AssetStatus::Confirmed));
    }

    #[test]
    fn retired_reference_cannot_be_registered_again() {
        let mut registry = UploadRegistry::new();
        registry.register(asset("img-1"), None).unwrap();
        assert!(registry.retire(&asset("img-1")));

        let err = registry.register(asset("img-1"), None).unwrap_err();
        assert!(matches!(err, RegistryError::ReferenceRetired { .. }));
        assert_eq!(registry.status(&asset("img-1")), Some(AssetStatus::Deleted));
    }

    #[test]
    fn reregistering_a_live_reference_keeps_its_status() {
        let mut registry = UploadRegistry::new();
        registry.register(asset("img-1"), Some(SessionId::new(1))).unwrap();
        registry.confirm(&asset("img-1"));

        let again = registry
            .register(asset("img-1"), Some(SessionId::new(2)))
            .unwrap();
        assert_eq!(again.status, AssetStatus::Confirmed);
        assert_eq!(again.owner, Some(SessionId::new(1)));
    }

    #[test]
    fn unconfirmed_lists_only_uploaded_assets_in_order() {
        let mut registry = UploadRegistry::new();
        for raw in ["img-c", "img-a", "img-b"] {
            registry.register(asset(raw), None).unwrap();
        }
        registry.confirm(&asset("img-b"));

        assert_eq!(registry.unconfirmed(), vec![asset("img-a"), asset("img-c")]);
        assert_eq!(registry.len(), 3);
    }
}
