use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::upload::{AssetRef, BlobStore, DeleteResult, ImageBlob, UploadError, UploadResult};
use thiserror::Error;

const STORED_FILE_PREFIX: &str = "post_";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("reference {reference} does not belong to this store")]
    ForeignReference { reference: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Directory-backed blob store for local development and offline editing.
/// References are `<public_prefix>/<file name>`.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    public_prefix: String,
    sequence: AtomicU64,
}

impl FsBlobStore {
    pub fn new(root: PathBuf, public_prefix: impl Into<String>) -> StorageResult<Self> {
        fs::create_dir_all(&root)?;
        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();
        Ok(Self {
            root,
            public_prefix,
            sequence: AtomicU64::new(0),
        })
    }

    fn allocate_file_name(&self, extension: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{STORED_FILE_PREFIX}{nanos}_{sequence}.{extension}")
    }

    fn reference_for(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.public_prefix)
    }

    fn path_for_reference(&self, reference: &AssetRef) -> StorageResult<PathBuf> {
        let foreign = || StorageError::ForeignReference {
            reference: reference.to_string(),
        };
        let file_name = reference
            .as_str()
            .strip_prefix(&self.public_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(foreign)?;
        if file_name.is_empty()
            || file_name.contains(['/', '\\'])
            || file_name.starts_with('.')
        {
            return Err(foreign());
        }
        Ok(self.root.join(file_name))
    }

    pub fn save(&self, blob: &ImageBlob) -> StorageResult<String> {
        let file_name = self.allocate_file_name(blob.extension());
        fs::write(self.root.join(&file_name), blob.bytes())?;
        Ok(self.reference_for(&file_name))
    }

    pub fn remove(&self, reference: &AssetRef) -> StorageResult<()> {
        let path = self.path_for_reference(reference)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}

impl BlobStore for FsBlobStore {
    fn store(&self, blob: &ImageBlob) -> UploadResult<AssetRef> {
        let reference = self.save(blob)?;
        AssetRef::parse(&reference).ok_or_else(|| UploadError::MissingLocation {
            message: "store produced an empty reference".to_string(),
        })
    }

    fn delete(&self, reference: &AssetRef) -> DeleteResult<()> {
        self.remove(reference)?;
        Ok(())
    }
}
