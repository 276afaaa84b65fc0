mod blob;
mod registry;
mod service;
mod store;
mod worker;

use std::fmt;

use thiserror::Error;

use crate::storage::StorageError;

pub use blob::{ImageBlob, UploadLimits};
pub use registry::{AssetStatus, RegistryError, RegistryResult, UploadRegistry, UploadedAsset};
pub use service::{UploadService, UploadTicket, WorkerEvent};
pub use store::{BlobStore, HttpBlobStore};
pub use worker::{InlineSpawner, TaskSpawner, ThreadSpawner};

/// Durable reference returned by the blob store, usually the public URL of the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetRef(String);

impl AssetRef {
    /// Returns `None` for blank input; an empty field value never names an asset.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image is larger than the upload limit ({size} > {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
    #[error("image dimensions {width}x{height} exceed the {max_width}x{max_height} limit")]
    DimensionsTooLarge {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
    #[error("image has too many pixels ({pixels} > {limit})")]
    TooManyPixels { pixels: u64, limit: u64 },
    #[error("file is not a supported image")]
    UnsupportedFormat,
    #[error("failed to read image: {message}")]
    Decode { message: String },
    #[error("upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("upload failed: {message}")]
    MissingLocation { message: String },
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type UploadResult<T> = std::result::Result<T, UploadError>;

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("delete rejected with status {status}")]
    Rejected { status: u16 },
    #[error("delete request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type DeleteResult<T> = std::result::Result<T, DeleteError>;
