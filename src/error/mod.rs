use crate::avatar::AvatarError;
use crate::dialog::StateError;
use crate::storage::StorageError;
use crate::upload::{DeleteError, RegistryError, UploadError};
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Delete(#[from] DeleteError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Avatar(#[from] AvatarError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
