pub mod avatar;
pub mod config;
pub mod dialog;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod reconcile;
pub mod session;
pub mod storage;
#[cfg(test)]
mod test_support;
pub mod upload;

pub use error::{AppError, AppResult};
pub use session::{EditorSession, SessionNotice, UnmountReport};

/// Entrypoint used by the editor page integration: sets up logging, reads
/// `config.json` and mounts a fresh editor session.
pub fn mount() -> AppResult<EditorSession> {
    logging::init();
    tracing::info!("mounting blogdesk editor session");

    let config = config::load_app_config();
    let session = EditorSession::mount(&config)?;

    tracing::info!(
        local_store = config.local_store.is_some(),
        "editor session ready"
    );
    Ok(session)
}
