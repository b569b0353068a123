use crate::download::DownloadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocateStationError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("No usable rows found in {0}")]
    EmptyReference(String),

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
