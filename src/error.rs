use std::{io, path::PathBuf};

/// Errors that can occur while opening, writing to or rotating a file sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Log directory '{path}' is unavailable: {source}")]
    DirectoryUnavailable { path: PathBuf, source: io::Error },
    #[error("Failed to create file '{path}': {source}")]
    CreateFile { path: PathBuf, source: io::Error },
    #[error("Failed to rename file from '{from}' to '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// The plain retired file is still on disk when this is returned.
    #[error("Failed to archive '{plain}' into '{archive}': {source}")]
    Archive {
        plain: PathBuf,
        archive: PathBuf,
        source: ArchiveError,
    },
    #[error("Failed to read metadata of '{path}': {source}")]
    Metadata { path: PathBuf, source: io::Error },
    #[error("File IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid sink configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to list retired files: {0}")]
    ListRetired(String),
}

/// Errors raised while writing a zip archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The archive file could not be created, e.g. because the name is taken.
    #[error("Failed to create archive: {0}")]
    Create(io::Error),
    #[error("File IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Error type returned by a notification [`Transport`](crate::Transport).
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the [`Logger`](crate::Logger).
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("Failed to write to console: {0}")]
    Console(io::Error),
    #[error("Email transport is not defined")]
    NotificationTransportMissing,
    #[error("Failed to send notification: {0}")]
    Notification(TransportError),
}
