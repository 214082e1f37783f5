use crate::charset::Charset;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("file too large: {} is {size} bytes (limit {limit})", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("unknown encoding label: {label}")]
    UnknownEncoding { label: String },

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not create backup {}: {source}", .backup.display())]
    BackupCreationFailed {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("converting {} failed, original restored: {cause}", .path.display())]
    ConversionFailed {
        path: PathBuf,
        #[source]
        cause: ConversionCause,
    },

    /// Rollback itself failed; the file may be corrupt and the backup is
    /// left at `backup` if it still exists.
    #[error(
        "converting {} failed ({cause}) and restoring from {} also failed: {source}",
        .path.display(),
        .backup.display()
    )]
    BackupRestoreFailed {
        path: PathBuf,
        backup: PathBuf,
        cause: ConversionCause,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::FileNotFound { .. } => "FileNotFound",
            Error::FileTooLarge { .. } => "FileTooLarge",
            Error::UnknownEncoding { .. } => "UnknownEncoding",
            Error::Io { .. } => "Io",
            Error::BackupCreationFailed { .. } => "BackupCreationFailed",
            Error::ConversionFailed { .. } => "ConversionFailed",
            Error::BackupRestoreFailed { .. } => "BackupRestoreFailed",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::BackupRestoreFailed { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConversionCause {
    #[error("malformed {encoding} input on line {line}")]
    Malformed { encoding: Charset, line: u64 },

    #[error("character {ch:?} on line {line} has no mapping in {encoding}")]
    Unmappable {
        ch: char,
        encoding: Charset,
        line: u64,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
