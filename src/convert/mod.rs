pub mod backup;
pub mod transcode;

use crate::{
    charset::Charset,
    config::{Config, UnmappablePolicy},
    error::{ConversionCause, Error, Result},
    report::ConversionOutcome,
    sample,
};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

pub use backup::BackupHandle;
pub use transcode::{transcode, TranscodeStats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub path: PathBuf,
    pub source: Charset,
    pub target: Charset,
}

/// Backed-up, streaming, in-place re-encoder.
///
/// Holds only configuration; conversions of different paths may run in
/// parallel, but callers must not convert the same path twice at once.
#[derive(Debug, Clone)]
pub struct ConversionEngine {
    max_input_file_bytes: u64,
    backup_suffix: String,
    unmappable: UnmappablePolicy,
    verify_backup: bool,
    read_buffer_bytes: usize,
}

impl ConversionEngine {
    pub fn new(cfg: &Config) -> Self {
        Self {
            max_input_file_bytes: cfg.limits.max_input_file_bytes,
            backup_suffix: cfg.conversion.backup_suffix.clone(),
            unmappable: cfg.conversion.unmappable,
            verify_backup: cfg.conversion.verify_backup,
            read_buffer_bytes: cfg.conversion.read_buffer_bytes.max(1),
        }
    }

    /// Re-encodes `path` from `source` to `target` in place.
    ///
    /// On any failure after the backup exists the file is restored
    /// byte-for-byte and the backup removed before returning.
    pub fn convert(
        &self,
        path: &Path,
        source: Charset,
        target: Charset,
    ) -> Result<ConversionOutcome> {
        self.convert_with(path, source, target, open_for_rewrite)
    }

    pub fn convert_with<W, F>(
        &self,
        path: &Path,
        source: Charset,
        target: Charset,
        open_target: F,
    ) -> Result<ConversionOutcome>
    where
        W: Write,
        F: FnOnce(&Path) -> io::Result<W>,
    {
        sample::check_input(path, self.max_input_file_bytes)?;
        info!("convert {} {source} -> {target}", path.display());

        let backup = BackupHandle::create(path, &self.backup_suffix, self.verify_backup)?;
        debug!("state=backed_up backup={}", backup.path().display());

        match self.rewrite(&backup, path, source, target, open_target) {
            Ok(stats) => {
                let backup_path = backup.path().to_path_buf();
                if let Err(source) = backup.discard() {
                    warn!(
                        "conversion of {} committed, but backup {} could not be removed: {source}",
                        path.display(),
                        backup_path.display()
                    );
                    return Err(Error::Io {
                        path: backup_path,
                        source,
                    });
                }
                info!(
                    "state=committed lines={} bytes_in={} bytes_out={} dropped={}",
                    stats.lines, stats.bytes_read, stats.bytes_written, stats.dropped
                );
                Ok(ConversionOutcome::new(path, source, target, &stats))
            }
            Err(cause) => {
                warn!("conversion of {} failed: {cause}; rolling back", path.display());
                let backup_path = backup.path().to_path_buf();
                match backup.restore() {
                    Ok(()) => {
                        info!("state=rolled_back path={}", path.display());
                        Err(Error::ConversionFailed {
                            path: path.to_path_buf(),
                            cause,
                        })
                    }
                    Err(source) => Err(Error::BackupRestoreFailed {
                        path: path.to_path_buf(),
                        backup: backup_path,
                        cause,
                        source,
                    }),
                }
            }
        }
    }

    fn rewrite<W, F>(
        &self,
        backup: &BackupHandle,
        path: &Path,
        source: Charset,
        target: Charset,
        open_target: F,
    ) -> std::result::Result<TranscodeStats, ConversionCause>
    where
        W: Write,
        F: FnOnce(&Path) -> io::Result<W>,
    {
        let reader = BufReader::with_capacity(self.read_buffer_bytes, backup.open()?);
        let writer = BufWriter::with_capacity(self.read_buffer_bytes, open_target(path)?);
        debug!("state=converting path={}", path.display());
        transcode(
            reader,
            writer,
            source,
            target,
            self.unmappable,
            self.read_buffer_bytes,
        )
    }

    /// `dest` must not exist; a partial `dest` is removed on failure.
    pub fn recode_into(
        &self,
        path: &Path,
        dest: &Path,
        source: Charset,
        target: Charset,
    ) -> Result<ConversionOutcome> {
        sample::check_input(path, self.max_input_file_bytes)?;
        info!(
            "recode {} {source} -> {} {target}",
            path.display(),
            dest.display()
        );

        let input = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let output = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)
            .map_err(|source| Error::Io {
                path: dest.to_path_buf(),
                source,
            })?;

        let result = transcode(
            BufReader::with_capacity(self.read_buffer_bytes, input),
            BufWriter::with_capacity(self.read_buffer_bytes, output),
            source,
            target,
            self.unmappable,
            self.read_buffer_bytes,
        );
        match result {
            Ok(stats) => Ok(ConversionOutcome::new(dest, source, target, &stats)),
            Err(cause) => {
                if let Err(err) = fs::remove_file(dest) {
                    warn!("could not remove partial output {}: {err}", dest.display());
                }
                Err(Error::ConversionFailed {
                    path: path.to_path_buf(),
                    cause,
                })
            }
        }
    }

    pub fn spawn_convert(&self, request: ConversionRequest) -> ConversionTask {
        let engine = self.clone();
        let handle = std::thread::spawn(move || {
            engine.convert(&request.path, request.source, request.target)
        });
        ConversionTask { handle }
    }
}

pub struct ConversionTask {
    handle: JoinHandle<Result<ConversionOutcome>>,
}

impl ConversionTask {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn wait(self) -> Result<ConversionOutcome> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

fn open_for_rewrite(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).truncate(true).open(path)
}
