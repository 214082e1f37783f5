use crate::{
    error::{Error, Result},
    util::{sha256_file, sibling_with_suffix},
};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Byte-exact copy of a file taken before it is rewritten.
///
/// Consumed by exactly one of [`discard`](Self::discard) (after a successful
/// conversion) or [`restore`](Self::restore) (on failure).
#[derive(Debug)]
pub struct BackupHandle {
    original: PathBuf,
    path: PathBuf,
}

impl BackupHandle {
    /// Copies `original` to `<original><suffix>`. An existing file there is
    /// never overwritten, and a partially written backup is removed.
    pub fn create(original: &Path, suffix: &str, verify: bool) -> Result<Self> {
        Self::create_with(original, suffix, verify, copy_into)
    }

    pub fn create_with<F>(original: &Path, suffix: &str, verify: bool, copy: F) -> Result<Self>
    where
        F: FnOnce(&Path, &mut File) -> io::Result<()>,
    {
        let path = sibling_with_suffix(original, suffix);
        let failed = |source| Error::BackupCreationFailed {
            path: original.to_path_buf(),
            backup: path.clone(),
            source,
        };

        let mut dst = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(failed)?;

        if let Err(err) = copy(original, &mut dst) {
            drop(dst);
            discard_partial(&path);
            return Err(failed(err));
        }
        drop(dst);

        if verify {
            let checked = sha256_file(original).and_then(|want| {
                let got = sha256_file(&path)?;
                if got == want {
                    Ok(())
                } else {
                    Err(io::Error::other(format!(
                        "checksum mismatch: {got} != {want}"
                    )))
                }
            });
            if let Err(err) = checked {
                discard_partial(&path);
                return Err(failed(err));
            }
        }

        debug!("backup {} -> {}", original.display(), path.display());
        Ok(Self {
            original: original.to_path_buf(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open(&self) -> io::Result<File> {
        File::open(&self.path)
    }

    pub fn discard(self) -> io::Result<()> {
        fs::remove_file(&self.path)
    }

    /// Rollback, replacing whatever partial output is at the original path.
    pub fn restore(self) -> io::Result<()> {
        match fs::rename(&self.path, &self.original) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(
                    "rename {} -> {} failed ({err}); copying instead",
                    self.path.display(),
                    self.original.display()
                );
                fs::copy(&self.path, &self.original)?;
                fs::remove_file(&self.path)
            }
        }
    }
}

fn copy_into(original: &Path, dst: &mut File) -> io::Result<()> {
    let mut src = File::open(original)?;
    let meta = src.metadata()?;
    io::copy(&mut src, dst)?;
    dst.sync_all()?;
    if let Ok(modified) = meta.modified() {
        dst.set_modified(modified)?;
    }
    dst.set_permissions(meta.permissions())?;
    Ok(())
}

fn discard_partial(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        warn!("could not remove partial backup {}: {err}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn existing_backup_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("a.srt");
        let bak = dir.path().join("a.srt.bak");
        fs::write(&original, b"new").unwrap();
        fs::write(&bak, b"someone else's file").unwrap();

        let err = BackupHandle::create(&original, ".bak", true).unwrap_err();
        assert_eq!(err.kind(), "BackupCreationFailed");
        assert_eq!(fs::read(&bak).unwrap(), b"someone else's file");
        assert_eq!(fs::read(&original).unwrap(), b"new");
    }

    #[test]
    fn restore_replaces_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("a.srt");
        fs::write(&original, b"before").unwrap();

        let backup = BackupHandle::create(&original, ".bak", true).unwrap();
        let bak = backup.path().to_path_buf();
        fs::write(&original, b"half-writ").unwrap();
        backup.restore().unwrap();

        assert_eq!(fs::read(&original).unwrap(), b"before");
        assert!(!bak.exists());
    }

    #[test]
    fn backup_keeps_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("a.srt");
        fs::write(&original, b"x").unwrap();
        let before = fs::metadata(&original).unwrap().modified().unwrap();

        let backup = BackupHandle::create(&original, ".bak", false).unwrap();
        let copied = fs::metadata(backup.path()).unwrap().modified().unwrap();
        assert_eq!(before, copied);
        backup.discard().unwrap();
    }

    #[test]
    fn interrupted_copy_leaves_no_backup() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("a.srt");
        let bak = dir.path().join("a.srt.bak");
        fs::write(&original, b"1\n00:00:01,000 --> 00:00:02,000\nhello\n").unwrap();

        let err = BackupHandle::create_with(&original, ".bak", true, |_, dst| {
            dst.write_all(b"1\n00:00")?;
            Err(io::Error::other("disk full"))
        })
        .unwrap_err();

        assert_eq!(err.kind(), "BackupCreationFailed");
        assert!(!bak.exists());
        assert_eq!(
            fs::read(&original).unwrap(),
            b"1\n00:00:01,000 --> 00:00:02,000\nhello\n"
        );
    }

    #[test]
    fn checksum_mismatch_leaves_no_backup() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("a.srt");
        let bak = dir.path().join("a.srt.bak");
        fs::write(&original, b"caf\xe9\n").unwrap();

        let err = BackupHandle::create_with(&original, ".bak", true, |_, dst| {
            dst.write_all(b"cafe\n")
        })
        .unwrap_err();

        assert_eq!(err.kind(), "BackupCreationFailed");
        assert!(err.to_string().contains("checksum mismatch"));
        assert!(!bak.exists());
        assert_eq!(fs::read(&original).unwrap(), b"caf\xe9\n");
    }
}
