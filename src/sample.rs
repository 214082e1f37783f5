use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct SamplePayload {
    pub bytes: Vec<u8>,
    pub lines: usize,
    pub reached_eof: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleStats {
    pub path: String,
    pub file_bytes: u64,
    pub sampled_lines: usize,
    pub sampled_bytes: usize,
    pub reached_eof: bool,
}

/// Size of `path`, refusing missing paths, directories and files over `limit`.
pub fn check_input(path: &Path, limit: u64) -> Result<u64> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if !meta.is_file() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let size = meta.len();
    if size > limit {
        return Err(Error::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        });
    }
    Ok(size)
}

pub fn read_sample(
    path: &Path,
    file_bytes: u64,
    max_lines: usize,
    max_bytes: u64,
) -> Result<SamplePayload> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let mut reader = BufReader::new(file).take(max_bytes);

    let mut bytes = Vec::new();
    let mut lines = 0;
    while lines < max_lines.max(1) {
        let n = reader.read_until(b'\n', &mut bytes).map_err(io_err)?;
        if n == 0 {
            break;
        }
        lines += 1;
    }

    Ok(SamplePayload {
        reached_eof: bytes.len() as u64 >= file_bytes,
        bytes,
        lines,
    })
}
