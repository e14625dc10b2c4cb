use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MachineError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image of {len} bytes does not fit at {addr:04X}h (limit {limit:04X}h)")]
    ImageTooLarge { addr: u16, len: usize, limit: u16 },
    #[error("disk image {path} is {len} bytes, expected at most {expected}")]
    DiskGeometry {
        path: PathBuf,
        len: u64,
        expected: usize,
    },
    #[error("no drive {0}: only A-D exist")]
    NoSuchDrive(usize),
}

pub type Result<T> = std::result::Result<T, MachineError>;

impl MachineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
