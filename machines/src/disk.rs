//! 8" single-sided single-density disk images (IBM 3740 layout).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MachineError, Result};

pub const TRACKS: usize = 77;
pub const SECTORS_PER_TRACK: usize = 26;
pub const SECTOR_SIZE: usize = 128;
pub const DISK_SIZE: usize = TRACKS * SECTORS_PER_TRACK * SECTOR_SIZE;

/// Fill byte of a freshly formatted disk (empty directory entries).
pub const FORMAT_BYTE: u8 = 0xE5;

/// A whole disk held in memory. File-backed disks are written back by
/// [`Disk::flush`] once something changed.
#[derive(Debug, Clone)]
pub struct Disk {
    data: Vec<u8>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl Disk {
    /// A formatted disk with no backing file.
    pub fn blank() -> Self {
        Self {
            data: vec![FORMAT_BYTE; DISK_SIZE],
            path: None,
            dirty: false,
        }
    }

    /// Disk from an in-memory image; short images are padded as formatted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > DISK_SIZE {
            return Err(MachineError::DiskGeometry {
                path: PathBuf::from("<memory>"),
                len: bytes.len() as u64,
                expected: DISK_SIZE,
            });
        }
        let mut disk = Self::blank();
        disk.data[..bytes.len()].copy_from_slice(bytes);
        Ok(disk)
    }

    /// Open an image file. A missing file starts out formatted and is
    /// created on the first flush.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut disk = if path.exists() {
            let bytes = fs::read(path).map_err(|e| MachineError::io(path, e))?;
            Self::from_bytes(&bytes).map_err(|_| MachineError::DiskGeometry {
                path: path.to_path_buf(),
                len: bytes.len() as u64,
                expected: DISK_SIZE,
            })?
        } else {
            log::info!("{} does not exist, starting with a formatted disk", path.display());
            let mut disk = Self::blank();
            disk.dirty = true;
            disk
        };
        disk.path = Some(path.to_path_buf());
        Ok(disk)
    }

    /// Byte offset of a sector. Tracks count from 0, sectors from 1.
    fn offset(track: u16, sector: u16) -> Option<usize> {
        let (track, sector) = (track as usize, sector as usize);
        if track >= TRACKS || sector == 0 || sector > SECTORS_PER_TRACK {
            return None;
        }
        Some((track * SECTORS_PER_TRACK + sector - 1) * SECTOR_SIZE)
    }

    pub fn read_sector(&self, track: u16, sector: u16) -> Option<&[u8]> {
        let start = Self::offset(track, sector)?;
        Some(&self.data[start..start + SECTOR_SIZE])
    }

    /// Returns false when the address is outside the geometry.
    pub fn write_sector(&mut self, track: u16, sector: u16, data: &[u8; SECTOR_SIZE]) -> bool {
        let Some(start) = Self::offset(track, sector) else {
            return false;
        };
        self.data[start..start + SECTOR_SIZE].copy_from_slice(data);
        self.dirty = true;
        true
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Write a modified file-backed disk back to its image.
    pub fn flush(&mut self) -> Result<()> {
        if let (Some(path), true) = (&self.path, self.dirty) {
            fs::write(path, &self.data).map_err(|e| MachineError::io(path, e))?;
            log::debug!("flushed {}", path.display());
            self.dirty = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry() {
        assert_eq!(DISK_SIZE, 256_256);
        let disk = Disk::blank();
        assert!(disk.read_sector(0, 1).is_some());
        assert!(disk.read_sector(76, 26).is_some());
        assert!(disk.read_sector(0, 0).is_none(), "sectors count from 1");
        assert!(disk.read_sector(0, 27).is_none());
        assert!(disk.read_sector(77, 1).is_none());
    }

    #[test]
    fn test_sector_roundtrip() {
        let mut disk = Disk::blank();
        let mut data = [0u8; SECTOR_SIZE];
        data[0] = 0x42;
        data[127] = 0x24;
        assert!(disk.write_sector(2, 5, &data));
        assert_eq!(disk.read_sector(2, 5), Some(&data[..]));
        assert_eq!(disk.read_sector(2, 4).map(|s| s[0]), Some(FORMAT_BYTE));
        assert!(!disk.write_sector(80, 1, &data));
    }

    #[test]
    fn test_from_bytes_pads_and_rejects_oversize() {
        let disk = Disk::from_bytes(&[1, 2, 3]).unwrap();
        assert_eq!(&disk.as_bytes()[..4], &[1, 2, 3, FORMAT_BYTE]);
        assert!(matches!(
            Disk::from_bytes(&vec![0; DISK_SIZE + 1]),
            Err(MachineError::DiskGeometry { .. })
        ));
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("cpm80_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_file_backed_flush() {
        let dir = scratch_dir("disk_flush");
        let path = dir.join("a.dsk");

        let mut disk = Disk::open(&path).unwrap();
        let data = [0x55u8; SECTOR_SIZE];
        disk.write_sector(0, 1, &data);
        disk.flush().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), DISK_SIZE);
        assert_eq!(bytes[0], 0x55);

        let reopened = Disk::open(&path).unwrap();
        assert_eq!(reopened.read_sector(0, 1), Some(&data[..]));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_open_rejects_oversize_file() {
        let dir = scratch_dir("disk_oversize");
        let path = dir.join("big.dsk");
        std::fs::write(&path, vec![0u8; DISK_SIZE + 128]).unwrap();
        match Disk::open(&path) {
            Err(MachineError::DiskGeometry { path: p, len, .. }) => {
                assert_eq!(p, path);
                assert_eq!(len, (DISK_SIZE + 128) as u64);
            }
            other => panic!("expected geometry error, got {other:?}"),
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
