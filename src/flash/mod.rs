// file: src/flash/mod.rs
// description: flash filesystem boundary and backend exports
// reference: internal module structure

pub mod host;
pub mod memory;

pub use host::HostFs;
pub use memory::MemoryFs;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Usage figures of a mounted partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsInfo {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

impl FsInfo {
    pub fn free_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.used_bytes)
    }
}

/// Flash chip sizes: what the hardware reports versus what the build
/// was configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashChip {
    pub real_size: u64,
    pub configured_size: u64,
}

impl FlashChip {
    pub fn new(real_size: u64, configured_size: u64) -> Self {
        Self {
            real_size,
            configured_size,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.real_size >= self.configured_size
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub size: u64,
}

/// Whole-file access to a flash partition. Paths are absolute, `/`-separated
/// names; reads always start at offset 0 and writes replace the file.
pub trait FlashFilesystem {
    /// Mount the partition. Calling it on a mounted partition is a no-op.
    fn mount(&mut self) -> Result<()>;

    fn info(&self) -> Result<FsInfo>;

    fn chip(&self) -> FlashChip;

    fn exists(&self, path: &str) -> bool;

    fn size(&self, path: &str) -> Result<usize>;

    /// Fill `buf` from the start of the file, returning the bytes copied.
    fn read(&mut self, path: &str, buf: &mut [u8]) -> Result<usize>;

    /// Create or truncate the file and store `data`, returning the bytes written.
    fn write(&mut self, path: &str, data: &[u8]) -> Result<usize>;

    /// Add `data` to the end of the file, creating it when missing.
    fn append(&mut self, path: &str, data: &[u8]) -> Result<usize>;

    fn remove(&mut self, path: &str) -> Result<()>;

    fn list(&self) -> Result<Vec<FileEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_consistency() {
        assert!(FlashChip::new(4096, 4096).is_consistent());
        assert!(FlashChip::new(8192, 4096).is_consistent());
        assert!(!FlashChip::new(1024, 4096).is_consistent());
    }

    #[test]
    fn test_free_bytes_never_underflows() {
        let info = FsInfo {
            total_bytes: 10,
            used_bytes: 12,
        };
        assert_eq!(info.free_bytes(), 0);
    }
}
