// file: src/flash/memory.rs
// description: in-memory flash partition for tests and simulation

use super::{FileEntry, FlashChip, FlashFilesystem, FsInfo};
use crate::error::{Result, StoreError};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MemoryFs {
    files: BTreeMap<String, Vec<u8>>,
    capacity: u64,
    chip: FlashChip,
    mounted: bool,
    mount_fails: bool,
}

impl MemoryFs {
    pub fn new(capacity: u64) -> Self {
        Self {
            files: BTreeMap::new(),
            capacity,
            chip: FlashChip::new(capacity, capacity),
            mounted: false,
            mount_fails: false,
        }
    }

    pub fn with_chip(mut self, chip: FlashChip) -> Self {
        self.chip = chip;
        self
    }

    /// Make every `mount` call fail, as a partition that was never formatted.
    pub fn failing_mount(mut self) -> Self {
        self.mount_fails = true;
        self
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn used(&self) -> u64 {
        self.files.values().map(|f| f.len() as u64).sum()
    }

    fn require_mounted(&self) -> Result<()> {
        if self.mounted {
            Ok(())
        } else {
            Err(StoreError::Mount("partition is not mounted".to_string()))
        }
    }
}

impl FlashFilesystem for MemoryFs {
    fn mount(&mut self) -> Result<()> {
        if self.mount_fails {
            return Err(StoreError::Mount("partition could not be mounted".to_string()));
        }
        if !self.mounted {
            debug!("Mounted in-memory partition ({} bytes)", self.capacity);
            self.mounted = true;
        }
        Ok(())
    }

    fn info(&self) -> Result<FsInfo> {
        self.require_mounted()?;
        Ok(FsInfo {
            total_bytes: self.capacity,
            used_bytes: self.used(),
        })
    }

    fn chip(&self) -> FlashChip {
        self.chip
    }

    fn exists(&self, path: &str) -> bool {
        self.mounted && self.files.contains_key(path)
    }

    fn size(&self, path: &str) -> Result<usize> {
        self.require_mounted()?;
        self.files
            .get(path)
            .map(Vec::len)
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })
    }

    fn read(&mut self, path: &str, buf: &mut [u8]) -> Result<usize> {
        self.require_mounted()?;
        let data = self.files.get(path).ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })?;
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<usize> {
        self.require_mounted()?;
        let replaced = self.files.get(path).map_or(0, |f| f.len() as u64);
        let available = self
            .capacity
            .saturating_sub(self.used().saturating_sub(replaced));
        if data.len() as u64 > available {
            return Err(StoreError::NoSpace {
                path: path.to_string(),
                needed: data.len(),
                available: available as usize,
            });
        }
        self.files.insert(path.to_string(), data.to_vec());
        Ok(data.len())
    }

    fn append(&mut self, path: &str, data: &[u8]) -> Result<usize> {
        self.require_mounted()?;
        let available = self.capacity.saturating_sub(self.used());
        if data.len() as u64 > available {
            return Err(StoreError::NoSpace {
                path: path.to_string(),
                needed: data.len(),
                available: available as usize,
            });
        }
        self.files
            .entry(path.to_string())
            .or_default()
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn remove(&mut self, path: &str) -> Result<()> {
        self.require_mounted()?;
        self.files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })
    }

    fn list(&self) -> Result<Vec<FileEntry>> {
        self.require_mounted()?;
        Ok(self
            .files
            .iter()
            .map(|(path, data)| FileEntry {
                path: path.clone(),
                size: data.len() as u64,
            })
            .collect())
    }
}
