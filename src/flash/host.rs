// file: src/flash/host.rs
// description: flash partition emulated by a directory on the host filesystem
// reference: uses walkdir to account for partition usage

use super::{FileEntry, FlashChip, FlashFilesystem, FsInfo};
use crate::error::{Result, StoreError};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct HostFs {
    root: PathBuf,
    capacity: u64,
    chip: FlashChip,
    mounted: bool,
}

impl HostFs {
    pub fn new(root: impl Into<PathBuf>, capacity: u64) -> Self {
        Self {
            root: root.into(),
            capacity,
            chip: FlashChip::new(capacity, capacity),
            mounted: false,
        }
    }

    pub fn with_chip(mut self, chip: FlashChip) -> Self {
        self.chip = chip;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn require_mounted(&self) -> Result<()> {
        if self.mounted {
            Ok(())
        } else {
            Err(StoreError::Mount(format!(
                "{} is not mounted",
                self.root.display()
            )))
        }
    }

    fn used(&self) -> u64 {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum()
    }

    fn not_found_or_io(path: &str, err: std::io::Error) -> StoreError {
        if err.kind() == ErrorKind::NotFound {
            StoreError::NotFound {
                path: path.to_string(),
            }
        } else {
            StoreError::Io(err)
        }
    }
}

impl FlashFilesystem for HostFs {
    fn mount(&mut self) -> Result<()> {
        if self.mounted {
            return Ok(());
        }
        fs::create_dir_all(&self.root).map_err(|e| {
            StoreError::Mount(format!("Failed to create {}: {}", self.root.display(), e))
        })?;
        info!("Mounted host partition at {}", self.root.display());
        self.mounted = true;
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
        self.mounted && self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn size(&self, path: &str) -> Result<usize> {
        self.require_mounted()?;
        let target = self.resolve(path)?;
        let metadata = fs::metadata(&target).map_err(|e| Self::not_found_or_io(path, e))?;
        if !metadata.is_file() {
            return Err(StoreError::OpenFailed {
                path: path.to_string(),
            });
        }
        Ok(metadata.len() as usize)
    }

    fn read(&mut self, path: &str, buf: &mut [u8]) -> Result<usize> {
        self.require_mounted()?;
        let target = self.resolve(path)?;
        let data = fs::read(&target).map_err(|e| Self::not_found_or_io(path, e))?;
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        debug!("Read {} bytes from {}", n, target.display());
        Ok(n)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<usize> {
        self.require_mounted()?;
        let target = self.resolve(path)?;

        let replaced = fs::metadata(&target).map(|m| m.len()).unwrap_or(0);
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

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, data)?;
        debug!("Wrote {} bytes to {}", data.len(), target.display());
        Ok(data.len())
    }

    fn append(&mut self, path: &str, data: &[u8]) -> Result<usize> {
        self.require_mounted()?;
        let target = self.resolve(path)?;

        let available = self.capacity.saturating_sub(self.used());
        if data.len() as u64 > available {
            return Err(StoreError::NoSpace {
                path: path.to_string(),
                needed: data.len(),
                available: available as usize,
            });
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&target)?;
        file.write_all(data)?;
        debug!("Appended {} bytes to {}", data.len(), target.display());
        Ok(data.len())
    }

    fn remove(&mut self, path: &str) -> Result<()> {
        self.require_mounted()?;
        let target = self.resolve(path)?;
        fs::remove_file(&target).map_err(|e| Self::not_found_or_io(path, e))
    }

    fn list(&self) -> Result<Vec<FileEntry>> {
        self.require_mounted()?;
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| StoreError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let size = entry.metadata().map_err(|e| StoreError::Io(e.into()))?.len();
            entries.push(FileEntry {
                path: format!("/{}", name),
                size,
            });
        }
        Ok(entries)
    }
}
