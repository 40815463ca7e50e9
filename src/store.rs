// file: src/store.rs
// description: typed read/write facade over a flash filesystem
// reference: whole-file persistence with canonical text encodings

use crate::codec::{CodecOptions, Decode, Encode};
use crate::error::{Result, StoreError};
use crate::flash::{FileEntry, FlashFilesystem, FsInfo};
use crate::utils::Validator;
use std::fmt;
use std::io::Write;
use tracing::{debug, warn};

/// Persists primitive values, strings and JSON documents as whole files.
///
/// Every operation first confirms the flash configuration (chip size at
/// least the configured size, partition mounts, partition not empty). A
/// successful check is remembered; a failed one is retried on the next call.
/// Failures are logged through `tracing` and, when a diagnostic writer is
/// attached, also written to it as `[operation] - message` lines.
pub struct FlashStore<F: FlashFilesystem> {
    fs: F,
    options: CodecOptions,
    flash_config_ok: bool,
    diagnostics: Option<Box<dyn Write + Send>>,
}

impl<F: FlashFilesystem> fmt::Debug for FlashStore<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlashStore")
            .field("options", &self.options)
            .field("flash_config_ok", &self.flash_config_ok)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

impl<F: FlashFilesystem> FlashStore<F> {
    pub fn new(fs: F) -> Self {
        Self::with_options(fs, CodecOptions::default())
    }

    pub fn with_options(fs: F, options: CodecOptions) -> Self {
        Self {
            fs,
            options,
            flash_config_ok: false,
            diagnostics: None,
        }
    }

    /// Send human-readable failure messages to `writer`.
    pub fn with_diagnostics(mut self, writer: impl Write + Send + 'static) -> Self {
        self.diagnostics = Some(Box::new(writer));
        self
    }

    /// Attach or replace the diagnostic writer.
    pub fn set_diagnostics(&mut self, writer: impl Write + Send + 'static) {
        self.diagnostics = Some(Box::new(writer));
    }

    /// Stop writing diagnostics; `tracing` output is unaffected.
    pub fn clear_diagnostics(&mut self) {
        self.diagnostics = None;
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    pub fn filesystem_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    pub fn into_inner(self) -> F {
        self.fs
    }

    fn diagnose(&mut self, operation: &str, message: &str) {
        warn!(operation, "{}", message);
        if let Some(out) = self.diagnostics.as_mut() {
            if let Err(err) = writeln!(out, "[{}] - {}", operation, message) {
                debug!("Failed to write diagnostic: {}", err);
            }
        }
    }

    fn report<T>(&mut self, operation: &str, path: &str, result: Result<T>) -> Result<T> {
        result.map_err(|err| {
            let err = err.at(path);
            // the configuration check reports its own cause
            if !matches!(err, StoreError::FlashConfig(_)) {
                self.diagnose(operation, &err.to_string());
            }
            err
        })
    }

    /// Verify chip and partition sizes. Returns `true` once the
    /// configuration has been found correct; later calls skip the checks.
    pub fn check_flash_config(&mut self) -> bool {
        if self.flash_config_ok {
            return true;
        }

        let chip = self.fs.chip();
        if !chip.is_consistent() {
            self.diagnose(
                "check_flash_config",
                &format!(
                    "Flash chip set to the incorrect size ({} bytes configured), correct size is {}",
                    chip.configured_size, chip.real_size
                ),
            );
            return false;
        }

        if let Err(err) = self.fs.mount() {
            self.diagnose(
                "check_flash_config",
                &format!("Failed to start file system: {}", err),
            );
            return false;
        }

        match self.fs.info() {
            Ok(info) if info.total_bytes != 0 => {
                debug!(
                    "Flash configuration ok: {} of {} bytes used",
                    info.used_bytes, info.total_bytes
                );
                self.flash_config_ok = true;
            }
            Ok(_) => self.diagnose(
                "check_flash_config",
                "File system size was set to 0, select a non-empty partition size",
            ),
            Err(err) => self.diagnose(
                "check_flash_config",
                &format!("Failed to query file system: {}", err),
            ),
        }

        self.flash_config_ok
    }

    fn ready(&mut self) -> Result<()> {
        if !self.check_flash_config() {
            return Err(StoreError::FlashConfig(
                "flash size or partition misconfigured".to_string(),
            ));
        }
        self.fs.mount()
    }

    fn ready_for(&mut self, path: &str) -> Result<()> {
        self.ready()?;
        Validator::validate_flash_path(path)
    }

    fn size_of(&mut self, path: &str) -> Result<usize> {
        self.ready_for(path)?;
        if !self.fs.exists(path) {
            return Err(StoreError::NotFound {
                path: path.to_string(),
            });
        }
        self.fs.size(path)
    }

    /// Size in bytes of the file at `path`.
    pub fn file_size(&mut self, path: &str) -> Result<usize> {
        let result = self.size_of(path);
        self.report("file_size", path, result)
    }

    /// Read from a file already known to hold `size` bytes.
    fn read_sized(
        &mut self,
        path: &str,
        size: usize,
        buf: &mut [u8],
        len: usize,
    ) -> Result<usize> {
        let wanted = if len > 0 && len <= size { len } else { size };
        if buf.len() < wanted {
            return Err(StoreError::BufferTooSmall {
                path: path.to_string(),
                size: wanted,
                capacity: buf.len(),
            });
        }

        let read = self.fs.read(path, &mut buf[..wanted])?;
        if read == 0 {
            return Err(StoreError::EmptyRead {
                path: path.to_string(),
            });
        }
        Ok(read)
    }

    fn read_bytes(&mut self, path: &str, buf: &mut [u8], len: usize) -> Result<usize> {
        let size = self.size_of(path)?;
        self.read_sized(path, size, buf, len)
    }

    /// Copy up to `len` bytes of the file into `buf`; `len == 0` (or a `len`
    /// past the end of the file) means the whole file. Reading nothing is an
    /// error, so an empty file cannot be opened.
    pub fn open_file(&mut self, path: &str, buf: &mut [u8], len: usize) -> Result<usize> {
        let result = self.read_bytes(path, buf, len);
        self.report("open_file", path, result)
    }

    fn write_bytes(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        self.ready_for(path)?;
        let written = self.fs.write(path, bytes)?;
        if written == 0 {
            return Err(StoreError::WriteFailed {
                path: path.to_string(),
            });
        }
        debug!("Saved {} bytes to {}", written, path);
        Ok(())
    }

    /// Replace the file at `path` with `bytes`.
    pub fn save_file(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let result = self.write_bytes(path, bytes);
        self.report("save_file", path, result)
    }

    fn append_bytes(&mut self, path: &str, bytes: &[u8]) -> Result<usize> {
        self.ready_for(path)?;
        if bytes.is_empty() {
            return Err(StoreError::WriteFailed {
                path: path.to_string(),
            });
        }
        let appended = self.fs.append(path, bytes)?;
        if appended == 0 {
            return Err(StoreError::WriteFailed {
                path: path.to_string(),
            });
        }
        debug!("Appended {} bytes to {}", appended, path);
        Ok(appended)
    }

    /// Add `bytes` to the end of the file at `path`, creating it if missing.
    pub fn append_file(&mut self, path: &str, bytes: &[u8]) -> Result<usize> {
        let result = self.append_bytes(path, bytes);
        self.report("append_file", path, result)
    }

    fn contents(&mut self, path: &str) -> Result<Vec<u8>> {
        let size = self.size_of(path)?;
        let mut buf = vec![0u8; size];
        let read = self.read_sized(path, size, &mut buf, size)?;
        buf.truncate(read);
        Ok(buf)
    }

    /// Read the file at `path` and decode it as `T`.
    pub fn read<T: Decode>(&mut self, path: &str) -> Result<T> {
        let options = self.options;
        let result = self
            .contents(path)
            .and_then(|bytes| T::decode(&bytes, &options));
        self.report("read", path, result)
    }

    /// Read the file at `path` into an existing value. On failure `out`
    /// keeps its previous contents.
    pub fn read_into<T: Decode>(&mut self, path: &str, out: &mut T) -> Result<()> {
        let options = self.options;
        let result = self
            .contents(path)
            .and_then(|bytes| out.decode_into(&bytes, &options));
        self.report("read_into", path, result)
    }

    /// Encode `value` with its canonical text form and replace the file at `path`.
    pub fn write<T: Encode + ?Sized>(&mut self, path: &str, value: &T) -> Result<()> {
        let result = value
            .encode(&self.options)
            .and_then(|bytes| self.write_bytes(path, &bytes));
        self.report("write", path, result)
    }

    /// Encode `value` and add it to the end of the file at `path`. No
    /// separator is written between appended values.
    pub fn append<T: Encode + ?Sized>(&mut self, path: &str, value: &T) -> Result<()> {
        let result = value
            .encode(&self.options)
            .and_then(|bytes| self.append_bytes(path, &bytes))
            .map(|_| ());
        self.report("append", path, result)
    }

    pub fn exists(&mut self, path: &str) -> bool {
        self.ready_for(path).is_ok() && self.fs.exists(path)
    }

    pub fn remove(&mut self, path: &str) -> Result<()> {
        let result = self.size_of(path).and_then(|_| self.fs.remove(path));
        self.report("remove", path, result)
    }

    pub fn list(&mut self) -> Result<Vec<FileEntry>> {
        let result = self.ready().and_then(|_| self.fs.list());
        self.report("list", "/", result)
    }

    pub fn info(&mut self) -> Result<FsInfo> {
        let result = self.ready().and_then(|_| self.fs.info());
        self.report("info", "/", result)
    }
}
