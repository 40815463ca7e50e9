// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod codec;
pub mod config;
pub mod error;
pub mod flash;
pub mod store;
pub mod utils;

pub use codec::{CodecOptions, Decode, Encode, Json, JsonDocument};
pub use config::{CodecConfig, Config, LoggingConfig, StorageConfig};
pub use error::{Result, StoreError};
pub use flash::{FileEntry, FlashChip, FlashFilesystem, FsInfo, HostFs, MemoryFs};
pub use store::FlashStore;
pub use utils::Validator;

/// Open a store over the host directory described by `config`.
pub fn open_host_store(config: &Config) -> FlashStore<HostFs> {
    let fs = HostFs::new(config.storage.root.clone(), config.storage.capacity_bytes).with_chip(
        FlashChip::new(
            config.storage.chip_size_bytes,
            config.storage.configured_size_bytes,
        ),
    );
    FlashStore::with_options(fs, config.codec_options())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_library_exports() {
        let _config = Config::default_config();
        let _store = FlashStore::new(MemoryFs::new(1024));
    }

    #[test]
    fn test_open_host_store_from_config() {
        let dir = tempdir().unwrap();
        let mut config = Config::default_config();
        config.storage.root = dir.path().join("flash");

        let mut store = open_host_store(&config);
        assert!(store.check_flash_config());
        store.write("/boot_count", &3u32).unwrap();
        assert_eq!(store.read::<u32>("/boot_count").unwrap(), 3);
    }
}
