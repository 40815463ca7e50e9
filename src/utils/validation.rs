// file: src/utils/validation.rs
// description: flash path validation utilities and helpers
// reference: input validation patterns

use crate::error::{Result, StoreError};

/// SPIFFS object names are limited to 32 bytes including the terminator.
pub const MAX_PATH_LEN: usize = 31;

pub struct Validator;

impl Validator {
    pub fn validate_flash_path(path: &str) -> Result<()> {
        if path.is_empty() {
            return Err(StoreError::InvalidPath("Path is empty".to_string()));
        }

        if !path.starts_with('/') {
            return Err(StoreError::InvalidPath(format!(
                "Path must be absolute: {}",
                path
            )));
        }

        if path.len() > MAX_PATH_LEN {
            return Err(StoreError::InvalidPath(format!(
                "Path longer than {} bytes: {}",
                MAX_PATH_LEN, path
            )));
        }

        if path.contains('\0') {
            return Err(StoreError::InvalidPath(
                "Path contains a NUL byte".to_string(),
            ));
        }

        if path.ends_with('/') {
            return Err(StoreError::InvalidPath(format!(
                "Path names a directory: {}",
                path
            )));
        }

        if path.split('/').any(|segment| segment == ".." || segment == ".") {
            return Err(StoreError::InvalidPath(format!(
                "Path traversal detected: {}",
                path
            )));
        }

        Ok(())
    }

    pub fn sanitize_flash_path(path: &str) -> String {
        let mut cleaned = path.trim().replace('\\', "/");
        while cleaned.contains("//") {
            cleaned = cleaned.replace("//", "/");
        }
        if cleaned.starts_with('/') {
            cleaned
        } else {
            format!("/{}", cleaned)
        }
    }

    pub fn truncate_text(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            text.to_string()
        } else {
            let head: String = text.chars().take(max_length).collect();
            format!("{}...", head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_flash_path() {
        assert!(Validator::validate_flash_path("/config.json").is_ok());
        assert!(Validator::validate_flash_path("/cfg/wifi.txt").is_ok());
        assert!(Validator::validate_flash_path("").is_err());
        assert!(Validator::validate_flash_path("relative.txt").is_err());
        assert!(Validator::validate_flash_path("/dir/").is_err());
        assert!(Validator::validate_flash_path("/a\0b").is_err());
    }

    #[test]
    fn test_validate_rejects_traversal() {
        assert!(Validator::validate_flash_path("/../etc/passwd").is_err());
        assert!(Validator::validate_flash_path("/a/./b").is_err());
    }

    #[test]
    fn test_validate_length_limit() {
        let ok = format!("/{}", "a".repeat(MAX_PATH_LEN - 1));
        let too_long = format!("/{}", "a".repeat(MAX_PATH_LEN));
        assert!(Validator::validate_flash_path(&ok).is_ok());
        assert!(Validator::validate_flash_path(&too_long).is_err());
    }

    #[test]
    fn test_sanitize_flash_path() {
        assert_eq!(
            Validator::sanitize_flash_path("path\\to\\file"),
            "/path/to/file"
        );
        assert_eq!(
            Validator::sanitize_flash_path("//path///to//file"),
            "/path/to/file"
        );
        assert_eq!(Validator::sanitize_flash_path("  /value.txt  "), "/value.txt");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(
            Validator::truncate_text("this is a very long text", 10),
            "this is a ..."
        );
    }
}
