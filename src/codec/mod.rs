// file: src/codec/mod.rs
// description: canonical text encodings for persisted values
// reference: internal module structure

pub mod json;
pub mod number;

pub use json::{Json, JsonDocument};

use crate::error::{Result, StoreError};
use std::ffi::{CStr, CString};

/// Default number of significant digits written for floating point values.
pub const DEFAULT_FLOAT_PRECISION: usize = 15;

/// Default size of the bounded buffer C-string reads go through.
pub const DEFAULT_CHAR_BUFFER_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Significant digits for floats; `None` writes shortest round-trip text.
    pub float_precision: Option<usize>,
    /// C-string reads require the file to be strictly smaller than this.
    pub char_buffer_size: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            float_precision: Some(DEFAULT_FLOAT_PRECISION),
            char_buffer_size: DEFAULT_CHAR_BUFFER_SIZE,
        }
    }
}

/// A value that can be written to a file as its canonical text.
pub trait Encode {
    fn encode(&self, options: &CodecOptions) -> Result<Vec<u8>>;
}

/// A value that can be rebuilt from the contents of a file.
pub trait Decode: Sized {
    fn decode(bytes: &[u8], options: &CodecOptions) -> Result<Self>;

    /// Decode into an existing value. Types that carry settings on the
    /// receiving side (such as a document capacity) override this.
    fn decode_into(&mut self, bytes: &[u8], options: &CodecOptions) -> Result<()> {
        *self = Self::decode(bytes, options)?;
        Ok(())
    }
}

/// Contents up to the first NUL, as a fixed C buffer would hold them.
fn until_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

impl Encode for bool {
    fn encode(&self, _options: &CodecOptions) -> Result<Vec<u8>> {
        Ok(if *self { b"1".to_vec() } else { b"0".to_vec() })
    }
}

impl Decode for bool {
    fn decode(bytes: &[u8], _options: &CodecOptions) -> Result<Self> {
        Ok(number::scan_integer(bytes) != 0)
    }
}

macro_rules! impl_integer {
    ($($t:ty),*) => {$(
        impl Encode for $t {
            fn encode(&self, _options: &CodecOptions) -> Result<Vec<u8>> {
                Ok(self.to_string().into_bytes())
            }
        }

        impl Decode for $t {
            fn decode(bytes: &[u8], _options: &CodecOptions) -> Result<Self> {
                let scanned = number::scan_integer(bytes);
                Ok(<$t>::try_from(scanned).unwrap_or(if scanned < 0 {
                    <$t>::MIN
                } else {
                    <$t>::MAX
                }))
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Encode for f64 {
    fn encode(&self, options: &CodecOptions) -> Result<Vec<u8>> {
        let text = match options.float_precision {
            Some(precision) => number::format_general(*self, precision),
            None => number::format_shortest(*self),
        };
        Ok(text.into_bytes())
    }
}

impl Decode for f64 {
    fn decode(bytes: &[u8], _options: &CodecOptions) -> Result<Self> {
        Ok(number::scan_float(bytes))
    }
}

impl Encode for f32 {
    fn encode(&self, options: &CodecOptions) -> Result<Vec<u8>> {
        let text = match options.float_precision {
            Some(precision) => number::format_general(f64::from(*self), precision),
            None => number::format_shortest_f32(*self),
        };
        Ok(text.into_bytes())
    }
}

impl Decode for f32 {
    fn decode(bytes: &[u8], _options: &CodecOptions) -> Result<Self> {
        Ok(number::scan_float(bytes) as f32)
    }
}

impl Encode for str {
    fn encode(&self, _options: &CodecOptions) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }
}

impl Encode for String {
    fn encode(&self, options: &CodecOptions) -> Result<Vec<u8>> {
        self.as_str().encode(options)
    }
}

impl Decode for String {
    fn decode(bytes: &[u8], _options: &CodecOptions) -> Result<Self> {
        std::str::from_utf8(until_nul(bytes))
            .map(str::to_owned)
            .map_err(|_| StoreError::Utf8 {
                path: String::new(),
            })
    }
}

impl Encode for CStr {
    fn encode(&self, _options: &CodecOptions) -> Result<Vec<u8>> {
        Ok(self.to_bytes().to_vec())
    }
}

impl Encode for CString {
    fn encode(&self, options: &CodecOptions) -> Result<Vec<u8>> {
        self.as_c_str().encode(options)
    }
}

impl Decode for CString {
    fn decode(bytes: &[u8], options: &CodecOptions) -> Result<Self> {
        if bytes.len() >= options.char_buffer_size {
            return Err(StoreError::BufferTooSmall {
                path: String::new(),
                size: bytes.len(),
                capacity: options.char_buffer_size,
            });
        }
        let text = CString::new(until_nul(bytes).to_vec()).map_err(std::io::Error::from)?;
        Ok(text)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, options: &CodecOptions) -> Result<Vec<u8>> {
        (**self).encode(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: Encode + ?Sized>(value: &T) -> String {
        String::from_utf8(value.encode(&CodecOptions::default()).unwrap()).unwrap()
    }

    fn decode<T: Decode>(text: &str) -> T {
        T::decode(text.as_bytes(), &CodecOptions::default()).unwrap()
    }

    #[test]
    fn test_bool_encoding() {
        assert_eq!(encode(&true), "1");
        assert_eq!(encode(&false), "0");
        assert!(decode::<bool>("1"));
        assert!(decode::<bool>("-3"));
        assert!(!decode::<bool>("0"));
        assert!(!decode::<bool>("true"));
    }

    #[test]
    fn test_signed_integers() {
        assert_eq!(encode(&-123i32), "-123");
        assert_eq!(decode::<i32>("-123"), -123);
        assert_eq!(decode::<i64>(&i64::MIN.to_string()), i64::MIN);
        assert_eq!(decode::<i8>("200"), i8::MAX);
        assert_eq!(decode::<i16>("-40000"), i16::MIN);
        assert_eq!(decode::<isize>("12 apples"), 12);
    }

    #[test]
    fn test_unsigned_integers() {
        assert_eq!(encode(&u64::MAX), "18446744073709551615");
        assert_eq!(decode::<u64>("18446744073709551615"), u64::MAX);
        assert_eq!(decode::<u8>("99999"), u8::MAX);
        assert_eq!(decode::<u32>("-5"), 0);
        assert_eq!(decode::<usize>(""), 0);
    }

    #[test]
    fn test_float_precision_option() {
        assert_eq!(encode(&0.1f64), "0.1");
        assert_eq!(encode(&1e20f64), "1e+20");
        let shortest = CodecOptions {
            float_precision: None,
            ..CodecOptions::default()
        };
        let bytes = 0.1f32.encode(&shortest).unwrap();
        assert_eq!(bytes, b"0.1");
        assert_eq!(f32::decode(&bytes, &shortest).unwrap(), 0.1f32);
    }

    #[test]
    fn test_float_decoding() {
        assert_eq!(decode::<f64>("2.5"), 2.5);
        assert_eq!(decode::<f32>("0.100000001490116"), 0.1f32);
        assert_eq!(decode::<f64>("junk"), 0.0);
    }

    #[test]
    fn test_strings_stop_at_nul() {
        assert_eq!(encode("hello"), "hello");
        assert_eq!(encode(&"owned".to_string()), "owned");
        assert_eq!(
            String::decode(b"abc\0def", &CodecOptions::default()).unwrap(),
            "abc"
        );
        assert!(matches!(
            String::decode(&[0xff, 0xfe], &CodecOptions::default()),
            Err(StoreError::Utf8 { .. })
        ));
    }

    #[test]
    fn test_cstring_buffer_bound() {
        let options = CodecOptions {
            char_buffer_size: 8,
            ..CodecOptions::default()
        };
        let text = CString::decode(b"1234567", &options).unwrap();
        assert_eq!(text.as_bytes(), b"1234567");

        let err = CString::decode(b"12345678", &options).unwrap_err();
        assert!(matches!(
            err,
            StoreError::BufferTooSmall {
                size: 8,
                capacity: 8,
                ..
            }
        ));

        let value = CString::new("abc").unwrap();
        assert_eq!(encode(&value), "abc");
        assert_eq!(encode(value.as_c_str()), "abc");
    }

    #[test]
    fn test_decode_into_replaces_value() {
        let mut value = 5i32;
        value
            .decode_into(b"17", &CodecOptions::default())
            .unwrap();
        assert_eq!(value, 17);
    }
}
