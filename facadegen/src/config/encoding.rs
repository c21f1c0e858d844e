//! Source file encodings supported for reading and writing facades

use std::fmt;
use std::str::FromStr;

use crate::error::CodegenError;

/// Character encoding of facade source files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceEncoding {
    #[default]
    Utf8,
    /// Big-endian with a byte order mark; either byte order is read
    Utf16,
    Utf16Le,
    Utf16Be,
    /// ISO-8859-1
    Latin1,
    Ascii,
}

impl SourceEncoding {
    /// Canonical name, as printed in logs
    pub fn name(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "UTF-8",
            SourceEncoding::Utf16 => "UTF-16",
            SourceEncoding::Utf16Le => "UTF-16LE",
            SourceEncoding::Utf16Be => "UTF-16BE",
            SourceEncoding::Latin1 => "ISO-8859-1",
            SourceEncoding::Ascii => "US-ASCII",
        }
    }

    /// Encode source text into bytes
    pub fn encode(&self, text: &str) -> std::result::Result<Vec<u8>, String> {
        match self {
            SourceEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            SourceEncoding::Utf16 => Ok(BOM_BE
                .into_iter()
                .chain(text.encode_utf16().flat_map(u16::to_be_bytes))
                .collect()),
            SourceEncoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            SourceEncoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            SourceEncoding::Latin1 => narrow(text, 0xFF),
            SourceEncoding::Ascii => narrow(text, 0x7F),
        }
    }

    /// Decode bytes into source text
    pub fn decode(&self, bytes: &[u8]) -> std::result::Result<String, String> {
        match self {
            SourceEncoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string()),
            SourceEncoding::Utf16 => match bytes {
                [0xFF, 0xFE, rest @ ..] => widen_utf16(rest, u16::from_le_bytes),
                [0xFE, 0xFF, rest @ ..] => widen_utf16(rest, u16::from_be_bytes),
                _ => widen_utf16(bytes, u16::from_be_bytes),
            },
            SourceEncoding::Utf16Le => widen_utf16(bytes, u16::from_le_bytes),
            SourceEncoding::Utf16Be => widen_utf16(bytes, u16::from_be_bytes),
            SourceEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            SourceEncoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(format!("non-ASCII byte at offset {}", pos)),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
        }
    }
}

const BOM_BE: [u8; 2] = [0xFE, 0xFF];

fn narrow(text: &str, max: u32) -> std::result::Result<Vec<u8>, String> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= max {
                Ok(code as u8)
            } else {
                Err(format!("character {:?} is not representable", c))
            }
        })
        .collect()
}

fn widen_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> std::result::Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err("odd number of bytes for UTF-16 content".to_string());
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| e.to_string())
}

impl FromStr for SourceEncoding {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "" | "utf8" => Ok(SourceEncoding::Utf8),
            "utf16le" => Ok(SourceEncoding::Utf16Le),
            "utf16" => Ok(SourceEncoding::Utf16),
            "utf16be" => Ok(SourceEncoding::Utf16Be),
            "iso88591" | "latin1" => Ok(SourceEncoding::Latin1),
            "ascii" | "usascii" => Ok(SourceEncoding::Ascii),
            _ => Err(CodegenError::ConfigError(format!(
                "Unsupported source encoding: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("UTF-8".parse::<SourceEncoding>().unwrap(), SourceEncoding::Utf8);
        assert_eq!("utf8".parse::<SourceEncoding>().unwrap(), SourceEncoding::Utf8);
        assert_eq!("".parse::<SourceEncoding>().unwrap(), SourceEncoding::Utf8);
        assert_eq!("ISO-8859-1".parse::<SourceEncoding>().unwrap(), SourceEncoding::Latin1);
        assert_eq!("UTF-16LE".parse::<SourceEncoding>().unwrap(), SourceEncoding::Utf16Le);
        assert!("Shift_JIS".parse::<SourceEncoding>().is_err());
    }

    #[test]
    fn test_latin1() {
        let bytes = SourceEncoding::Latin1.encode("café").unwrap();
        assert_eq!(bytes, vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(SourceEncoding::Latin1.decode(&bytes).unwrap(), "café");
        assert!(SourceEncoding::Latin1.encode("日本").is_err());
    }

    #[test]
    fn test_utf16() {
        let bytes = SourceEncoding::Utf16Le.encode("ab").unwrap();
        assert_eq!(bytes, vec![b'a', 0, b'b', 0]);
        assert_eq!(SourceEncoding::Utf16Le.decode(&bytes).unwrap(), "ab");
        assert!(SourceEncoding::Utf16Be.decode(&[0]).is_err());
    }

    #[test]
    fn test_utf16_with_byte_order_mark() {
        assert_eq!("UTF-16".parse::<SourceEncoding>().unwrap(), SourceEncoding::Utf16);
        assert_eq!("utf-16be".parse::<SourceEncoding>().unwrap(), SourceEncoding::Utf16Be);

        let bytes = SourceEncoding::Utf16.encode("ab").unwrap();
        assert_eq!(bytes, vec![0xFE, 0xFF, 0, b'a', 0, b'b']);
        assert_eq!(SourceEncoding::Utf16.decode(&bytes).unwrap(), "ab");

        // little-endian files and files without a mark are read too
        assert_eq!(SourceEncoding::Utf16.decode(&[0xFF, 0xFE, b'a', 0]).unwrap(), "a");
        assert_eq!(SourceEncoding::Utf16.decode(&[0, b'a']).unwrap(), "a");
        assert_eq!(SourceEncoding::Utf16.decode(&[]).unwrap(), "");
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        assert!(SourceEncoding::Ascii.decode(&[b'a', 0xE9]).is_err());
        assert!(SourceEncoding::Ascii.encode("é").is_err());
    }
}
