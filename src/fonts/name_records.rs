//! `name` table record decoding.
//!
//! Name strings are stored in a platform/encoding specific byte format.
//! Unicode records are UTF-16BE; legacy Windows and Mac records go through
//! `encoding_rs` code pages. Encodings without a decoder are skipped.

use std::borrow::Cow;

use encoding_rs::{Encoding, BIG5, EUC_KR, GBK, MACINTOSH, SHIFT_JIS, UTF_8, X_MAC_CYRILLIC};

/// Platform ids from the OpenType `name` table.
pub mod platform {
    pub const UNICODE: u16 = 0;
    pub const MACINTOSH: u16 = 1;
    pub const ISO: u16 = 2;
    pub const WINDOWS: u16 = 3;
}

/// Name ids used by the catalog.
pub mod name_id {
    pub const FAMILY: u16 = 1;
    pub const SUBFAMILY: u16 = 2;
    pub const POST_SCRIPT_NAME: u16 = 6;
}

/// One raw record of a `name` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRecord<'a> {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub bytes: &'a [u8],
}

impl NameRecord<'_> {
    /// Decode the record to a string, if its encoding is supported.
    pub fn decode(&self) -> Option<String> {
        match (self.platform_id, self.encoding_id) {
            (platform::UNICODE, _) | (platform::WINDOWS, 0 | 1) => {
                Some(decode_utf16_be(self.bytes))
            },
            (platform::WINDOWS, encoding @ 2..=6) => {
                let Some(codepage) = windows_codepage(encoding) else {
                    log::debug!("Unsupported Windows encoding {} in name record", encoding);
                    return None;
                };
                decode_bytes(codepage, &unpack_double_byte(self.bytes))
            },
            (platform::MACINTOSH, encoding) => match mac_codepage(encoding) {
                Some(codepage) => decode_bytes(codepage, self.bytes),
                None if self.bytes.starts_with(b"Khmer OS") => decode_bytes(UTF_8, self.bytes),
                None => {
                    log::debug!("Unimplemented Mac encoding {} in name record", encoding);
                    None
                },
            },
            _ => None,
        }
    }
}

/// Legacy CJK code pages of Windows encodings 2..=5. Johab (6) has no
/// decoder.
fn windows_codepage(encoding_id: u16) -> Option<&'static Encoding> {
    match encoding_id {
        2 => Some(SHIFT_JIS),
        3 => Some(GBK),
        4 => Some(BIG5),
        5 => Some(EUC_KR),
        _ => None,
    }
}

/// Code pages for the Mac script codes that have a decoder.
fn mac_codepage(encoding_id: u16) -> Option<&'static Encoding> {
    match encoding_id {
        0 => Some(MACINTOSH),
        1 => Some(SHIFT_JIS),
        2 => Some(BIG5),
        3 => Some(EUC_KR),
        7 => Some(X_MAC_CYRILLIC),
        25 => Some(GBK),
        // uninterpreted
        32 => Some(UTF_8),
        _ => None,
    }
}

fn decode_bytes(codepage: &'static Encoding, bytes: &[u8]) -> Option<String> {
    codepage
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

fn decode_utf16_be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Windows records in the legacy CJK encodings store a byte string packed
/// into 16-bit units. Some fonts put one byte per unit (leaving zero bytes),
/// others two; dropping the zero bytes recovers the byte string either way.
fn unpack_double_byte(bytes: &[u8]) -> Vec<u8> {
    bytes
        .chunks_exact(2)
        .flat_map(|pair| [pair[0], pair[1]])
        .filter(|&b| b != 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(platform_id: u16, encoding_id: u16, bytes: &[u8]) -> NameRecord<'_> {
        NameRecord {
            platform_id,
            encoding_id,
            language_id: 0,
            name_id: name_id::FAMILY,
            bytes,
        }
    }

    #[test]
    fn test_windows_unicode() {
        let bytes = [0x00, b'F', 0x00, b'o', 0x00, b'o'];
        assert_eq!(record(platform::WINDOWS, 1, &bytes).decode().as_deref(), Some("Foo"));
        assert_eq!(record(platform::UNICODE, 3, &bytes).decode().as_deref(), Some("Foo"));
    }

    #[test]
    fn test_mac_roman() {
        let bytes = [b'C', b'a', b'f', 0x8E];
        assert_eq!(record(platform::MACINTOSH, 0, &bytes).decode().as_deref(), Some("Café"));
    }

    #[test]
    fn test_mac_roman_high_half() {
        let bytes = [0x80, 0xD0, 0xDB, 0xFF];
        assert_eq!(record(platform::MACINTOSH, 0, &bytes).decode().as_deref(), Some("Ä–€ˇ"));
    }

    #[test]
    fn test_mac_uninterpreted_is_utf8() {
        let bytes = "Ünï".as_bytes();
        assert_eq!(record(platform::MACINTOSH, 32, bytes).decode().as_deref(), Some("Ünï"));
    }

    #[test]
    fn test_mac_khmer_os_override() {
        assert_eq!(
            record(platform::MACINTOSH, 20, b"Khmer OS System").decode().as_deref(),
            Some("Khmer OS System")
        );
        assert_eq!(record(platform::MACINTOSH, 20, b"Other").decode(), None);
    }

    #[test]
    fn test_packed_double_byte_drops_zero_bytes() {
        // one byte per unit
        let sparse = [0x00, b'A', 0x00, b'B'];
        assert_eq!(record(platform::WINDOWS, 3, &sparse).decode().as_deref(), Some("AB"));
        // two bytes per unit
        let dense = [b'A', b'B', b'C', 0x00];
        assert_eq!(record(platform::WINDOWS, 5, &dense).decode().as_deref(), Some("ABC"));
    }

    #[test]
    fn test_windows_shift_jis() {
        // "明朝", packed two bytes per unit and one byte per unit
        let dense = [0x96, 0xBE, 0x92, 0xA9];
        let sparse = [0x00, 0x96, 0x00, 0xBE, 0x00, 0x92, 0x00, 0xA9];
        assert_eq!(record(platform::WINDOWS, 2, &dense).decode().as_deref(), Some("明朝"));
        assert_eq!(record(platform::WINDOWS, 2, &sparse).decode().as_deref(), Some("明朝"));
    }

    #[test]
    fn test_windows_big5() {
        // "細明體"
        let bytes = [0xB2, 0xD3, 0xA9, 0xFA, 0xC5, 0xE9];
        assert_eq!(record(platform::WINDOWS, 4, &bytes).decode().as_deref(), Some("細明體"));
    }

    #[test]
    fn test_mac_japanese() {
        let bytes = [0x96, 0xBE, 0x92, 0xA9];
        assert_eq!(record(platform::MACINTOSH, 1, &bytes).decode().as_deref(), Some("明朝"));
    }

    #[test]
    fn test_mac_cyrillic() {
        // "Шрифт"
        let bytes = [0x98, 0xF0, 0xE8, 0xF4, 0xF2];
        assert_eq!(record(platform::MACINTOSH, 7, &bytes).decode().as_deref(), Some("Шрифт"));
    }

    #[test]
    fn test_malformed_legacy_bytes_are_skipped() {
        // lone Shift_JIS lead byte
        assert_eq!(record(platform::MACINTOSH, 1, &[0x41, 0x96]).decode(), None);
    }

    #[test]
    fn test_unsupported_platform() {
        assert_eq!(record(platform::ISO, 0, b"x").decode(), None);
        assert_eq!(record(platform::WINDOWS, 10, b"\0x").decode(), None);
        // Johab and Mac Greek have no decoder
        assert_eq!(record(platform::WINDOWS, 6, b"\0x").decode(), None);
        assert_eq!(record(platform::MACINTOSH, 6, b"x").decode(), None);
    }
}
