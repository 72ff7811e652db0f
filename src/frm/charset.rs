//! Static character set / collation lookup.
//!
//! `.frm` files reference collations by the server's numeric id. The table
//! below covers the stock collations shipped with MySQL; `maxlen` is the
//! maximum bytes per character, needed to convert stored byte lengths back
//! into character counts.

use crate::error::{Error, Result};

/// MySQL charset number for `binary`.
pub const BINARY_CHARSET: u16 = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    pub id: u16,
    pub name: &'static str,
    pub collation: &'static str,
    pub is_default: bool,
    pub maxlen: u32,
}

/// Sorted by id for binary search.
static CHARSETS: &[Charset] = &[
    Charset { id: 1, name: "big5", collation: "big5_chinese_ci", is_default: true, maxlen: 2 },
    Charset { id: 2, name: "latin2", collation: "latin2_czech_cs", is_default: false, maxlen: 1 },
    Charset { id: 3, name: "dec8", collation: "dec8_swedish_ci", is_default: true, maxlen: 1 },
    Charset { id: 4, name: "cp850", collation: "cp850_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 5, name: "latin1", collation: "latin1_german1_ci", is_default: false, maxlen: 1 },
    Charset { id: 6, name: "hp8", collation: "hp8_english_ci", is_default: true, maxlen: 1 },
    Charset { id: 7, name: "koi8r", collation: "koi8r_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 8, name: "latin1", collation: "latin1_swedish_ci", is_default: true, maxlen: 1 },
    Charset { id: 9, name: "latin2", collation: "latin2_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 10, name: "swe7", collation: "swe7_swedish_ci", is_default: true, maxlen: 1 },
    Charset { id: 11, name: "ascii", collation: "ascii_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 12, name: "ujis", collation: "ujis_japanese_ci", is_default: true, maxlen: 3 },
    Charset { id: 13, name: "sjis", collation: "sjis_japanese_ci", is_default: true, maxlen: 2 },
    Charset { id: 14, name: "cp1251", collation: "cp1251_bulgarian_ci", is_default: false, maxlen: 1 },
    Charset { id: 16, name: "hebrew", collation: "hebrew_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 18, name: "tis620", collation: "tis620_thai_ci", is_default: true, maxlen: 1 },
    Charset { id: 19, name: "euckr", collation: "euckr_korean_ci", is_default: true, maxlen: 2 },
    Charset { id: 22, name: "koi8u", collation: "koi8u_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 24, name: "gb2312", collation: "gb2312_chinese_ci", is_default: true, maxlen: 2 },
    Charset { id: 25, name: "greek", collation: "greek_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 26, name: "cp1250", collation: "cp1250_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 28, name: "gbk", collation: "gbk_chinese_ci", is_default: true, maxlen: 2 },
    Charset { id: 30, name: "latin5", collation: "latin5_turkish_ci", is_default: true, maxlen: 1 },
    Charset { id: 32, name: "armscii8", collation: "armscii8_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 33, name: "utf8", collation: "utf8_general_ci", is_default: true, maxlen: 3 },
    Charset { id: 35, name: "ucs2", collation: "ucs2_general_ci", is_default: true, maxlen: 2 },
    Charset { id: 36, name: "cp866", collation: "cp866_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 37, name: "keybcs2", collation: "keybcs2_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 38, name: "macce", collation: "macce_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 39, name: "macroman", collation: "macroman_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 40, name: "cp852", collation: "cp852_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 41, name: "latin7", collation: "latin7_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 45, name: "utf8mb4", collation: "utf8mb4_general_ci", is_default: true, maxlen: 4 },
    Charset { id: 46, name: "utf8mb4", collation: "utf8mb4_bin", is_default: false, maxlen: 4 },
    Charset { id: 47, name: "latin1", collation: "latin1_bin", is_default: false, maxlen: 1 },
    Charset { id: 48, name: "latin1", collation: "latin1_general_ci", is_default: false, maxlen: 1 },
    Charset { id: 49, name: "latin1", collation: "latin1_general_cs", is_default: false, maxlen: 1 },
    Charset { id: 51, name: "cp1251", collation: "cp1251_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 54, name: "utf16", collation: "utf16_general_ci", is_default: true, maxlen: 4 },
    Charset { id: 56, name: "utf16le", collation: "utf16le_general_ci", is_default: true, maxlen: 4 },
    Charset { id: 57, name: "cp1256", collation: "cp1256_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 59, name: "cp1257", collation: "cp1257_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 60, name: "utf32", collation: "utf32_general_ci", is_default: true, maxlen: 4 },
    Charset { id: 63, name: "binary", collation: "binary", is_default: true, maxlen: 1 },
    Charset { id: 83, name: "utf8", collation: "utf8_bin", is_default: false, maxlen: 3 },
    Charset { id: 84, name: "big5", collation: "big5_bin", is_default: false, maxlen: 2 },
    Charset { id: 86, name: "gb2312", collation: "gb2312_bin", is_default: false, maxlen: 2 },
    Charset { id: 87, name: "gbk", collation: "gbk_bin", is_default: false, maxlen: 2 },
    Charset { id: 90, name: "ucs2", collation: "ucs2_bin", is_default: false, maxlen: 2 },
    Charset { id: 92, name: "geostd8", collation: "geostd8_general_ci", is_default: true, maxlen: 1 },
    Charset { id: 95, name: "cp932", collation: "cp932_japanese_ci", is_default: true, maxlen: 2 },
    Charset { id: 97, name: "eucjpms", collation: "eucjpms_japanese_ci", is_default: true, maxlen: 3 },
    Charset { id: 101, name: "utf16", collation: "utf16_unicode_ci", is_default: false, maxlen: 4 },
    Charset { id: 192, name: "utf8", collation: "utf8_unicode_ci", is_default: false, maxlen: 3 },
    Charset { id: 224, name: "utf8mb4", collation: "utf8mb4_unicode_ci", is_default: false, maxlen: 4 },
    Charset { id: 246, name: "utf8mb4", collation: "utf8mb4_unicode_520_ci", is_default: false, maxlen: 4 },
    Charset { id: 255, name: "utf8mb4", collation: "utf8mb4_0900_ai_ci", is_default: false, maxlen: 4 },
];

/// Resolve a collation id.
pub fn lookup(id: u16) -> Result<&'static Charset> {
    CHARSETS
        .binary_search_by_key(&id, |cs| cs.id)
        .map(|idx| &CHARSETS[idx])
        .map_err(|_| Error::CharsetUnresolved(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_by_id() {
        assert!(CHARSETS.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn ids_round_trip() {
        for cs in CHARSETS {
            assert_eq!(lookup(cs.id).unwrap().id, cs.id);
        }
    }

    #[test]
    fn binary_charset() {
        let cs = lookup(BINARY_CHARSET).unwrap();
        assert_eq!(cs.name, "binary");
        assert!(cs.is_default);
    }

    #[test]
    fn latin1_default_collation() {
        let cs = lookup(8).unwrap();
        assert_eq!(cs.name, "latin1");
        assert_eq!(cs.collation, "latin1_swedish_ci");
        assert!(cs.is_default);
        assert!(!lookup(47).unwrap().is_default);
    }

    #[test]
    fn unknown_id_is_an_error() {
        assert!(matches!(lookup(999), Err(Error::CharsetUnresolved(999))));
    }
}
