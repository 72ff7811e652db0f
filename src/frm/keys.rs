//! Index definitions packed into the keyinfo section.
//!
//! Layout: a 6-byte header (key and part counts, with a 2-byte count
//! escape), one 8-byte record per key followed by 9-byte records for its
//! parts, then the key names as a `0xFF`-separated block terminated by
//! `0x00`. Keys flagged `USES_COMMENT` pull a length-prefixed comment from
//! the extra section.

use std::fmt;

use zerocopy::FromBytes;
use zerocopy::byteorder::little_endian::U16 as U16LE;
use zerocopy::{Immutable, KnownLayout};

use crate::error::{Error, Result};
use crate::frm::constant::{HaKeyAlg, KeyFlag, MySQLType};
use crate::frm::reader::ByteReader;
use crate::frm::table::Column;

/// Fixed-size key record.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
struct KeyRecord {
    flags: U16LE,
    key_length: U16LE,
    parts_count: u8,
    algorithm: u8,
    block_size: U16LE,
}

/// Fixed-size key part record.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
struct KeyPartRecord {
    fieldnr: U16LE,
    offset: U16LE,
    part_flag: u8,
    key_type: U16LE,
    length: U16LE,
}

/// One column reference within a key, with an optional prefix length in
/// characters.
#[derive(Debug, Clone)]
pub struct KeyPart {
    pub column: String,
    pub prefix: Option<u32>,
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.column.replace('`', "``"))?;
        if let Some(prefix) = self.prefix {
            write!(f, "({prefix})")?;
        }
        Ok(())
    }
}

/// A decoded index definition.
#[derive(Debug, Clone)]
pub struct Key {
    pub name: String,
    pub parts: Vec<KeyPart>,
    pub flags: KeyFlag,
    pub algorithm: HaKeyAlg,
    pub block_size: u16,
    pub comment: Option<String>,
}

impl Key {
    pub fn is_unique(&self) -> bool {
        self.flags.contains(KeyFlag::NOSAME)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == "PRIMARY" {
            write!(f, "PRIMARY KEY")?;
        } else if self.flags.contains(KeyFlag::FULLTEXT) {
            write!(f, "FULLTEXT KEY `{}`", self.name)?;
        } else if self.flags.contains(KeyFlag::SPATIAL) {
            write!(f, "SPATIAL KEY `{}`", self.name)?;
        } else if self.is_unique() {
            write!(f, "UNIQUE KEY `{}`", self.name)?;
        } else {
            write!(f, "KEY `{}`", self.name)?;
        }
        let parts = self
            .parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write!(f, " ({parts})")?;
        match self.algorithm {
            HaKeyAlg::Btree => write!(f, " USING BTREE")?,
            HaKeyAlg::Hash => write!(f, " USING HASH")?,
            _ => {}
        }
        if self.block_size != 0 {
            write!(f, " KEY_BLOCK_SIZE={}", self.block_size)?;
        }
        if let Some(comment) = &self.comment {
            write!(f, " COMMENT '{}'", comment.replace('\'', "\\'"))?;
        }
        Ok(())
    }
}

/// Decode the packed key section. `columns` resolve the 1-based field
/// numbers in part records; `extra` supplies key comments.
pub fn unpack_keys(
    keyinfo: &[u8],
    columns: &[Column],
    extra: &mut ByteReader<'_>,
) -> Result<Vec<Key>> {
    if keyinfo.is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = ByteReader::new(keyinfo);

    let first = reader.u8()?;
    let (key_count, _part_count) = if first & 0x80 != 0 {
        let count = u16::from(first & 0x7f) | (u16::from(reader.u8()?) << 7);
        (count, reader.u16()?)
    } else {
        let parts = u16::from(reader.u8()?);
        reader.skip(2)?;
        (u16::from(first), parts)
    };
    reader.skip(2)?;

    if key_count == 0 {
        return Ok(Vec::new());
    }

    struct RawKey {
        flags: KeyFlag,
        algorithm: HaKeyAlg,
        block_size: u16,
        parts: Vec<KeyPart>,
    }

    let mut raw_keys = Vec::with_capacity(usize::from(key_count));
    for _ in 0..key_count {
        let record = KeyRecord::ref_from_bytes(reader.read(size_of::<KeyRecord>())?)
            .map_err(|_| Error::ShortBuffer {
                wanted: size_of::<KeyRecord>(),
                remaining: 0,
            })?;
        let flags = KeyFlag::from_bits_retain(record.flags.get());
        let algorithm = HaKeyAlg::decode(record.algorithm)?;
        let block_size = record.block_size.get();
        let parts_count = record.parts_count;

        let mut parts = Vec::with_capacity(usize::from(parts_count));
        for _ in 0..parts_count {
            let part = KeyPartRecord::ref_from_bytes(reader.read(size_of::<KeyPartRecord>())?)
                .map_err(|_| Error::ShortBuffer {
                    wanted: size_of::<KeyPartRecord>(),
                    remaining: 0,
                })?;
            let fieldnr = usize::from(part.fieldnr.get() & 0x3fff);
            let column = fieldnr
                .checked_sub(1)
                .and_then(|idx| columns.get(idx))
                .ok_or(Error::UnknownEnum {
                    field: "key_part_fieldnr",
                    value: u32::from(part.fieldnr.get()),
                })?;
            parts.push(KeyPart {
                column: column.name.clone(),
                prefix: part_prefix(column, part.length.get()),
            });
        }
        raw_keys.push(RawKey {
            flags,
            algorithm,
            block_size,
            parts,
        });
    }

    let names = unpack_key_names(&mut reader, usize::from(key_count))?;

    let mut keys = Vec::with_capacity(raw_keys.len());
    for (raw, name) in raw_keys.into_iter().zip(names) {
        let comment = if raw.flags.contains(KeyFlag::USES_COMMENT) {
            Some(String::from_utf8_lossy(extra.bytes_prefix16()?).into_owned())
        } else {
            None
        };
        keys.push(Key {
            name,
            parts: raw.parts,
            flags: raw.flags,
            algorithm: raw.algorithm,
            block_size: raw.block_size,
            comment,
        });
    }
    Ok(keys)
}

/// Key names follow the part records: `0xFF`-separated, `0x00`-terminated.
fn unpack_key_names(reader: &mut ByteReader<'_>, count: usize) -> Result<Vec<String>> {
    let rest = reader.read(reader.remaining())?;
    let block = match rest.iter().position(|&b| b == 0) {
        Some(end) => &rest[..end],
        None => rest,
    };
    let names: Vec<String> = block
        .split(|&b| b == 0xff)
        .filter(|part| !part.is_empty())
        .map(|part| String::from_utf8_lossy(part).into_owned())
        .collect();
    if names.len() != count {
        return Err(Error::InvalidFrm(format!(
            "key section names {} keys, header says {}",
            names.len(),
            count
        )));
    }
    Ok(names)
}

/// A part shorter than its column is a prefix index; report the prefix in
/// characters.
fn part_prefix(column: &Column, part_length: u16) -> Option<u32> {
    let prefixable = column.type_code.is_blob()
        || matches!(
            column.type_code,
            MySQLType::Varchar | MySQLType::VarString | MySQLType::String
        );
    if !prefixable {
        return None;
    }
    let part_length = u32::from(part_length);
    if column.type_code.is_blob() || part_length < column.length {
        Some(part_length / column.charset.maxlen)
    } else {
        None
    }
}
