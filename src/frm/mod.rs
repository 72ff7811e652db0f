//! Binary `.frm` decoding.
//!
//! A `.frm` file is a header full of absolute offsets pointing at four
//! sections (keyinfo, defaults, extrainfo, columns). [`parse`] slices the
//! sections, unpacks columns and keys, and returns a [`Table`] that renders
//! as a `CREATE TABLE` statement.

pub mod charset;
pub mod constant;
pub mod keys;
pub mod reader;
pub mod tablename;
pub mod table;
pub mod types;

use std::path::Path;

use zerocopy::FromBytes;
use zerocopy::byteorder::little_endian::U16 as U16LE;
use zerocopy::{Immutable, KnownLayout};

pub use self::table::{Column, MySQLVersion, Table, TableOptions};

use crate::error::{Error, Result};
use crate::frm::charset::BINARY_CHARSET;
use crate::frm::constant::{
    FieldFlag, GeometryType, HaOption, HaRowType, LegacyDBType, MySQLType, Utype,
};
use crate::frm::reader::{ByteReader, Whence};
use crate::frm::types::ColumnContext;

const MAGIC: [u8; 2] = [0xfe, 0x01];
const HEADER_SIZE: usize = 64;
const FORMINFO_LENGTH: usize = 288;
const COLUMN_RECORD_SIZE: usize = 17;

/// Raw slices of the non-header sections.
struct PackedFrmData<'a> {
    keyinfo: &'a [u8],
    columns: PackedColumnData<'a>,
}

/// Column sub-section slices.
struct PackedColumnData<'a> {
    count: usize,
    null_count: usize,
    metadata: &'a [u8],
    names: &'a [u8],
    labels: &'a [u8],
    comments: &'a [u8],
    defaults: &'a [u8],
}

/// Per-column metadata record.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
struct ColumnRecord {
    _unused: [u8; 3],
    length: U16LE,
    defaults_offset: [u8; 3],
    flags: U16LE,
    unireg_check: u8,
    charset_high: u8,
    label_id: u8,
    type_code: u8,
    charset_low: u8,
    comment_length: U16LE,
}

impl ColumnRecord {
    fn defaults_offset(&self) -> u32 {
        let b = self.defaults_offset;
        u32::from_le_bytes([b[0], b[1], b[2], 0])
    }
}

/// Parse a `.frm` file into a [`Table`].
pub fn parse(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let buf = std::fs::read(path)?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_buffer(path, &name, &buf)
}

fn parse_buffer(path: &Path, filename: &str, buf: &[u8]) -> Result<Table> {
    let mut data = ByteReader::new(buf);
    if data.read(2).ok() != Some(MAGIC.as_slice()) {
        return Err(Error::NotAFrm {
            path: path.to_path_buf(),
        });
    }

    let mysql_version = MySQLVersion::from_version_id(data.u32_at(0x0033, Whence::Start)?);

    // keyinfo section, with the 16-bit length escape
    let keyinfo_offset = usize::from(data.u16_at(0x0006, Whence::Start)?);
    let mut keyinfo_length = usize::from(data.u16_at(0x000e, Whence::Start)?);
    if keyinfo_length == 0xffff {
        keyinfo_length = data.u32_at(0x002f, Whence::Start)? as usize;
    }

    // column defaults section
    let defaults_offset = keyinfo_offset + keyinfo_length;
    let defaults_length = usize::from(data.u16_at(0x0010, Whence::Start)?);
    let defaults = data.read_at(defaults_length, defaults_offset)?;

    // table extra / attributes section
    let extrainfo_offset = defaults_offset + defaults_length;
    let extrainfo_length = data.u32_at(0x0037, Whence::Start)? as usize;
    let extrainfo = data.read_at(extrainfo_length, extrainfo_offset)?;
    let mut extra = ByteReader::new(extrainfo);

    // forminfo block, found through the name section length
    let names_length = usize::from(data.u16_at(0x0004, Whence::Start)?);
    let forminfo_offset = data.u32_at(HEADER_SIZE + names_length, Whence::Start)? as usize;
    // the legacy "screens" block follows forminfo and is skipped
    let screens_length = usize::from(data.u16_at(forminfo_offset + 260, Whence::Start)?);

    let null_count = usize::from(data.u16_at(forminfo_offset + 282, Whence::Start)?);
    let column_count = usize::from(data.u16_at(forminfo_offset + 258, Whence::Start)?);
    let column_names_length = usize::from(data.u16_at(forminfo_offset + 268, Whence::Start)?);
    let labels_length = usize::from(data.u16_at(forminfo_offset + 274, Whence::Start)?);
    let comments_length = usize::from(data.u16_at(forminfo_offset + 284, Whence::Start)?);
    let metadata_offset = forminfo_offset + FORMINFO_LENGTH + screens_length;

    let keyinfo = data.read_at(keyinfo_length, keyinfo_offset)?;
    let packed = {
        let mut scope = data.offset(metadata_offset)?;
        let metadata = scope.read(COLUMN_RECORD_SIZE * column_count)?;
        let names = scope.read(column_names_length)?;
        let labels = scope.read(labels_length)?;
        let comments = scope.read(comments_length)?;
        PackedFrmData {
            keyinfo,
            columns: PackedColumnData {
                count: column_count,
                null_count,
                metadata,
                names,
                labels,
                comments,
                defaults,
            },
        }
    };

    let table_charset = charset::lookup(u16::from(data.u8_at(0x0026, Whence::Start)?))?;

    // Extra section opens with three length-prefixed strings and a 2-byte
    // trailer (null + autopartition flag).
    let (connection, engine_name, partition_info) = if extra.is_empty() {
        (None, None, None)
    } else {
        let connection = extra.bytes_prefix16()?;
        let engine = extra.bytes_prefix16()?;
        let partition_info = extra.bytes_prefix32()?;
        extra.skip(2)?;
        (
            non_empty(connection),
            non_empty(engine),
            non_empty(partition_info),
        )
    };

    let engine = match engine_name.as_deref() {
        None => LegacyDBType::decode(data.u8_at(0x0003, Whence::Start)?)?
            .engine_name()
            .to_string(),
        Some("partition") => {
            // underlying storage engine of a partitioned table
            LegacyDBType::decode(data.u8_at(0x003d, Whence::Start)?)?
                .engine_name()
                .to_string()
        }
        Some(name) => name.to_string(),
    };

    let handler_options = HaOption::from_bits_retain(data.u16_at(0x001e, Whence::Start)?);
    let pack_keys = if handler_options.contains(HaOption::PACK_KEYS) {
        Some(1)
    } else if handler_options.contains(HaOption::NO_PACK_KEYS) {
        Some(0)
    } else {
        None
    };
    let stats_persistent = if handler_options.contains(HaOption::STATS_PERSISTENT) {
        Some(1)
    } else if handler_options.contains(HaOption::NO_STATS_PERSISTENT) {
        Some(0)
    } else {
        None
    };

    let options = TableOptions {
        connection,
        engine: Some(engine),
        charset: Some(table_charset),
        min_rows: data.u32_at(0x0016, Whence::Start)?,
        max_rows: data.u32_at(0x0012, Whence::Start)?,
        avg_row_length: data.u32_at(0x0022, Whence::Start)?,
        pack_keys,
        stats_persistent,
        checksum: handler_options.contains(HaOption::CHECKSUM),
        delay_key_write: handler_options.contains(HaOption::DELAY_KEY_WRITE),
        row_format: Some(HaRowType::decode(data.u8_at(0x0028, Whence::Start)?)?),
        key_block_size: data.u16_at(0x003e, Whence::Start)?,
        comment: None,
        partitions: partition_info,
    };

    let mut table = Table {
        name: tablename::filename_to_tablename(filename),
        charset: table_charset,
        mysql_version,
        options,
        columns: Vec::new(),
        keys: Vec::new(),
    };

    table.columns = unpack_columns(&packed.columns)?;
    table.keys = keys::unpack_keys(packed.keyinfo, &table.columns, &mut extra)?;

    // Short table comments live in forminfo; long ones overflow into the
    // extra section.
    let comment_length = data.u8_at(forminfo_offset + 46, Whence::Start)?;
    let comment = if comment_length != 0xff {
        data.read_at(usize::from(comment_length), forminfo_offset + 47)?
    } else {
        extra.bytes_prefix16()?
    };
    if !comment.is_empty() {
        table.options.comment = Some(String::from_utf8_lossy(comment).into_owned());
    }

    Ok(table)
}

fn non_empty(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Strip the bracketing byte and trailing terminator pair, then split on
/// `0xFF`.
fn unpack_column_names(names: &[u8]) -> Result<Vec<String>> {
    if names.len() < 3 {
        return Ok(Vec::new());
    }
    names[1..names.len() - 2]
        .split(|&b| b == 0xff)
        .map(|raw| {
            simdutf8::basic::from_utf8(raw)
                .map(str::to_string)
                .map_err(|_| Error::InvalidUtf8 {
                    context: "column name",
                })
        })
        .collect()
}

/// Label groups are separated by `0x00`; within a group the label strings
/// are bracketed and separated by `0xFF`.
fn unpack_column_labels(labels: &[u8]) -> Result<Vec<Vec<String>>> {
    if labels.is_empty() {
        return Ok(Vec::new());
    }
    labels[..labels.len() - 1]
        .split(|&b| b == 0x00)
        .map(|group| {
            if group.len() < 2 {
                return Ok(Vec::new());
            }
            group[1..group.len() - 1]
                .split(|&b| b == 0xff)
                .map(|raw| {
                    simdutf8::basic::from_utf8(raw)
                        .map(str::to_string)
                        .map_err(|_| Error::InvalidUtf8 {
                            context: "enum label",
                        })
                })
                .collect()
        })
        .collect()
}

fn unpack_columns(packed: &PackedColumnData<'_>) -> Result<Vec<Column>> {
    let names = unpack_column_names(packed.names)?;
    let labels = unpack_column_labels(packed.labels)?;
    if names.len() != packed.count {
        return Err(Error::InvalidFrm(format!(
            "column section names {} columns, forminfo says {}",
            names.len(),
            packed.count
        )));
    }

    let mut metadata = ByteReader::new(packed.metadata);
    let mut defaults = ByteReader::new(packed.defaults);
    let mut comments = ByteReader::new(packed.comments);

    let null_map = defaults.read((packed.null_count + 1).div_ceil(8))?.to_vec();
    let mut ctx = ColumnContext {
        name: String::new(),
        fieldnr: 0,
        length: 0,
        flags: FieldFlag::empty(),
        unireg_check: Utype::None,
        type_code: MySQLType::Null,
        subtype_code: None,
        charset: charset::lookup(BINARY_CHARSET)?,
        labels: None,
        null_map,
        null_bit: 1,
    };

    let mut columns = Vec::with_capacity(packed.count);
    for (fieldnr, name) in names.into_iter().enumerate() {
        let record = ColumnRecord::ref_from_bytes(metadata.read(COLUMN_RECORD_SIZE)?)
            .map_err(|_| Error::ShortBuffer {
                wanted: COLUMN_RECORD_SIZE,
                remaining: 0,
            })?;

        ctx.name = name;
        ctx.fieldnr = fieldnr;
        ctx.length = u32::from(record.length.get());
        ctx.flags = FieldFlag::from_bits_retain(record.flags.get());
        ctx.unireg_check = Utype::decode(record.unireg_check)?;
        ctx.type_code = MySQLType::decode(record.type_code)?;

        // label_id is 1-based for ENUM/SET columns
        ctx.labels = if matches!(ctx.type_code, MySQLType::Enum | MySQLType::Set) {
            let group = usize::from(record.label_id)
                .checked_sub(1)
                .and_then(|idx| labels.get(idx))
                .ok_or(Error::UnknownEnum {
                    field: "label_id",
                    value: u32::from(record.label_id),
                })?;
            Some(group.clone())
        } else {
            None
        };

        if ctx.type_code == MySQLType::Geometry {
            ctx.charset = charset::lookup(BINARY_CHARSET)?;
            ctx.subtype_code = Some(GeometryType::decode(record.charset_low)?);
        } else {
            let charset_id =
                (u16::from(record.charset_high) << 8) | u16::from(record.charset_low);
            ctx.charset = charset::lookup(charset_id)?;
            ctx.subtype_code = None;
        }

        let type_name = types::format_type(&ctx);
        let default = {
            let offset = record.defaults_offset().saturating_sub(1) as usize;
            let mut scope = defaults.offset(offset)?;
            types::unpack_default(&mut scope, &mut ctx)?
        };
        let comment = comments.read(usize::from(record.comment_length.get()))?;

        let mut attributes = Vec::new();
        if matches!(ctx.type_code, MySQLType::Timestamp | MySQLType::Timestamp2)
            && matches!(
                ctx.unireg_check,
                Utype::TimestampUnField | Utype::TimestampDnunField
            )
        {
            attributes.push("ON UPDATE CURRENT_TIMESTAMP".to_string());
        }

        columns.push(Column {
            name: ctx.name.clone(),
            type_code: ctx.type_code,
            type_name,
            length: ctx.length,
            attributes,
            default,
            comment: String::from_utf8_lossy(comment).into_owned(),
            charset: ctx.charset,
        });
    }
    Ok(columns)
}
