//! Column type formatting and default-value decoding.
//!
//! `format_type` renders the SQL type string for a column context;
//! `unpack_default` decodes the packed default value for the same context
//! from the defaults section. Both are pure over the context except for the
//! shared null-bitmap cursor, which advances once per nullable column.

use crate::error::{Error, Result};
use crate::frm::charset::{BINARY_CHARSET, Charset};
use crate::frm::constant::{FieldFlag, GeometryType, MySQLType, Utype};
use crate::frm::reader::ByteReader;

/// Everything the type formatter and default unpacker need to know about
/// the column currently being decoded. One context is reused across the
/// column loop; `null_bit` is the only field that survives from one column
/// to the next.
#[derive(Debug)]
pub struct ColumnContext {
    pub name: String,
    pub fieldnr: usize,
    pub length: u32,
    pub flags: FieldFlag,
    pub unireg_check: Utype,
    pub type_code: MySQLType,
    pub subtype_code: Option<GeometryType>,
    pub charset: &'static Charset,
    pub labels: Option<Vec<String>>,
    pub null_map: Vec<u8>,
    pub null_bit: usize,
}

/// Render the SQL type of a column, including display width, character
/// length, enum labels and signedness.
pub fn format_type(ctx: &ColumnContext) -> String {
    match ctx.type_code {
        MySQLType::Tiny => int_type("tinyint", ctx),
        MySQLType::Short => int_type("smallint", ctx),
        MySQLType::Int24 => int_type("mediumint", ctx),
        MySQLType::Long => int_type("int", ctx),
        MySQLType::LongLong => int_type("bigint", ctx),
        MySQLType::Decimal | MySQLType::NewDecimal => {
            let scale = ctx.flags.decimals();
            let mut precision = ctx.length;
            if scale > 0 {
                precision -= 1;
            }
            if !ctx.flags.is_unsigned() {
                precision -= 1;
            }
            let mut name = format!("decimal({precision},{scale})");
            push_numeric_suffixes(&mut name, ctx);
            name
        }
        MySQLType::Float => real_type("float", ctx),
        MySQLType::Double => real_type("double", ctx),
        MySQLType::Varchar | MySQLType::VarString => {
            if ctx.charset.id == BINARY_CHARSET {
                format!("varbinary({})", ctx.length)
            } else {
                format!("varchar({})", ctx.length / ctx.charset.maxlen)
            }
        }
        MySQLType::String => {
            if ctx.charset.id == BINARY_CHARSET {
                format!("binary({})", ctx.length)
            } else {
                format!("char({})", ctx.length / ctx.charset.maxlen)
            }
        }
        MySQLType::TinyBlob => blob_type("tiny", ctx),
        MySQLType::Blob => blob_type("", ctx),
        MySQLType::MediumBlob => blob_type("medium", ctx),
        MySQLType::LongBlob => blob_type("long", ctx),
        MySQLType::Enum => label_type("enum", ctx),
        MySQLType::Set => label_type("set", ctx),
        MySQLType::Bit => format!("bit({})", ctx.length),
        MySQLType::Year => "year(4)".to_string(),
        MySQLType::Date | MySQLType::NewDate => "date".to_string(),
        MySQLType::Time => "time".to_string(),
        MySQLType::Time2 => fsp_type("time", ctx.length, 10),
        MySQLType::DateTime => "datetime".to_string(),
        MySQLType::DateTime2 => fsp_type("datetime", ctx.length, 19),
        MySQLType::Timestamp => "timestamp".to_string(),
        MySQLType::Timestamp2 => fsp_type("timestamp", ctx.length, 19),
        MySQLType::Json => "json".to_string(),
        MySQLType::Geometry => ctx
            .subtype_code
            .unwrap_or(GeometryType::Geometry)
            .sql_name()
            .to_string(),
        MySQLType::Null => "null".to_string(),
    }
}

fn int_type(name: &str, ctx: &ColumnContext) -> String {
    let mut out = format!("{name}({})", ctx.length);
    push_numeric_suffixes(&mut out, ctx);
    out
}

/// FLOAT/DOUBLE carry an explicit (length, decimals) only when the decimal
/// count is fixed; 31 marks "not fixed".
fn real_type(name: &str, ctx: &ColumnContext) -> String {
    const NOT_FIXED_DEC: u32 = 31;
    let decimals = ctx.flags.decimals();
    let mut out = if decimals == NOT_FIXED_DEC {
        name.to_string()
    } else {
        format!("{name}({},{decimals})", ctx.length)
    };
    push_numeric_suffixes(&mut out, ctx);
    out
}

fn push_numeric_suffixes(out: &mut String, ctx: &ColumnContext) {
    if ctx.flags.is_unsigned() {
        out.push_str(" unsigned");
    }
    if ctx.flags.contains(FieldFlag::ZEROFILL) {
        out.push_str(" zerofill");
    }
}

fn blob_type(size: &str, ctx: &ColumnContext) -> String {
    if ctx.charset.id == BINARY_CHARSET {
        format!("{size}blob")
    } else {
        format!("{size}text")
    }
}

fn label_type(name: &str, ctx: &ColumnContext) -> String {
    let labels = ctx.labels.as_deref().unwrap_or_default();
    let rendered = labels
        .iter()
        .map(|label| format!("'{}'", label.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(",");
    format!("{name}({rendered})")
}

/// The stored length of second-precision temporals includes the fractional
/// digits and their dot.
fn fsp_type(name: &str, length: u32, base: u32) -> String {
    if length > base + 1 {
        format!("{name}({})", length - base - 1)
    } else {
        name.to_string()
    }
}

/// Decode the default value for the current column. The reader is expected
/// to be positioned at the column's slot in the defaults section. Returns
/// a rendered SQL literal, or `None` when the column has no default.
pub fn unpack_default(
    defaults: &mut ByteReader<'_>,
    ctx: &mut ColumnContext,
) -> Result<Option<String>> {
    // The null bitmap covers every nullable column, so the cursor must
    // advance before any early return below.
    let mut is_null = false;
    if ctx.flags.contains(FieldFlag::MAYBE_NULL) {
        let byte = ctx.null_map.get(ctx.null_bit / 8).copied().unwrap_or(0);
        is_null = byte & (1 << (ctx.null_bit % 8)) != 0;
        ctx.null_bit += 1;
    }

    if ctx.unireg_check == Utype::NextNumber {
        return Ok(None);
    }
    if matches!(ctx.type_code, MySQLType::Timestamp | MySQLType::Timestamp2)
        && matches!(
            ctx.unireg_check,
            Utype::TimestampDnField | Utype::TimestampDnunField
        )
    {
        return Ok(Some("CURRENT_TIMESTAMP".to_string()));
    }
    if ctx.type_code.is_blob()
        || matches!(
            ctx.type_code,
            MySQLType::Geometry | MySQLType::Json | MySQLType::Null
        )
    {
        return Ok(None);
    }
    if ctx.flags.contains(FieldFlag::NO_DEFAULT) {
        return Ok(None);
    }
    if is_null {
        return Ok(Some("NULL".to_string()));
    }

    let unsigned = ctx.flags.is_unsigned();
    let literal = match ctx.type_code {
        MySQLType::Tiny => {
            let v = defaults.u8()?;
            if unsigned {
                v.to_string()
            } else {
                (v as i8).to_string()
            }
        }
        MySQLType::Short => {
            let v = defaults.u16()?;
            if unsigned {
                v.to_string()
            } else {
                (v as i16).to_string()
            }
        }
        MySQLType::Int24 => {
            let v = defaults.u24()?;
            if unsigned {
                v.to_string()
            } else if v & 0x0080_0000 != 0 {
                (v as i32 - 0x0100_0000).to_string()
            } else {
                v.to_string()
            }
        }
        MySQLType::Long => {
            let v = defaults.u32()?;
            if unsigned {
                v.to_string()
            } else {
                (v as i32).to_string()
            }
        }
        MySQLType::LongLong => {
            let b = defaults.read(8)?;
            let v = u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]);
            if unsigned {
                v.to_string()
            } else {
                (v as i64).to_string()
            }
        }
        MySQLType::Float => {
            let b = defaults.read(4)?;
            let v = f32::from_le_bytes([b[0], b[1], b[2], b[3]]);
            format!("{v}")
        }
        MySQLType::Double => {
            let b = defaults.read(8)?;
            let v = f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]);
            format!("{v}")
        }
        MySQLType::Decimal => {
            let raw = defaults.read(ctx.length as usize)?;
            String::from_utf8_lossy(raw).trim().to_string()
        }
        MySQLType::NewDecimal => {
            let scale = ctx.flags.decimals();
            let mut precision = ctx.length;
            if scale > 0 {
                precision -= 1;
            }
            if !unsigned {
                precision -= 1;
            }
            let raw = defaults.read(decimal_bin_size(precision, scale))?;
            decode_new_decimal(raw, precision, scale)
        }
        MySQLType::Varchar | MySQLType::VarString => {
            let len = if ctx.length < 256 {
                usize::from(defaults.u8()?)
            } else {
                usize::from(defaults.u16()?)
            };
            quote(&String::from_utf8_lossy(defaults.read(len)?))
        }
        MySQLType::String => {
            let raw = defaults.read(ctx.length as usize)?;
            let trimmed = raw
                .iter()
                .rposition(|&b| b != b' ' && b != 0)
                .map_or(&raw[..0], |idx| &raw[..=idx]);
            quote(&String::from_utf8_lossy(trimmed))
        }
        MySQLType::Enum => {
            let labels = ctx.labels.as_deref().unwrap_or_default();
            let idx = if labels.len() <= 255 {
                usize::from(defaults.u8()?)
            } else {
                usize::from(defaults.u16()?)
            };
            if idx == 0 {
                quote("")
            } else {
                let label = labels.get(idx - 1).ok_or(Error::UnknownEnum {
                    field: "enum_default",
                    value: idx as u32,
                })?;
                quote(label)
            }
        }
        MySQLType::Set => {
            let labels = ctx.labels.as_deref().unwrap_or_default();
            let raw = defaults.read(set_pack_length(labels.len()))?;
            let mut bits: u64 = 0;
            for (i, &b) in raw.iter().enumerate() {
                bits |= u64::from(b) << (8 * i);
            }
            let members = labels
                .iter()
                .enumerate()
                .filter(|(i, _)| bits & (1u64 << i) != 0)
                .map(|(_, label)| label.as_str())
                .collect::<Vec<_>>()
                .join(",");
            quote(&members)
        }
        MySQLType::Bit => {
            let raw = defaults.read((ctx.length as usize).div_ceil(8))?;
            format!("b'{:b}'", be_uint(raw))
        }
        MySQLType::Year => {
            let v = defaults.u8()?;
            if v == 0 {
                quote("0000")
            } else {
                quote(&(1900 + u32::from(v)).to_string())
            }
        }
        MySQLType::Date | MySQLType::NewDate => {
            let v = defaults.u24()?;
            quote(&format!("{:04}-{:02}-{:02}", v >> 9, (v >> 5) & 15, v & 31))
        }
        MySQLType::Time => {
            let v = defaults.u24()?;
            quote(&format!(
                "{:02}:{:02}:{:02}",
                v / 10000,
                v / 100 % 100,
                v % 100
            ))
        }
        MySQLType::Time2 => {
            let packed = be_uint(defaults.read(3)?) as i64 - 0x80_0000;
            let (sign, packed) = if packed < 0 { ("-", -packed) } else { ("", packed) };
            let frac = read_frac(defaults, fsp(ctx.length, 10))?;
            quote(&format!(
                "{sign}{:02}:{:02}:{:02}{frac}",
                (packed >> 12) & 0x3ff,
                (packed >> 6) & 0x3f,
                packed & 0x3f
            ))
        }
        MySQLType::DateTime => {
            let b = defaults.read(8)?;
            let v = u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]);
            let (date, time) = (v / 1_000_000, v % 1_000_000);
            quote(&format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                date / 10000,
                date / 100 % 100,
                date % 100,
                time / 10000,
                time / 100 % 100,
                time % 100
            ))
        }
        MySQLType::DateTime2 => {
            let v = be_uint(defaults.read(5)?) as i64 - 0x80_0000_0000;
            let frac = read_frac(defaults, fsp(ctx.length, 19))?;
            let ymd = v >> 17;
            let ym = ymd >> 5;
            let hms = v & 0x1_ffff;
            quote(&format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}{frac}",
                ym / 13,
                ym % 13,
                ymd & 31,
                hms >> 12,
                (hms >> 6) & 63,
                hms & 63
            ))
        }
        MySQLType::Timestamp => {
            let v = defaults.u32()?;
            quote(&render_epoch(v, ""))
        }
        MySQLType::Timestamp2 => {
            let v = be_uint(defaults.read(4)?) as u32;
            let frac = read_frac(defaults, fsp(ctx.length, 19))?;
            quote(&render_epoch(v, &frac))
        }
        // Unreachable: every other code returned above.
        _ => return Ok(None),
    };
    Ok(Some(literal))
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn be_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, &b| (acc << 8) | u64::from(b))
}

fn fsp(length: u32, base: u32) -> u32 {
    if length > base + 1 { length - base - 1 } else { 0 }
}

/// Fractional seconds are stored big-endian in `(fsp + 1) / 2` bytes,
/// scaled to an even digit count.
fn read_frac(reader: &mut ByteReader<'_>, fsp: u32) -> Result<String> {
    if fsp == 0 {
        return Ok(String::new());
    }
    let nbytes = (fsp as usize + 1) / 2;
    let raw = be_uint(reader.read(nbytes)?);
    let digits = format!("{raw:0width$}", width = 2 * nbytes);
    Ok(format!(".{}", &digits[..fsp as usize]))
}

fn render_epoch(secs: u32, frac: &str) -> String {
    if secs == 0 {
        return format!("0000-00-00 00:00:00{frac}");
    }
    let days = i64::from(secs / 86400);
    let rem = secs % 86400;
    // Civil-from-days, Gregorian proleptic.
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    format!(
        "{year:04}-{month:02}-{day:02} {:02}:{:02}:{:02}{frac}",
        rem / 3600,
        rem % 3600 / 60,
        rem % 60
    )
}

fn set_pack_length(count: usize) -> usize {
    match count {
        0..=8 => 1,
        9..=16 => 2,
        17..=24 => 3,
        25..=32 => 4,
        _ => 8,
    }
}

const DIG2BYTES: [usize; 10] = [0, 1, 1, 2, 2, 3, 3, 4, 4, 4];

/// Storage size of a binary-packed decimal.
fn decimal_bin_size(precision: u32, scale: u32) -> usize {
    let intg = (precision - scale) as usize;
    let frac = scale as usize;
    (intg / 9) * 4 + DIG2BYTES[intg % 9] + (frac / 9) * 4 + DIG2BYTES[frac % 9]
}

/// Decode MySQL's binary decimal format: base-10^9 big-endian groups with
/// the sign folded into the top bit of the first byte (inverted bytes for
/// negatives).
fn decode_new_decimal(raw: &[u8], precision: u32, scale: u32) -> String {
    let mut buf = raw.to_vec();
    if buf.is_empty() {
        return "0".to_string();
    }
    let positive = buf[0] & 0x80 != 0;
    buf[0] ^= 0x80;
    if !positive {
        for b in &mut buf {
            *b = !*b;
        }
    }

    let intg = (precision - scale) as usize;
    let frac = scale as usize;
    let mut pos = 0;
    let mut digits = String::new();

    let lead = DIG2BYTES[intg % 9];
    if lead > 0 {
        digits.push_str(&format!(
            "{:0width$}",
            be_uint(&buf[pos..pos + lead]),
            width = intg % 9
        ));
        pos += lead;
    }
    for _ in 0..intg / 9 {
        digits.push_str(&format!("{:09}", be_uint(&buf[pos..pos + 4])));
        pos += 4;
    }
    let int_part = digits.trim_start_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };

    let mut frac_digits = String::new();
    for _ in 0..frac / 9 {
        frac_digits.push_str(&format!("{:09}", be_uint(&buf[pos..pos + 4])));
        pos += 4;
    }
    let tail = DIG2BYTES[frac % 9];
    if tail > 0 {
        frac_digits.push_str(&format!(
            "{:0width$}",
            be_uint(&buf[pos..pos + tail]),
            width = frac % 9
        ));
    }

    let sign = if positive || (int_part == "0" && frac_digits.chars().all(|c| c == '0')) {
        ""
    } else {
        "-"
    };
    if frac > 0 {
        format!("{sign}{int_part}.{frac_digits}")
    } else {
        format!("{sign}{int_part}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::frm::charset;

    fn context(type_code: MySQLType, length: u32, flags: u16, charset_id: u16) -> ColumnContext {
        ColumnContext {
            name: "c".to_string(),
            fieldnr: 0,
            length,
            flags: FieldFlag::from_bits_retain(flags),
            unireg_check: Utype::None,
            type_code,
            subtype_code: None,
            charset: charset::lookup(charset_id).unwrap(),
            labels: None,
            null_map: vec![0],
            null_bit: 1,
        }
    }

    #[test]
    fn integer_type_names() {
        // signed int(11)
        let ctx = context(MySQLType::Long, 11, 1 | 2, 8);
        assert_eq!(format_type(&ctx), "int(11)");
        // unsigned zerofill
        let ctx = context(MySQLType::Tiny, 3, 2 | 4, 8);
        assert_eq!(format_type(&ctx), "tinyint(3) unsigned zerofill");
    }

    #[test]
    fn decimal_type_precision() {
        // decimal(10,2) signed: stored length 10 + dot + sign
        let ctx = context(MySQLType::NewDecimal, 12, 1 | 2 | (2 << 8), 8);
        assert_eq!(format_type(&ctx), "decimal(10,2)");
    }

    #[test]
    fn string_types_divide_by_charset_width() {
        let ctx = context(MySQLType::Varchar, 96, 0, 33);
        assert_eq!(format_type(&ctx), "varchar(32)");
        let ctx = context(MySQLType::Varchar, 16, 0, 63);
        assert_eq!(format_type(&ctx), "varbinary(16)");
        let ctx = context(MySQLType::String, 10, 0, 8);
        assert_eq!(format_type(&ctx), "char(10)");
    }

    #[test]
    fn blob_and_text() {
        let ctx = context(MySQLType::LongBlob, 0, 0, 63);
        assert_eq!(format_type(&ctx), "longblob");
        let ctx = context(MySQLType::Blob, 0, 0, 8);
        assert_eq!(format_type(&ctx), "text");
    }

    #[test]
    fn enum_labels() {
        let mut ctx = context(MySQLType::Enum, 1, 0, 8);
        ctx.labels = Some(vec!["a".to_string(), "b'c".to_string()]);
        assert_eq!(format_type(&ctx), "enum('a','b''c')");
    }

    #[test]
    fn geometry_subtype() {
        let mut ctx = context(MySQLType::Geometry, 0, 0, 63);
        ctx.subtype_code = Some(GeometryType::Point);
        assert_eq!(format_type(&ctx), "point");
        ctx.subtype_code = Some(GeometryType::Geometry);
        assert_eq!(format_type(&ctx), "geometry");
    }

    #[test]
    fn temporal_fsp() {
        let ctx = context(MySQLType::DateTime2, 19, 0, 8);
        assert_eq!(format_type(&ctx), "datetime");
        let ctx = context(MySQLType::DateTime2, 23, 0, 8);
        assert_eq!(format_type(&ctx), "datetime(3)");
        let ctx = context(MySQLType::Time2, 12, 0, 8);
        assert_eq!(format_type(&ctx), "time(1)");
    }

    #[test]
    fn int_defaults() {
        let data = [0xFEu8, 0xFF, 0xFF, 0xFF];
        let mut reader = ByteReader::new(&data);
        let mut ctx = context(MySQLType::Long, 11, 1 | 2, 8);
        assert_eq!(
            unpack_default(&mut reader, &mut ctx).unwrap().as_deref(),
            Some("-2")
        );
        let mut reader = ByteReader::new(&data);
        let mut ctx = context(MySQLType::Long, 11, 2, 8);
        assert_eq!(
            unpack_default(&mut reader, &mut ctx).unwrap().as_deref(),
            Some("4294967294")
        );
    }

    #[test]
    fn null_default_consumes_a_bitmap_slot() {
        let data = [0u8; 4];
        let mut reader = ByteReader::new(&data);
        let mut ctx = context(MySQLType::Long, 11, 1 | 2 | 32768, 8);
        ctx.null_map = vec![0b0000_0010];
        assert_eq!(
            unpack_default(&mut reader, &mut ctx).unwrap().as_deref(),
            Some("NULL")
        );
        assert_eq!(ctx.null_bit, 2);
    }

    #[test]
    fn auto_increment_has_no_default() {
        let data = [0u8; 4];
        let mut reader = ByteReader::new(&data);
        let mut ctx = context(MySQLType::Long, 11, 1 | 2 | 32768, 8);
        ctx.unireg_check = Utype::NextNumber;
        assert_eq!(unpack_default(&mut reader, &mut ctx).unwrap(), None);
        assert_eq!(ctx.null_bit, 2);
    }

    #[test]
    fn varchar_default() {
        let data = [2u8, b'h', b'i'];
        let mut reader = ByteReader::new(&data);
        let mut ctx = context(MySQLType::Varchar, 32, 0, 8);
        assert_eq!(
            unpack_default(&mut reader, &mut ctx).unwrap().as_deref(),
            Some("'hi'")
        );
    }

    #[test]
    fn char_default_trims_padding() {
        let data = [b'o', b'k', b' ', b' '];
        let mut reader = ByteReader::new(&data);
        let mut ctx = context(MySQLType::String, 4, 0, 8);
        assert_eq!(
            unpack_default(&mut reader, &mut ctx).unwrap().as_deref(),
            Some("'ok'")
        );
    }

    #[test]
    fn enum_and_set_defaults() {
        let data = [2u8];
        let mut reader = ByteReader::new(&data);
        let mut ctx = context(MySQLType::Enum, 1, 0, 8);
        ctx.labels = Some(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            unpack_default(&mut reader, &mut ctx).unwrap().as_deref(),
            Some("'b'")
        );

        let data = [0b0000_0101u8];
        let mut reader = ByteReader::new(&data);
        let mut ctx = context(MySQLType::Set, 1, 0, 8);
        ctx.labels = Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(
            unpack_default(&mut reader, &mut ctx).unwrap().as_deref(),
            Some("'a,c'")
        );
    }

    #[test]
    fn new_decimal_default() {
        // decimal(10,2) value 1234567.89
        let raw = [0x80, 0x12, 0xD6, 0x87, 0x59];
        assert_eq!(decode_new_decimal(&raw, 10, 2), "1234567.89");
        // the negative encoding is the bytewise inverse of the positive one
        let neg: Vec<u8> = raw.iter().map(|&b| !b).collect();
        assert_eq!(decode_new_decimal(&neg, 10, 2), "-1234567.89");
    }

    #[test]
    fn decimal_bin_sizes() {
        assert_eq!(decimal_bin_size(10, 2), 5);
        assert_eq!(decimal_bin_size(18, 9), 8);
        assert_eq!(decimal_bin_size(9, 0), 4);
    }

    #[test]
    fn newdate_and_time_defaults() {
        // 2014-07-18: (2014 << 9) | (7 << 5) | 18
        let packed: u32 = (2014 << 9) | (7 << 5) | 18;
        let data = packed.to_le_bytes();
        let mut reader = ByteReader::new(&data[..3]);
        let mut ctx = context(MySQLType::NewDate, 10, 0, 8);
        assert_eq!(
            unpack_default(&mut reader, &mut ctx).unwrap().as_deref(),
            Some("'2014-07-18'")
        );

        let time: u32 = 235959;
        let data = time.to_le_bytes();
        let mut reader = ByteReader::new(&data[..3]);
        let mut ctx = context(MySQLType::Time, 10, 0, 8);
        assert_eq!(
            unpack_default(&mut reader, &mut ctx).unwrap().as_deref(),
            Some("'23:59:59'")
        );
    }

    #[test]
    fn datetime2_default() {
        // 2015-03-09 17:45:30, no fractional seconds
        let ymd = (2015 * 13 + 3) << 5 | 9;
        let hms = 17 << 12 | 45 << 6 | 30;
        let packed: i64 = ((ymd as i64) << 17 | hms as i64) + 0x80_0000_0000;
        let be = packed.to_be_bytes();
        let data = &be[3..8];
        let mut reader = ByteReader::new(data);
        let mut ctx = context(MySQLType::DateTime2, 19, 0, 8);
        assert_eq!(
            unpack_default(&mut reader, &mut ctx).unwrap().as_deref(),
            Some("'2015-03-09 17:45:30'")
        );
    }

    #[test]
    fn timestamp_epoch_rendering() {
        assert_eq!(render_epoch(0, ""), "0000-00-00 00:00:00");
        assert_eq!(render_epoch(1_405_651_200, ""), "2014-07-18 02:40:00");
    }

    #[test]
    fn current_timestamp_default() {
        let data = [0u8; 4];
        let mut reader = ByteReader::new(&data);
        let mut ctx = context(MySQLType::Timestamp, 19, 0, 8);
        ctx.unireg_check = Utype::TimestampDnField;
        assert_eq!(
            unpack_default(&mut reader, &mut ctx).unwrap().as_deref(),
            Some("CURRENT_TIMESTAMP")
        );
    }
}
