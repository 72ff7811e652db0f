//! End-to-end `.frm` decoding against synthetic table definition images.

use std::io::Write;

use pretty_assertions::assert_eq;

const MYISAM: u8 = 9;

struct FrmColumn {
    name: &'static str,
    type_code: u8,
    length: u16,
    flags: u16,
    unireg: u8,
    charset_high: u8,
    charset_low: u8,
    defaults_offset: u32,
}

const KEYINFO_OFFSET: usize = 0x1000;
const FORMINFO_OFFSET: usize = 0x2000;

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Assemble a minimal single-table `.frm` image: header, empty keyinfo,
/// a defaults section, forminfo, and the column sub-sections.
fn build_frm(
    engine: u8,
    charset_id: u8,
    null_count: u16,
    columns: &[FrmColumn],
    defaults: &[u8],
) -> Vec<u8> {
    let mut buf = vec![0u8; 0x2400];

    buf[0] = 0xfe;
    buf[1] = 0x01;
    buf[2] = 0x09; // frm version
    buf[3] = engine;
    put_u16(&mut buf, 0x04, 3); // names section length
    put_u16(&mut buf, 0x06, KEYINFO_OFFSET as u16);
    put_u16(&mut buf, 0x0e, 6); // keyinfo length
    put_u16(&mut buf, 0x10, defaults.len() as u16);
    buf[0x26] = charset_id;
    put_u32(&mut buf, 0x33, 50645); // MySQL 5.6.45
    put_u32(&mut buf, 0x37, 0); // no extrainfo
    put_u32(&mut buf, 64 + 3, FORMINFO_OFFSET as u32);

    // empty keyinfo: zero keys, zero parts
    let defaults_offset = KEYINFO_OFFSET + 6;
    buf[defaults_offset..defaults_offset + defaults.len()].copy_from_slice(defaults);

    // column names: bracketed, 0xFF-separated
    let mut names = vec![0xffu8];
    for (idx, column) in columns.iter().enumerate() {
        if idx > 0 {
            names.push(0xff);
        }
        names.extend_from_slice(column.name.as_bytes());
    }
    names.extend_from_slice(&[0xff, 0x00]);

    put_u16(&mut buf, FORMINFO_OFFSET + 258, columns.len() as u16);
    put_u16(&mut buf, FORMINFO_OFFSET + 260, 0); // screens
    put_u16(&mut buf, FORMINFO_OFFSET + 268, names.len() as u16);
    put_u16(&mut buf, FORMINFO_OFFSET + 274, 0); // labels
    put_u16(&mut buf, FORMINFO_OFFSET + 282, null_count);
    put_u16(&mut buf, FORMINFO_OFFSET + 284, 0); // comments

    let mut pos = FORMINFO_OFFSET + 288;
    for column in columns {
        let record = &mut buf[pos..pos + 17];
        put_u16(record, 3, column.length);
        record[5..8].copy_from_slice(&column.defaults_offset.to_le_bytes()[..3]);
        put_u16(record, 8, column.flags);
        record[10] = column.unireg;
        record[11] = column.charset_high;
        record[13] = column.type_code;
        record[14] = column.charset_low;
        pos += 17;
    }
    buf[pos..pos + names.len()].copy_from_slice(&names);
    buf
}

fn parse_frm(name: &str, image: &[u8]) -> cold_mysql::frm::Table {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("{name}.frm"));
    std::fs::File::create(&path)
        .unwrap()
        .write_all(image)
        .unwrap();
    cold_mysql::frm::parse(&path).unwrap()
}

// FieldFlag bits
const SIGNED: u16 = 1;
const NUMBER: u16 = 2;
const GEOM: u16 = 2048;
const NO_DEFAULT: u16 = 16384;
const MAYBE_NULL: u16 = 32768;

#[test]
fn myisam_int_table_round_trips() {
    // CREATE TABLE t (id INT) ENGINE=MyISAM CHARSET=latin1
    let columns = [FrmColumn {
        name: "id",
        type_code: 0x03,
        length: 11,
        flags: SIGNED | NUMBER | MAYBE_NULL,
        unireg: 0,
        charset_high: 0,
        charset_low: 8,
        defaults_offset: 2,
    }];
    // one reserved bit, then id's null bit set: NULL default
    let defaults = [0b0000_0010u8, 0, 0, 0, 0];
    let table = parse_frm("t", &build_frm(MYISAM, 8, 1, &columns, &defaults));

    assert_eq!(table.name, "t");
    assert_eq!(table.mysql_version.to_string(), "5.6.45");
    assert_eq!(table.columns.len(), 1);
    assert_eq!(table.columns[0].type_name, "int(11)");

    let ddl = table.to_string();
    assert!(ddl.contains("CREATE TABLE `t` ("), "{ddl}");
    assert!(ddl.contains("`id` int(11) DEFAULT NULL"), "{ddl}");
    assert!(ddl.contains("ENGINE=MyISAM"), "{ddl}");
    assert!(ddl.contains("DEFAULT CHARSET=latin1"), "{ddl}");
}

#[test]
fn geometry_column_is_forced_to_binary_charset() {
    // the metadata charset bytes of a GEOMETRY column are junk; the low
    // byte is the geometry subtype instead
    let columns = [FrmColumn {
        name: "g",
        type_code: 0xff,
        length: 12,
        flags: GEOM | MAYBE_NULL,
        unireg: 0,
        charset_high: 99,
        charset_low: 0,
        defaults_offset: 2,
    }];
    let defaults = [0u8, 0];
    let table = parse_frm("t", &build_frm(MYISAM, 8, 1, &columns, &defaults));

    assert_eq!(table.columns[0].charset.id, 63);
    assert_eq!(table.columns[0].type_name, "geometry");
    assert_eq!(table.columns[0].default, None);
    assert!(table.to_string().contains("`g` geometry"), "{}", table);
}

#[test]
fn integer_defaults_come_from_the_defaults_section() {
    let columns = [
        FrmColumn {
            name: "id",
            type_code: 0x03,
            length: 11,
            flags: SIGNED | NUMBER | NO_DEFAULT,
            unireg: 0,
            charset_high: 0,
            charset_low: 8,
            defaults_offset: 2,
        },
        FrmColumn {
            name: "v",
            type_code: 0x03,
            length: 11,
            flags: SIGNED | NUMBER | MAYBE_NULL,
            unireg: 0,
            charset_high: 0,
            charset_low: 8,
            defaults_offset: 2,
        },
    ];
    // null byte (v's bit clear), then v's packed default 42
    let defaults = [0u8, 42, 0, 0, 0];
    let table = parse_frm("t", &build_frm(MYISAM, 8, 1, &columns, &defaults));

    assert_eq!(table.columns[0].default, None);
    assert_eq!(table.columns[1].default.as_deref(), Some("42"));
}

#[test]
fn escaped_filenames_decode_to_table_names() {
    let columns = [FrmColumn {
        name: "id",
        type_code: 0x03,
        length: 11,
        flags: SIGNED | NUMBER | NO_DEFAULT,
        unireg: 0,
        charset_high: 0,
        charset_low: 8,
        defaults_offset: 2,
    }];
    let defaults = [0u8, 0, 0, 0, 0];
    let table = parse_frm("t@002d1", &build_frm(MYISAM, 8, 0, &columns, &defaults));
    assert_eq!(table.name, "t-1");
    assert!(table.to_string().contains("CREATE TABLE `t-1`"));
}

#[test]
fn non_frm_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.frm");
    std::fs::write(&path, b"-- not a frm --").unwrap();
    let err = cold_mysql::frm::parse(&path).unwrap_err();
    assert!(matches!(err, cold_mysql::Error::NotAFrm { .. }));
}
