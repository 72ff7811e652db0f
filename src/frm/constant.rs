//! On-disk enumerations and bitfields found in `.frm` files.
//!
//! Every byte-to-enum conversion is a partial function; unknown values are
//! rejected with [`Error::UnknownEnum`] at the call site rather than carried
//! around as raw numbers.

use crate::error::{Error, Result};

/// Storage type codes as recorded in column metadata.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MySQLType {
    Decimal = 0x00,
    Tiny = 0x01,
    Short = 0x02,
    Long = 0x03,
    Float = 0x04,
    Double = 0x05,
    Null = 0x06,
    Timestamp = 0x07,
    LongLong = 0x08,
    Int24 = 0x09,
    Date = 0x0a,
    Time = 0x0b,
    DateTime = 0x0c,
    Year = 0x0d,
    NewDate = 0x0e,
    Varchar = 0x0f,
    Bit = 0x10,
    Timestamp2 = 0x11,
    DateTime2 = 0x12,
    Time2 = 0x13,
    Json = 0xf5,
    NewDecimal = 0xf6,
    Enum = 0xf7,
    Set = 0xf8,
    TinyBlob = 0xf9,
    MediumBlob = 0xfa,
    LongBlob = 0xfb,
    Blob = 0xfc,
    VarString = 0xfd,
    String = 0xfe,
    Geometry = 0xff,
}

impl MySQLType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Decimal),
            0x01 => Some(Self::Tiny),
            0x02 => Some(Self::Short),
            0x03 => Some(Self::Long),
            0x04 => Some(Self::Float),
            0x05 => Some(Self::Double),
            0x06 => Some(Self::Null),
            0x07 => Some(Self::Timestamp),
            0x08 => Some(Self::LongLong),
            0x09 => Some(Self::Int24),
            0x0a => Some(Self::Date),
            0x0b => Some(Self::Time),
            0x0c => Some(Self::DateTime),
            0x0d => Some(Self::Year),
            0x0e => Some(Self::NewDate),
            0x0f => Some(Self::Varchar),
            0x10 => Some(Self::Bit),
            0x11 => Some(Self::Timestamp2),
            0x12 => Some(Self::DateTime2),
            0x13 => Some(Self::Time2),
            0xf5 => Some(Self::Json),
            0xf6 => Some(Self::NewDecimal),
            0xf7 => Some(Self::Enum),
            0xf8 => Some(Self::Set),
            0xf9 => Some(Self::TinyBlob),
            0xfa => Some(Self::MediumBlob),
            0xfb => Some(Self::LongBlob),
            0xfc => Some(Self::Blob),
            0xfd => Some(Self::VarString),
            0xfe => Some(Self::String),
            0xff => Some(Self::Geometry),
            _ => None,
        }
    }

    pub fn decode(value: u8) -> Result<Self> {
        Self::from_u8(value).ok_or(Error::UnknownEnum {
            field: "type_code",
            value: u32::from(value),
        })
    }

    /// Name used in `/* MYSQL_TYPE_... */` annotations.
    pub fn name(self) -> &'static str {
        match self {
            Self::Decimal => "DECIMAL",
            Self::Tiny => "TINY",
            Self::Short => "SHORT",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Null => "NULL",
            Self::Timestamp => "TIMESTAMP",
            Self::LongLong => "LONGLONG",
            Self::Int24 => "INT24",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::Year => "YEAR",
            Self::NewDate => "NEWDATE",
            Self::Varchar => "VARCHAR",
            Self::Bit => "BIT",
            Self::Timestamp2 => "TIMESTAMP2",
            Self::DateTime2 => "DATETIME2",
            Self::Time2 => "TIME2",
            Self::Json => "JSON",
            Self::NewDecimal => "NEWDECIMAL",
            Self::Enum => "ENUM",
            Self::Set => "SET",
            Self::TinyBlob => "TINY_BLOB",
            Self::MediumBlob => "MEDIUM_BLOB",
            Self::LongBlob => "LONG_BLOB",
            Self::Blob => "BLOB",
            Self::VarString => "VAR_STRING",
            Self::String => "STRING",
            Self::Geometry => "GEOMETRY",
        }
    }

    pub fn is_blob(self) -> bool {
        matches!(
            self,
            Self::TinyBlob | Self::MediumBlob | Self::LongBlob | Self::Blob
        )
    }
}

/// Geometry subtype stored where non-spatial columns keep the low charset
/// byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Geometry = 0,
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
}

impl GeometryType {
    pub fn decode(value: u8) -> Result<Self> {
        let v = match value {
            0 => Self::Geometry,
            1 => Self::Point,
            2 => Self::LineString,
            3 => Self::Polygon,
            4 => Self::MultiPoint,
            5 => Self::MultiLineString,
            6 => Self::MultiPolygon,
            7 => Self::GeometryCollection,
            _ => {
                return Err(Error::UnknownEnum {
                    field: "geometry_type",
                    value: u32::from(value),
                });
            }
        };
        Ok(v)
    }

    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Geometry => "geometry",
            Self::Point => "point",
            Self::LineString => "linestring",
            Self::Polygon => "polygon",
            Self::MultiPoint => "multipoint",
            Self::MultiLineString => "multilinestring",
            Self::MultiPolygon => "multipolygon",
            Self::GeometryCollection => "geometrycollection",
        }
    }
}

/// Unireg check byte: residual column behaviors from the pre-5.0
/// table-definition layer. Only a few values still matter (auto-increment
/// and the timestamp default/update combinations).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utype {
    None = 0,
    Date = 1,
    Shield = 2,
    NoEmpty = 3,
    CaseUp = 4,
    Pnr = 5,
    Bgnr = 6,
    Pgnr = 7,
    Yes = 8,
    No = 9,
    Rel = 10,
    Check = 11,
    Empty = 12,
    UnknownField = 13,
    CaseDn = 14,
    NextNumber = 15,
    IntervalField = 16,
    BitField = 17,
    TimestampOldField = 18,
    Capitalize = 19,
    BlobField = 20,
    TimestampDnField = 21,
    TimestampUnField = 22,
    TimestampDnunField = 23,
}

impl Utype {
    pub fn decode(value: u8) -> Result<Self> {
        let v = match value {
            0 => Self::None,
            1 => Self::Date,
            2 => Self::Shield,
            3 => Self::NoEmpty,
            4 => Self::CaseUp,
            5 => Self::Pnr,
            6 => Self::Bgnr,
            7 => Self::Pgnr,
            8 => Self::Yes,
            9 => Self::No,
            10 => Self::Rel,
            11 => Self::Check,
            12 => Self::Empty,
            13 => Self::UnknownField,
            14 => Self::CaseDn,
            15 => Self::NextNumber,
            16 => Self::IntervalField,
            17 => Self::BitField,
            18 => Self::TimestampOldField,
            19 => Self::Capitalize,
            20 => Self::BlobField,
            21 => Self::TimestampDnField,
            22 => Self::TimestampUnField,
            23 => Self::TimestampDnunField,
            _ => {
                return Err(Error::UnknownEnum {
                    field: "unireg_check",
                    value: u32::from(value),
                });
            }
        };
        Ok(v)
    }
}

bitflags::bitflags! {
    /// Column pack flags. Bits 8..=12 are overloaded: for numeric columns
    /// they hold the decimal count, for string columns the INTERVAL /
    /// BITFIELD / BLOB / GEOM / TREAT_BIT_AS_CHAR markers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlag: u16 {
        /// Signed for numeric columns.
        const DECIMAL = 1;
        const NUMBER = 2;
        const ZEROFILL = 4;
        const PACK = 120;
        const INTERVAL = 256;
        const BITFIELD = 512;
        const BLOB = 1024;
        const GEOM = 2048;
        const TREAT_BIT_AS_CHAR = 4096;
        const NO_DEFAULT = 16384;
        const MAYBE_NULL = 32768;
    }
}

impl FieldFlag {
    const DEC_SHIFT: u16 = 8;
    const MAX_DEC: u16 = 31;

    /// Decimal digit count packed into the flag word (numeric columns).
    pub fn decimals(self) -> u32 {
        u32::from((self.bits() >> Self::DEC_SHIFT) & Self::MAX_DEC)
    }

    /// Numeric columns are unsigned when the DECIMAL (sign) bit is clear.
    pub fn is_unsigned(self) -> bool {
        !self.contains(Self::DECIMAL)
    }
}

bitflags::bitflags! {
    /// Table handler options from the header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HaOption: u16 {
        const PACK_RECORD = 1;
        const PACK_KEYS = 2;
        const COMPRESS_RECORD = 4;
        const LONG_BLOB_PTR = 8;
        const TMP_TABLE = 16;
        const CHECKSUM = 32;
        const DELAY_KEY_WRITE = 64;
        const NO_PACK_KEYS = 128;
        const CREATE_FROM_ENGINE = 256;
        const RELIES_ON_SQL_LAYER = 512;
        const NULL_FIELDS = 1024;
        const PAGE_CHECKSUM = 2048;
        const STATS_PERSISTENT = 4096;
        const NO_STATS_PERSISTENT = 8192;
    }
}

bitflags::bitflags! {
    /// Per-key flags from the key section.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyFlag: u16 {
        const NOSAME = 1;
        const PACK_KEY = 2;
        const SPACE_PACK_USED = 4;
        const VAR_LENGTH_KEY = 8;
        const AUTO_KEY = 16;
        const BINARY_PACK_KEY = 32;
        const NULL_PART_KEY = 64;
        const FULLTEXT = 128;
        const UNIQUE_CHECK = 256;
        const SORT_ALLOWS_SAME = 512;
        const SPATIAL = 1024;
        const NULL_ARE_EQUAL = 2048;
        const USES_COMMENT = 4096;
        const GENERATED_KEY = 8192;
        const USES_PARSER = 16384;
        const USES_BLOCK_SIZE = 32768;
    }
}

/// Index algorithm byte in a key record.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaKeyAlg {
    Undefined = 0,
    Btree = 1,
    Rtree = 2,
    Hash = 3,
    Fulltext = 4,
}

impl HaKeyAlg {
    pub fn decode(value: u8) -> Result<Self> {
        let v = match value {
            0 => Self::Undefined,
            1 => Self::Btree,
            2 => Self::Rtree,
            3 => Self::Hash,
            4 => Self::Fulltext,
            _ => {
                return Err(Error::UnknownEnum {
                    field: "key_algorithm",
                    value: u32::from(value),
                });
            }
        };
        Ok(v)
    }
}

/// Row format byte in the header.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaRowType {
    Default = 0,
    Fixed = 1,
    Dynamic = 2,
    Compressed = 3,
    Redundant = 4,
    Compact = 5,
    Page = 6,
}

impl HaRowType {
    pub fn decode(value: u8) -> Result<Self> {
        let v = match value {
            0 => Self::Default,
            1 => Self::Fixed,
            2 => Self::Dynamic,
            3 => Self::Compressed,
            4 => Self::Redundant,
            5 => Self::Compact,
            6 => Self::Page,
            _ => {
                return Err(Error::UnknownEnum {
                    field: "row_format",
                    value: u32::from(value),
                });
            }
        };
        Ok(v)
    }

    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Fixed => "FIXED",
            Self::Dynamic => "DYNAMIC",
            Self::Compressed => "COMPRESSED",
            Self::Redundant => "REDUNDANT",
            Self::Compact => "COMPACT",
            Self::Page => "PAGE",
        }
    }
}

/// Storage engine codes used before engines were named in the extra
/// section.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyDBType {
    Unknown = 0,
    DiabIsam = 1,
    Hash = 2,
    MIsam = 3,
    PIsam = 4,
    RmsIsam = 5,
    Heap = 6,
    Isam = 7,
    MrgIsam = 8,
    MyIsam = 9,
    MrgMyIsam = 10,
    BerkeleyDb = 11,
    InnoDb = 12,
    Gemini = 13,
    NdbCluster = 14,
    ExampleDb = 15,
    ArchiveDb = 16,
    CsvDb = 17,
    FederatedDb = 18,
    BlackholeDb = 19,
    PartitionDb = 20,
    Binlog = 21,
    Solid = 22,
    Pbxt = 23,
    TableFunction = 24,
    Memcache = 25,
    Falcon = 26,
    Maria = 27,
    PerformanceSchema = 28,
}

impl LegacyDBType {
    pub fn decode(value: u8) -> Result<Self> {
        let v = match value {
            0 => Self::Unknown,
            1 => Self::DiabIsam,
            2 => Self::Hash,
            3 => Self::MIsam,
            4 => Self::PIsam,
            5 => Self::RmsIsam,
            6 => Self::Heap,
            7 => Self::Isam,
            8 => Self::MrgIsam,
            9 => Self::MyIsam,
            10 => Self::MrgMyIsam,
            11 => Self::BerkeleyDb,
            12 => Self::InnoDb,
            13 => Self::Gemini,
            14 => Self::NdbCluster,
            15 => Self::ExampleDb,
            16 => Self::ArchiveDb,
            17 => Self::CsvDb,
            18 => Self::FederatedDb,
            19 => Self::BlackholeDb,
            20 => Self::PartitionDb,
            21 => Self::Binlog,
            22 => Self::Solid,
            23 => Self::Pbxt,
            24 => Self::TableFunction,
            25 => Self::Memcache,
            26 => Self::Falcon,
            27 => Self::Maria,
            28 => Self::PerformanceSchema,
            _ => {
                return Err(Error::UnknownEnum {
                    field: "legacy_db_type",
                    value: u32::from(value),
                });
            }
        };
        Ok(v)
    }

    /// Engine name as it appears in `ENGINE=` clauses.
    pub fn engine_name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::DiabIsam => "DIAB_ISAM",
            Self::Hash => "HASH",
            Self::MIsam => "MISAM",
            Self::PIsam => "PISAM",
            Self::RmsIsam => "RMS_ISAM",
            Self::Heap => "MEMORY",
            Self::Isam => "ISAM",
            Self::MrgIsam => "MRG_ISAM",
            Self::MyIsam => "MyISAM",
            Self::MrgMyIsam => "MRG_MyISAM",
            Self::BerkeleyDb => "BerkeleyDB",
            Self::InnoDb => "InnoDB",
            Self::Gemini => "Gemini",
            Self::NdbCluster => "ndbcluster",
            Self::ExampleDb => "EXAMPLE",
            Self::ArchiveDb => "ARCHIVE",
            Self::CsvDb => "CSV",
            Self::FederatedDb => "FEDERATED",
            Self::BlackholeDb => "BLACKHOLE",
            Self::PartitionDb => "partition",
            Self::Binlog => "BINLOG",
            Self::Solid => "SOLID",
            Self::Pbxt => "PBXT",
            Self::TableFunction => "TABLE_FUNCTION",
            Self::Memcache => "MEMCACHE",
            Self::Falcon => "Falcon",
            Self::Maria => "Aria",
            Self::PerformanceSchema => "PERFORMANCE_SCHEMA",
        }
    }
}
