//! Decoded table model and `CREATE TABLE` rendering.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::frm::charset::Charset;
use crate::frm::constant::{HaRowType, MySQLType};
use crate::frm::keys::Key;

/// Server version recorded in the header, decoded from MYSQL_VERSION_ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MySQLVersion {
    pub major: u32,
    pub minor: u32,
    pub release: u32,
}

impl MySQLVersion {
    pub fn from_version_id(value: u32) -> Self {
        Self {
            major: value / 10000,
            minor: value % 1000 / 100,
            release: value % 100,
        }
    }
}

impl fmt::Display for MySQLVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.major == 0 && self.minor == 0 && self.release == 0 {
            write!(f, "< 5.0")
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.release)
        }
    }
}

/// A single column definition.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub type_code: MySQLType,
    pub type_name: String,
    pub length: u32,
    pub attributes: Vec<String>,
    pub default: Option<String>,
    pub comment: String,
    pub charset: &'static Charset,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {}", self.name.replace('`', "``"), self.type_name)?;
        for attr in &self.attributes {
            write!(f, " {attr}")?;
        }
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {default}")?;
        }
        if !self.comment.is_empty() {
            write!(f, " COMMENT '{}'", self.comment.replace('\'', "\\'"))?;
        }
        Ok(())
    }
}

/// Table attributes rendered after the closing parenthesis. Every field is
/// independently optional; absent fields are omitted from the tail.
#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    pub connection: Option<String>,
    pub engine: Option<String>,
    pub charset: Option<&'static Charset>,
    pub min_rows: u32,
    pub max_rows: u32,
    pub avg_row_length: u32,
    pub pack_keys: Option<u8>,
    pub stats_persistent: Option<u8>,
    pub checksum: bool,
    pub delay_key_write: bool,
    pub row_format: Option<HaRowType>,
    pub key_block_size: u16,
    pub comment: Option<String>,
    pub partitions: Option<String>,
}

// A versioned ALGORITHM comment nested inside the outer /*!50100 ... */
// guard must be re-opened around it to stay valid SQL.
static PARTITION_ALGORITHM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([/][*]!\d+ ALGORITHM = \d+ [*][/])").unwrap());

impl TableOptions {
    fn attributes(&self) -> Vec<String> {
        let mut attrs = Vec::new();
        if let Some(connection) = &self.connection {
            attrs.push(format!("CONNECTION='{connection}'"));
        }
        if let Some(engine) = &self.engine {
            attrs.push(format!("ENGINE={engine}"));
        }
        if let Some(charset) = self.charset {
            attrs.push(format!("DEFAULT CHARSET={}", charset.name));
            if !charset.is_default {
                attrs.push(format!("COLLATE={}", charset.collation));
            }
        }
        if self.min_rows != 0 {
            attrs.push(format!("MIN_ROWS={}", self.min_rows));
        }
        if self.max_rows != 0 {
            attrs.push(format!("MAX_ROWS={}", self.max_rows));
        }
        if self.avg_row_length != 0 {
            attrs.push(format!("AVG_ROW_LENGTH={}", self.avg_row_length));
        }
        if let Some(pack_keys) = self.pack_keys {
            attrs.push(format!("PACK_KEYS={pack_keys}"));
        }
        if let Some(stats_persistent) = self.stats_persistent {
            attrs.push(format!("STATS_PERSISTENT={stats_persistent}"));
        }
        if self.checksum {
            attrs.push("CHECKSUM=1".to_string());
        }
        if self.delay_key_write {
            attrs.push("DELAY_KEY_WRITE=1".to_string());
        }
        if let Some(row_format) = self.row_format {
            if row_format != HaRowType::Default {
                attrs.push(format!("ROW_FORMAT={}", row_format.sql_name()));
            }
        }
        if self.key_block_size != 0 {
            attrs.push(format!("KEY_BLOCK_SIZE={}", self.key_block_size));
        }
        if let Some(comment) = &self.comment {
            attrs.push(format!("COMMENT '{}'", comment.replace('\'', "\\'")));
        }
        if let Some(partitions) = &self.partitions {
            let patched = PARTITION_ALGORITHM.replace_all(partitions, "*/ $1 /*!50100");
            attrs.push(format!("\n/*!50100 {patched} */"));
        }
        attrs
    }
}

impl fmt::Display for TableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.attributes().join(" "))
    }
}

/// A fully decoded table definition.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub charset: &'static Charset,
    pub mysql_version: MySQLVersion,
    pub options: TableOptions,
    pub columns: Vec<Column>,
    pub keys: Vec<Key>,
}

impl Table {
    /// Render the complete `CREATE TABLE` statement, preceded by the same
    /// comment banner mysqldump emits for table sections.
    pub fn format(&self, include_raw_types: bool) -> String {
        let mut body: Vec<String> = Vec::with_capacity(self.columns.len() + self.keys.len());
        for column in &self.columns {
            if include_raw_types {
                body.push(format!(
                    "{column} /* MYSQL_TYPE_{} */",
                    column.type_code.name()
                ));
            } else {
                body.push(column.to_string());
            }
        }
        for key in &self.keys {
            body.push(key.to_string());
        }
        let body = body
            .iter()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join(",\n");

        format!(
            "--\n\
             -- Table structure for table `{name}`\n\
             -- Created with MySQL Version {version}\n\
             --\n\
             \n\
             CREATE TABLE `{name}` (\n\
             {body}\n\
             ) {options};\n",
            name = self.name,
            version = self.mysql_version,
            body = body,
            options = self.options,
        )
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::frm::charset;

    #[test]
    fn version_rendering() {
        assert_eq!(MySQLVersion::from_version_id(50645).to_string(), "5.6.45");
        assert_eq!(MySQLVersion::from_version_id(0).to_string(), "< 5.0");
        assert_eq!(MySQLVersion::from_version_id(100108).to_string(), "10.1.8");
    }

    #[test]
    fn option_tail_order() {
        let options = TableOptions {
            engine: Some("MyISAM".to_string()),
            charset: Some(charset::lookup(8).unwrap()),
            min_rows: 10,
            pack_keys: Some(1),
            checksum: true,
            row_format: Some(HaRowType::Dynamic),
            comment: Some("it's a table".to_string()),
            ..TableOptions::default()
        };
        assert_eq!(
            options.to_string(),
            "ENGINE=MyISAM DEFAULT CHARSET=latin1 MIN_ROWS=10 PACK_KEYS=1 \
             CHECKSUM=1 ROW_FORMAT=DYNAMIC COMMENT 'it\\'s a table'"
        );
    }

    #[test]
    fn non_default_collation_is_rendered() {
        let options = TableOptions {
            charset: Some(charset::lookup(83).unwrap()),
            ..TableOptions::default()
        };
        assert_eq!(
            options.to_string(),
            "DEFAULT CHARSET=utf8 COLLATE=utf8_bin"
        );
    }

    #[test]
    fn default_row_format_is_omitted() {
        let options = TableOptions {
            row_format: Some(HaRowType::Default),
            ..TableOptions::default()
        };
        assert_eq!(options.to_string(), "");
    }

    #[test]
    fn partition_algorithm_comment_is_patched() {
        let options = TableOptions {
            partitions: Some(
                "PARTITION BY LINEAR KEY /*!50611 ALGORITHM = 1 */ (id) PARTITIONS 4".to_string(),
            ),
            ..TableOptions::default()
        };
        assert_eq!(
            options.to_string(),
            "\n/*!50100 PARTITION BY LINEAR KEY */ /*!50611 ALGORITHM = 1 */ /*!50100 (id) PARTITIONS 4 */"
        );
    }

    #[test]
    fn column_rendering() {
        let column = Column {
            name: "weird`name".to_string(),
            type_code: MySQLType::Long,
            type_name: "int(11)".to_string(),
            length: 11,
            attributes: vec![],
            default: Some("0".to_string()),
            comment: "counts".to_string(),
            charset: charset::lookup(8).unwrap(),
        };
        assert_eq!(
            column.to_string(),
            "`weird``name` int(11) DEFAULT 0 COMMENT 'counts'"
        );
    }
}
