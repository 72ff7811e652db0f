//! Split `mysqldump` output into per-database, per-table files.
//!
//! The driver walks the tokenizer's sections in input order and routes each
//! one to `<directory>/<db>/<name>.sql[.<ext>]` through the filter command.
//! For InnoDB tables it can rewrite the `CREATE TABLE` to defer secondary
//! indexes (and, for newer targets, foreign keys) into an `ALTER TABLE`
//! injected after the table's data section.

pub mod defer;
pub mod filter;
pub mod tokenizer;

use std::collections::HashSet;
use std::fs::File;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use self::defer::{extract_create_table, split_indexes};
use self::filter::write_through;
use self::tokenizer::{DumpTokenizer, Section, SectionKind, extract_identifier};

/// Parsed configuration record handed in by the invoking shell.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// MySQL version the output targets; controls index/constraint
    /// deferral.
    pub target: String,
    /// Output directory root.
    pub directory: PathBuf,
    /// Shell command each output file is piped through.
    pub filter_command: String,
    /// Only paths matching this pattern are written.
    pub regex: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            target: "5.5".to_string(),
            directory: PathBuf::from("."),
            filter_command: "gzip -1".to_string(),
            regex: ".*".to_string(),
        }
    }
}

static HEADER_DATABASE: LazyLock<regex::bytes::Regex> =
    LazyLock::new(|| regex::bytes::Regex::new(r"(?m)Database: (.*)$").unwrap());

const DEFERRED_INDEX_BANNER: &str =
    "\n--\n-- InnoDB Fast Index Creation (generated by dbsake)\n--\n\n\n";

struct PendingAlter {
    table: String,
    statement: String,
}

#[derive(Default)]
struct SplitterState {
    current_db: Option<String>,
    header: Vec<u8>,
    pending_alter: Option<PendingAlter>,
    database_count: u32,
    table_count: u32,
    view_count: u32,
    views_truncated: HashSet<PathBuf>,
}

pub struct Splitter {
    options: SplitOptions,
    name_filter: Regex,
    defer_indexes: bool,
    defer_constraints: bool,
    state: SplitterState,
}

impl Splitter {
    pub fn new(options: SplitOptions) -> Result<Self> {
        let name_filter = Regex::new(&options.regex)?;
        debug!("Compiled regex {}", options.regex);
        let (defer_indexes, defer_constraints) = match options.target.as_str() {
            "5.5" => (true, false),
            "5.6" | "5.7" => (true, true),
            other => {
                warn!("Unknown target version '{other}'");
                warn!("Indexes will not be deferred");
                (false, false)
            }
        };
        std::fs::create_dir_all(&options.directory)?;
        Ok(Self {
            options,
            name_filter,
            defer_indexes,
            defer_constraints,
            state: SplitterState::default(),
        })
    }

    /// Consume a dump stream to end-of-input.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        let mut tokenizer = DumpTokenizer::new(input);
        while let Some(mut section) = tokenizer.next_section()? {
            match section.kind() {
                SectionKind::Header => self.on_header(&mut section)?,
                SectionKind::ReplicationInfo => self.on_replication_info(&mut section)?,
                SectionKind::Schema => self.on_schema(&mut section)?,
                SectionKind::SchemaRoutines => self.on_schema_file(&mut section, "routines.sql")?,
                SectionKind::SchemaEvents => self.on_schema_file(&mut section, "events.sql")?,
                SectionKind::TableDefinition => self.on_table_definition(&mut section)?,
                SectionKind::TableData => self.on_table_data(&mut section)?,
                SectionKind::ViewTemporaryDefinition | SectionKind::ViewDefinition => {
                    self.on_view(&mut section)?;
                }
                kind => {
                    debug!("Skipping section type: {}", kind.as_str());
                    section.drain()?;
                }
            }
        }
        info!(
            "Split input into {} database(s) {} table(s) and {} view(s)",
            self.state.database_count, self.state.table_count, self.state.view_count
        );
        Ok(())
    }

    fn db(&self, kind: &'static str) -> Result<&str> {
        self.state
            .current_db
            .as_deref()
            .ok_or(Error::NoDatabase { kind })
    }

    fn set_db(&mut self, db: String) -> Result<()> {
        std::fs::create_dir_all(self.options.directory.join(&db))?;
        self.state.current_db = Some(db);
        Ok(())
    }

    fn on_header<R: BufRead>(&mut self, section: &mut Section<'_, R>) -> Result<()> {
        self.state.header = section.collect_lines()?.concat();
        // Single-database dumps name the schema in the header banner.
        let db = HEADER_DATABASE
            .captures(&self.state.header)
            .map(|caps| String::from_utf8_lossy(&caps[1]).trim().to_string());
        if let Some(db) = db {
            if !db.is_empty() {
                self.set_db(db)?;
                self.state.database_count += 1;
            }
        }
        Ok(())
    }

    fn on_replication_info<R: BufRead>(&mut self, section: &mut Section<'_, R>) -> Result<()> {
        let path = self.options.directory.join("replication_info.sql");
        let header = &self.state.header;
        write_through(&self.options.filter_command, &path, false, |out| {
            out.write_all(header)?;
            while let Some(line) = section.next_line()? {
                out.write_all(&line)?;
            }
            Ok(())
        })
    }

    fn on_schema<R: BufRead>(&mut self, section: &mut Section<'_, R>) -> Result<()> {
        let lines = section.collect_lines()?;
        let db = lines
            .get(1)
            .and_then(|line| extract_identifier(line))
            .ok_or_else(|| {
                Error::InvalidDump("schema section carries no database identifier".to_string())
            })?;
        self.set_db(db.clone())?;
        let path = self.options.directory.join(&db).join("create.sql");
        let header = &self.state.header;
        write_through(&self.options.filter_command, &path, false, |out| {
            out.write_all(header)?;
            for line in &lines {
                out.write_all(line)?;
            }
            Ok(())
        })?;
        self.state.database_count += 1;
        Ok(())
    }

    fn on_schema_file<R: BufRead>(
        &mut self,
        section: &mut Section<'_, R>,
        name: &str,
    ) -> Result<()> {
        let db = self.db(section.kind().as_str())?;
        let path = self.options.directory.join(db).join(name);
        let header = &self.state.header;
        write_through(&self.options.filter_command, &path, false, |out| {
            out.write_all(header)?;
            while let Some(line) = section.next_line()? {
                out.write_all(&line)?;
            }
            Ok(())
        })
    }

    fn on_table_definition<R: BufRead>(&mut self, section: &mut Section<'_, R>) -> Result<()> {
        let lines = section.collect_lines()?;
        let table = lines
            .get(1)
            .and_then(|line| extract_identifier(line))
            .ok_or_else(|| {
                Error::InvalidDump("table definition carries no table identifier".to_string())
            })?;
        let db = self.db("table_definition")?.to_string();
        let path = self
            .options
            .directory
            .join(&db)
            .join(format!("{table}.schema.sql"));

        let mut block = String::from_utf8_lossy(&lines.concat()).into_owned();
        if self.defer_indexes {
            let mut rewrite = None;
            if let Some(ddl) = extract_create_table(&block) {
                if ddl.contains("ENGINE=InnoDB") {
                    let (alter, rewritten) = split_indexes(ddl, self.defer_constraints);
                    if let Some(statement) = alter {
                        let what = if self.defer_constraints {
                            "indexes and constraints"
                        } else {
                            "indexes"
                        };
                        info!("Deferring {what} for {db}.{table} ({})", path.display());
                        rewrite = Some((block.replace(ddl, &rewritten), statement));
                    }
                }
            }
            if let Some((rewritten_block, statement)) = rewrite {
                block = rewritten_block;
                self.state.pending_alter = Some(PendingAlter {
                    table: table.clone(),
                    statement,
                });
            }
        }

        if self.name_filter.is_match(&path.to_string_lossy()) {
            let header = &self.state.header;
            write_through(&self.options.filter_command, &path, false, |out| {
                out.write_all(header)?;
                out.write_all(block.as_bytes())?;
                Ok(())
            })?;
            self.state.table_count += 1;
        } else {
            debug!("No regex match on '{}'", path.display());
        }
        Ok(())
    }

    fn on_table_data<R: BufRead>(&mut self, section: &mut Section<'_, R>) -> Result<()> {
        let mut comments = Vec::with_capacity(3);
        for _ in 0..3 {
            if let Some(line) = section.next_line()? {
                comments.push(line);
            }
        }
        let table = comments
            .get(1)
            .and_then(|line| extract_identifier(line))
            .ok_or_else(|| {
                Error::InvalidDump("table data carries no table identifier".to_string())
            })?;
        let db = self.db("table_data")?.to_string();
        let path = self
            .options
            .directory
            .join(&db)
            .join(format!("{table}.data.sql"));

        // The stashed ALTER belongs to exactly one data section: the one
        // for the table whose definition produced it.
        let pending = if self
            .state
            .pending_alter
            .as_ref()
            .is_some_and(|pending| pending.table == table)
        {
            self.state.pending_alter.take()
        } else {
            None
        };

        if self.name_filter.is_match(&path.to_string_lossy()) {
            if pending.is_some() {
                info!("Injecting deferred index creation {}", path.display());
            }
            let header = &self.state.header;
            write_through(&self.options.filter_command, &path, false, |out| {
                out.write_all(header)?;
                for line in &comments {
                    out.write_all(line)?;
                }
                while let Some(line) = section.next_line()? {
                    out.write_all(&line)?;
                }
                if let Some(pending) = &pending {
                    out.write_all(DEFERRED_INDEX_BANNER.as_bytes())?;
                    out.write_all(pending.statement.as_bytes())?;
                    out.write_all(b"\n")?;
                }
                Ok(())
            })?;
        } else {
            debug!("No regex match on '{}'", path.display());
            section.drain()?;
        }
        Ok(())
    }

    fn on_view<R: BufRead>(&mut self, section: &mut Section<'_, R>) -> Result<()> {
        let db = self.db(section.kind().as_str())?;
        let path = self.options.directory.join(db).join("views.sql");
        if self.name_filter.is_match(&path.to_string_lossy()) {
            // Both view section kinds append to one file per database;
            // truncate it the first time it is touched this run.
            let target = filter::path_with_ext(&path, &self.options.filter_command);
            if !self.state.views_truncated.contains(&target) {
                File::create(&target)?;
                self.state.views_truncated.insert(target);
            }
            write_through(&self.options.filter_command, &path, true, |out| {
                while let Some(line) = section.next_line()? {
                    out.write_all(&line)?;
                }
                Ok(())
            })?;
            self.state.view_count += 1;
        } else {
            debug!("No regex match on '{}'", path.display());
            section.drain()?;
        }
        Ok(())
    }
}
