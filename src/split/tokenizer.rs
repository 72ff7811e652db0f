//! Streaming section tokenizer for `mysqldump` output.
//!
//! mysqldump announces each section with a three-line comment banner:
//! a bare `--`, a marker line, another `--`. Sections here begin at the
//! bare `--` preceding the marker (so the marker is always `lines[1]`) and
//! end right before the next banner. Lines are raw bytes including their
//! terminators, so reassembling the sections reproduces the dump exactly.
//!
//! A [`Section`] mutably borrows the tokenizer, which makes "consume the
//! current section before asking for the next" a compile-time guarantee;
//! any lines left unread when the next section is requested are drained
//! internally.

use std::collections::VecDeque;
use std::io::BufRead;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Header,
    ReplicationInfo,
    Schema,
    SchemaRoutines,
    SchemaEvents,
    TableDefinition,
    TableData,
    ViewTemporaryDefinition,
    ViewDefinition,
    Footer,
    Unknown,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::ReplicationInfo => "replication_info",
            Self::Schema => "schema",
            Self::SchemaRoutines => "schema_routines",
            Self::SchemaEvents => "schema_events",
            Self::TableDefinition => "table_definition",
            Self::TableData => "table_data",
            Self::ViewTemporaryDefinition => "view_temporary_definition",
            Self::ViewDefinition => "view_definition",
            Self::Footer => "footer",
            Self::Unknown => "unknown",
        }
    }
}

const MARKERS: &[(&[u8], SectionKind)] = &[
    (
        b"-- Position to start replication or point-in-time recovery from",
        SectionKind::ReplicationInfo,
    ),
    (b"-- Current Database:", SectionKind::Schema),
    (b"-- Table structure for table", SectionKind::TableDefinition),
    (b"-- Dumping data for table", SectionKind::TableData),
    (
        b"-- Temporary view structure for view",
        SectionKind::ViewTemporaryDefinition,
    ),
    (b"-- Final view structure for view", SectionKind::ViewDefinition),
    (b"-- Dumping routines for database", SectionKind::SchemaRoutines),
    (b"-- Dumping events for database", SectionKind::SchemaEvents),
    (b"-- Dump completed", SectionKind::Footer),
];

fn marker_kind(line: &[u8]) -> Option<SectionKind> {
    MARKERS
        .iter()
        .find(|(prefix, _)| line.starts_with(prefix))
        .map(|&(_, kind)| kind)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn is_bare_comment(line: &[u8]) -> bool {
    trim_line_ending(line) == b"--"
}

/// Pull the last backtick-quoted identifier out of a marker line.
pub fn extract_identifier(line: &[u8]) -> Option<String> {
    let s = String::from_utf8_lossy(line);
    let end = s.rfind('`')?;
    let start = s[..end].rfind('`')?;
    Some(s[start + 1..end].to_string())
}

pub struct DumpTokenizer<R> {
    reader: R,
    pending: VecDeque<Vec<u8>>,
    in_section: bool,
    section_pos: usize,
    started: bool,
}

impl<R: BufRead> DumpTokenizer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
            in_section: false,
            section_pos: 0,
            started: false,
        }
    }

    fn fetch(&mut self) -> Result<Option<Vec<u8>>> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(Some(line));
        }
        let mut buf = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buf)?;
        if n == 0 { Ok(None) } else { Ok(Some(buf)) }
    }

    /// Next line of the current section, or `None` at the section end.
    fn section_line(&mut self) -> Result<Option<Vec<u8>>> {
        if !self.in_section {
            return Ok(None);
        }
        let Some(line) = self.fetch()? else {
            self.in_section = false;
            return Ok(None);
        };
        // A banner (bare `--` followed by a marker line) ends the section.
        if self.section_pos > 0 && is_bare_comment(&line) {
            if let Some(next) = self.fetch()? {
                if marker_kind(&next).is_some() {
                    self.pending.push_front(next);
                    self.pending.push_front(line);
                    self.in_section = false;
                    return Ok(None);
                }
                self.pending.push_front(next);
            }
        }
        // A bannerless marker (the dump-completed footer) does too. The
        // position guard keeps the current section's own marker, which
        // sits at index 1, from ending it.
        if self.section_pos > 1 && marker_kind(&line).is_some() {
            self.pending.push_front(line);
            self.in_section = false;
            return Ok(None);
        }
        self.section_pos += 1;
        Ok(Some(line))
    }

    /// Advance to the next section, draining whatever is left of the
    /// current one.
    pub fn next_section(&mut self) -> Result<Option<Section<'_, R>>> {
        while self.in_section {
            if self.section_line()?.is_none() {
                break;
            }
        }
        let Some(first) = self.fetch()? else {
            return Ok(None);
        };
        let kind = if is_bare_comment(&first) {
            match self.fetch()? {
                Some(next) => {
                    let kind = marker_kind(&next).unwrap_or(SectionKind::Unknown);
                    self.pending.push_front(next);
                    kind
                }
                None => SectionKind::Unknown,
            }
        } else if !self.started && first.starts_with(b"-- MySQL dump") {
            SectionKind::Header
        } else {
            marker_kind(&first).unwrap_or(SectionKind::Unknown)
        };
        self.started = true;
        self.pending.push_front(first);
        self.in_section = true;
        self.section_pos = 0;
        Ok(Some(Section {
            kind,
            tokenizer: self,
        }))
    }
}

/// One dump section: a kind plus a bounded iterator over its lines.
pub struct Section<'t, R> {
    kind: SectionKind,
    tokenizer: &'t mut DumpTokenizer<R>,
}

impl<R: BufRead> Section<'_, R> {
    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        self.tokenizer.section_line()
    }

    /// Read the remaining lines of the section into memory.
    pub fn collect_lines(&mut self) -> Result<Vec<Vec<u8>>> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line()? {
            lines.push(line);
        }
        Ok(lines)
    }

    /// Consume and discard the rest of the section.
    pub fn drain(&mut self) -> Result<()> {
        while self.next_line()?.is_some() {}
        Ok(())
    }
}

impl<R: BufRead> Iterator for Section<'_, R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.tokenizer.section_line().transpose()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const DUMP: &str = "\
-- MySQL dump 10.13  Distrib 5.6.19, for Linux (x86_64)
--
-- Host: localhost    Database: app
-- ------------------------------------------------------
-- Server version\t5.6.19

/*!40101 SET @OLD_CHARACTER_SET_CLIENT=@@CHARACTER_SET_CLIENT */;

--
-- Table structure for table `t`
--

DROP TABLE IF EXISTS `t`;
CREATE TABLE `t` (
  `id` int(11) NOT NULL
) ENGINE=InnoDB DEFAULT CHARSET=latin1;

--
-- Dumping data for table `t`
--

LOCK TABLES `t` WRITE;
INSERT INTO `t` VALUES (1);
UNLOCK TABLES;

-- Dump completed on 2014-07-18
";

    fn kinds_and_lines(input: &str) -> Vec<(SectionKind, Vec<String>)> {
        let mut tokenizer = DumpTokenizer::new(input.as_bytes());
        let mut out = Vec::new();
        while let Some(mut section) = tokenizer.next_section().unwrap() {
            let lines = section
                .collect_lines()
                .unwrap()
                .into_iter()
                .map(|line| String::from_utf8(line).unwrap())
                .collect();
            out.push((section.kind(), lines));
        }
        out
    }

    #[test]
    fn sections_are_bounded_by_banners() {
        let sections = kinds_and_lines(DUMP);
        let kinds: Vec<SectionKind> = sections.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Header,
                SectionKind::TableDefinition,
                SectionKind::TableData,
                SectionKind::Footer,
            ]
        );
        // the marker is always the second line of a banner section
        assert_eq!(
            sections[1].1[1],
            "-- Table structure for table `t`\n"
        );
        assert!(sections[2].1.iter().any(|l| l.starts_with("INSERT INTO")));
    }

    #[test]
    fn reassembling_sections_reproduces_the_dump() {
        let sections = kinds_and_lines(DUMP);
        let rebuilt: String = sections
            .iter()
            .flat_map(|(_, lines)| lines.iter())
            .map(String::as_str)
            .collect();
        assert_eq!(rebuilt, DUMP);
    }

    #[test]
    fn unconsumed_sections_are_drained() {
        let mut tokenizer = DumpTokenizer::new(DUMP.as_bytes());
        let mut kinds = Vec::new();
        while let Some(section) = tokenizer.next_section().unwrap() {
            // never read a single line
            kinds.push(section.kind());
        }
        assert_eq!(kinds.len(), 4);
    }

    #[test]
    fn one_event_per_marker() {
        let sections = kinds_and_lines(DUMP);
        let table_defs = sections
            .iter()
            .filter(|(kind, _)| *kind == SectionKind::TableDefinition)
            .count();
        assert_eq!(table_defs, 1);
    }

    #[test]
    fn identifier_extraction() {
        assert_eq!(
            extract_identifier(b"-- Table structure for table `orders`\n").as_deref(),
            Some("orders")
        );
        assert_eq!(
            extract_identifier(b"-- Current Database: `my-db`\n").as_deref(),
            Some("my-db")
        );
        assert_eq!(extract_identifier(b"-- no identifier here\n"), None);
    }

    #[test]
    fn unknown_leading_garbage() {
        let input = "random line\nmore\n";
        let sections = kinds_and_lines(input);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, SectionKind::Unknown);
        assert_eq!(sections[0].1.len(), 2);
    }
}
