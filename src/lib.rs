//! Offline MySQL tooling.
//!
//! Two independent cores that never talk to a server:
//!
//! - [`frm`] reads MySQL's legacy binary `.frm` table-definition files and
//!   reconstructs the `CREATE TABLE` statement they describe.
//! - [`split`] streams `mysqldump` output and partitions it into
//!   per-database, per-table files, optionally deferring secondary index
//!   creation to a post-load `ALTER TABLE`.

pub mod error;
pub mod frm;
pub mod split;

pub use error::{Error, Result};
