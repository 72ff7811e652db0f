//! Output plumbing: every file is written through a user-supplied filter
//! command (`gzip -1` by default) whose stdout is redirected to the target
//! file. The child's lifetime brackets the write; it is always awaited,
//! including on write failure.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Extension implied by the first word of the filter command.
pub fn cmd_to_ext(cmd: &str) -> &'static str {
    match cmd.split_whitespace().next().unwrap_or_default() {
        "gzip" | "pigz" => ".gz",
        "bzip2" | "pbzip2" => ".bz2",
        "lzop" => ".lzo",
        "xz" => ".xz",
        "lzma" => ".lzma",
        _ => "",
    }
}

/// Target path with the filter extension appended.
pub fn path_with_ext(path: &Path, cmd: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(cmd_to_ext(cmd));
    PathBuf::from(name)
}

/// Run `cmd` through the shell with its stdout redirected to `path`
/// (plus the command's extension), feeding it whatever `feed` writes.
/// The child is awaited on every path; a non-zero exit or failed spawn is
/// [`Error::FilterCommandFailed`].
pub fn write_through(
    cmd: &str,
    path: &Path,
    append: bool,
    feed: impl FnOnce(&mut dyn Write) -> Result<()>,
) -> Result<()> {
    let target = path_with_ext(path, cmd);
    let file = if append {
        OpenOptions::new().create(true).append(true).open(&target)?
    } else {
        File::create(&target)?
    };

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::piped())
        .stdout(Stdio::from(file))
        .spawn()
        .map_err(|err| Error::FilterCommandFailed {
            command: cmd.to_string(),
            reason: format!("failed to spawn: {err}"),
        })?;

    let feed_result = match child.stdin.take() {
        Some(mut stdin) => {
            let result = feed(&mut stdin);
            drop(stdin);
            result
        }
        None => Err(Error::FilterCommandFailed {
            command: cmd.to_string(),
            reason: "no stdin pipe".to_string(),
        }),
    };

    let status = child.wait()?;
    if !status.success() {
        return Err(Error::FilterCommandFailed {
            command: cmd.to_string(),
            reason: format!("exited with {status}"),
        });
    }
    feed_result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn command_extensions() {
        assert_eq!(cmd_to_ext("gzip -1"), ".gz");
        assert_eq!(cmd_to_ext("pigz -p4"), ".gz");
        assert_eq!(cmd_to_ext("pbzip2"), ".bz2");
        assert_eq!(cmd_to_ext("xz -9"), ".xz");
        assert_eq!(cmd_to_ext("lzop"), ".lzo");
        assert_eq!(cmd_to_ext("lzma"), ".lzma");
        assert_eq!(cmd_to_ext("cat"), "");
        assert_eq!(cmd_to_ext(""), "");
    }

    #[test]
    fn writes_stream_through_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sql");
        write_through("cat", &path, false, |out| {
            out.write_all(b"hello ")?;
            out.write_all(b"world\n")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello world\n");
    }

    #[test]
    fn append_mode_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("views.sql");
        write_through("cat", &path, false, |out| {
            out.write_all(b"one\n").map_err(Into::into)
        })
        .unwrap();
        write_through("cat", &path, true, |out| {
            out.write_all(b"two\n").map_err(Into::into)
        })
        .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn failing_command_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.sql");
        let err = write_through("false", &path, false, |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::FilterCommandFailed { .. }));
    }
}
