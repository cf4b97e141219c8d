//! JSONL import source: one issue per line.
//!
//! The interchange format exported by beads-style trackers. Blank lines and
//! `#` comments are skipped; everything else must parse as an [`Issue`].

use crate::issue::Issue;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read issues from a JSONL reader.
pub fn read_issues(reader: impl BufRead) -> Result<Vec<Issue>, JsonlError> {
    let mut issues = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| JsonlError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let issue: Issue = serde_json::from_str(trimmed)
            .map_err(|e| JsonlError::Parse(line_no + 1, e.to_string()))?;
        issues.push(issue);
    }
    Ok(issues)
}

/// Read issues from a JSONL file path.
pub fn read_issues_from_path(path: impl AsRef<Path>) -> Result<Vec<Issue>, JsonlError> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).map_err(|e| JsonlError::Io(0, format!("{}: {e}", path.display())))?;
    validate_source_bytes(path, &bytes)?;
    let reader = BufReader::new(bytes.as_slice());
    read_issues(reader)
}

fn validate_source_bytes(path: &Path, bytes: &[u8]) -> Result<(), JsonlError> {
    if bytes.contains(&0) {
        return Err(JsonlError::Corrupt(format!(
            "{}: contains NUL byte(s)",
            path.display()
        )));
    }
    if std::str::from_utf8(bytes).is_err() {
        return Err(JsonlError::Corrupt(format!(
            "{}: contains non-UTF-8 byte sequence(s)",
            path.display()
        )));
    }
    Ok(())
}

/// Errors from JSONL operations.
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("corrupted source: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Status;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "quarry-jsonl-{prefix}-{}-{unique}.jsonl",
            std::process::id()
        ))
    }

    #[test]
    fn read_issues_skips_blank_and_comment_lines() {
        let raw = "# exported\n\n{\"id\":\"bd-1\",\"title\":\"One\"}\n  \n{\"id\":\"bd-2\",\"title\":\"Two\",\"status\":\"closed\"}\n";
        let issues = read_issues(std::io::Cursor::new(raw)).expect("jsonl should parse");
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[1].status, Status::Closed);
    }

    #[test]
    fn read_issues_reports_the_failing_line() {
        let raw = "{\"id\":\"bd-1\",\"title\":\"One\"}\n{not json}\n";
        match read_issues(std::io::Cursor::new(raw)) {
            Err(JsonlError::Parse(line, _)) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn read_issues_from_path_rejects_nul_payload() {
        let path = temp_path("nul");
        fs::write(
            &path,
            b"{\"id\":\"bd-1\",\"title\":\"Issue\",\"status\":\"open\"}\n\0garbage",
        )
        .expect("fixture should write");

        let result = read_issues_from_path(&path);
        match result {
            Err(JsonlError::Corrupt(message)) => {
                assert!(message.contains("contains NUL"));
            }
            other => panic!("expected corrupt source error, got {other:?}"),
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn read_issues_from_path_rejects_non_utf8_payload() {
        let path = temp_path("non-utf8");
        fs::write(&path, [0xff, 0xfe, 0xfd]).expect("fixture should write");

        let result = read_issues_from_path(&path);
        match result {
            Err(JsonlError::Corrupt(message)) => {
                assert!(message.contains("non-UTF-8"));
            }
            other => panic!("expected corrupt source error, got {other:?}"),
        }

        let _ = fs::remove_file(path);
    }
}
