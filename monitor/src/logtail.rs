//! Byte-cursor reads over the append-only message log.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Log line shape: `[HH:MM:SS] message text`. Anything else is ignored.
static MESSAGE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\d{2}:\d{2}:\d{2}\]\s*(.+)").unwrap());

/// Read messages appended since `cursor` and return them with the new
/// cursor. A missing log file is not an error, the file just has not
/// been created yet; the cursor is returned unchanged.
pub fn read_new_messages(path: &Path, cursor: u64) -> std::io::Result<(Vec<String>, u64)> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok((Vec::new(), cursor));
        }
        Err(e) => return Err(e),
    };

    file.seek(SeekFrom::Start(cursor))?;
    let mut tail = String::new();
    let read = file.read_to_string(&mut tail)?;

    let messages = tail
        .lines()
        .filter_map(|line| MESSAGE_LINE.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .collect();

    Ok((messages, cursor + read as u64))
}

/// Current end of the log, to skip history and only watch new messages.
/// Zero if the log does not exist yet.
pub fn log_end_position(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_returns_cursor_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let (messages, cursor) = read_new_messages(&path, 7).unwrap();
        assert!(messages.is_empty());
        assert_eq!(cursor, 7);
        assert_eq!(log_end_position(&path), 0);
    }

    #[test]
    fn parses_timestamped_lines_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(
            &path,
            "[12:00:01] hello world\nnot a message\n[12:00:02]   trailing spaces  \n",
        )
        .unwrap();

        let (messages, cursor) = read_new_messages(&path, 0).unwrap();
        assert_eq!(messages, vec!["hello world", "trailing spaces"]);
        assert_eq!(cursor, log_end_position(&path));
    }

    #[test]
    fn cursor_advances_across_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "[12:00:01] first\n").unwrap();

        let (messages, cursor) = read_new_messages(&path, 0).unwrap();
        assert_eq!(messages, vec!["first"]);

        // Nothing new yet.
        let (messages, cursor) = read_new_messages(&path, cursor).unwrap();
        assert!(messages.is_empty());

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "[12:00:05] second").unwrap();

        let (messages, cursor) = read_new_messages(&path, cursor).unwrap();
        assert_eq!(messages, vec!["second"]);
        assert_eq!(cursor, log_end_position(&path));
    }
}
