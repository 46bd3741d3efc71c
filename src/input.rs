use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::ExtractionError;

pub const DEFAULT_BUFFER_SIZE: usize = 65536; // 64KB

/// Read every line from a buffered reader, dropping a trailing `\r`
pub fn read_lines<R: BufRead>(input: R) -> Result<Vec<String>, ExtractionError> {
    let mut lines = Vec::new();
    for line_result in input.lines() {
        let mut line = line_result?;
        if line.ends_with('\r') {
            line.pop();
        }
        lines.push(line);
    }
    Ok(lines)
}

/// Read lines from a file, or from stdin when no path is given
pub fn read_input(path: Option<&Path>, buffer_size: usize) -> Result<Vec<String>, ExtractionError> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ExtractionError::FileNotFound(path.to_path_buf()),
                _ => ExtractionError::IoError(e),
            })?;
            read_lines(BufReader::with_capacity(buffer_size, file))
        }
        None => read_lines(BufReader::with_capacity(buffer_size, io::stdin())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_lines_strips_carriage_returns() {
        let lines = read_lines(Cursor::new("one\r\ntwo\n\nthree")).unwrap();
        assert_eq!(lines, vec!["one", "two", "", "three"]);
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "alpha").unwrap();
        writeln!(file, "beta").unwrap();

        let lines = read_input(Some(file.path()), DEFAULT_BUFFER_SIZE).unwrap();
        assert_eq!(lines, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_missing_file() {
        let err = read_input(Some(Path::new("/definitely/not/here.log")), 1024).unwrap_err();
        assert!(matches!(err, ExtractionError::FileNotFound(_)));
        assert!(err.to_string().contains("not/here.log"));
    }
}
