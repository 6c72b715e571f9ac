//! Line source over a usage log file.
//!
//! Lines are read as raw bytes and converted lossily, so a stray invalid UTF-8 sequence
//! only affects the line it appears on. The file handle is owned by the iterator and is
//! released when it is dropped, whether or not the log was fully consumed.

use crate::error::{Result, UsageError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const READ_BUFFER_BYTES: usize = 64 * 1024;

pub struct LineSource {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    failed: bool,
}

impl LineSource {
    /// Open `path` for reading. Fails with [`UsageError::SourceUnavailable`].
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| UsageError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::with_capacity(READ_BUFFER_BYTES, file),
            buf: Vec::new(),
            failed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for LineSource {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(source) => {
                self.failed = true;
                Some(Err(UsageError::SourceRead {
                    path: self.path.clone(),
                    source,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lines_of(content: &[u8]) -> Vec<String> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        LineSource::open(file.path())
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_yields_each_line_including_blank() {
        assert_eq!(lines_of(b"a\n\nb\r\nc"), vec!["a", "", "b", "c"]);
    }

    #[test]
    fn test_empty_file_yields_nothing() {
        assert!(lines_of(b"").is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let lines = lines_of(b"ok\n\xff\xfe audio_tokens\n");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(" audio_tokens"));
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.log");
        match LineSource::open(&missing) {
            Err(UsageError::SourceUnavailable { path, .. }) => assert_eq!(path, missing),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opening a missing file should fail"),
        }
    }
}
