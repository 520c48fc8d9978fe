//! Persistent log file support for unattended runs.
//!
//! The file is rotated at startup once it has grown past `max_bytes`:
//! `netbackup.log` becomes `netbackup.log.1`, `.1` becomes `.2`, and so on,
//! keeping at most `keep` old files.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Rotation threshold used by the command line.
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Number of rotated files kept by the command line.
pub const DEFAULT_KEEP: usize = 5;

fn rotated(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Open `path` for appending, rotating it first if it is too large.
pub fn open_log_file(path: &Path, max_bytes: u64, keep: usize) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let oversized = std::fs::metadata(path).is_ok_and(|meta| meta.len() >= max_bytes);
    if oversized {
        if keep == 0 {
            std::fs::remove_file(path)?;
        } else {
            for index in (1..keep).rev() {
                let from = rotated(path, index);
                if from.exists() {
                    std::fs::rename(&from, rotated(path, index + 1))?;
                }
            }
            std::fs::rename(path, rotated(path, 1))?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Writer duplicating log output to stderr and a file.
pub struct Tee {
    file: File,
}

impl Tee {
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_below_threshold() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("netbackup.log");
        std::fs::write(&path, b"old\n").unwrap();

        let mut file = open_log_file(&path, 1024, 5).unwrap();
        file.write_all(b"new\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\nnew\n");
        assert!(!rotated(&path, 1).exists());
    }

    #[test]
    fn test_rotates_and_caps_old_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs").join("netbackup.log");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"current run\n").unwrap();
        std::fs::write(rotated(&path, 1), b"one\n").unwrap();
        std::fs::write(rotated(&path, 2), b"two\n").unwrap();

        let mut file = open_log_file(&path, 4, 2).unwrap();
        file.write_all(b"fresh\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
        assert_eq!(std::fs::read_to_string(rotated(&path, 1)).unwrap(), "current run\n");
        assert_eq!(std::fs::read_to_string(rotated(&path, 2)).unwrap(), "one\n");
        assert!(!rotated(&path, 3).exists());
    }

    #[test]
    fn test_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("var").join("netbackup.log");

        let mut tee = Tee::new(open_log_file(&path, DEFAULT_MAX_BYTES, DEFAULT_KEEP).unwrap());
        tee.write_all(b"backup complete: success 1/1\n").unwrap();
        tee.flush().unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "backup complete: success 1/1\n"
        );
    }
}
