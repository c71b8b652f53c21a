// Newline-delimited text file backend

use crate::config::RewriteMode;
use crate::error::{Result, ResultExt};
use crate::store::{TodoStore, survivors};
use crate::task::{RemoveSpec, Task, validate_title};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// Hold an advisory lock on `<file>.lock` for the duration of each operation
    pub lock: bool,
    pub rewrite: RewriteMode,
}

/// Task list stored as one title per line, each terminated by `\n`.
///
/// Blank lines are skipped when reading and are dropped by the next rewrite.
/// Concurrent invocations against the same file are not coordinated unless
/// `FileOptions::lock` is set; without it a remove can clobber a concurrent
/// append.
pub struct FileStore {
    path: PathBuf,
    file: File,
    options: FileOptions,
}

/// Advisory lock held until dropped
struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = ?e, "Failed to release todo file lock");
        }
    }
}

impl FileStore {
    /// Open the todo file, creating an empty one if it doesn't exist.
    ///
    /// The containing directory must already exist.
    pub fn open<P: AsRef<Path>>(path: P, options: FileOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = Self::open_file(&path)?;
        debug!(?path, ?options, "Opened todo file");

        Ok(Self { path, file, options })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_file(path: &Path) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .file_context(format!("Failed to open todo file {}", path.display()))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn lock(&self, exclusive: bool) -> Result<Option<LockGuard>> {
        if !self.options.lock {
            return Ok(None);
        }

        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .file_context(format!("Failed to open lock file {}", lock_path.display()))?;

        let locked = if exclusive {
            file.lock_exclusive()
        } else {
            FileExt::lock_shared(&file)
        };
        locked.file_context("Failed to acquire file lock")?;

        Ok(Some(LockGuard { file }))
    }

    /// Read every line from the start of the file.
    ///
    /// Returns the non-blank lines and whether the file ends without a newline.
    fn read_lines(&mut self) -> Result<(Vec<String>, bool)> {
        self.file.seek(SeekFrom::Start(0)).file_context("Failed to seek todo file")?;

        let mut reader = BufReader::new(&self.file);
        let mut lines = Vec::new();
        let mut unterminated = false;
        let mut buf = String::new();

        loop {
            buf.clear();
            let n = reader.read_line(&mut buf).file_context("Failed to read todo file")?;
            if n == 0 {
                break;
            }

            unterminated = !buf.ends_with('\n');
            let line = buf.trim_end_matches('\n').trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            lines.push(line.to_string());
        }

        Ok((lines, unterminated))
    }

    fn rewrite(&mut self, lines: &[String]) -> Result<()> {
        let content: String = lines.iter().map(|line| format!("{}\n", line)).collect();

        match self.options.rewrite {
            RewriteMode::Truncate => {
                // Not crash safe: a failure after set_len loses every task
                self.file.set_len(0).file_context("Failed to truncate todo file")?;
                self.file.seek(SeekFrom::Start(0)).file_context("Failed to seek todo file")?;
                self.file
                    .write_all(content.as_bytes())
                    .file_context("Failed to write todo file")?;
                self.file.sync_all().file_context("Failed to sync todo file")?;
            }
            RewriteMode::Atomic => {
                let tmp_path = self.tmp_path();
                let result = self.write_and_rename(&tmp_path, &content);
                if result.is_err() && tmp_path.exists() {
                    let _ = fs::remove_file(&tmp_path);
                }
                result?;
                self.file = Self::open_file(&self.path)?;
            }
        }

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".tmp.{}", std::process::id()));
        self.path.with_file_name(name)
    }

    fn write_and_rename(&self, tmp_path: &Path, content: &str) -> Result<()> {
        let mut tmp = File::create(tmp_path).file_context(format!("Failed to create {}", tmp_path.display()))?;
        tmp.write_all(content.as_bytes())
            .file_context("Failed to write temporary todo file")?;
        tmp.sync_all().file_context("Failed to sync temporary todo file")?;

        let permissions = self
            .file
            .metadata()
            .file_context("Failed to read todo file metadata")?
            .permissions();
        fs::set_permissions(tmp_path, permissions).file_context("Failed to copy todo file permissions")?;

        fs::rename(tmp_path, &self.path).file_context("Failed to replace todo file")?;
        Ok(())
    }
}

impl TodoStore for FileStore {
    fn list(&mut self) -> Result<Vec<Task>> {
        let _guard = self.lock(false)?;
        let (lines, _) = self.read_lines()?;
        Ok(Task::number(lines))
    }

    fn append(&mut self, title: &str) -> Result<usize> {
        validate_title(title)?;

        let _guard = self.lock(true)?;
        let (lines, unterminated) = self.read_lines()?;

        let mut entry = String::with_capacity(title.len() + 2);
        if unterminated {
            entry.push('\n');
        }
        entry.push_str(title);
        entry.push('\n');

        self.file.seek(SeekFrom::End(0)).file_context("Failed to seek todo file")?;
        self.file
            .write_all(entry.as_bytes())
            .file_context("Failed to append to todo file")?;
        self.file.sync_all().file_context("Failed to sync todo file")?;

        let ordinal = lines.len() + 1;
        debug!(path = ?self.path, ordinal, "Appended task");
        Ok(ordinal)
    }

    fn remove(&mut self, spec: &RemoveSpec) -> Result<usize> {
        let _guard = self.lock(true)?;

        if spec.is_all() {
            self.rewrite(&[])?;
            info!(path = ?self.path, "Cleared todo file");
            return Ok(0);
        }

        let (lines, _) = self.read_lines()?;
        let (kept, removed) = survivors(lines, spec);

        if removed.is_empty() {
            debug!(?spec, "No tasks matched, leaving file untouched");
            return Ok(kept.len());
        }

        self.rewrite(&kept)?;
        info!(path = ?self.path, removed = removed.len(), remaining = kept.len(), "Removed tasks");
        Ok(kept.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TodoError;
    use tempfile::TempDir;

    fn open(temp: &TempDir, options: FileOptions) -> FileStore {
        FileStore::open(temp.path().join("todos.txt"), options).unwrap()
    }

    #[test]
    fn test_open_creates_empty_file() {
        let temp = TempDir::new().unwrap();
        let mut store = open(&temp, FileOptions::default());

        let path = temp.path().join("todos.txt");
        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let result = FileStore::open(temp.path().join("missing/todos.txt"), FileOptions::default());
        assert!(matches!(result, Err(TodoError::File { .. })));
    }

    #[test]
    fn test_open_keeps_existing_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("todos.txt");
        fs::write(&path, "first todo\nsecond todo\n").unwrap();

        let mut store = FileStore::open(&path, FileOptions::default()).unwrap();
        assert_eq!(store.list().unwrap(), Task::number(["first todo", "second todo"]));
    }

    #[test]
    fn test_append_writes_line() {
        let temp = TempDir::new().unwrap();
        let mut store = open(&temp, FileOptions::default());

        assert_eq!(store.append("buy milk").unwrap(), 1);
        assert_eq!(store.append("walk dog").unwrap(), 2);

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "buy milk\nwalk dog\n");
    }

    #[test]
    fn test_append_after_unterminated_line() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("todos.txt");
        fs::write(&path, "hand edited").unwrap();

        let mut store = FileStore::open(&path, FileOptions::default()).unwrap();
        assert_eq!(store.append("next").unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hand edited\nnext\n");
    }

    #[test]
    fn test_list_skips_blank_lines_and_crlf() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("todos.txt");
        fs::write(&path, "a\r\n\n  \nb\n").unwrap();

        let mut store = FileStore::open(&path, FileOptions::default()).unwrap();
        assert_eq!(store.list().unwrap(), Task::number(["a", "b"]));

        // Ordinals used by remove agree with the listing
        assert_eq!(store.remove(&RemoveSpec::ordinals([2])).unwrap(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\n");
    }

    #[test]
    fn test_list_reflects_external_changes() {
        let temp = TempDir::new().unwrap();
        let mut store = open(&temp, FileOptions::default());
        store.append("a").unwrap();

        fs::write(store.path(), "x\ny\n").unwrap();
        assert_eq!(store.list().unwrap(), Task::number(["x", "y"]));
    }

    #[test]
    fn test_remove_rewrites_survivors_in_order() {
        let temp = TempDir::new().unwrap();
        let mut store = open(&temp, FileOptions::default());
        for title in ["a", "b", "c", "d"] {
            store.append(title).unwrap();
        }

        assert_eq!(store.remove(&RemoveSpec::ordinals([1, 3])).unwrap(), 2);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "b\nd\n");

        // Appending after a rewrite goes to the end, not the old offset
        store.append("e").unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "b\nd\ne\n");
    }

    #[test]
    fn test_remove_unmatched_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("todos.txt");
        fs::write(&path, "only\n\n").unwrap();

        let mut store = FileStore::open(&path, FileOptions::default()).unwrap();
        assert_eq!(store.remove(&RemoveSpec::ordinals([5])).unwrap(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "only\n\n");
    }

    #[test]
    fn test_remove_all_truncates() {
        let temp = TempDir::new().unwrap();
        let mut store = open(&temp, FileOptions::default());
        store.append("a").unwrap();
        store.append("b").unwrap();

        assert_eq!(store.remove(&RemoveSpec::All).unwrap(), 0);
        assert_eq!(fs::metadata(store.path()).unwrap().len(), 0);
    }

    #[test]
    fn test_atomic_rewrite_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let options = FileOptions {
            lock: false,
            rewrite: RewriteMode::Atomic,
        };
        let mut store = open(&temp, options);
        for title in ["a", "b", "c"] {
            store.append(title).unwrap();
        }

        assert_eq!(store.remove(&RemoveSpec::ordinals([2])).unwrap(), 2);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "a\nc\n");

        let entries: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["todos.txt".to_string()]);

        // The reopened handle keeps working
        store.append("d").unwrap();
        assert_eq!(store.list().unwrap(), Task::number(["a", "c", "d"]));
    }

    #[test]
    fn test_lock_uses_sidecar_file() {
        let temp = TempDir::new().unwrap();
        let options = FileOptions {
            lock: true,
            rewrite: RewriteMode::Truncate,
        };
        let mut store = open(&temp, options);
        store.append("locked").unwrap();

        assert!(temp.path().join("todos.txt.lock").exists());

        // The lock is released after each operation
        let mut other = open(&temp, options);
        assert_eq!(other.append("second").unwrap(), 2);
        assert_eq!(store.list().unwrap(), Task::number(["locked", "second"]));
    }

    #[test]
    fn test_invalid_utf8_is_file_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("todos.txt");
        fs::write(&path, [0xff, 0xfe, b'\n']).unwrap();

        let mut store = FileStore::open(&path, FileOptions::default()).unwrap();
        assert!(matches!(store.list(), Err(TodoError::File { .. })));
    }
}
