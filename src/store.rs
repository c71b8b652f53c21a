// Ordinal-addressed store trait and backend selection

use crate::config::{Backend, Config};
use crate::error::Result;
use crate::file_store::{FileOptions, FileStore};
use crate::sqlite_store::SqliteStore;
use crate::task::{RemoveSpec, Task};
use tracing::debug;

/// An ordered list of task titles addressed by 1-based position.
///
/// Ordinals are derived from the backing order on every call and are not
/// stable across mutations: removing ordinal 1 makes the old ordinal 2 the
/// new ordinal 1.
pub trait TodoStore {
    /// Read the full list from the backing store
    fn list(&mut self) -> Result<Vec<Task>>;

    /// Append a task after all existing ones, returning its ordinal
    fn append(&mut self, title: &str) -> Result<usize>;

    /// Remove the tasks selected by `spec`, keeping survivors in their
    /// original relative order. Returns the number of tasks left.
    fn remove(&mut self, spec: &RemoveSpec) -> Result<usize>;

    /// Remove every task
    fn clear(&mut self) -> Result<()> {
        self.remove(&RemoveSpec::All)?;
        Ok(())
    }

    fn len(&mut self) -> Result<usize> {
        Ok(self.list()?.len())
    }

    fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Partition items into those kept and those removed, numbering from 1 in
/// the order given. Every backend computes removals through this so that
/// remove and list agree on ordinals.
pub fn survivors<I, T>(items: I, spec: &RemoveSpec) -> (Vec<T>, Vec<T>)
where
    I: IntoIterator<Item = T>,
{
    let mut kept = Vec::new();
    let mut removed = Vec::new();

    for (i, item) in items.into_iter().enumerate() {
        if spec.matches(i + 1) {
            removed.push(item);
        } else {
            kept.push(item);
        }
    }

    (kept, removed)
}

/// Open the store selected by `config`
pub fn open_store(config: &Config) -> Result<Box<dyn TodoStore>> {
    let path = config.data_path()?;
    debug!(?path, backend = ?config.backend, "open_store: called");

    match config.backend {
        Backend::File => {
            let options = FileOptions {
                lock: config.lock,
                rewrite: config.rewrite,
            };
            Ok(Box::new(FileStore::open(path, options)?))
        }
        Backend::Sqlite => Ok(Box::new(SqliteStore::open(path)?)),
    }
}
