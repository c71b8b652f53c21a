// One operation per invocation, followed by a fresh listing

use crate::error::Result;
use crate::render::{DisplayConfig, render};
use crate::store::TodoStore;
use crate::task::{RemoveSpec, Task};
use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add { title: String },
    /// Raw ordinal tokens; none means remove everything
    Remove { ordinals: Vec<String> },
}

/// Perform `command` and return the list as it stands afterwards.
///
/// Ordinal tokens are parsed before the store is touched, so a bad token
/// leaves the backing file exactly as it was.
pub fn execute(store: &mut dyn TodoStore, command: &Command) -> Result<Vec<Task>> {
    debug!(?command, "execute: called");

    match command {
        Command::List => {}
        Command::Add { title } => {
            store.append(title)?;
        }
        Command::Remove { ordinals } => {
            let spec = RemoveSpec::parse(ordinals.as_slice())?;
            store.remove(&spec)?;
        }
    }

    store.list()
}

/// Execute `command` and render the resulting list to `out`
pub fn run<W: Write>(store: &mut dyn TodoStore, command: &Command, display: &DisplayConfig, out: &mut W) -> Result<()> {
    let tasks = execute(store, command)?;
    render(&tasks, display, out)
}
