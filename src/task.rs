// Task values and removal requests

use crate::error::{Result, TodoError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A task as seen by one listing: its title and the 1-based position it
/// currently occupies. The ordinal is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub ordinal: usize,
    pub title: String,
}

impl Task {
    /// Number a sequence of titles from 1 in the order given
    pub fn number<I, S>(titles: I) -> Vec<Task>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        titles
            .into_iter()
            .enumerate()
            .map(|(i, title)| Task {
                ordinal: i + 1,
                title: title.into(),
            })
            .collect()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.ordinal, self.title)
    }
}

/// What a remove operation should cross off
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveSpec {
    /// Truncate the list
    All,
    /// Remove tasks at these ordinals; ordinals with no task are ignored
    Specific(BTreeSet<usize>),
}

impl RemoveSpec {
    /// Parse ordinal tokens from the command line.
    ///
    /// No tokens means remove everything. Every token must be a base-10
    /// integer; zero and negative values are accepted but never match a task.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        if tokens.is_empty() {
            return Ok(RemoveSpec::All);
        }

        let mut ordinals = BTreeSet::new();
        for token in tokens {
            let token = token.as_ref();
            let value: i64 = token
                .trim()
                .parse()
                .map_err(|_| TodoError::Validation(format!("Invalid ordinal '{}': not an integer", token)))?;

            if let Ok(ordinal) = usize::try_from(value)
                && ordinal > 0
            {
                ordinals.insert(ordinal);
            }
        }

        Ok(RemoveSpec::Specific(ordinals))
    }

    pub fn ordinals<I: IntoIterator<Item = usize>>(ordinals: I) -> Self {
        RemoveSpec::Specific(ordinals.into_iter().collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, RemoveSpec::All)
    }

    /// Whether the task at `ordinal` is to be removed
    pub fn matches(&self, ordinal: usize) -> bool {
        match self {
            RemoveSpec::All => true,
            RemoveSpec::Specific(ordinals) => ordinals.contains(&ordinal),
        }
    }
}

/// Validate a title before it is written
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TodoError::Validation("Task title cannot be empty".to_string()));
    }
    if title.contains(['\n', '\r']) {
        return Err(TodoError::Validation(
            "Task title cannot contain a line break".to_string(),
        ));
    }
    Ok(())
}
