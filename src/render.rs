// Listing output

use crate::error::{Result, ResultExt};
use crate::task::Task;
use colored::Colorize;
use std::io::{self, Write};

pub const ALL_DONE: &str = "all done!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// How a listing is rendered. Passed explicitly to `render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Style ordinals and the empty-list line. `colored` still drops the
    /// escapes when stdout is not a terminal or `NO_COLOR` is set.
    pub color: bool,
    pub format: OutputFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Text,
        }
    }
}

impl DisplayConfig {
    pub fn plain() -> Self {
        Self {
            color: false,
            format: OutputFormat::Text,
        }
    }
}

/// Write `tasks` to `out`: one `"<ordinal>. <title>"` line per task, or a
/// single "all done!" line when there are none.
pub fn render<W: Write>(tasks: &[Task], config: &DisplayConfig, out: &mut W) -> Result<()> {
    let written = match config.format {
        OutputFormat::Json => render_json(tasks, out),
        OutputFormat::Text => render_text(tasks, config.color, out),
    };
    written.file_context("Failed to write listing")
}

fn render_text<W: Write>(tasks: &[Task], color: bool, out: &mut W) -> io::Result<()> {
    if tasks.is_empty() {
        if color {
            writeln!(out, "{}", ALL_DONE.green())?;
        } else {
            writeln!(out, "{}", ALL_DONE)?;
        }
        return Ok(());
    }

    for task in tasks {
        let ordinal = format!("{}.", task.ordinal);
        if color {
            writeln!(out, "{} {}", ordinal.green().bold(), task.title)?;
        } else {
            writeln!(out, "{} {}", ordinal, task.title)?;
        }
    }
    Ok(())
}

fn render_json<W: Write>(tasks: &[Task], out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, tasks)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(tasks: &[Task], config: &DisplayConfig) -> String {
        let mut out = Vec::new();
        render(tasks, config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_empty_is_all_done() {
        assert_eq!(render_to_string(&[], &DisplayConfig::plain()), "all done!\n");
    }

    #[test]
    fn test_render_tasks() {
        let tasks = Task::number(["first todo", "second todo"]);
        assert_eq!(
            render_to_string(&tasks, &DisplayConfig::plain()),
            "1. first todo\n2. second todo\n"
        );
    }

    #[test]
    fn test_render_colored_keeps_text() {
        let tasks = Task::number(["first todo"]);
        let output = render_to_string(&tasks, &DisplayConfig::default());
        assert!(output.contains("1."));
        assert!(output.ends_with(" first todo\n"));
    }

    #[test]
    fn test_render_json() {
        let config = DisplayConfig {
            color: true,
            format: OutputFormat::Json,
        };
        let output = render_to_string(&Task::number(["a"]), &config);
        let parsed: Vec<Task> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, Task::number(["a"]));

        let empty = render_to_string(&[], &config);
        assert_eq!(empty.trim(), "[]");
    }
}
