use clap::{ArgAction, Parser, Subcommand};
use eyre::{Context, Result};
use std::io;
use std::path::PathBuf;
use todolist::{Backend, Command, Config, DisplayConfig, OutputFormat, RewriteMode};
use tracing::Level;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "A todo list addressed by line number")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/todo/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Todo file (default: ~/dev/todo/todos.txt)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Storage backend
    #[arg(short, long, global = true, value_enum)]
    backend: Option<Backend>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print the list as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Hold an advisory lock on the todo file while it is read or written
    #[arg(long, global = true)]
    lock: bool,

    /// Replace the todo file via a temporary file and rename on remove
    #[arg(long, global = true)]
    atomic: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all todo items
    Ls,

    /// Add a todo item
    Add {
        /// Title of the todo item; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Complete one or more todo items. If no numbers are provided, complete all todo items
    Rm {
        /// Numbers of the todo items to complete
        #[arg(allow_negative_numbers = true)]
        numbers: Vec<String>,
    },
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref()).context("Failed to load config")?;

        if let Some(path) = &self.file {
            config.path = Some(path.clone());
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if self.no_color {
            config.color = false;
        }
        if self.lock {
            config.lock = true;
        }
        if self.atomic {
            config.rewrite = RewriteMode::Atomic;
        }

        Ok(config)
    }

    fn display(&self, config: &Config) -> DisplayConfig {
        DisplayConfig {
            color: config.color,
            format: if self.json { OutputFormat::Json } else { OutputFormat::Text },
        }
    }

    fn to_command(&self) -> Command {
        match &self.command {
            Commands::Ls => Command::List,
            Commands::Add { title } => Command::Add { title: title.join(" ") },
            Commands::Rm { numbers } => Command::Remove {
                ordinals: numbers.clone(),
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing; stdout is reserved for the listing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let config = cli.config()?;
    let display = cli.display(&config);

    let mut store = todolist::open_store(&config).context("Failed to open todo store")?;
    let mut stdout = io::stdout().lock();
    todolist::run(store.as_mut(), &cli.to_command(), &display, &mut stdout)?;

    Ok(())
}
