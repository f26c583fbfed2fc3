//! bt: command-line client for brotab mediators.
//!
//! Talks to every mediator listening on the configured port range and
//! prints tab lines in the form `prefix.window.tab<TAB>title<TAB>url`.
//!
//! ## Subcommands
//!
//! - `list`: Print all tabs
//! - `move`: Edit the tab list in `$EDITOR` and apply the result
//! - `close`: Close tabs by id (arguments or stdin)
//! - `activate`, `active`: Focus a tab, show focused tabs
//! - `open`, `update`: Open urls, change tab properties (stdin)
//! - `windows`, `clients`, `dup`: Inspection helpers

mod actions;
mod error;
mod logging;
mod mediator_client;
mod mediators;
#[cfg(test)]
mod test_support;

use std::io::{self, Read};

use brotab_core::ClientConfig;
use clap::{Parser, Subcommand};

use crate::error::BtError;
use crate::mediators::Mediators;

#[derive(Parser)]
#[command(name = "bt")]
#[command(about = "Control browser tabs from the command line")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all tabs
    List,

    /// Edit the tab list in $EDITOR; deleted lines close tabs, reordered lines move them
    Move {
        /// Print inferred commands instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Close tabs (ids from arguments, or stdin if none given)
    Close {
        #[arg(value_name = "TAB_ID")]
        tab_ids: Vec<String>,
    },

    /// Activate a tab
    Activate {
        #[arg(value_name = "TAB_ID")]
        tab_id: String,

        /// Also focus the tab's window
        #[arg(long)]
        focused: bool,
    },

    /// Show active tab ids
    Active,

    /// Open urls from stdin, one per line, and print the new tab ids
    Open {
        /// Mediator prefix, optionally with a window id (a or a.1234)
        #[arg(value_name = "PREFIX[.WINDOW]")]
        target: String,
    },

    /// Update tabs from a JSON array on stdin
    Update,

    /// Show tab counts per window
    Windows,

    /// Show connected mediators
    Clients,

    /// Show shell recipes for closing duplicate tabs
    Dup,
}

fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("bt: {}", err);
            std::process::exit(1);
        }
    };
    let _logging_guard = logging::init(&config);

    if let Err(err) = run(cli.command, &config) {
        tracing::error!(error = %err, "bt failed");
        eprintln!("bt: {}", err);
        std::process::exit(err.exit_code());
    }
}

fn run(command: Commands, config: &ClientConfig) -> Result<(), BtError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::List => actions::list(&discover(config)?, &mut out),
        Commands::Move { dry_run } => {
            actions::move_tabs(&discover(config)?, config, dry_run, &mut out)
        }
        Commands::Close { tab_ids } => {
            let input = if tab_ids.is_empty() {
                read_stdin()?
            } else {
                String::new()
            };
            actions::close(&discover(config)?, &tab_ids, &input)
        }
        Commands::Activate { tab_id, focused } => {
            actions::activate(&discover(config)?, &tab_id, focused)
        }
        Commands::Active => actions::active(&discover(config)?, &mut out),
        Commands::Open { target } => {
            let input = read_stdin()?;
            actions::open(&discover(config)?, &target, &input, &mut out)
        }
        Commands::Update => {
            let input = read_stdin()?;
            actions::update(&discover(config)?, &input, &mut out)
        }
        Commands::Windows => actions::windows(&discover(config)?, &mut out),
        Commands::Clients => actions::clients(&discover(config)?, &mut out),
        Commands::Dup => actions::duplicates(&mut out),
    }
}

/// Probes the configured port range. `dup` never calls this.
fn discover(config: &ClientConfig) -> Result<Mediators, BtError> {
    let mediators = Mediators::discover(config)?;
    if mediators.is_empty() {
        tracing::warn!(
            ports = ?config.mediator_ports(),
            "No mediators found"
        );
    }
    Ok(mediators)
}

fn read_stdin() -> Result<String, BtError> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|source| BtError::Io {
            context: "read stdin",
            source,
        })?;
    Ok(input)
}
