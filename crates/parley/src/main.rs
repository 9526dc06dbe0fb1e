// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - headless operator console for AI-assisted chat accounts.
//!
//! This is the binary entry point. Each subcommand drives the same library
//! crates a graphical console would.

mod doctor;
mod edit;
mod inspect;
mod watch;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use parley_config::ParleyConfig;
use parley_console::shutdown::install_signal_handler;
use parley_console::{ConsoleServices, OperatorScope};
use parley_core::{ParleyError, RoomId, RoomRef};
use parley_policy::PolicyStore;
use parley_remote::RemoteServices;

/// Parley - operator console for AI-assisted chat accounts.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Load this configuration file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the accounts within the operator's scope.
    Accounts,
    /// List an account's rooms with their automation state.
    Rooms { account: String },
    /// Print the normalized conversation of one room.
    Messages { account: String, room: String },
    /// Turn automated replies on or off for one room.
    Toggle {
        account: String,
        room: String,
        /// The room is a group chat.
        #[arg(long)]
        group: bool,
        #[arg(long, conflicts_with = "off", required_unless_present = "off")]
        on: bool,
        #[arg(long)]
        off: bool,
    },
    /// Hand an escalated room back to automation.
    Release { account: String, room: String },
    /// Poll an account for new messages until interrupted.
    Watch { account: String },
    /// Check that every remote service answers.
    Doctor,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => parley_config::load_and_validate_path(path),
        None => parley_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.console.log_level);

    match run(cli.command, &config).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("parley: {e}");
            std::process::exit(1);
        }
    }
}

/// Run one command. Returns the process exit code.
async fn run(command: Commands, config: &ParleyConfig) -> Result<i32, ParleyError> {
    let services = console_services(RemoteServices::from_config(&config.remote)?);
    let policy_store = PolicyStore::new(services.variables.clone(), config.policy.write_description.clone());
    let scope = OperatorScope::from_config(&config.scope);
    let mut out = std::io::stdout();

    match command {
        Commands::Accounts => inspect::run_accounts(&services, &scope, &mut out).await?,
        Commands::Rooms { account } => {
            let account = inspect::find_account(&services, &scope, &account).await?;
            inspect::run_rooms(&services, &policy_store, &account, &mut out).await?;
        }
        Commands::Messages { account, room } => {
            let account = inspect::find_account(&services, &scope, &account).await?;
            let room = RoomId(room);
            inspect::run_messages(&services, &config.media, &account, &room, &mut out).await?;
        }
        Commands::Toggle {
            account,
            room,
            group,
            on,
            off: _,
        } => {
            let account = inspect::find_account(&services, &scope, &account).await?;
            let room = RoomRef::new(room.as_str(), group);
            edit::run_toggle(&policy_store, &account, &room, on, &mut out).await?;
        }
        Commands::Release { account, room } => {
            let account = inspect::find_account(&services, &scope, &account).await?;
            edit::run_release(&policy_store, &account, &RoomId(room), &mut out).await?;
        }
        Commands::Watch { account } => {
            let account = inspect::find_account(&services, &scope, &account).await?;
            let interval = Duration::from_millis(config.console.poll_interval_ms);
            watch::run_watch(&services, &account, interval, install_signal_handler()).await;
        }
        Commands::Doctor => {
            if doctor::run_doctor(&services, &mut out).await? > 0 {
                return Ok(1);
            }
        }
    }
    Ok(0)
}

fn console_services(remote: RemoteServices) -> ConsoleServices {
    ConsoleServices {
        directory: remote.directory,
        variables: remote.variables,
        personal: remote.personal,
        official: remote.official,
        workflow: remote.workflow,
    }
}

/// Initialize the tracing subscriber with an env-filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
