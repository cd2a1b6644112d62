//! Subcommand implementations.

pub mod challenge;
pub mod client;
pub mod init;
pub mod schema;

use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use crate::format::OutputContext;

/// Route the parsed command line to its implementation.
///
/// # Errors
///
/// Returns whatever the selected command returns.
pub fn dispatch(cli: &Cli, settings: &Settings, ctx: &OutputContext) -> Result<()> {
    match &cli.command {
        Commands::Init(args) => init::execute(args, settings, ctx),
        Commands::Challenge { command } => challenge::execute(command, settings, ctx),
        Commands::Client { command } => client::execute(command, settings, ctx),
        Commands::Schema(args) => schema::execute(args, ctx),
    }
}
