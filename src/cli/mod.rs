//! Command-line interface for `boostme`.
//!
//! Global flags feed [`CliOverrides`](crate::config::CliOverrides); each
//! subcommand lives in its own module under [`commands`].

pub mod commands;

use crate::config::CliOverrides;
use crate::model::AttributeInput;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Challenge catalog and client directory.
#[derive(Parser, Debug)]
#[command(name = "boostme")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database DSN (e.g. `sqlite:///boostme.db`, `sqlite:///:memory:`)
    #[arg(long, global = true, value_name = "DSN")]
    pub db: Option<String>,

    /// Project config file (defaults to ./boostme.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Configuration profile: development, testing or production
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Emit `{message, data}` JSON envelopes
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress success output and non-error logs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write JSON logs to this file
    #[arg(long, global = true, value_name = "PATH", env = "BOOSTME_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration overrides taken from the global flags.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            db_url: self.db.clone(),
            config: self.config.clone(),
            profile: self.profile.clone(),
            seed: match &self.command {
                Commands::Init(args) if args.no_seed => Some(false),
                _ => None,
            },
            ..CliOverrides::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the schema and seed the catalog
    Init(InitArgs),

    /// Manage the challenge catalog
    Challenge {
        #[command(subcommand)]
        command: ChallengeCommand,
    },

    /// Manage the client directory
    Client {
        #[command(subcommand)]
        command: ClientCommand,
    },

    /// Print JSON Schemas for the output types
    Schema(SchemaArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    /// Do not insert the built-in catalog
    #[arg(long)]
    pub no_seed: bool,
}

#[derive(Subcommand, Debug)]
pub enum ChallengeCommand {
    /// List challenges, optionally filtered by category
    List(ChallengeListArgs),

    /// Add a challenge to the catalog
    Create(ChallengeCreateArgs),

    /// Show one challenge
    Get { id: i64 },

    /// Pick a random challenge of the week
    Weekly,

    /// Remove a challenge
    Delete { id: i64 },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ChallengeListArgs {
    /// Only challenges in this category (exact match)
    #[arg(long)]
    pub category: Option<String>,

    /// Column to sort by
    #[arg(long, value_name = "COLUMN")]
    pub order_by: Option<String>,

    /// Sort descending (requires --order-by)
    #[arg(long, requires = "order_by")]
    pub desc: bool,

    #[arg(long)]
    pub limit: Option<u64>,

    #[arg(long)]
    pub offset: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct ChallengeCreateArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: String,

    #[arg(long)]
    pub category: String,
}

#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    /// List all clients
    List,

    /// Show one client with its attributes
    Get { id: i64 },

    /// Register a client
    Create(ClientCreateArgs),

    /// Change a client's fields or attributes
    Update(ClientUpdateArgs),

    /// Remove a client and its attributes
    Delete { id: i64 },

    /// List a client's attributes
    Attributes { id: i64 },

    /// Attach one attribute to a client
    AddAttribute(AddAttributeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ClientCreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: Option<String>,

    /// Attribute as key=value (repeatable)
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attribute)]
    pub attributes: Vec<AttributeInput>,
}

#[derive(Args, Debug, Clone)]
pub struct ClientUpdateArgs {
    pub id: i64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Replacement attribute as key=value (repeatable)
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attribute)]
    pub attributes: Vec<AttributeInput>,

    /// Remove every attribute (ignored when --attr is given)
    #[arg(long)]
    pub clear_attributes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AddAttributeArgs {
    pub id: i64,

    #[arg(long)]
    pub key: String,

    #[arg(long)]
    pub value: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value_t = SchemaTarget::All)]
    pub target: SchemaTarget,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaTarget {
    #[default]
    All,
    Challenge,
    Client,
    Attribute,
    Envelope,
}

/// Split `key=value` on the first `=`.
///
/// # Errors
///
/// Returns a message when there is no `=` or the key is empty.
pub fn parse_attribute(raw: &str) -> std::result::Result<AttributeInput, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.trim().is_empty() {
        return Err(format!("attribute key is empty in `{raw}`"));
    }
    Ok(AttributeInput::new(key.trim(), value))
}
