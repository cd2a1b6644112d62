//! Init command implementation.
//!
//! Applies the schema to the configured store and seeds the catalog unless
//! seeding is disabled.

use crate::cli::InitArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::format::OutputContext;
use crate::storage::Storage;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use crate::storage::seed::seed_catalog;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize, JsonSchema)]
pub struct InitReport {
    pub database: String,
    pub schema_version: i32,
    pub seeded: usize,
    pub challenges: i64,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or seeding fails.
pub fn execute(args: &InitArgs, settings: &Settings, ctx: &OutputContext) -> Result<()> {
    let storage = Storage::open(&settings.database_url, &settings.pool_options())?;
    let challenges = storage.challenges();

    let seeded = if settings.seed && !args.no_seed {
        seed_catalog(&challenges)?
    } else {
        0
    };
    let report = InitReport {
        database: settings.database_url.to_string(),
        schema_version: CURRENT_SCHEMA_VERSION,
        seeded,
        challenges: challenges.count()?,
    };
    info!(database = %report.database, seeded, "Initialized database");

    ctx.emit("Database initialized", Some(&report), |report| {
        println!("  database:   {}", report.database);
        println!("  seeded:     {}", report.seeded);
        println!("  challenges: {}", report.challenges);
    });
    Ok(())
}
