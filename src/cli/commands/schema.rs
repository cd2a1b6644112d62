//! Schema command implementation.
//!
//! Emits JSON Schema documents describing the machine-readable outputs, in
//! place of an interactive API browser.

use crate::cli::{SchemaArgs, SchemaTarget};
use crate::error::Result;
use crate::format::{Envelope, ErrorEnvelope, OutputContext};
use crate::model::{Challenge, Client, ClientAttribute};
use chrono::{DateTime, Utc};
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct SchemaOutput {
    tool: &'static str,
    generated_at: DateTime<Utc>,
    schemas: BTreeMap<&'static str, RootSchema>,
}

/// Execute the schema command.
///
/// Schema output is always JSON; `--json` and plain mode print the same
/// document.
///
/// # Errors
///
/// Never fails today; the signature matches the other commands.
pub fn execute(args: &SchemaArgs, ctx: &OutputContext) -> Result<()> {
    if ctx.mode().is_quiet() {
        return Ok(());
    }

    let payload = SchemaOutput {
        tool: "boostme",
        generated_at: Utc::now(),
        schemas: build_schemas(args.target),
    };
    ctx.json_pretty(&payload);
    Ok(())
}

fn build_schemas(target: SchemaTarget) -> BTreeMap<&'static str, RootSchema> {
    let mut schemas = BTreeMap::new();

    match target {
        SchemaTarget::All => {
            schemas.insert("Challenge", schema_for!(Challenge));
            schemas.insert("Client", schema_for!(Client));
            schemas.insert("ClientAttribute", schema_for!(ClientAttribute));
            schemas.insert("ChallengeEnvelope", schema_for!(Envelope<Challenge>));
            schemas.insert("ChallengeListEnvelope", schema_for!(Envelope<Vec<Challenge>>));
            schemas.insert("ErrorEnvelope", schema_for!(ErrorEnvelope));
        }
        SchemaTarget::Challenge => {
            schemas.insert("Challenge", schema_for!(Challenge));
        }
        SchemaTarget::Client => {
            schemas.insert("Client", schema_for!(Client));
        }
        SchemaTarget::Attribute => {
            schemas.insert("ClientAttribute", schema_for!(ClientAttribute));
        }
        SchemaTarget::Envelope => {
            schemas.insert("ChallengeEnvelope", schema_for!(Envelope<Challenge>));
            schemas.insert("ChallengeListEnvelope", schema_for!(Envelope<Vec<Challenge>>));
            schemas.insert("ErrorEnvelope", schema_for!(ErrorEnvelope));
        }
    }

    schemas
}
