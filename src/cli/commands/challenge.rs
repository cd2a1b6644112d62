//! Challenge command implementations.

use crate::cli::{ChallengeCommand, ChallengeCreateArgs, ChallengeListArgs};
use crate::config::{self, Settings};
use crate::error::{BoostError, Result};
use crate::format::{OutputContext, format_challenge, print_challenges};
use crate::model::NewChallenge;
use crate::storage::{ChallengeRepository, QueryModifiers, SortDirection};
use crate::validation::validate_new_challenge;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
struct Created {
    id: i64,
}

/// Execute a challenge subcommand.
///
/// # Errors
///
/// Returns `NotFound` for missing challenges, a validation error for bad
/// input, or an execution error from the store.
pub fn execute(command: &ChallengeCommand, settings: &Settings, ctx: &OutputContext) -> Result<()> {
    let repo = config::open_storage(settings)?.challenges();

    match command {
        ChallengeCommand::List(args) => list(&repo, args, ctx),
        ChallengeCommand::Create(args) => create(&repo, args, ctx),
        ChallengeCommand::Get { id } => get(&repo, *id, ctx),
        ChallengeCommand::Weekly => weekly(&repo, ctx),
        ChallengeCommand::Delete { id } => delete(&repo, *id, ctx),
    }
}

fn modifiers_from(args: &ChallengeListArgs) -> QueryModifiers {
    let mut modifiers = QueryModifiers::new();
    if let Some(column) = &args.order_by {
        let direction = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        modifiers = modifiers.order_by(column.as_str(), direction);
    }
    if let Some(limit) = args.limit {
        modifiers = modifiers.limit(limit);
    }
    if let Some(offset) = args.offset {
        modifiers = modifiers.offset(offset);
    }
    modifiers
}

fn list(repo: &ChallengeRepository, args: &ChallengeListArgs, ctx: &OutputContext) -> Result<()> {
    let challenges = repo.list_page(args.category.as_deref(), &modifiers_from(args))?;
    if challenges.is_empty() {
        debug!(category = ?args.category, "No challenges matched");
        return Err(BoostError::EmptyResult("No challenges found".to_string()));
    }
    ctx.emit("Challenges retrieved successfully", Some(&challenges), |c| {
        print_challenges(c);
    });
    Ok(())
}

fn create(repo: &ChallengeRepository, args: &ChallengeCreateArgs, ctx: &OutputContext) -> Result<()> {
    let new = NewChallenge::new(
        args.title.trim(),
        args.description.trim(),
        args.category.trim(),
    );
    validate_new_challenge(&new)?;
    let id = repo.create(&new)?;
    ctx.emit("Challenge created successfully!", Some(&Created { id }), |c| {
        println!("  id: {}", c.id);
    });
    Ok(())
}

fn get(repo: &ChallengeRepository, id: i64, ctx: &OutputContext) -> Result<()> {
    let challenge = repo
        .get_by_id(id)?
        .ok_or_else(|| BoostError::NotFound("Challenge not found".to_string()))?;
    ctx.emit("Challenge retrieved successfully", Some(&challenge), |c| {
        println!("{}", format_challenge(c));
    });
    Ok(())
}

fn weekly(repo: &ChallengeRepository, ctx: &OutputContext) -> Result<()> {
    let challenge = repo
        .get_weekly()?
        .ok_or_else(|| BoostError::NotFound("No challenges available".to_string()))?;
    ctx.emit("Challenge retrieved successfully", Some(&challenge), |c| {
        println!("{}", format_challenge(c));
    });
    Ok(())
}

fn delete(repo: &ChallengeRepository, id: i64, ctx: &OutputContext) -> Result<()> {
    if repo.get_by_id(id)?.is_none() {
        return Err(BoostError::NotFound("Challenge not found".to_string()));
    }
    repo.delete(id)?;
    debug!(id, "Challenge removed via CLI");
    ctx.emit::<Created, _>("Challenge deleted successfully", None, |_| {});
    Ok(())
}
