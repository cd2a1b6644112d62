//! Client command implementations.

use crate::cli::{AddAttributeArgs, ClientCommand, ClientCreateArgs, ClientUpdateArgs};
use crate::config::{self, Settings};
use crate::error::{BoostError, Result};
use crate::format::{OutputContext, format_attribute, print_attributes, print_client, print_clients};
use crate::model::{AttributeInput, Client, ClientUpdate, NewClient};
use crate::storage::ClientRepository;

/// Execute a client subcommand.
///
/// # Errors
///
/// Returns `NotFound` for unknown clients, `Conflict` for a duplicate email,
/// a validation error for bad input, or an execution error from the store.
pub fn execute(command: &ClientCommand, settings: &Settings, ctx: &OutputContext) -> Result<()> {
    let repo = config::open_storage(settings)?.clients();

    match command {
        ClientCommand::List => {
            let clients = repo.list()?;
            ctx.emit("Clients retrieved successfully", Some(&clients), |c| {
                print_clients(c);
            });
            Ok(())
        }
        ClientCommand::Get { id } => {
            let client = repo.get(*id)?.ok_or_else(|| not_found(*id))?;
            ctx.emit("Client retrieved successfully", Some(&client), print_client);
            Ok(())
        }
        ClientCommand::Create(args) => create(&repo, args, ctx),
        ClientCommand::Update(args) => update(&repo, args, ctx),
        ClientCommand::Delete { id } => {
            repo.delete(*id)?;
            ctx.emit::<Client, _>("Client deleted successfully", None, |_| {});
            Ok(())
        }
        ClientCommand::Attributes { id } => {
            let attributes = repo.attributes(*id)?;
            ctx.emit("Attributes retrieved successfully", Some(&attributes), |a| {
                print_attributes(a);
            });
            Ok(())
        }
        ClientCommand::AddAttribute(args) => add_attribute(&repo, args, ctx),
    }
}

fn not_found(id: i64) -> BoostError {
    BoostError::NotFound(format!("Client not found: {id}"))
}

fn create(repo: &ClientRepository, args: &ClientCreateArgs, ctx: &OutputContext) -> Result<()> {
    let client = repo.create(&NewClient {
        name: args.name.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
        attributes: args.attributes.clone(),
    })?;
    ctx.emit("Client created successfully", Some(&client), print_client);
    Ok(())
}

fn update_from(args: &ClientUpdateArgs) -> ClientUpdate {
    let attributes: Option<Vec<AttributeInput>> = if !args.attributes.is_empty() {
        Some(args.attributes.clone())
    } else if args.clear_attributes {
        Some(Vec::new())
    } else {
        None
    };
    ClientUpdate {
        name: args.name.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
        attributes,
    }
}

fn update(repo: &ClientRepository, args: &ClientUpdateArgs, ctx: &OutputContext) -> Result<()> {
    let changes = update_from(args);
    if changes.is_empty() {
        return Err(BoostError::validation(
            "update",
            "provide at least one of --name, --email, --phone, --attr or --clear-attributes",
        ));
    }
    let client = repo.update(args.id, &changes)?;
    ctx.emit("Client updated successfully", Some(&client), print_client);
    Ok(())
}

fn add_attribute(repo: &ClientRepository, args: &AddAttributeArgs, ctx: &OutputContext) -> Result<()> {
    let attribute = repo.add_attribute(args.id, &AttributeInput::new(args.key.as_str(), args.value.as_str()))?;
    ctx.emit("Attribute added successfully", Some(&attribute), |a| {
        println!("  {}", format_attribute(a));
    });
    Ok(())
}
