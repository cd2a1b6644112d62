//! Plain-text renderers for human-readable output.

use crate::model::{Challenge, Client, ClientAttribute};

const DESCRIPTION_WIDTH: usize = 60;

/// Shorten `text` to at most `max` characters, ending with `...` when cut.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// `[id] title (category)` followed by an indented description.
#[must_use]
pub fn format_challenge(challenge: &Challenge) -> String {
    format!(
        "[{}] {} ({})\n    {}",
        challenge.id,
        challenge.title,
        challenge.category,
        truncate(&challenge.description, DESCRIPTION_WIDTH)
    )
}

pub fn print_challenges(challenges: &[Challenge]) {
    if challenges.is_empty() {
        println!("  (none)");
        return;
    }
    for challenge in challenges {
        println!("{}", format_challenge(challenge));
    }
}

#[must_use]
pub fn format_attribute(attribute: &ClientAttribute) -> String {
    format!("{}={}", attribute.key, attribute.value)
}

#[must_use]
pub fn format_client_line(client: &Client) -> String {
    let phone = client
        .phone
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| format!(" {p}"))
        .unwrap_or_default();
    format!("[{}] {} <{}>{phone}", client.id, client.name, client.email)
}

pub fn print_client(client: &Client) {
    println!("{}", format_client_line(client));
    println!("    created {}", client.created_at.to_rfc3339());
    for attribute in &client.attributes {
        println!("    {}", format_attribute(attribute));
    }
}

pub fn print_clients(clients: &[Client]) {
    if clients.is_empty() {
        println!("  (none)");
        return;
    }
    for client in clients {
        println!("{}", format_client_line(client));
    }
}

pub fn print_attributes(attributes: &[ClientAttribute]) {
    if attributes.is_empty() {
        println!("  (none)");
        return;
    }
    for attribute in attributes {
        println!("  {}", format_attribute(attribute));
    }
}
