//! Input validation for records entering the store.
//!
//! Validation runs before any statement is issued; failures are reported as
//! [`BoostError::Validation`] naming the offending field.

use crate::error::{BoostError, Result};
use crate::model::{AttributeInput, ClientUpdate, NewChallenge, NewClient};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
});

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 100;
const MAX_PHONE_LEN: usize = 20;
const MAX_KEY_LEN: usize = 50;
const MAX_VALUE_LEN: usize = 255;

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BoostError::validation(field, "is required"));
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(BoostError::validation(
            field,
            format!("must be at most {max} characters (got {len})"),
        ));
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if title, description or category is blank.
pub fn validate_new_challenge(challenge: &NewChallenge) -> Result<()> {
    require("title", &challenge.title)?;
    require("description", &challenge.description)?;
    require("category", &challenge.category)?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the address is blank, too long, or not shaped like
/// `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<()> {
    require("email", email)?;
    max_len("email", email, MAX_EMAIL_LEN)?;
    if !EMAIL.is_match(email) {
        return Err(BoostError::validation("email", "is not a valid email address"));
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if key or value is blank or too long.
pub fn validate_attribute(attribute: &AttributeInput) -> Result<()> {
    require("key", &attribute.key)?;
    require("value", &attribute.value)?;
    max_len("key", &attribute.key, MAX_KEY_LEN)?;
    max_len("value", &attribute.value, MAX_VALUE_LEN)?;
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    require("name", name)?;
    max_len("name", name, MAX_NAME_LEN)
}

fn validate_phone(phone: &str) -> Result<()> {
    max_len("phone", phone, MAX_PHONE_LEN)
}

/// # Errors
///
/// Returns an error if name or email is missing or malformed, the phone is
/// too long, or any attribute is invalid.
pub fn validate_new_client(client: &NewClient) -> Result<()> {
    validate_name(&client.name)?;
    validate_email(&client.email)?;
    if let Some(phone) = &client.phone {
        validate_phone(phone)?;
    }
    client.attributes.iter().try_for_each(validate_attribute)
}

/// Only the fields present in the update are checked.
///
/// # Errors
///
/// Returns an error if any provided field is invalid.
pub fn validate_client_update(update: &ClientUpdate) -> Result<()> {
    if let Some(name) = &update.name {
        validate_name(name)?;
    }
    if let Some(email) = &update.email {
        validate_email(email)?;
    }
    if let Some(phone) = &update.phone {
        validate_phone(phone)?;
    }
    if let Some(attributes) = &update.attributes {
        attributes.iter().try_for_each(validate_attribute)?;
    }
    Ok(())
}
