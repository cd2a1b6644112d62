//! Output formatting for `boostme`.
//!
//! Supports human-readable text output and machine-parseable JSON.
//! JSON output wraps every result in the [`Envelope`] `{message, data}`.

mod context;
mod text;

pub use context::{OutputContext, OutputMode};
pub use text::{
    format_attribute, format_challenge, format_client_line, print_attributes, print_challenges,
    print_client, print_clients, truncate,
};

use crate::error::StructuredError;
use schemars::JsonSchema;
use serde::Serialize;

/// Success envelope. `data` is omitted when the command has nothing to
/// return (deletes, for example).
#[derive(Debug, Serialize, JsonSchema)]
pub struct Envelope<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorEnvelope {
    pub error: StructuredError,
}
