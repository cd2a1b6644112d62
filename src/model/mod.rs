//! Domain types for the challenge catalog and the client directory.
//!
//! Accessors read [`Row`]s from the executor and convert them here, so the
//! column-name contract with the schema lives in one place.

mod row;

pub use row::{Row, Value};

use crate::error::{BoostError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A catalog entry. Never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Challenge {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
}

/// Input for creating a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChallenge {
    pub title: String,
    pub description: String,
    pub category: String,
}

impl NewChallenge {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}

impl TryFrom<&Row> for Challenge {
    type Error = BoostError;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(Self {
            id: int_column(row, "id")?,
            title: text_column(row, "title")?,
            description: text_column(row, "description")?,
            category: text_column(row, "category")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub attributes: Vec<ClientAttribute>,
}

impl TryFrom<&Row> for Client {
    type Error = BoostError;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(Self {
            id: int_column(row, "id")?,
            name: text_column(row, "name")?,
            email: text_column(row, "email")?,
            phone: optional_text_column(row, "phone")?,
            created_at: datetime_column(row, "created_at")?,
            updated_at: datetime_column(row, "updated_at")?,
            attributes: vec![], // Loaded separately
        })
    }
}

/// A free-form key/value pair attached to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClientAttribute {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub client_id: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Row> for ClientAttribute {
    type Error = BoostError;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(Self {
            id: int_column(row, "id")?,
            key: text_column(row, "key")?,
            value: text_column(row, "value")?,
            client_id: int_column(row, "client_id")?,
            created_at: datetime_column(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInput {
    pub key: String,
    pub value: String,
}

impl AttributeInput {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeInput>,
}

/// Fields to change on a client. `attributes: Some(..)` replaces the whole
/// attribute list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub attributes: Option<Vec<AttributeInput>>,
}

impl ClientUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.attributes.is_none()
    }
}

fn column<'a>(row: &'a Row, name: &str) -> Result<&'a Value> {
    row.get(name)
        .ok_or_else(|| BoostError::query(format!("missing column: {name}")))
}

fn int_column(row: &Row, name: &str) -> Result<i64> {
    column(row, name)?
        .as_i64()
        .ok_or_else(|| BoostError::query(format!("column {name} is not an integer")))
}

fn text_column(row: &Row, name: &str) -> Result<String> {
    column(row, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| BoostError::query(format!("column {name} is not text")))
}

fn optional_text_column(row: &Row, name: &str) -> Result<Option<String>> {
    match column(row, name)? {
        Value::Null => Ok(None),
        Value::Text(v) => Ok(Some(v.clone())),
        _ => Err(BoostError::query(format!("column {name} is not text"))),
    }
}

fn datetime_column(row: &Row, name: &str) -> Result<DateTime<Utc>> {
    let raw = text_column(row, name)?;
    parse_datetime(&raw)
        .ok_or_else(|| BoostError::query(format!("column {name} is not a timestamp: {raw}")))
}

/// Parse RFC 3339 or SQLite's `CURRENT_TIMESTAMP` format.
#[must_use]
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
