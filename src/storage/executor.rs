//! Generic parameterized statement execution.
//!
//! A [`QueryExecutor`] checks out one pooled connection per call, runs one
//! statement and hands the connection back on every exit path. Reads come
//! back as a [`RowSet`]; writes run in autocommit mode and report a
//! [`WriteSummary`]. Every failure is logged and surfaced as
//! [`BoostError::QueryExecution`] carrying the store's message.

use crate::error::{BoostError, Result};
use crate::model::{Row, Value};
use crate::storage::pool::DbPool;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::ToSql;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, trace};

type Failure = Box<dyn std::error::Error + Send + Sync>;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("valid regex")
});

const LIMIT_PARAM: &str = ":__limit";
const OFFSET_PARAM: &str = ":__offset";

/// Whether a statement produces rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    Write,
}

impl StatementKind {
    /// Classify by the leading keyword: `SELECT` and `WITH` read, everything
    /// else writes.
    #[must_use]
    pub fn classify(sql: &str) -> Self {
        let keyword: String = sql
            .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
            .chars()
            .take_while(char::is_ascii_alphabetic)
            .collect();
        if keyword.eq_ignore_ascii_case("SELECT") || keyword.eq_ignore_ascii_case("WITH") {
            Self::Read
        } else {
            Self::Write
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = BoostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(BoostError::validation(
                "order_direction",
                format!("expected ASC or DESC, got {other:?}"),
            )),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Ordering and paging applied to reads.
///
/// Clauses are emitted as `ORDER BY`, then `LIMIT`, then `OFFSET`. The
/// ordering column must be a plain identifier; limit and offset are bound as
/// parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryModifiers {
    pub order_by: Option<String>,
    pub direction: SortDirection,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryModifiers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(column.into());
        self.direction = direction;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.order_by.is_none() && self.limit.is_none() && self.offset.is_none()
    }
}

/// Named statement parameters. Keys without a `:`, `@` or `$` sigil get `:`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: Vec<(String, Value)>,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: &str, value: impl Into<Value>) {
        let name = if name.starts_with([':', '@', '$']) {
            name.to_string()
        } else {
            format!(":{name}")
        };
        self.values.push((name, value.into()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Rows produced by a read, by count.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    Empty,
    One(Row),
    Many(Vec<Row>),
}

impl RowSet {
    #[must_use]
    pub fn from_rows(mut rows: Vec<Row>) -> Self {
        match rows.len() {
            0 => Self::Empty,
            1 => Self::One(rows.remove(0)),
            _ => Self::Many(rows),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Many(rows) => rows.len(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Always a sequence, whatever the count.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Empty => Vec::new(),
            Self::One(row) => vec![row],
            Self::Many(rows) => rows,
        }
    }

    #[must_use]
    pub fn into_first(self) -> Option<Row> {
        match self {
            Self::Empty => None,
            Self::One(row) => Some(row),
            Self::Many(rows) => rows.into_iter().next(),
        }
    }
}

/// Result of a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub affected: usize,
    pub last_insert_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(RowSet),
    Written(WriteSummary),
}

/// Executes parameterized statements against the pooled store.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    pool: DbPool,
}

impl QueryExecutor {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Run one statement. Modifiers only apply to reads.
    ///
    /// # Errors
    ///
    /// Returns [`BoostError::QueryExecution`] if no connection is available,
    /// the ordering column is not an identifier, or the store rejects the
    /// statement.
    pub fn query(
        &self,
        template: &str,
        params: &Params,
        modifiers: &QueryModifiers,
    ) -> Result<QueryOutcome> {
        self.run(template, params, modifiers).map_err(|e| {
            let message = e.to_string();
            error!(error = %message, "Error executing query");
            BoostError::query(message)
        })
    }

    /// Run a read and return its rows.
    ///
    /// # Errors
    ///
    /// Returns [`BoostError::QueryExecution`] on any execution failure or if
    /// the template is not a read.
    pub fn fetch(
        &self,
        template: &str,
        params: &Params,
        modifiers: &QueryModifiers,
    ) -> Result<RowSet> {
        match self.query(template, params, modifiers)? {
            QueryOutcome::Rows(rows) => Ok(rows),
            QueryOutcome::Written(_) => Err(BoostError::query(
                "expected a read statement, got a write",
            )),
        }
    }

    /// Run a write and return its summary.
    ///
    /// # Errors
    ///
    /// Returns [`BoostError::QueryExecution`] on any execution failure or if
    /// the template is a read.
    pub fn execute(&self, template: &str, params: &Params) -> Result<WriteSummary> {
        match self.query(template, params, &QueryModifiers::default())? {
            QueryOutcome::Written(summary) => Ok(summary),
            QueryOutcome::Rows(_) => Err(BoostError::query(
                "expected a write statement, got a read",
            )),
        }
    }

    /// Run a multi-statement script without parameters (DDL).
    ///
    /// # Errors
    ///
    /// Returns [`BoostError::QueryExecution`] if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let run = || -> std::result::Result<(), Failure> {
            let conn = self.pool.get()?;
            conn.execute_batch(sql)?;
            Ok(())
        };
        run().map_err(|e| {
            let message = e.to_string();
            error!(error = %message, "Error executing batch");
            BoostError::query(message)
        })
    }

    fn run(
        &self,
        template: &str,
        params: &Params,
        modifiers: &QueryModifiers,
    ) -> std::result::Result<QueryOutcome, Failure> {
        let kind = StatementKind::classify(template);
        let (sql, bound) = match kind {
            StatementKind::Read => build_read(template, params, modifiers)?,
            StatementKind::Write => {
                if !modifiers.is_empty() {
                    debug!("Ignoring ordering/paging modifiers on a write");
                }
                (template.to_string(), params.clone())
            }
        };

        debug!(kind = ?kind, params = bound.len(), "Executing statement");
        trace!(sql = %sql, "Statement text");

        let named: Vec<(&str, &dyn ToSql)> = bound
            .iter()
            .map(|(name, value)| (name, value as &dyn ToSql))
            .collect();

        let conn = self.pool.get()?;
        match kind {
            StatementKind::Read => {
                let mut stmt = conn.prepare(&sql)?;
                let names: Vec<String> = stmt
                    .column_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                let mut rows = stmt.query(named.as_slice())?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    let mut converted = Row::with_capacity(names.len());
                    for (idx, name) in names.iter().enumerate() {
                        converted.push(name.clone(), Value::from(row.get_ref(idx)?));
                    }
                    out.push(converted);
                }
                debug!(rows = out.len(), "Read complete");
                Ok(QueryOutcome::Rows(RowSet::from_rows(out)))
            }
            StatementKind::Write => {
                let affected = conn.execute(&sql, named.as_slice())?;
                let last_insert_id = conn.last_insert_rowid();
                debug!(affected, "Write committed");
                Ok(QueryOutcome::Written(WriteSummary {
                    affected,
                    last_insert_id,
                }))
            }
        }
    }
}

/// Append the modifier clauses to a read and bind their values.
fn build_read(
    template: &str,
    params: &Params,
    modifiers: &QueryModifiers,
) -> std::result::Result<(String, Params), Failure> {
    let mut sql = template.trim().trim_end_matches(';').trim_end().to_string();
    let mut bound = params.clone();

    if let Some(column) = &modifiers.order_by {
        if !IDENTIFIER.is_match(column) {
            return Err(format!("invalid ORDER BY column: {column:?}").into());
        }
        sql.push_str(&format!(" ORDER BY {column} {}", modifiers.direction));
    }

    if modifiers.limit.is_some() || modifiers.offset.is_some() {
        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        let limit = match modifiers.limit {
            Some(limit) => i64::try_from(limit)?,
            None => -1,
        };
        sql.push_str(&format!(" LIMIT {LIMIT_PARAM}"));
        bound.push(LIMIT_PARAM, limit);
    }

    if let Some(offset) = modifiers.offset {
        sql.push_str(&format!(" OFFSET {OFFSET_PARAM}"));
        bound.push(OFFSET_PARAM, i64::try_from(offset)?);
    }

    Ok((sql, bound))
}
