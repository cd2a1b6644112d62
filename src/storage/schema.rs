//! Database schema definitions.

use crate::error::Result;
use crate::model::Value;
use crate::storage::executor::{Params, QueryExecutor, QueryModifiers};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the boostme database.
pub const SCHEMA_SQL: &str = r"
    -- Challenge catalog
    CREATE TABLE IF NOT EXISTS challenges (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_challenges_category ON challenges(category);

    -- Client directory
    CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK(length(name) <= 100),
        email TEXT NOT NULL UNIQUE CHECK(length(email) <= 100),
        phone TEXT CHECK(phone IS NULL OR length(phone) <= 20),
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Free-form client attributes
    CREATE TABLE IF NOT EXISTS client_attributes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT NOT NULL CHECK(length(key) <= 50),
        value TEXT NOT NULL CHECK(length(value) <= 255),
        client_id INTEGER NOT NULL,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_client_attributes_client ON client_attributes(client_id);
";

/// Read `PRAGMA user_version`; zero means the schema was never applied.
///
/// # Errors
///
/// Returns an error if the pragma cannot be read.
pub fn schema_version(executor: &QueryExecutor) -> Result<i64> {
    Ok(executor
        .fetch(
            "SELECT user_version AS version FROM pragma_user_version",
            &Params::new(),
            &QueryModifiers::default(),
        )?
        .into_first()
        .and_then(|row| row.get("version").and_then(Value::as_i64))
        .unwrap_or(0))
}

/// Apply the schema to the database.
///
/// It is idempotent because all statements use `IF NOT EXISTS`. Returns
/// `true` when the store had no schema before this call.
///
/// # Errors
///
/// Returns an error if the SQL execution fails.
pub fn apply_schema(executor: &QueryExecutor) -> Result<bool> {
    let fresh = schema_version(executor)? == 0;
    executor.execute_batch(SCHEMA_SQL)?;
    // Mark schema as applied so future versions can migrate from here.
    executor.execute_batch(&format!("PRAGMA user_version = {CURRENT_SCHEMA_VERSION}"))?;
    Ok(fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::pool::{DatabaseUrl, PoolOptions, create_pool};

    fn executor() -> QueryExecutor {
        QueryExecutor::new(create_pool(&DatabaseUrl::Memory, &PoolOptions::default()).unwrap())
    }

    fn table_names(executor: &QueryExecutor) -> Vec<String> {
        executor
            .fetch(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                &Params::new(),
                &QueryModifiers::new().order_by("name", crate::storage::SortDirection::Asc),
            )
            .unwrap()
            .into_rows()
            .iter()
            .filter_map(|row| row.get("name").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_apply_schema() {
        let executor = executor();
        assert!(apply_schema(&executor).unwrap());
        assert_eq!(
            table_names(&executor),
            vec!["challenges", "client_attributes", "clients"]
        );

        assert_eq!(
            schema_version(&executor).unwrap(),
            i64::from(CURRENT_SCHEMA_VERSION)
        );
    }

    #[test]
    fn test_apply_schema_is_idempotent() {
        let executor = executor();
        apply_schema(&executor).unwrap();
        executor
            .execute(
                "INSERT INTO challenges (title, description, category) VALUES ('t', 'd', 'c')",
                &Params::new(),
            )
            .unwrap();
        assert!(!apply_schema(&executor).unwrap());
        let count = executor
            .fetch("SELECT COUNT(*) AS n FROM challenges", &Params::new(), &QueryModifiers::default())
            .unwrap()
            .into_first()
            .and_then(|row| row.get("n").and_then(Value::as_i64));
        assert_eq!(count, Some(1));
    }

    #[test]
    fn attributes_cascade_with_client() {
        let executor = executor();
        apply_schema(&executor).unwrap();
        let client = executor
            .execute(
                "INSERT INTO clients (name, email) VALUES ('Ana', 'ana@example.com')",
                &Params::new(),
            )
            .unwrap();
        executor
            .execute(
                "INSERT INTO client_attributes (key, value, client_id) VALUES ('tier', 'gold', :id)",
                &Params::new().with("id", client.last_insert_id),
            )
            .unwrap();
        executor
            .execute("DELETE FROM clients WHERE id = :id", &Params::new().with("id", client.last_insert_id))
            .unwrap();
        let left = executor
            .fetch("SELECT * FROM client_attributes", &Params::new(), &QueryModifiers::default())
            .unwrap();
        assert!(left.is_empty());
    }
}
