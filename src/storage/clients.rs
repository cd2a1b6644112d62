//! Client directory accessor.
//!
//! Every step is a single statement through the executor. Creating a client
//! with attributes inserts the client first and then each attribute.

use crate::error::{BoostError, Result};
use crate::model::{AttributeInput, Client, ClientAttribute, ClientUpdate, NewClient};
use crate::storage::executor::{Params, QueryExecutor, QueryModifiers, SortDirection};
use crate::validation::{validate_attribute, validate_client_update, validate_new_client};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info};

const SELECT_CLIENTS: &str =
    "SELECT id, name, email, phone, created_at, updated_at FROM clients";
const SELECT_ATTRIBUTES: &str =
    "SELECT id, key, value, client_id, created_at FROM client_attributes";

#[derive(Debug, Clone)]
pub struct ClientRepository {
    executor: QueryExecutor,
}

impl ClientRepository {
    #[must_use]
    pub const fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// All clients with their attributes, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list(&self) -> Result<Vec<Client>> {
        let by_id = QueryModifiers::new().order_by("id", SortDirection::Asc);
        let mut clients: Vec<Client> = self
            .executor
            .fetch(SELECT_CLIENTS, &Params::new(), &by_id)?
            .into_rows()
            .iter()
            .map(Client::try_from)
            .collect::<Result<_>>()?;

        let mut grouped: HashMap<i64, Vec<ClientAttribute>> = HashMap::new();
        for row in self
            .executor
            .fetch(SELECT_ATTRIBUTES, &Params::new(), &by_id)?
            .into_rows()
        {
            let attribute = ClientAttribute::try_from(&row)?;
            grouped.entry(attribute.client_id).or_default().push(attribute);
        }
        for client in &mut clients {
            client.attributes = grouped.remove(&client.id).unwrap_or_default();
        }

        debug!(count = clients.len(), "Listed clients");
        Ok(clients)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get(&self, id: i64) -> Result<Option<Client>> {
        let row = self
            .executor
            .fetch(
                &format!("{SELECT_CLIENTS} WHERE id = :id"),
                &Params::new().with("id", id),
                &QueryModifiers::default(),
            )?
            .into_first();
        let Some(row) = row else {
            return Ok(None);
        };
        let mut client = Client::try_from(&row)?;
        client.attributes = self.load_attributes(id)?;
        Ok(Some(client))
    }

    /// Insert a client and its attributes, returning the stored record.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, `Conflict` if the email is
    /// already registered, or an execution error if an insert fails.
    pub fn create(&self, client: &NewClient) -> Result<Client> {
        validate_new_client(client)?;

        let now = Utc::now().to_rfc3339();
        let summary = self
            .executor
            .execute(
                "INSERT INTO clients (name, email, phone, created_at, updated_at)
                 VALUES (:name, :email, :phone, :now, :now)",
                &Params::new()
                    .with("name", client.name.trim())
                    .with("email", client.email.trim())
                    .with("phone", client.phone.clone().unwrap_or_default())
                    .with("now", now),
            )
            .map_err(|e| email_conflict(e, &client.email))?;
        let id = summary.last_insert_id;

        for attribute in &client.attributes {
            self.insert_attribute(id, attribute)?;
        }
        info!(id, attributes = client.attributes.len(), "Created client");

        self.get(id)?
            .ok_or_else(|| BoostError::NotFound(format!("Client not found: {id}")))
    }

    /// Apply the provided fields. A supplied attribute list replaces the
    /// existing one.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the client does not exist, a validation error for
    /// bad input, `Conflict` on a duplicate email, or an execution error.
    pub fn update(&self, id: i64, changes: &ClientUpdate) -> Result<Client> {
        let existing = self.require(id)?;
        validate_client_update(changes)?;
        if changes.is_empty() {
            return Ok(existing);
        }

        let mut set_clauses: Vec<&str> = vec![];
        let mut params = Params::new().with("id", id);

        if let Some(name) = &changes.name {
            set_clauses.push("name = :name");
            params.push("name", name.trim());
        }
        if let Some(email) = &changes.email {
            set_clauses.push("email = :email");
            params.push("email", email.trim());
        }
        if let Some(phone) = &changes.phone {
            set_clauses.push("phone = :phone");
            params.push("phone", phone.as_str());
        }
        set_clauses.push("updated_at = :updated_at");
        params.push("updated_at", Utc::now().to_rfc3339());

        let sql = format!("UPDATE clients SET {} WHERE id = :id", set_clauses.join(", "));
        self.executor.execute(&sql, &params).map_err(|e| {
            email_conflict(e, changes.email.as_deref().unwrap_or(&existing.email))
        })?;

        if let Some(attributes) = &changes.attributes {
            self.executor.execute(
                "DELETE FROM client_attributes WHERE client_id = :id",
                &Params::new().with("id", id),
            )?;
            for attribute in attributes {
                self.insert_attribute(id, attribute)?;
            }
        }
        info!(id, "Updated client");

        self.require(id)
    }

    /// Remove a client; its attributes go with it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the client does not exist, or an execution error.
    pub fn delete(&self, id: i64) -> Result<()> {
        self.require(id)?;
        self.executor.execute(
            "DELETE FROM clients WHERE id = :id",
            &Params::new().with("id", id),
        )?;
        info!(id, "Deleted client");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the client does not exist, or an execution error.
    pub fn attributes(&self, id: i64) -> Result<Vec<ClientAttribute>> {
        self.require(id)?;
        self.load_attributes(id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the client does not exist, a validation error for
    /// a blank key or value, or an execution error.
    pub fn add_attribute(&self, id: i64, attribute: &AttributeInput) -> Result<ClientAttribute> {
        self.require(id)?;
        validate_attribute(attribute)?;
        let attribute_id = self.insert_attribute(id, attribute)?;
        self.executor
            .fetch(
                &format!("{SELECT_ATTRIBUTES} WHERE id = :id"),
                &Params::new().with("id", attribute_id),
                &QueryModifiers::default(),
            )?
            .into_first()
            .as_ref()
            .map(ClientAttribute::try_from)
            .transpose()?
            .ok_or_else(|| BoostError::NotFound(format!("Attribute not found: {attribute_id}")))
    }

    fn require(&self, id: i64) -> Result<Client> {
        self.get(id)?
            .ok_or_else(|| BoostError::NotFound(format!("Client not found: {id}")))
    }

    fn load_attributes(&self, client_id: i64) -> Result<Vec<ClientAttribute>> {
        self.executor
            .fetch(
                &format!("{SELECT_ATTRIBUTES} WHERE client_id = :client_id"),
                &Params::new().with("client_id", client_id),
                &QueryModifiers::new().order_by("id", SortDirection::Asc),
            )?
            .into_rows()
            .iter()
            .map(ClientAttribute::try_from)
            .collect()
    }

    fn insert_attribute(&self, client_id: i64, attribute: &AttributeInput) -> Result<i64> {
        let summary = self.executor.execute(
            "INSERT INTO client_attributes (key, value, client_id, created_at)
             VALUES (:key, :value, :client_id, :created_at)",
            &Params::new()
                .with("key", attribute.key.trim())
                .with("value", attribute.value.as_str())
                .with("client_id", client_id)
                .with("created_at", Utc::now().to_rfc3339()),
        )?;
        debug!(client_id, key = %attribute.key, "Inserted attribute");
        Ok(summary.last_insert_id)
    }
}

/// Turn a UNIQUE violation on `clients.email` into a conflict.
fn email_conflict(err: BoostError, email: &str) -> BoostError {
    if err.is_unique_violation() {
        BoostError::Conflict(format!("email already registered: {}", email.trim()))
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    fn repo() -> ClientRepository {
        Storage::open_memory().unwrap().clients()
    }

    fn ana() -> NewClient {
        NewClient {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            phone: Some("555-0101".into()),
            attributes: vec![AttributeInput::new("tier", "gold")],
        }
    }

    #[test]
    fn create_returns_client_with_attributes() {
        let client = repo().create(&ana()).unwrap();
        assert_eq!(client.name, "Ana");
        assert_eq!(client.phone.as_deref(), Some("555-0101"));
        assert_eq!(client.attributes.len(), 1);
        assert_eq!(client.attributes[0].key, "tier");
        assert_eq!(client.attributes[0].client_id, client.id);
    }

    #[test]
    fn missing_phone_defaults_to_empty() {
        let client = repo()
            .create(&NewClient {
                name: "Bo".into(),
                email: "bo@example.com".into(),
                ..NewClient::default()
            })
            .unwrap();
        assert_eq!(client.phone.as_deref(), Some(""));
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let repo = repo();
        repo.create(&ana()).unwrap();
        let err = repo.create(&ana()).unwrap_err();
        assert!(matches!(err, BoostError::Conflict(_)), "got {err:?}");
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn update_replaces_attributes_when_given() {
        let repo = repo();
        let client = repo.create(&ana()).unwrap();

        let renamed = repo
            .update(
                client.id,
                &ClientUpdate {
                    name: Some("Ana Maria".into()),
                    ..ClientUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "Ana Maria");
        assert_eq!(renamed.attributes.len(), 1);
        assert!(renamed.updated_at >= client.updated_at);

        let replaced = repo
            .update(
                client.id,
                &ClientUpdate {
                    attributes: Some(vec![
                        AttributeInput::new("lang", "pt"),
                        AttributeInput::new("plan", "pro"),
                    ]),
                    ..ClientUpdate::default()
                },
            )
            .unwrap();
        let keys: Vec<_> = replaced.attributes.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["lang", "plan"]);
    }

    #[test]
    fn missing_client_operations_are_not_found() {
        let repo = repo();
        assert!(repo.get(42).unwrap().is_none());
        assert!(matches!(repo.delete(42), Err(BoostError::NotFound(_))));
        assert!(matches!(repo.attributes(42), Err(BoostError::NotFound(_))));
        assert!(matches!(
            repo.update(42, &ClientUpdate::default()),
            Err(BoostError::NotFound(_))
        ));
        assert!(matches!(
            repo.add_attribute(42, &AttributeInput::new("k", "v")),
            Err(BoostError::NotFound(_))
        ));
    }

    #[test]
    fn delete_cascades_attributes() {
        let repo = repo();
        let client = repo.create(&ana()).unwrap();
        repo.add_attribute(client.id, &AttributeInput::new("lang", "pt"))
            .unwrap();
        repo.delete(client.id).unwrap();
        let orphans = repo
            .executor
            .fetch(SELECT_ATTRIBUTES, &Params::new(), &QueryModifiers::default())
            .unwrap();
        assert!(orphans.is_empty());
    }

    #[test]
    fn list_groups_attributes_per_client() {
        let repo = repo();
        let first = repo.create(&ana()).unwrap();
        let second = repo
            .create(&NewClient {
                name: "Bo".into(),
                email: "bo@example.com".into(),
                phone: None,
                attributes: vec![AttributeInput::new("a", "1"), AttributeInput::new("b", "2")],
            })
            .unwrap();
        let clients = repo.list().unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].id, first.id);
        assert_eq!(clients[0].attributes.len(), 1);
        assert_eq!(clients[1].id, second.id);
        assert_eq!(clients[1].attributes.len(), 2);
    }
}
