//! Challenge catalog accessor.

use crate::error::{BoostError, Result};
use crate::model::{Challenge, NewChallenge, Value};
use crate::storage::executor::{Params, QueryExecutor, QueryModifiers, RowSet};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

const SELECT_CHALLENGES: &str = "SELECT id, title, description, category FROM challenges";

/// Domain operations over the `challenges` table.
#[derive(Debug, Clone)]
pub struct ChallengeRepository {
    executor: QueryExecutor,
}

impl ChallengeRepository {
    #[must_use]
    pub const fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// All challenges, or only those whose category matches exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_all(&self, category: Option<&str>) -> Result<Vec<Challenge>> {
        self.list_page(category, &QueryModifiers::default())
    }

    /// Like [`list_all`](Self::list_all) with ordering and paging.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the ordering column
    /// is not a plain identifier.
    pub fn list_page(
        &self,
        category: Option<&str>,
        modifiers: &QueryModifiers,
    ) -> Result<Vec<Challenge>> {
        let rows = match category {
            Some(category) => self.executor.fetch(
                &format!("{SELECT_CHALLENGES} WHERE category = :category"),
                &Params::new().with("category", category),
                modifiers,
            )?,
            None => self
                .executor
                .fetch(SELECT_CHALLENGES, &Params::new(), modifiers)?,
        };
        debug!(category = ?category, count = rows.len(), "Listed challenges");
        to_challenges(rows)
    }

    /// Insert a challenge and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create(&self, challenge: &NewChallenge) -> Result<i64> {
        let summary = self.executor.execute(
            "INSERT INTO challenges (title, description, category) VALUES (:title, :description, :category)",
            &Params::new()
                .with("title", challenge.title.as_str())
                .with("description", challenge.description.as_str())
                .with("category", challenge.category.as_str()),
        )?;
        info!(id = summary.last_insert_id, category = %challenge.category, "Created challenge");
        Ok(summary.last_insert_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Challenge>> {
        let rows = self.executor.fetch(
            &format!("{SELECT_CHALLENGES} WHERE id = :id"),
            &Params::new().with("id", id),
            &QueryModifiers::default(),
        )?;
        rows.into_first().as_ref().map(Challenge::try_from).transpose()
    }

    /// A uniformly random challenge, or `None` when the catalog is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_weekly(&self) -> Result<Option<Challenge>> {
        self.pick_weekly(&mut rand::rng())
    }

    /// [`get_weekly`](Self::get_weekly) with a caller-supplied RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn pick_weekly<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Option<Challenge>> {
        let challenges = self.list_all(None)?;
        let picked = challenges.choose(rng).cloned();
        debug!(pool = challenges.len(), picked = ?picked.as_ref().map(|c| c.id), "Weekly pick");
        Ok(picked)
    }

    /// Delete by id. Succeeds whether or not the row existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete(&self, id: i64) -> Result<()> {
        let summary = self.executor.execute(
            "DELETE FROM challenges WHERE id = :id",
            &Params::new().with("id", id),
        )?;
        info!(id, removed = summary.affected, "Deleted challenge");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count(&self) -> Result<i64> {
        let row = self
            .executor
            .fetch(
                "SELECT COUNT(*) AS total FROM challenges",
                &Params::new(),
                &QueryModifiers::default(),
            )?
            .into_first();
        row.as_ref()
            .and_then(|row| row.get("total"))
            .and_then(Value::as_i64)
            .ok_or_else(|| BoostError::query("COUNT(*) returned no value"))
    }
}

fn to_challenges(rows: RowSet) -> Result<Vec<Challenge>> {
    rows.into_rows().iter().map(Challenge::try_from).collect()
}
