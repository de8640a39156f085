use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::{EngineError, ResultEngine, members};

mod balances;
mod expenses;
mod households;
mod meals;
mod planner;
mod sweep;

pub use expenses::SpendingSummary;
pub use sweep::SweepReport;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The engine: every household-scoped operation goes through here.
///
/// Holds only the database handle; household state is read fresh per
/// operation, so concurrent sessions never share mutable state outside the
/// store itself.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Looks up a household or fails with `KeyNotFound`.
    pub(crate) async fn require_household<C: ConnectionTrait>(
        &self,
        conn: &C,
        household_id: &str,
    ) -> ResultEngine<crate::households::Model> {
        crate::households::Entity::find_by_id(household_id.to_string())
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("household not exists".to_string()))
    }

    /// Authorizes `user_id` against a household.
    ///
    /// Every household-scoped operation calls this first; a member of another
    /// household (or none) gets `Forbidden` and never learns whether the
    /// household exists.
    pub(crate) async fn require_member<C: ConnectionTrait>(
        &self,
        conn: &C,
        household_id: &str,
        user_id: &str,
    ) -> ResultEngine<members::Model> {
        let member = members::Entity::find_by_id(user_id.to_string())
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

        if member.household_id.as_deref() != Some(household_id) {
            return Err(EngineError::Forbidden(
                "not a member of this household".to_string(),
            ));
        }
        Ok(member)
    }

    /// Member ids of a household, ascending.
    pub(crate) async fn roster_ids<C: ConnectionTrait>(
        &self,
        conn: &C,
        household_id: &str,
    ) -> ResultEngine<Vec<String>> {
        let mut ids: Vec<String> = members::Entity::find()
            .filter(members::Column::HouseholdId.eq(household_id.to_string()))
            .all(conn)
            .await?
            .into_iter()
            .map(|member| member.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
