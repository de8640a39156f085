use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, households, members};

use super::{Engine, normalize_required_name, with_tx};

/// Length of the invite code members type to join a household.
const JOIN_CODE_LEN: usize = 6;

fn generate_join_code() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    simple[..JOIN_CODE_LEN].to_uppercase()
}

impl Engine {
    /// Registers a member (the stand-in for the external identity provider
    /// creating a profile on first login).
    pub async fn new_member(
        &self,
        id: &str,
        password: &str,
        display_name: &str,
    ) -> ResultEngine<()> {
        let id = normalize_required_name(id, "member")?;
        let display_name = normalize_required_name(display_name, "member display")?;

        with_tx!(self, |db_tx| {
            if members::Entity::find_by_id(id.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(id.clone()));
            }

            members::ActiveModel {
                id: ActiveValue::Set(id.clone()),
                password: ActiveValue::Set(password.to_string()),
                display_name: ActiveValue::Set(display_name),
                household_id: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Creates a household and moves the creator into it.
    ///
    /// Returns the new household id. The generated join code is what other
    /// members use with [`Engine::join_household`].
    pub async fn new_household(&self, name: &str, user_id: &str) -> ResultEngine<String> {
        let name = normalize_required_name(name, "household")?;
        let household_id = Uuid::new_v4().to_string();
        let code = generate_join_code();

        with_tx!(self, |db_tx| {
            let member = members::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

            households::ActiveModel {
                id: ActiveValue::Set(household_id.clone()),
                name: ActiveValue::Set(name.clone()),
                code: ActiveValue::Set(code.clone()),
                created_by: ActiveValue::Set(member.id.clone()),
            }
            .insert(&db_tx)
            .await?;

            members::ActiveModel {
                id: ActiveValue::Set(member.id),
                household_id: ActiveValue::Set(Some(household_id.clone())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok(household_id.clone())
        })
    }

    /// Joins the household matching an invite code.
    ///
    /// A member already in another household simply switches; membership is
    /// a single profile-side pointer.
    pub async fn join_household(&self, code: &str, user_id: &str) -> ResultEngine<String> {
        let code = code.trim().to_uppercase();

        with_tx!(self, |db_tx| {
            let household = households::Entity::find()
                .filter(households::Column::Code.eq(code.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("no household for that code".to_string())
                })?;

            let member = members::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

            members::ActiveModel {
                id: ActiveValue::Set(member.id),
                household_id: ActiveValue::Set(Some(household.id.clone())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok(household.id)
        })
    }

    /// The household a member currently belongs to, if any.
    pub async fn household_of(&self, user_id: &str) -> ResultEngine<Option<households::Model>> {
        let member = members::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;

        let Some(household_id) = member.household_id else {
            return Ok(None);
        };
        Ok(households::Entity::find_by_id(household_id)
            .one(&self.database)
            .await?)
    }

    /// Full member profiles of a household, id ascending.
    pub async fn roster(
        &self,
        household_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<members::Model>> {
        self.require_member(&self.database, household_id, user_id)
            .await?;

        Ok(members::Entity::find()
            .filter(members::Column::HouseholdId.eq(household_id.to_string()))
            .order_by_asc(members::Column::Id)
            .all(&self.database)
            .await?)
    }
}
