use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use uuid::Uuid;

use crate::{
    EngineError, Meal, MealCmd, Portions, ResultEngine, meals, slots, util::normalize_lookup_key,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Adds a meal definition with its starting stock.
    ///
    /// Names are unique per household under NFKC/case folding, so two members
    /// typing the same dish differently don't end up with split stock.
    pub async fn add_meal(&self, cmd: MealCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "meal")?;

        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, &cmd.household_id, &cmd.user_id)
                .await?;

            let name_norm = normalize_lookup_key(&name);
            let clash = meals::Entity::find()
                .filter(meals::Column::HouseholdId.eq(cmd.household_id.clone()))
                .filter(meals::Column::NameNorm.eq(name_norm))
                .one(&db_tx)
                .await?;
            if clash.is_some() {
                return Err(EngineError::ExistingKey(name.clone()));
            }

            let meal = Meal::new(
                cmd.household_id.clone(),
                name.clone(),
                cmd.kind,
                Portions::new(cmd.quantity_hundredths),
                normalize_optional_text(cmd.notes.as_deref()),
                normalize_optional_text(cmd.ingredients.as_deref()),
            )?;
            meals::ActiveModel::from(&meal).insert(&db_tx).await?;
            Ok(meal.id)
        })
    }

    /// Sets a meal's stock to an absolute quantity (the "I cooked more" /
    /// manual correction path; planned depletion never goes through here).
    pub async fn update_meal_stock(
        &self,
        household_id: &str,
        meal_id: Uuid,
        quantity_hundredths: i64,
        user_id: &str,
    ) -> ResultEngine<()> {
        if quantity_hundredths < 0 {
            return Err(EngineError::InvalidAmount(
                "quantity must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, household_id, user_id).await?;
            let model = self.require_meal(&db_tx, household_id, meal_id).await?;

            meals::ActiveModel {
                id: ActiveValue::Set(model.id),
                quantity_hundredths: ActiveValue::Set(quantity_hundredths),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Deletes a meal definition.
    ///
    /// Slots still referencing it keep their assignment; the sweeper skips
    /// the dangling reference when the slot comes due.
    pub async fn delete_meal(
        &self,
        household_id: &str,
        meal_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, household_id, user_id).await?;
            let model = self.require_meal(&db_tx, household_id, meal_id).await?;
            meals::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// A household's meals, name ascending.
    pub async fn list_meals(&self, household_id: &str, user_id: &str) -> ResultEngine<Vec<Meal>> {
        self.require_member(&self.database, household_id, user_id)
            .await?;

        let models = meals::Entity::find()
            .filter(meals::Column::HouseholdId.eq(household_id.to_string()))
            .order_by_asc(meals::Column::NameNorm)
            .all(&self.database)
            .await?;
        models.into_iter().map(Meal::try_from).collect()
    }

    /// Returns a single meal.
    pub async fn meal(
        &self,
        household_id: &str,
        meal_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Meal> {
        self.require_member(&self.database, household_id, user_id)
            .await?;
        let model = self
            .require_meal(&self.database, household_id, meal_id)
            .await?;
        Meal::try_from(model)
    }

    /// Total portions of a meal claimed by slots the sweeper has not
    /// processed yet.
    ///
    /// Presentation layers compare this against stock to warn before
    /// depletion actually runs; the sweeper itself re-reads quantities inside
    /// its transaction and never trusts this number.
    pub async fn current_demand(
        &self,
        household_id: &str,
        meal_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Portions> {
        self.require_member(&self.database, household_id, user_id)
            .await?;

        let slot_models = slots::Entity::find()
            .filter(slots::Column::HouseholdId.eq(household_id.to_string()))
            .filter(slots::Column::Processed.eq(false))
            .all(&self.database)
            .await?;

        let mut demand = Portions::ZERO;
        for model in slot_models {
            let slot = slots::PlannedSlot::try_from(model)?;
            demand += slot
                .assignments
                .iter()
                .filter(|a| a.meal_id == meal_id)
                .map(|a| a.portion)
                .sum();
        }
        Ok(demand)
    }

    async fn require_meal<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        household_id: &str,
        meal_id: Uuid,
    ) -> ResultEngine<meals::Model> {
        let model = meals::Entity::find_by_id(meal_id.to_string())
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("meal not exists".to_string()))?;
        if model.household_id != household_id {
            return Err(EngineError::KeyNotFound("meal not exists".to_string()));
        }
        Ok(model)
    }
}
