use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use uuid::Uuid;

use crate::{
    Assignment, EngineError, PlannedSlot, Portions, ResultEngine, ServiceKind, SlotCmd, meals,
    slot_key, slots,
};

use super::{Engine, with_tx};

impl Engine {
    /// Plans or overwrites one calendar slot.
    ///
    /// Planning is only allowed for today onward: past slots belong to the
    /// sweeper. An empty assignment list clears the slot.
    pub async fn set_slot(&self, cmd: SlotCmd, today: NaiveDate) -> ResultEngine<()> {
        if cmd.date < today {
            return Err(EngineError::InvalidSlot(
                "cannot plan a slot in the past".to_string(),
            ));
        }
        if cmd.assignments.is_empty() {
            return self
                .clear_slot(&cmd.household_id, cmd.date, cmd.service, &cmd.user_id, today)
                .await;
        }

        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, &cmd.household_id, &cmd.user_id)
                .await?;

            let mut assignments = Vec::with_capacity(cmd.assignments.len());
            for (raw_meal_id, portion_hundredths) in &cmd.assignments {
                let meal_id = Uuid::parse_str(raw_meal_id).map_err(|_| {
                    EngineError::InvalidSlot(format!("invalid meal id: {raw_meal_id}"))
                })?;

                // Only existing household meals can be planned; dangling
                // references appear later, when someone deletes the meal.
                let meal = meals::Entity::find_by_id(meal_id.to_string())
                    .one(&db_tx)
                    .await?;
                match meal {
                    Some(meal) if meal.household_id == cmd.household_id => {}
                    _ => return Err(EngineError::KeyNotFound("meal not exists".to_string())),
                }

                assignments.push(Assignment::new(meal_id, Portions::new(*portion_hundredths))?);
            }

            let slot = PlannedSlot::new(
                cmd.household_id.clone(),
                cmd.date,
                cmd.service,
                assignments,
            );

            match slots::Entity::find_by_id(slot.id.clone()).one(&db_tx).await? {
                Some(existing) => {
                    if existing.processed {
                        return Err(EngineError::InvalidSlot(
                            "slot already processed".to_string(),
                        ));
                    }
                    let mut active = slots::ActiveModel::from(&slot);
                    active.id = ActiveValue::Unchanged(slot.id.clone());
                    active.update(&db_tx).await?;
                }
                None => {
                    slots::ActiveModel::from(&slot).insert(&db_tx).await?;
                }
            }
            Ok(())
        })
    }

    /// Removes a planned slot, if present.
    pub async fn clear_slot(
        &self,
        household_id: &str,
        date: NaiveDate,
        service: ServiceKind,
        user_id: &str,
        today: NaiveDate,
    ) -> ResultEngine<()> {
        if date < today {
            return Err(EngineError::InvalidSlot(
                "cannot edit a slot in the past".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, household_id, user_id).await?;

            let key = slot_key(household_id, date, service);
            if let Some(existing) = slots::Entity::find_by_id(key).one(&db_tx).await? {
                if existing.processed {
                    return Err(EngineError::InvalidSlot(
                        "slot already processed".to_string(),
                    ));
                }
                slots::Entity::delete_by_id(existing.id).exec(&db_tx).await?;
            }
            Ok(())
        })
    }

    /// All of a household's slots, date ascending.
    pub async fn list_slots(
        &self,
        household_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<PlannedSlot>> {
        self.require_member(&self.database, household_id, user_id)
            .await?;

        let models = slots::Entity::find()
            .filter(slots::Column::HouseholdId.eq(household_id.to_string()))
            .order_by_asc(slots::Column::Date)
            .order_by_asc(slots::Column::Service)
            .all(&self.database)
            .await?;
        models.into_iter().map(PlannedSlot::try_from).collect()
    }
}
