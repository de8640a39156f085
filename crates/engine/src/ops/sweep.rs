use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{EngineError, PlannedSlot, Portions, ResultEngine, meals, slots};

use super::Engine;

/// What one sweep pass did, for logs and the attach response.
///
/// Nothing in here is an error: contention and dangling meal references are
/// expected operating conditions that the next opportunistic sweep absorbs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Slots this caller transitioned to processed.
    pub swept: u32,
    /// Slots another sweeper had already processed by the time we looked.
    pub already_processed: u32,
    /// Slots lost to a concurrent transaction; still due, retried next sweep.
    pub contended: u32,
    /// Assignments skipped because their meal no longer exists.
    pub missing_meals: u32,
    /// Decrements that ran past zero and were clamped.
    pub depleted: u32,
}

enum SlotOutcome {
    Swept { missing_meals: u32, depleted: u32 },
    AlreadyProcessed,
    Contended,
}

impl Engine {
    /// Runs one depletion pass over a household's due slots.
    ///
    /// A slot is due when its date is before `today` and it has not been
    /// processed. Each due slot is transitioned independently inside its own
    /// DB transaction, so any number of sessions can trigger sweeps
    /// concurrently: for a given slot exactly one transaction observes
    /// `processed = false` and commits the flip together with the stock
    /// decrements; everyone else no-ops or loses the commit race and leaves
    /// the slot for the next sweep.
    ///
    /// An interrupted sweep needs no recovery: whatever it left due is picked
    /// up the next time any session attaches.
    pub async fn sweep(
        &self,
        household_id: &str,
        today: NaiveDate,
        user_id: &str,
    ) -> ResultEngine<SweepReport> {
        self.require_member(&self.database, household_id, user_id)
            .await?;

        let due: Vec<String> = slots::Entity::find()
            .filter(slots::Column::HouseholdId.eq(household_id.to_string()))
            .filter(slots::Column::Processed.eq(false))
            .filter(slots::Column::Date.lt(today))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| model.id)
            .collect();

        let mut report = SweepReport::default();
        for slot_id in due {
            match self.sweep_slot(&slot_id).await {
                Ok(SlotOutcome::Swept {
                    missing_meals,
                    depleted,
                }) => {
                    report.swept += 1;
                    report.missing_meals += missing_meals;
                    report.depleted += depleted;
                }
                Ok(SlotOutcome::AlreadyProcessed) => report.already_processed += 1,
                Ok(SlotOutcome::Contended) => report.contended += 1,
                Err(EngineError::Database(err)) => {
                    // Optimistic-concurrency conflict with another session's
                    // sweep. Expected; the slot is still due and the next
                    // sweep retries it.
                    tracing::debug!(slot = %slot_id, "sweep contention: {err}");
                    report.contended += 1;
                }
                Err(err) => {
                    // A malformed slot must not poison the rest of the pass.
                    tracing::warn!(slot = %slot_id, "sweep skipped slot: {err}");
                }
            }
        }

        tracing::debug!(
            household = %household_id,
            swept = report.swept,
            contended = report.contended,
            "sweep pass finished"
        );
        Ok(report)
    }

    /// The per-slot transition: at most one decrement ever happens, no matter
    /// how many sweepers race on the slot.
    async fn sweep_slot(&self, slot_id: &str) -> ResultEngine<SlotOutcome> {
        let db_tx = self.database.begin().await?;

        // Re-read inside the transaction; the pre-selection outside is stale
        // by definition.
        let Some(model) = slots::Entity::find_by_id(slot_id.to_string())
            .one(&db_tx)
            .await?
        else {
            // Slot deleted since selection; nothing left to apply.
            return Ok(SlotOutcome::AlreadyProcessed);
        };
        if model.processed {
            return Ok(SlotOutcome::AlreadyProcessed);
        }
        let slot = PlannedSlot::try_from(model)?;

        // All reads before any write: fetch each referenced meal fresh and
        // compute the clamped decrements. A slot may list the same meal
        // twice; the running quantity makes the second assignment see the
        // first one's decrement.
        let mut fresh: HashMap<Uuid, Option<Portions>> = HashMap::new();
        let mut missing_meals = 0u32;
        let mut depleted = 0u32;

        for assignment in &slot.assignments {
            let quantity = match fresh.get(&assignment.meal_id) {
                Some(cached) => *cached,
                None => {
                    let loaded = meals::Entity::find_by_id(assignment.meal_id.to_string())
                        .one(&db_tx)
                        .await?
                        .map(|meal| Portions::new(meal.quantity_hundredths));
                    fresh.insert(assignment.meal_id, loaded);
                    loaded
                }
            };

            match quantity {
                None => {
                    // The meal was deleted after planning. Skip this
                    // assignment only; the slot still gets processed.
                    missing_meals += 1;
                }
                Some(current) => {
                    let (next, clamped) = current.saturating_sub(assignment.portion);
                    if clamped {
                        depleted += 1;
                    }
                    fresh.insert(assignment.meal_id, Some(next));
                }
            }
        }

        // Guarded flip: only the transaction that still observes
        // `processed = false` gets to write the decrements.
        let flip = slots::Entity::update_many()
            .col_expr(slots::Column::Processed, Expr::value(true))
            .filter(slots::Column::Id.eq(slot_id.to_string()))
            .filter(slots::Column::Processed.eq(false))
            .exec(&db_tx)
            .await?;
        if flip.rows_affected == 0 {
            return Ok(SlotOutcome::Contended);
        }

        for (meal_id, quantity) in fresh {
            if let Some(quantity) = quantity {
                meals::ActiveModel {
                    id: ActiveValue::Set(meal_id.to_string()),
                    quantity_hundredths: ActiveValue::Set(quantity.hundredths()),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
            }
        }

        db_tx.commit().await?;
        Ok(SlotOutcome::Swept {
            missing_meals,
            depleted,
        })
    }
}
