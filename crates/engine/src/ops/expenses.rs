use std::collections::BTreeMap;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use uuid::Uuid;

use crate::{
    Category, EngineError, Expense, ExpenseCmd, MoneyCents, Period, ResultEngine, Split, expenses,
};

use super::{Engine, normalize_required_name, with_tx};

/// Spending totals for one period, settlement payments excluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendingSummary {
    pub total: MoneyCents,
    pub by_category: BTreeMap<String, MoneyCents>,
}

impl Engine {
    fn build_expense(cmd: &ExpenseCmd, roster: &[String]) -> ResultEngine<Expense> {
        let title = normalize_required_name(&cmd.title, "expense")?;
        let payer_id = cmd
            .payer_id
            .clone()
            .unwrap_or_else(|| cmd.user_id.clone());

        // An empty equal split means "everyone".
        let among = if cmd.split_among.is_empty() {
            roster.to_vec()
        } else {
            cmd.split_among.clone()
        };
        let split = Split::from_record(cmd.split_mode, among, cmd.custom_amounts.clone())?;

        Expense::new(
            cmd.household_id.clone(),
            title,
            MoneyCents::new(cmd.amount_minor),
            Category::from(cmd.category.trim()),
            cmd.date,
            payer_id,
            split,
        )
    }

    /// Records a new shared expense.
    ///
    /// Split validation happens before anything is written: an invalid or
    /// mismatched split never reaches the store.
    pub async fn add_expense(&self, cmd: ExpenseCmd) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, &cmd.household_id, &cmd.user_id)
                .await?;
            let roster = self.roster_ids(&db_tx, &cmd.household_id).await?;

            let expense = Self::build_expense(&cmd, &roster)?;
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;

            tracing::debug!(
                expense = %expense.id,
                household = %expense.household_id,
                amount = %expense.amount,
                "expense recorded"
            );
            Ok(expense.id)
        })
    }

    /// Replaces an expense with a re-validated version of itself.
    pub async fn update_expense(&self, expense_id: Uuid, cmd: ExpenseCmd) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, &cmd.household_id, &cmd.user_id)
                .await?;

            let model = expenses::Entity::find_by_id(expense_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            if model.household_id != cmd.household_id {
                return Err(EngineError::KeyNotFound("expense not exists".to_string()));
            }

            let roster = self.roster_ids(&db_tx, &cmd.household_id).await?;
            let mut expense = Self::build_expense(&cmd, &roster)?;
            expense.id = expense_id;

            let mut active = expenses::ActiveModel::from(&expense);
            active.id = sea_orm::ActiveValue::Unchanged(expense_id.to_string());
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes an expense.
    pub async fn delete_expense(
        &self,
        household_id: &str,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, household_id, user_id).await?;

            let model = expenses::Entity::find_by_id(expense_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            if model.household_id != household_id {
                return Err(EngineError::KeyNotFound("expense not exists".to_string()));
            }

            expenses::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Expenses of one period, newest first.
    pub async fn list_expenses(
        &self,
        household_id: &str,
        period: Period,
        user_id: &str,
    ) -> ResultEngine<Vec<Expense>> {
        self.require_member(&self.database, household_id, user_id)
            .await?;

        let models = expenses::Entity::find()
            .filter(expenses::Column::HouseholdId.eq(household_id.to_string()))
            .filter(expenses::Column::Date.gte(period.start()))
            .filter(expenses::Column::Date.lt(period.next().start()))
            .order_by_desc(expenses::Column::Date)
            .all(&self.database)
            .await?;

        models.into_iter().map(Expense::try_from).collect()
    }

    /// Period spending total and per-category breakdown.
    ///
    /// Settlement records are money moving between members, not consumption,
    /// so they are left out here even though balance aggregation includes
    /// them.
    pub async fn monthly_spending(
        &self,
        household_id: &str,
        period: Period,
        user_id: &str,
    ) -> ResultEngine<SpendingSummary> {
        let expenses = self.list_expenses(household_id, period, user_id).await?;

        let mut total = MoneyCents::ZERO;
        let mut by_category: BTreeMap<String, MoneyCents> = BTreeMap::new();
        for expense in &expenses {
            if expense.category.is_settlement() {
                continue;
            }
            total += expense.amount;
            *by_category
                .entry(expense.category.as_str().to_string())
                .or_insert(MoneyCents::ZERO) += expense.amount;
        }

        Ok(SpendingSummary { total, by_category })
    }
}
