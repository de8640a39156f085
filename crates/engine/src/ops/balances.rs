use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseCmd, MoneyCents, Period, ResultEngine, Transfer, balance, settlement,
};

use super::Engine;

impl Engine {
    /// Net balance per member for one period.
    ///
    /// A point-in-time read followed by a pure fold: no locks are taken and
    /// the result is safe to recompute on every render. Positive means the
    /// member is owed money, negative that they owe; the map always sums to
    /// zero.
    pub async fn period_balances(
        &self,
        household_id: &str,
        period: Period,
        user_id: &str,
    ) -> ResultEngine<BTreeMap<String, MoneyCents>> {
        let expenses = self.list_expenses(household_id, period, user_id).await?;
        let roster = self.roster_ids(&self.database, household_id).await?;

        balance::aggregate(roster.iter().map(String::as_str), &expenses)
    }

    /// The transfer plan that settles one period.
    pub async fn settlement_plan(
        &self,
        household_id: &str,
        period: Period,
        user_id: &str,
    ) -> ResultEngine<Vec<Transfer>> {
        let balances = self
            .period_balances(household_id, period, user_id)
            .await?;
        Ok(settlement::plan(&balances))
    }

    /// Marks a planned transfer as actually paid.
    ///
    /// No transfer entity is stored. The payment becomes a `settlement`
    /// expense with the debtor as payer and the creditor as sole beneficiary,
    /// so the next balance computation folds it in and the pair reads zero.
    pub async fn record_settlement(
        &self,
        household_id: &str,
        from: &str,
        to: &str,
        amount_minor: i64,
        date: DateTime<Utc>,
        user_id: &str,
    ) -> ResultEngine<Uuid> {
        if from == to {
            return Err(EngineError::InvalidAmount(
                "debtor and creditor must differ".to_string(),
            ));
        }

        let title = format!("Settlement {}", Period::containing(date));
        let cmd = ExpenseCmd::new(household_id, user_id, title, amount_minor, date)
            .category("settlement")
            .payer(from)
            .split_equal(vec![to.to_string()]);

        self.add_expense(cmd).await
    }
}
