//! Wire types shared by the server and its clients.
//!
//! Amounts travel as integer minor units (`*_minor` = cents,
//! `*_hundredths` = hundredths of a portion); the engine owns the fixed-point
//! types behind them. Periods travel as `YYYY-MM` strings, dates as ISO-8601.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod household {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HouseholdNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HouseholdJoin {
        pub code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HouseholdView {
        pub id: String,
        pub name: String,
        pub code: String,
    }

    /// A member profile as other household members see it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: String,
        pub display_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }

    /// Response to a session attaching to its household: the household
    /// details plus what the opportunistic sweep pass just did.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AttachResponse {
        pub household: HouseholdView,
        pub sweep: super::sweep::SweepReportView,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SplitMode {
        Equal,
        Custom,
    }

    /// Create or replace an expense.
    ///
    /// `split_among` is used by `equal` mode (empty = whole roster);
    /// `custom_amounts` by `custom` mode and must sum to `amount_minor`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub title: String,
        pub amount_minor: i64,
        pub category: String,
        /// Defaults to now.
        pub date: Option<DateTime<Utc>>,
        /// Defaults to the authenticated member.
        pub payer_id: Option<String>,
        pub split_mode: SplitMode,
        #[serde(default)]
        pub split_among: Vec<String>,
        #[serde(default)]
        pub custom_amounts: BTreeMap<String, i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub title: String,
        pub amount_minor: i64,
        pub category: String,
        pub date: DateTime<Utc>,
        pub payer_id: String,
        pub split_mode: SplitMode,
        pub split_among: Vec<String>,
        pub custom_amounts: BTreeMap<String, i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub period: String,
        pub expenses: Vec<ExpenseView>,
    }

    /// Period spending, settlement payments excluded.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SpendingSummaryView {
        pub period: String,
        pub total_minor: i64,
        pub by_category: BTreeMap<String, i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: Uuid,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub member_id: String,
        /// Positive = owed to the member, negative = the member owes.
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub period: String,
        pub balances: Vec<BalanceView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub from: String,
        pub to: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransfersResponse {
        pub period: String,
        pub transfers: Vec<TransferView>,
    }

    /// Record that a planned transfer was actually paid.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettleNew {
        pub from: String,
        pub to: String,
        pub amount_minor: i64,
    }
}

pub mod meal {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MealKind {
        Lunch,
        Dinner,
        Any,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MealNew {
        pub name: String,
        pub kind: MealKind,
        pub quantity_hundredths: i64,
        pub notes: Option<String>,
        pub ingredients: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MealView {
        pub id: Uuid,
        pub name: String,
        pub kind: MealKind,
        pub quantity_hundredths: i64,
        pub notes: Option<String>,
        pub ingredients: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MealsResponse {
        pub meals: Vec<MealView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockUpdate {
        pub quantity_hundredths: i64,
    }

    /// Stock vs. outstanding demand, the "will run out" early warning.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DemandView {
        pub meal_id: Uuid,
        pub stock_hundredths: i64,
        pub demand_hundredths: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MealCreated {
        pub id: Uuid,
    }
}

pub mod planner {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ServiceKind {
        Lunch,
        Dinner,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignmentView {
        pub meal_id: Uuid,
        pub portion_hundredths: i64,
    }

    /// Plan (or overwrite) one calendar slot. An empty assignment list
    /// clears it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SlotPut {
        pub date: NaiveDate,
        pub service: ServiceKind,
        #[serde(default)]
        pub assignments: Vec<AssignmentView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SlotClear {
        pub date: NaiveDate,
        pub service: ServiceKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SlotView {
        pub date: NaiveDate,
        pub service: ServiceKind,
        pub assignments: Vec<AssignmentView>,
        pub processed: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SlotsResponse {
        pub slots: Vec<SlotView>,
    }
}

pub mod sweep {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SweepReportView {
        pub swept: u32,
        pub already_processed: u32,
        pub contended: u32,
        pub missing_meals: u32,
        pub depleted: u32,
    }
}
