//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Split and assignment fields
//! carry the raw record shape; the engine normalizes them at the boundary.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{MealKind, ServiceKind, SplitMode};

/// Create or fully replace an expense.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub household_id: String,
    pub user_id: String,
    pub title: String,
    pub amount_minor: i64,
    pub category: String,
    pub date: DateTime<Utc>,
    /// Defaults to the acting user when unset.
    pub payer_id: Option<String>,
    pub split_mode: SplitMode,
    pub split_among: Vec<String>,
    pub custom_amounts: BTreeMap<String, i64>,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(
        household_id: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        amount_minor: i64,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            household_id: household_id.into(),
            user_id: user_id.into(),
            title: title.into(),
            amount_minor,
            category: "other".to_string(),
            date,
            payer_id: None,
            split_mode: SplitMode::Equal,
            split_among: Vec::new(),
            custom_amounts: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn payer(mut self, payer_id: impl Into<String>) -> Self {
        self.payer_id = Some(payer_id.into());
        self
    }

    /// Split evenly among the given members. An empty list means the whole
    /// roster, resolved by the engine at creation time.
    #[must_use]
    pub fn split_equal(mut self, among: Vec<String>) -> Self {
        self.split_mode = SplitMode::Equal;
        self.split_among = among;
        self.custom_amounts = BTreeMap::new();
        self
    }

    #[must_use]
    pub fn split_custom(mut self, amounts: BTreeMap<String, i64>) -> Self {
        self.split_mode = SplitMode::Custom;
        self.split_among = Vec::new();
        self.custom_amounts = amounts;
        self
    }
}

/// Create a meal definition.
#[derive(Clone, Debug)]
pub struct MealCmd {
    pub household_id: String,
    pub user_id: String,
    pub name: String,
    pub kind: MealKind,
    pub quantity_hundredths: i64,
    pub notes: Option<String>,
    pub ingredients: Option<String>,
}

impl MealCmd {
    #[must_use]
    pub fn new(
        household_id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
        kind: MealKind,
        quantity_hundredths: i64,
    ) -> Self {
        Self {
            household_id: household_id.into(),
            user_id: user_id.into(),
            name: name.into(),
            kind,
            quantity_hundredths,
            notes: None,
            ingredients: None,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn ingredients(mut self, ingredients: impl Into<String>) -> Self {
        self.ingredients = Some(ingredients.into());
        self
    }
}

/// Plan (or overwrite) a calendar slot.
#[derive(Clone, Debug)]
pub struct SlotCmd {
    pub household_id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub service: ServiceKind,
    /// `(meal_id, portion_hundredths)` pairs; an empty list clears the slot.
    pub assignments: Vec<(String, i64)>,
}

impl SlotCmd {
    #[must_use]
    pub fn new(
        household_id: impl Into<String>,
        user_id: impl Into<String>,
        date: NaiveDate,
        service: ServiceKind,
    ) -> Self {
        Self {
            household_id: household_id.into(),
            user_id: user_id.into(),
            date,
            service,
            assignments: Vec::new(),
        }
    }

    #[must_use]
    pub fn assign(mut self, meal_id: impl Into<String>, portion_hundredths: i64) -> Self {
        self.assignments.push((meal_id.into(), portion_hundredths));
        self
    }
}
