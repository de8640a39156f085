//! Expense records and their split configuration.
//!
//! The store keeps the split in two loosely-shaped fields (`split_among`
//! array, `custom_amounts` map) next to a `split_mode` discriminator. The
//! engine normalizes that shape into the [`Split`] union exactly once, at the
//! ingestion boundary ([`Split::from_record`] / [`TryFrom<Model>`]); consuming
//! code only ever sees the typed variant.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Expense category.
///
/// The known set mirrors the product's fixed list; anything else is carried
/// through as [`Category::Other`] so new categories never require a schema
/// change. [`Category::Settlement`] marks a recorded peer-to-peer payment and
/// is excluded from spending summaries, but flows through balance
/// aggregation like any other expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Groceries,
    Home,
    Utilities,
    Leisure,
    Settlement,
    #[serde(untagged)]
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Groceries => "groceries",
            Self::Home => "home",
            Self::Utilities => "utilities",
            Self::Leisure => "leisure",
            Self::Settlement => "settlement",
            Self::Other(name) => name,
        }
    }

    #[must_use]
    pub fn is_settlement(&self) -> bool {
        matches!(self, Self::Settlement)
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        match value {
            "groceries" => Self::Groceries,
            "home" => Self::Home,
            "utilities" => Self::Utilities,
            "leisure" => Self::Leisure,
            "settlement" => Self::Settlement,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    Equal,
    Custom,
}

impl SplitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Custom => "custom",
        }
    }
}

impl TryFrom<&str> for SplitMode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "custom" => Ok(Self::Custom),
            other => Err(EngineError::InvalidSplit(format!(
                "invalid split mode: {other}"
            ))),
        }
    }
}

/// Who an expense was for, in normalized form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Split {
    /// Divided evenly across `among` (remainder cents go to the first members
    /// in id order).
    Equal { among: Vec<String> },
    /// Explicit per-member amounts; must sum exactly to the expense amount.
    Custom { amounts: BTreeMap<String, MoneyCents> },
}

impl Split {
    /// Normalizes the store/API shape into a [`Split`].
    ///
    /// - `equal`: deduplicates and id-sorts the beneficiary set.
    /// - `custom`: drops zero entries, rejects negative ones.
    ///
    /// Shape-level validation only; whether a custom split matches the
    /// expense amount is checked by [`Split::validate`].
    pub fn from_record(
        mode: SplitMode,
        among: Vec<String>,
        amounts: BTreeMap<String, i64>,
    ) -> ResultEngine<Self> {
        match mode {
            SplitMode::Equal => {
                let mut among = among;
                among.sort();
                among.dedup();
                Ok(Self::Equal { among })
            }
            SplitMode::Custom => {
                let mut shares = BTreeMap::new();
                for (member, cents) in amounts {
                    if cents < 0 {
                        return Err(EngineError::InvalidAmount(format!(
                            "negative custom share for {member}"
                        )));
                    }
                    if cents > 0 {
                        shares.insert(member, MoneyCents::new(cents));
                    }
                }
                Ok(Self::Custom { amounts: shares })
            }
        }
    }

    pub fn mode(&self) -> SplitMode {
        match self {
            Self::Equal { .. } => SplitMode::Equal,
            Self::Custom { .. } => SplitMode::Custom,
        }
    }

    /// Member ids consuming a share of the expense.
    pub fn beneficiaries(&self) -> Vec<&str> {
        match self {
            Self::Equal { among } => among.iter().map(String::as_str).collect(),
            Self::Custom { amounts } => amounts.keys().map(String::as_str).collect(),
        }
    }

    /// Checks the split against the expense amount.
    ///
    /// An empty equal split is rejected with [`EngineError::InvalidSplit`]; a
    /// custom split whose shares do not sum exactly to `amount` with
    /// [`EngineError::SplitMismatch`]. Integer cents make the equality exact,
    /// so there is no tolerance window.
    pub fn validate(&self, amount: MoneyCents) -> ResultEngine<()> {
        match self {
            Self::Equal { among } => {
                if among.is_empty() {
                    return Err(EngineError::InvalidSplit(
                        "equal split needs at least one beneficiary".to_string(),
                    ));
                }
                Ok(())
            }
            Self::Custom { amounts } => {
                if amounts.is_empty() {
                    return Err(EngineError::InvalidSplit(
                        "custom split needs at least one share".to_string(),
                    ));
                }
                let sum: MoneyCents = amounts.values().copied().sum();
                if sum != amount {
                    return Err(EngineError::SplitMismatch(format!(
                        "custom shares sum to {sum}, expense amount is {amount}"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// A shared expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub household_id: String,
    pub title: String,
    pub amount: MoneyCents,
    pub category: Category,
    pub date: DateTime<Utc>,
    pub payer_id: String,
    pub split: Split,
}

impl Expense {
    /// Builds a validated expense.
    ///
    /// Rejects non-positive amounts and any split that fails
    /// [`Split::validate`], so an invalid record is never handed to storage.
    pub fn new(
        household_id: String,
        title: String,
        amount: MoneyCents,
        category: Category,
        date: DateTime<Utc>,
        payer_id: String,
        split: Split,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        split.validate(amount)?;

        Ok(Self {
            id: Uuid::new_v4(),
            household_id,
            title,
            amount,
            category,
            date,
            payer_id,
            split,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub household_id: String,
    pub title: String,
    pub amount_minor: i64,
    pub category: String,
    pub date: DateTimeUtc,
    pub payer_id: String,
    pub split_mode: String,
    pub split_among: Json,
    pub custom_amounts: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::households::Entity",
        from = "Column::HouseholdId",
        to = "super::households::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Household,
}

impl Related<super::households::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Household.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        let (split_among, custom_amounts) = match &expense.split {
            Split::Equal { among } => (serde_json::json!(among), serde_json::json!({})),
            Split::Custom { amounts } => {
                let cents: BTreeMap<&String, i64> =
                    amounts.iter().map(|(k, v)| (k, v.cents())).collect();
                (serde_json::json!([]), serde_json::json!(cents))
            }
        };

        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            household_id: ActiveValue::Set(expense.household_id.clone()),
            title: ActiveValue::Set(expense.title.clone()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            category: ActiveValue::Set(expense.category.as_str().to_string()),
            date: ActiveValue::Set(expense.date),
            payer_id: ActiveValue::Set(expense.payer_id.clone()),
            split_mode: ActiveValue::Set(expense.split.mode().as_str().to_string()),
            split_among: ActiveValue::Set(split_among),
            custom_amounts: ActiveValue::Set(custom_amounts),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let mode = SplitMode::try_from(model.split_mode.as_str())?;
        let among: Vec<String> = serde_json::from_value(model.split_among)
            .map_err(|_| EngineError::InvalidSplit("malformed split_among".to_string()))?;
        let amounts: BTreeMap<String, i64> = serde_json::from_value(model.custom_amounts)
            .map_err(|_| EngineError::InvalidSplit("malformed custom_amounts".to_string()))?;

        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("expense not exists".to_string()))?,
            household_id: model.household_id,
            title: model.title,
            amount: MoneyCents::new(model.amount_minor),
            category: Category::from(model.category.as_str()),
            date: model.date,
            payer_id: model.payer_id,
            split: Split::from_record(mode, among, amounts)?,
        })
    }
}
