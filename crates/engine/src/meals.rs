//! Meal definitions and their stock.
//!
//! `quantity` is the number of prepared portions still available, stored as
//! fixed-point hundredths ([`Portions`]). It is only ever decremented inside
//! the sweeper's per-slot transaction; planner and presentation layers read
//! it (together with `current_demand`) to warn before depletion runs.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Portions, ResultEngine};

/// Which service a meal is meant for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealKind {
    Lunch,
    Dinner,
    /// Fits either service.
    #[default]
    Any,
}

impl MealKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Any => "any",
        }
    }
}

impl TryFrom<&str> for MealKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "any" => Ok(Self::Any),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid meal kind: {other}"
            ))),
        }
    }
}

/// A reusable dish definition with its remaining stock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    pub household_id: String,
    pub name: String,
    pub kind: MealKind,
    pub quantity: Portions,
    pub notes: Option<String>,
    pub ingredients: Option<String>,
}

impl Meal {
    pub fn new(
        household_id: String,
        name: String,
        kind: MealKind,
        quantity: Portions,
        notes: Option<String>,
        ingredients: Option<String>,
    ) -> ResultEngine<Self> {
        if quantity.hundredths() < 0 {
            return Err(EngineError::InvalidAmount(
                "quantity must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            household_id,
            name,
            kind,
            quantity,
            notes,
            ingredients,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "meals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub name_norm: String,
    pub kind: String,
    pub quantity_hundredths: i64,
    pub notes: Option<String>,
    pub ingredients: Option<String>,
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

impl From<&Meal> for ActiveModel {
    fn from(meal: &Meal) -> Self {
        Self {
            id: ActiveValue::Set(meal.id.to_string()),
            household_id: ActiveValue::Set(meal.household_id.clone()),
            name: ActiveValue::Set(meal.name.clone()),
            name_norm: ActiveValue::Set(crate::util::normalize_lookup_key(&meal.name)),
            kind: ActiveValue::Set(meal.kind.as_str().to_string()),
            quantity_hundredths: ActiveValue::Set(meal.quantity.hundredths()),
            notes: ActiveValue::Set(meal.notes.clone()),
            ingredients: ActiveValue::Set(meal.ingredients.clone()),
        }
    }
}

impl TryFrom<Model> for Meal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("meal not exists".to_string()))?,
            household_id: model.household_id,
            name: model.name,
            kind: MealKind::try_from(model.kind.as_str())?,
            quantity: Portions::new(model.quantity_hundredths),
            notes: model.notes,
            ingredients: model.ingredients,
        })
    }
}
