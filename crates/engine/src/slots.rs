//! Planned meal slots.
//!
//! A slot is one `(date, service)` cell of the household calendar. Its key is
//! the composite string `{household_id}_{date}-{service}` so one household
//! can only ever hold one slot per cell.
//!
//! The `meals` field has two historical shapes: a bare meal-id string (one
//! full portion, the original single-meal planner) and the current list of
//! `{meal_id, portion}` assignments. Both are normalized into
//! [`Vec<Assignment>`] here, at the ingestion boundary, and nowhere else.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Portions, ResultEngine};

/// Which service of the day a slot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Lunch,
    Dinner,
}

impl ServiceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }
}

impl TryFrom<&str> for ServiceKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            other => Err(EngineError::InvalidSlot(format!(
                "invalid service kind: {other}"
            ))),
        }
    }
}

/// One meal drawn from stock by a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub meal_id: Uuid,
    pub portion: Portions,
}

impl Assignment {
    pub fn new(meal_id: Uuid, portion: Portions) -> ResultEngine<Self> {
        if !portion.is_positive() {
            return Err(EngineError::InvalidSlot(
                "assignment portion must be > 0".to_string(),
            ));
        }
        Ok(Self { meal_id, portion })
    }
}

/// Lifecycle of a slot relative to a reference day.
///
/// `Planned` and `Due` are the same stored record (`processed = false`); the
/// split is purely temporal. Only `Due` slots are eligible for the
/// depletion transition, and `Processed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Planned,
    Due,
    Processed,
}

/// Composite primary key of a slot.
#[must_use]
pub fn slot_key(household_id: &str, date: NaiveDate, service: ServiceKind) -> String {
    format!("{household_id}_{date}-{}", service.as_str())
}

/// A planned calendar cell with its meal assignments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSlot {
    pub id: String,
    pub household_id: String,
    pub date: NaiveDate,
    pub service: ServiceKind,
    pub assignments: Vec<Assignment>,
    pub processed: bool,
}

impl PlannedSlot {
    pub fn new(
        household_id: String,
        date: NaiveDate,
        service: ServiceKind,
        assignments: Vec<Assignment>,
    ) -> Self {
        Self {
            id: slot_key(&household_id, date, service),
            household_id,
            date,
            service,
            assignments,
            processed: false,
        }
    }

    /// Where the slot sits in its lifecycle, relative to `today`.
    #[must_use]
    pub fn state(&self, today: NaiveDate) -> SlotState {
        if self.processed {
            SlotState::Processed
        } else if self.date < today {
            SlotState::Due
        } else {
            SlotState::Planned
        }
    }
}

/// The two stored shapes of the `meals` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MealsField {
    /// Legacy single-meal slot: the bare meal id, one full portion.
    Single(String),
    List(Vec<AssignmentRecord>),
}

#[derive(Debug, Serialize, Deserialize)]
struct AssignmentRecord {
    meal_id: String,
    portion_hundredths: i64,
}

fn parse_meal_id(raw: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(raw).map_err(|_| EngineError::InvalidSlot(format!("invalid meal id: {raw}")))
}

/// Normalizes either stored shape into assignment records.
fn normalize_meals(value: Json) -> ResultEngine<Vec<Assignment>> {
    let field: MealsField = serde_json::from_value(value)
        .map_err(|_| EngineError::InvalidSlot("malformed meals field".to_string()))?;

    match field {
        MealsField::Single(meal_id) => {
            Ok(vec![Assignment {
                meal_id: parse_meal_id(&meal_id)?,
                portion: Portions::ONE,
            }])
        }
        MealsField::List(records) => records
            .into_iter()
            .map(|record| {
                Assignment::new(
                    parse_meal_id(&record.meal_id)?,
                    Portions::new(record.portion_hundredths),
                )
            })
            .collect(),
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "planned_slots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub household_id: String,
    pub date: Date,
    pub service: String,
    pub meals: Json,
    pub processed: bool,
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

impl From<&PlannedSlot> for ActiveModel {
    fn from(slot: &PlannedSlot) -> Self {
        let records: Vec<AssignmentRecord> = slot
            .assignments
            .iter()
            .map(|a| AssignmentRecord {
                meal_id: a.meal_id.to_string(),
                portion_hundredths: a.portion.hundredths(),
            })
            .collect();

        Self {
            id: ActiveValue::Set(slot.id.clone()),
            household_id: ActiveValue::Set(slot.household_id.clone()),
            date: ActiveValue::Set(slot.date),
            service: ActiveValue::Set(slot.service.as_str().to_string()),
            meals: ActiveValue::Set(serde_json::json!(records)),
            processed: ActiveValue::Set(slot.processed),
        }
    }
}

impl TryFrom<Model> for PlannedSlot {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            household_id: model.household_id,
            date: model.date,
            service: ServiceKind::try_from(model.service.as_str())?,
            assignments: normalize_meals(model.meals)?,
            processed: model.processed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_key_is_composite() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        assert_eq!(
            slot_key("hh1", date, ServiceKind::Dinner),
            "hh1_2026-08-03-dinner"
        );
    }

    #[test]
    fn legacy_single_meal_normalizes_to_one_full_portion() {
        let meal_id = Uuid::new_v4();
        let assignments = normalize_meals(serde_json::json!(meal_id.to_string())).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].meal_id, meal_id);
        assert_eq!(assignments[0].portion, Portions::ONE);
    }

    #[test]
    fn assignment_list_normalizes_portions() {
        let meal_id = Uuid::new_v4();
        let assignments = normalize_meals(serde_json::json!([
            { "meal_id": meal_id.to_string(), "portion_hundredths": 250 }
        ]))
        .unwrap();
        assert_eq!(assignments, [Assignment {
            meal_id,
            portion: Portions::new(250),
        }]);
    }

    #[test]
    fn zero_portion_assignment_is_rejected() {
        let meal_id = Uuid::new_v4();
        let result = normalize_meals(serde_json::json!([
            { "meal_id": meal_id.to_string(), "portion_hundredths": 0 }
        ]));
        assert!(matches!(result, Err(EngineError::InvalidSlot(_))));
    }

    #[test]
    fn state_follows_date_and_processed_flag() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let mut slot = PlannedSlot::new(
            "hh1".to_string(),
            today.pred_opt().unwrap(),
            ServiceKind::Lunch,
            vec![],
        );
        assert_eq!(slot.state(today), SlotState::Due);

        slot.date = today;
        assert_eq!(slot.state(today), SlotState::Planned);

        slot.processed = true;
        assert_eq!(slot.state(today), SlotState::Processed);
    }
}
