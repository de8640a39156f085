use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run_with_listener, spawn_with_listener};

mod balances;
mod expenses;
mod household;
mod meals;
mod planner;
mod server;

pub mod types {
    pub mod household {
        pub use api_types::household::{
            AttachResponse, HouseholdJoin, HouseholdNew, HouseholdView, MemberView,
            MembersResponse,
        };
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseCreated, ExpenseNew, ExpenseView, ExpensesResponse, SpendingSummaryView,
            SplitMode,
        };
    }

    pub mod balance {
        pub use api_types::balance::{
            BalanceView, BalancesResponse, SettleNew, TransferView, TransfersResponse,
        };
    }

    pub mod meal {
        pub use api_types::meal::{
            DemandView, MealCreated, MealKind, MealNew, MealView, MealsResponse, StockUpdate,
        };
    }

    pub mod planner {
        pub use api_types::planner::{
            AssignmentView, ServiceKind, SlotClear, SlotPut, SlotView, SlotsResponse,
        };
    }

    pub mod sweep {
        pub use api_types::sweep::SweepReportView;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidSplit(_)
        | EngineError::SplitMismatch(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidSlot(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res =
            ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn split_errors_map_to_422() {
        let res = ServerError::from(EngineError::InvalidSplit("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = ServerError::from(EngineError::SplitMismatch("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
