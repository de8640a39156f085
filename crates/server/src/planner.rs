//! Planner API endpoints.

use api_types::planner::{AssignmentView, ServiceKind, SlotClear, SlotPut, SlotView, SlotsResponse};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    ServerError,
    server::{ServerState, require_household},
};
use engine::{SlotCmd, members};

fn engine_service(service: ServiceKind) -> engine::ServiceKind {
    match service {
        ServiceKind::Lunch => engine::ServiceKind::Lunch,
        ServiceKind::Dinner => engine::ServiceKind::Dinner,
    }
}

fn api_service(service: engine::ServiceKind) -> ServiceKind {
    match service {
        engine::ServiceKind::Lunch => ServiceKind::Lunch,
        engine::ServiceKind::Dinner => ServiceKind::Dinner,
    }
}

/// Handle requests for the household's planned slots.
pub async fn list(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SlotsResponse>, ServerError> {
    let household = require_household(&state, &member).await?;

    let slots = state.engine.list_slots(&household.id, &member.id).await?;
    Ok(Json(SlotsResponse {
        slots: slots
            .into_iter()
            .map(|slot| SlotView {
                date: slot.date,
                service: api_service(slot.service),
                assignments: slot
                    .assignments
                    .into_iter()
                    .map(|assignment| AssignmentView {
                        meal_id: assignment.meal_id,
                        portion_hundredths: assignment.portion.hundredths(),
                    })
                    .collect(),
                processed: slot.processed,
            })
            .collect(),
    }))
}

/// Handle requests for planning a slot (empty assignments clear it).
pub async fn set_slot(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SlotPut>,
) -> Result<StatusCode, ServerError> {
    let household = require_household(&state, &member).await?;

    let mut cmd = SlotCmd::new(
        &household.id,
        &member.id,
        payload.date,
        engine_service(payload.service),
    );
    for assignment in payload.assignments {
        cmd = cmd.assign(assignment.meal_id.to_string(), assignment.portion_hundredths);
    }

    state.engine.set_slot(cmd, Utc::now().date_naive()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for clearing a slot.
pub async fn clear_slot(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SlotClear>,
) -> Result<StatusCode, ServerError> {
    let household = require_household(&state, &member).await?;

    state
        .engine
        .clear_slot(
            &household.id,
            payload.date,
            engine_service(payload.service),
            &member.id,
            Utc::now().date_naive(),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
