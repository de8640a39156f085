//! Household API endpoints.

use api_types::household::{
    AttachResponse, HouseholdJoin, HouseholdNew, HouseholdView, MemberView, MembersResponse,
};
use api_types::sweep::SweepReportView;
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{
    ServerError,
    server::{ServerState, require_household},
};
use engine::members;

fn household_view(model: engine::households::Model) -> HouseholdView {
    HouseholdView {
        id: model.id,
        name: model.name,
        code: model.code,
    }
}

/// Handle requests for creating a new household.
pub async fn create(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<HouseholdNew>,
) -> Result<Json<HouseholdView>, ServerError> {
    state.engine.new_household(&payload.name, &member.id).await?;

    let household = require_household(&state, &member).await?;
    Ok(Json(household_view(household)))
}

/// Handle requests for joining a household by invite code.
pub async fn join(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<HouseholdJoin>,
) -> Result<Json<HouseholdView>, ServerError> {
    state.engine.join_household(&payload.code, &member.id).await?;

    let household = require_household(&state, &member).await?;
    Ok(Json(household_view(household)))
}

/// Handle requests for the household member roster.
pub async fn members(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
) -> Result<Json<MembersResponse>, ServerError> {
    let household = require_household(&state, &member).await?;
    let roster = state.engine.roster(&household.id, &member.id).await?;

    Ok(Json(MembersResponse {
        members: roster
            .into_iter()
            .map(|profile| MemberView {
                id: profile.id,
                display_name: profile.display_name,
            })
            .collect(),
    }))
}

/// Handle a session attaching to its household.
///
/// This is the opportunistic trigger of the depletion sweeper: every attach
/// runs one pass over the household's due slots and reports what it did.
pub async fn attach(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
) -> Result<Json<AttachResponse>, ServerError> {
    let household = require_household(&state, &member).await?;

    let report = state
        .engine
        .sweep(&household.id, Utc::now().date_naive(), &member.id)
        .await?;

    Ok(Json(AttachResponse {
        household: household_view(household),
        sweep: SweepReportView {
            swept: report.swept,
            already_processed: report.already_processed,
            contended: report.contended,
            missing_meals: report.missing_meals,
            depleted: report.depleted,
        },
    }))
}
