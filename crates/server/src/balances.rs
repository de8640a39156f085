//! Balance and transfer API endpoints.

use api_types::balance::{
    BalanceView, BalancesResponse, SettleNew, TransferView, TransfersResponse,
};
use api_types::expense::ExpenseCreated;
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::Utc;

use crate::{
    ServerError,
    server::{PeriodQuery, ServerState, require_household},
};
use engine::members;

/// Handle requests for a period's net balances.
pub async fn list(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let household = require_household(&state, &member).await?;
    let period = query.resolve()?;

    let balances = state
        .engine
        .period_balances(&household.id, period, &member.id)
        .await?;

    Ok(Json(BalancesResponse {
        period: period.to_string(),
        balances: balances
            .into_iter()
            .map(|(member_id, amount)| BalanceView {
                member_id,
                amount_minor: amount.cents(),
            })
            .collect(),
    }))
}

/// Handle requests for a period's settlement plan.
pub async fn transfers(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<TransfersResponse>, ServerError> {
    let household = require_household(&state, &member).await?;
    let period = query.resolve()?;

    let plan = state
        .engine
        .settlement_plan(&household.id, period, &member.id)
        .await?;

    Ok(Json(TransfersResponse {
        period: period.to_string(),
        transfers: plan
            .into_iter()
            .map(|transfer| TransferView {
                from: transfer.from,
                to: transfer.to,
                amount_minor: transfer.amount.cents(),
            })
            .collect(),
    }))
}

/// Handle requests for marking a planned transfer as paid.
///
/// The payment is stored as a `settlement` expense; nothing else is
/// persisted, and the next balance read folds it in.
pub async fn settle(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SettleNew>,
) -> Result<Json<ExpenseCreated>, ServerError> {
    let household = require_household(&state, &member).await?;

    let id = state
        .engine
        .record_settlement(
            &household.id,
            &payload.from,
            &payload.to,
            payload.amount_minor,
            Utc::now(),
            &member.id,
        )
        .await?;
    Ok(Json(ExpenseCreated { id }))
}
