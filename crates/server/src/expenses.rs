//! Expense API endpoints.

use api_types::expense::{
    ExpenseCreated, ExpenseNew, ExpenseView, ExpensesResponse, SpendingSummaryView, SplitMode,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    ServerError,
    server::{PeriodQuery, ServerState, require_household},
};
use engine::{Expense, ExpenseCmd, Split, members};

fn engine_mode(mode: SplitMode) -> engine::SplitMode {
    match mode {
        SplitMode::Equal => engine::SplitMode::Equal,
        SplitMode::Custom => engine::SplitMode::Custom,
    }
}

fn expense_view(expense: Expense) -> ExpenseView {
    let (split_mode, split_among, custom_amounts) = match expense.split {
        Split::Equal { among } => (SplitMode::Equal, among, Default::default()),
        Split::Custom { amounts } => (
            SplitMode::Custom,
            Vec::new(),
            amounts
                .into_iter()
                .map(|(member, share)| (member, share.cents()))
                .collect(),
        ),
    };

    ExpenseView {
        id: expense.id,
        title: expense.title,
        amount_minor: expense.amount.cents(),
        category: expense.category.as_str().to_string(),
        date: expense.date,
        payer_id: expense.payer_id,
        split_mode,
        split_among,
        custom_amounts,
    }
}

fn expense_cmd(household_id: &str, user_id: &str, payload: ExpenseNew) -> ExpenseCmd {
    let mut cmd = ExpenseCmd::new(
        household_id,
        user_id,
        payload.title,
        payload.amount_minor,
        payload.date.unwrap_or_else(Utc::now),
    )
    .category(payload.category);

    if let Some(payer) = payload.payer_id {
        cmd = cmd.payer(payer);
    }
    cmd = match engine_mode(payload.split_mode) {
        engine::SplitMode::Equal => cmd.split_equal(payload.split_among),
        engine::SplitMode::Custom => cmd.split_custom(payload.custom_amounts),
    };
    cmd
}

/// Handle requests for listing a period's expenses.
pub async fn list(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let household = require_household(&state, &member).await?;
    let period = query.resolve()?;

    let expenses = state
        .engine
        .list_expenses(&household.id, period, &member.id)
        .await?;

    Ok(Json(ExpensesResponse {
        period: period.to_string(),
        expenses: expenses.into_iter().map(expense_view).collect(),
    }))
}

/// Handle requests for recording a new expense.
pub async fn create(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseCreated>, ServerError> {
    let household = require_household(&state, &member).await?;

    let id = state
        .engine
        .add_expense(expense_cmd(&household.id, &member.id, payload))
        .await?;
    Ok(Json(ExpenseCreated { id }))
}

/// Handle requests for replacing an expense.
pub async fn update(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<StatusCode, ServerError> {
    let household = require_household(&state, &member).await?;

    state
        .engine
        .update_expense(id, expense_cmd(&household.id, &member.id, payload))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for deleting an expense.
pub async fn delete(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let household = require_household(&state, &member).await?;

    state
        .engine
        .delete_expense(&household.id, id, &member.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for the period spending summary (settlements excluded).
pub async fn summary(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<SpendingSummaryView>, ServerError> {
    let household = require_household(&state, &member).await?;
    let period = query.resolve()?;

    let summary = state
        .engine
        .monthly_spending(&household.id, period, &member.id)
        .await?;

    Ok(Json(SpendingSummaryView {
        period: period.to_string(),
        total_minor: summary.total.cents(),
        by_category: summary
            .by_category
            .into_iter()
            .map(|(category, total)| (category, total.cents()))
            .collect(),
    }))
}
