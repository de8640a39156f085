//! Meal API endpoints.

use api_types::meal::{
    DemandView, MealCreated, MealKind, MealNew, MealView, MealsResponse, StockUpdate,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{ServerState, require_household},
};
use engine::{Meal, MealCmd, members};

fn engine_kind(kind: MealKind) -> engine::MealKind {
    match kind {
        MealKind::Lunch => engine::MealKind::Lunch,
        MealKind::Dinner => engine::MealKind::Dinner,
        MealKind::Any => engine::MealKind::Any,
    }
}

fn api_kind(kind: engine::MealKind) -> MealKind {
    match kind {
        engine::MealKind::Lunch => MealKind::Lunch,
        engine::MealKind::Dinner => MealKind::Dinner,
        engine::MealKind::Any => MealKind::Any,
    }
}

fn meal_view(meal: Meal) -> MealView {
    MealView {
        id: meal.id,
        name: meal.name,
        kind: api_kind(meal.kind),
        quantity_hundredths: meal.quantity.hundredths(),
        notes: meal.notes,
        ingredients: meal.ingredients,
    }
}

/// Handle requests for listing the household's meals.
pub async fn list(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
) -> Result<Json<MealsResponse>, ServerError> {
    let household = require_household(&state, &member).await?;

    let meals = state.engine.list_meals(&household.id, &member.id).await?;
    Ok(Json(MealsResponse {
        meals: meals.into_iter().map(meal_view).collect(),
    }))
}

/// Handle requests for adding a meal.
pub async fn create(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<MealNew>,
) -> Result<Json<MealCreated>, ServerError> {
    let household = require_household(&state, &member).await?;

    let mut cmd = MealCmd::new(
        &household.id,
        &member.id,
        payload.name,
        engine_kind(payload.kind),
        payload.quantity_hundredths,
    );
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }
    if let Some(ingredients) = payload.ingredients {
        cmd = cmd.ingredients(ingredients);
    }

    let id = state.engine.add_meal(cmd).await?;
    Ok(Json(MealCreated { id }))
}

/// Handle requests for setting a meal's stock.
pub async fn update_stock(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockUpdate>,
) -> Result<StatusCode, ServerError> {
    let household = require_household(&state, &member).await?;

    state
        .engine
        .update_meal_stock(&household.id, id, payload.quantity_hundredths, &member.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for deleting a meal.
pub async fn delete(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let household = require_household(&state, &member).await?;

    state.engine.delete_meal(&household.id, id, &member.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for a meal's stock-vs-demand check.
pub async fn demand(
    Extension(member): Extension<members::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DemandView>, ServerError> {
    let household = require_household(&state, &member).await?;

    let meal = state.engine.meal(&household.id, id, &member.id).await?;
    let demand = state
        .engine
        .current_demand(&household.id, id, &member.id)
        .await?;

    Ok(Json(DemandView {
        meal_id: id,
        stock_hundredths: meal.quantity.hundredths(),
        demand_hundredths: demand.hundredths(),
    }))
}
