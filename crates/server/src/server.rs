use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;

use std::sync::Arc;

use crate::{ServerError, balances, expenses, household, meals, planner};
use engine::{Engine, Period, members};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Basic-auth middleware standing in for the external identity provider.
///
/// Resolves the member row and hands it to handlers as an extension; every
/// route behind it can assume an authenticated member.
async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let member: Option<members::Model> = members::Entity::find()
        .filter(members::Column::Id.eq(auth_header.username()))
        .filter(members::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(member) = member else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(member);
    Ok(next.run(request).await)
}

/// `?period=YYYY-MM` query, shared by the expense/balance endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct PeriodQuery {
    pub period: Option<String>,
}

impl PeriodQuery {
    /// Parses the requested period, defaulting to the current month.
    pub(crate) fn resolve(&self) -> Result<Period, ServerError> {
        match self.period.as_deref() {
            None => Ok(Period::containing(Utc::now())),
            Some(raw) => raw
                .parse()
                .map_err(|_| ServerError::Generic(format!("invalid period: {raw}"))),
        }
    }
}

/// The household of the authenticated member, or a 400 telling them to create
/// or join one first.
pub(crate) async fn require_household(
    state: &ServerState,
    member: &members::Model,
) -> Result<engine::households::Model, ServerError> {
    state
        .engine
        .household_of(&member.id)
        .await?
        .ok_or_else(|| ServerError::Generic("no household: create or join one first".to_string()))
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/household", post(household::create))
        .route("/household/join", post(household::join))
        .route("/household/members", get(household::members))
        .route("/household/attach", post(household::attach))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{id}",
            axum::routing::patch(expenses::update).delete(expenses::delete),
        )
        .route("/expenses/summary", get(expenses::summary))
        .route("/balances", get(balances::list))
        .route("/transfers", get(balances::transfers))
        .route("/transfers/settle", post(balances::settle))
        .route("/meals", get(meals::list).post(meals::create))
        .route(
            "/meals/{id}",
            axum::routing::delete(meals::delete),
        )
        .route("/meals/{id}/stock", axum::routing::patch(meals::update_stock))
        .route("/meals/{id}/demand", get(meals::demand))
        .route("/planner", get(planner::list))
        .route("/planner/slot", put(planner::set_slot).delete(planner::clear_slot))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, header};
    use base64::Engine as _;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        let engine = Engine::builder().database(db.clone()).build().await.unwrap();
        engine.new_member("alice", "password", "Alice").await.unwrap();

        router(ServerState {
            engine: Arc::new(engine),
            db,
        })
    }

    fn basic_auth(user: &str, password: &str) -> String {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
        format!("Basic {encoded}")
    }

    fn authed_json(method: &str, uri: &str, body: serde_json::Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, basic_auth("alice", "password"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn rejects_missing_credentials() {
        let app = test_router().await;

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/meals")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        // TypedHeader rejects the missing Authorization header outright.
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let app = test_router().await;

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/meals")
                    .header(header::AUTHORIZATION, basic_auth("alice", "wrong"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_household_then_attach_runs_a_sweep() {
        let app = test_router().await;

        let response = app
            .clone()
            .oneshot(authed_json(
                "POST",
                "/household",
                serde_json::json!({ "name": "Flat 3B" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(authed_json("POST", "/household/attach", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let attach: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(attach["household"]["name"], "Flat 3B");
        assert_eq!(attach["sweep"]["swept"], 0);
    }

    #[tokio::test]
    async fn custom_split_mismatch_is_rejected_with_422() {
        let app = test_router().await;

        let response = app
            .clone()
            .oneshot(authed_json(
                "POST",
                "/household",
                serde_json::json!({ "name": "Flat 3B" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(authed_json(
                "POST",
                "/expenses",
                serde_json::json!({
                    "title": "Groceries",
                    "amount_minor": 10_000,
                    "category": "groceries",
                    "split_mode": "custom",
                    "custom_amounts": { "alice": 9_999 }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
