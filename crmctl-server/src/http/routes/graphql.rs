//! GraphQL endpoint
//!
//! `POST <path>` executes a JSON request; `GET <path>` serves GraphiQL.
//! The path is mounted with and without a trailing slash.

use async_graphql::http::GraphiQLSource;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

async fn execute(
    State(state): State<AppState>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let operation = request.operation_name.clone();
    let response = state.schema().execute(request).await;
    if response.is_err() {
        tracing::debug!(
            operation = ?operation,
            errors = response.errors.len(),
            "GraphQL request returned errors"
        );
    }
    Json(response)
}

async fn graphiql(State(state): State<AppState>) -> Html<String> {
    Html(GraphiQLSource::build().endpoint(state.graphql_path()).finish())
}

pub fn router(path: &str) -> Router<AppState> {
    let path = normalize(path);
    let mut router = Router::new().route(&path, get(graphiql).post(execute));
    if path != "/" {
        router = router.route(&format!("{}/", path), get(graphiql).post(execute));
    }
    router
}

/// Leading slash, no trailing slash (except for the root itself).
fn normalize(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
