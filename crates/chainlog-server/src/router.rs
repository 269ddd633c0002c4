use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use chainlog_protocol::endpoints;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Read route; the index segment is validated by the handler.
pub const READ_ROUTE: &str = "/transactions/:index";
/// Append also answers with a trailing slash.
pub const APPEND_ROUTE_SLASH: &str = "/transactions/";

/// Build the axum router with all ledger endpoints.
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout;
    Router::new()
        .route(endpoints::STATUS, get(handler::status_handler))
        .route(READ_ROUTE, get(handler::read_handler))
        .route(endpoints::TRANSACTIONS, post(handler::append_handler))
        .route(APPEND_ROUTE_SLASH, post(handler::append_handler))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handler::common_headers,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
