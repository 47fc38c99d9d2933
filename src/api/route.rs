use crate::{
    api::{
        error::ApiError,
        response::{with_total_count, ApiResponse},
    },
    state::AppState,
};
use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

// Query parameters shared by every endpoint
#[derive(Deserialize)]
pub struct AddressQuery {
    address: String,
}

#[derive(Serialize)]
pub struct BlockNumber {
    pub address: String,
    pub block_number: u64,
}

// Create router with all routes
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/subscribe", post(subscribe).get(subscribe))
        .route("/currentblock", get(current_block))
        .route("/transaction", get(transaction_history))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

// POST /subscribe handler
async fn subscribe(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AddressQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    info!("Processing subscribe request for address: {}", params.address);

    let block_number = state.store.create_account(&params.address).await?;

    Ok(ApiResponse {
        data: BlockNumber {
            address: params.address.to_ascii_lowercase(),
            block_number,
        },
    }
    .with_status(StatusCode::CREATED))
}

// GET /currentblock handler
async fn current_block(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AddressQuery>, QueryRejection>,
) -> Result<ApiResponse<BlockNumber>, ApiError> {
    let Query(params) = query?;
    let block_number = state.store.get_cursor(&params.address)?;

    Ok(ApiResponse {
        data: BlockNumber {
            address: params.address.to_ascii_lowercase(),
            block_number,
        },
    })
}

// GET /transaction handler
async fn transaction_history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AddressQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let transactions = state.store.get_transactions(&params.address).await?;
    let count = transactions.len();

    Ok(with_total_count(transactions, count))
}

async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
