use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{Analytics, Product, ProductId, Strategy, UserId},
};

use super::AppState;

/// Product list length of the catalog split on the overview page
const CATALOG_SPLIT_TOP_N: usize = 10;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct TopNQuery {
    pub top_n: Option<usize>,
}

/// Product id as sent by clients, either a number or a numeric string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductIdInput {
    Number(u64),
    Text(String),
}

impl TryFrom<ProductIdInput> for ProductId {
    type Error = AppError;

    fn try_from(input: ProductIdInput) -> Result<Self, Self::Error> {
        match input {
            ProductIdInput::Number(id) => Ok(ProductId(id)),
            ProductIdInput::Text(raw) => raw
                .trim()
                .parse()
                .map(ProductId)
                .map_err(|_| AppError::InvalidInput(format!("Invalid product_id '{}'", raw))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LikeProductRequest {
    pub user_id: Option<String>,
    pub product_id: Option<ProductIdInput>,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub user_id: UserId,
    pub recommended_products: Vec<Product>,
    pub category_products: Vec<Product>,
    pub other_products: Vec<Product>,
    pub user_likes: Vec<ProductId>,
}

#[derive(Debug, Serialize)]
pub struct StrategyResponse {
    pub strategy: Strategy,
    pub recommendations: Vec<Product>,
    pub user_likes: Vec<ProductId>,
}

#[derive(Debug, Serialize)]
pub struct LikeProductResponse {
    pub status: &'static str,
    pub recommendations: Vec<Product>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// User ids in catalog order
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<UserId>> {
    let users = state
        .recommender
        .catalog()
        .users()
        .iter()
        .map(|user| user.user_id.clone())
        .collect();
    Json(users)
}

/// Hybrid recommendations plus the catalog split and the user's likes
pub async fn user_overview(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> AppResult<Json<OverviewResponse>> {
    let user_id = UserId::new(user_id);
    tracing::info!(request_id = %request_id, user_id = %user_id, "Building user overview");

    let engine = &state.recommender;
    let ranked = engine
        .recommend_with_likes(&user_id, Strategy::Hybrid, state.default_top_n)
        .await?;
    let split = engine.catalog_split(&user_id, CATALOG_SPLIT_TOP_N)?;

    Ok(Json(OverviewResponse {
        user_id,
        recommended_products: ranked.recommendations,
        category_products: split.category_products,
        other_products: split.other_products,
        user_likes: ranked.user_likes,
    }))
}

/// Recommendations from a single strategy
pub async fn strategy_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path((user_id, strategy)): Path<(String, String)>,
    Query(query): Query<TopNQuery>,
) -> AppResult<Json<StrategyResponse>> {
    let user_id = UserId::new(user_id);
    let strategy: Strategy = strategy.parse()?;
    let top_n = query.top_n.unwrap_or(state.default_top_n);

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        strategy = %strategy,
        top_n,
        "Processing recommendation request"
    );

    let ranked = state
        .recommender
        .recommend_with_likes(&user_id, strategy, top_n)
        .await?;

    Ok(Json(StrategyResponse {
        strategy,
        recommendations: ranked.recommendations,
        user_likes: ranked.user_likes,
    }))
}

/// Product ids the user liked
pub async fn user_likes(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<ProductId>>> {
    let likes = state.recommender.user_likes(&UserId::new(user_id)).await?;
    Ok(Json(likes))
}

/// Records a like and returns refreshed hybrid recommendations
pub async fn like_product(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<LikeProductRequest>,
) -> AppResult<Json<LikeProductResponse>> {
    let user_id = request
        .user_id
        .filter(|id| !id.trim().is_empty())
        .map(UserId::new)
        .ok_or_else(|| AppError::InvalidInput("user_id is required".to_string()))?;
    let product_id: ProductId = request
        .product_id
        .ok_or_else(|| AppError::InvalidInput("product_id is required".to_string()))?
        .try_into()?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        product_id = %product_id,
        "Processing like"
    );

    state.recommender.add_interaction(&user_id, product_id).await?;
    let recommendations = state
        .recommender
        .recommend(&user_id, Strategy::Hybrid, state.default_top_n)
        .await?;

    Ok(Json(LikeProductResponse {
        status: "success",
        recommendations,
    }))
}

/// Catalog and interaction totals with the most liked products
pub async fn analytics(State(state): State<AppState>) -> Json<Analytics> {
    Json(state.recommender.analytics().await)
}
