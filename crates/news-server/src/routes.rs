//! Route handlers

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use news_client::Article;
use serde::{Deserialize, Serialize};

/// Query string for `GET /news`
#[derive(Debug, Default, Deserialize)]
pub struct NewsParams {
    /// Category name; `general` when absent
    pub category: Option<String>,
    /// Country code; `gb` when absent
    pub country: Option<String>,
}

/// Body of a successful `GET /news`
#[derive(Debug, Serialize, Deserialize)]
pub struct NewsResponse {
    /// Normalized headlines
    pub articles: Vec<Article>,
}

/// `GET /news?category=<name>&country=<code>`
///
/// Unknown categories and malformed countries answer with an empty list.
pub async fn get_news(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> Result<Json<NewsResponse>, ApiError> {
    let category = params.category.as_deref().unwrap_or("general");
    let country = params.country.as_deref().unwrap_or("");

    let set = state.fetcher.fetch(category, country).await?;
    tracing::debug!(query = %set.query(), count = set.len(), "Serving headlines");

    Ok(Json(NewsResponse { articles: set.into_articles() }))
}

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: &'static str,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
