use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RecommendRequest, RecommendResponse, SearchRequest, SearchResponse, StatusResponse},
    services::search,
};

use super::AppState;

/// Liveness and catalog size
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Online".to_string(),
        movies_loaded: state.catalog.len(),
    })
}

/// Up to eight recommendations for a user
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> AppResult<Json<RecommendResponse>> {
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        user_id = %request.user_id,
        "Processing recommendation request"
    );

    let candidates = state.recommender.recommend(&request.user_id).await;

    Ok(Json(RecommendResponse {
        movies: candidates.to_cards(),
    }))
}

/// Keyword + genre search, up to twelve results
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Json(request) = payload?;

    let results = search::search_titles(&state.catalog, &request.query, &request.genre);

    tracing::info!(
        request_id = %request_id,
        query = %request.query,
        genre = %request.genre,
        results = results.len(),
        "Search completed"
    );

    Ok(Json(SearchResponse { results }))
}
