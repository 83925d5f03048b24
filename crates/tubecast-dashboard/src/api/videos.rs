use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tubecast_core::CleanedVideoRecord;

use crate::middleware::RequestId;

use super::{normalize_limit, ApiResponse, AppState};

/// Rows shown in the data overview when no limit is given.
const DEFAULT_OVERVIEW_ROWS: usize = 5;

#[derive(Debug, Deserialize)]
pub(super) struct VideosQuery {
    pub limit: Option<usize>,
}

/// First rows of the cleaned dataset, in file order.
pub(super) async fn list_videos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<VideosQuery>,
) -> Json<ApiResponse<Vec<CleanedVideoRecord>>> {
    let limit = normalize_limit(query.limit, DEFAULT_OVERVIEW_ROWS);
    let data = state.videos.iter().take(limit).cloned().collect();
    Json(ApiResponse::new(data, req_id.0))
}
