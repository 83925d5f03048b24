//! Series for the views trend line, the top-videos bar chart, and the
//! category pie.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tubecast_pipeline::insights::{self, CategoryViews, VideoViews, ViewsPoint};

use crate::middleware::RequestId;

use super::{normalize_limit, ApiResponse, AppState};

const DEFAULT_TOP_VIDEOS: usize = 10;

#[derive(Debug, Deserialize)]
pub(super) struct TopVideosQuery {
    pub limit: Option<usize>,
}

pub(super) async fn views_over_time(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<ViewsPoint>>> {
    Json(ApiResponse::new(
        insights::views_over_time(&state.videos),
        req_id.0,
    ))
}

pub(super) async fn top_videos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TopVideosQuery>,
) -> Json<ApiResponse<Vec<VideoViews>>> {
    let limit = normalize_limit(query.limit, DEFAULT_TOP_VIDEOS);
    Json(ApiResponse::new(
        insights::top_videos(&state.videos, limit),
        req_id.0,
    ))
}

pub(super) async fn category_views(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<CategoryViews>>> {
    Json(ApiResponse::new(
        insights::category_views(&state.videos),
        req_id.0,
    ))
}
