use axum::{extract::State, Extension, Json};
use tubecast_pipeline::insights::{summarize, ChannelSummary};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

/// Best-performing category plus channel totals.
pub(super) async fn channel_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ChannelSummary>> {
    Json(ApiResponse::new(summarize(&state.videos), req_id.0))
}
