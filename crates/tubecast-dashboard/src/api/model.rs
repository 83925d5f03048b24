use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tubecast_pipeline::{ForestParams, Metrics, PredictError, PredictionInput, TrainedModel};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ModelInfo {
    format_version: u32,
    trained_at: DateTime<Utc>,
    feature_names: Vec<String>,
    trees: usize,
    params: ForestParams,
    metrics: Metrics,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct PredictionData {
    predicted_views: u64,
}

fn require_model(state: &AppState, request_id: &str) -> Result<Arc<TrainedModel>, ApiError> {
    state.model.clone().ok_or_else(|| {
        ApiError::new(
            request_id,
            "model_unavailable",
            "no trained model is loaded; run `tubecast train` and restart",
        )
    })
}

/// Evaluation metrics and parameters of the loaded model.
pub(super) async fn model_info(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ModelInfo>>, ApiError> {
    let model = require_model(&state, &req_id.0)?;
    let info = ModelInfo {
        format_version: model.format_version,
        trained_at: model.trained_at,
        feature_names: model.feature_names.clone(),
        trees: model.forest.trees().len(),
        params: model.params.clone(),
        metrics: model.metrics,
    };
    Ok(Json(ApiResponse::new(info, req_id.0)))
}

/// Scores one video described by a JSON [`PredictionInput`].
pub(super) async fn predict_views(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<PredictionInput>, JsonRejection>,
) -> Result<Json<ApiResponse<PredictionData>>, ApiError> {
    let Json(input) = payload.map_err(|rejection| {
        ApiError::new(req_id.0.clone(), "validation_error", rejection.body_text())
    })?;
    let model = require_model(&state, &req_id.0)?;

    match model.predict(&input) {
        Ok(predicted_views) => Ok(Json(ApiResponse::new(
            PredictionData { predicted_views },
            req_id.0,
        ))),
        Err(err @ PredictError::FeatureOutOfRange { .. }) => {
            Err(ApiError::new(req_id.0, "validation_error", err.to_string()))
        }
        Err(err @ PredictError::NonFinite) => {
            tracing::error!(error = %err, ?input, "prediction failed");
            Err(ApiError::new(req_id.0, "internal_error", "prediction failed"))
        }
    }
}
