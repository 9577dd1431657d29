//! Video upload handler: the HTTP face of the ingestion pipeline.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use filmroom_core::{AnalysisResult, AppError};
use std::sync::Arc;

const VIDEO_FIELD: &str = "video";

#[utoipa::path(
    post,
    path = "/videos",
    tag = "videos",
    request_body(
        content = Vec<u8>,
        content_type = "multipart/form-data",
        description = "Multipart form with the required binary field `video`"
    ),
    responses(
        (status = 200, description = "Video analyzed successfully", body = AnalysisResult),
        (status = 400, description = "Missing, empty, or oversized video file", body = ErrorResponse),
        (status = 500, description = "Pipeline failure", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, HttpAppError> {
    let (payload, content_type) = extract_video_field(&mut multipart).await?;

    let result = state.pipeline.process_upload(payload, &content_type).await?;

    Ok(Json(result))
}

/// Pull the `video` field out of the multipart form.
///
/// Any multipart-level problem (missing field, malformed body, a part the
/// body-limit layer cut short) is the caller's to fix, so it maps to 400.
async fn extract_video_field(
    multipart: &mut Multipart,
) -> Result<(Bytes, String), HttpAppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        HttpAppError(AppError::InvalidInput(format!(
            "Malformed multipart body: {}",
            e
        )))
    })? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let payload = field.bytes().await.map_err(|e| {
            HttpAppError(AppError::InvalidInput(format!(
                "Failed to read video field: {}",
                e
            )))
        })?;

        return Ok((payload, content_type));
    }

    Err(HttpAppError(AppError::InvalidInput(
        "No video file provided".to_string(),
    )))
}
