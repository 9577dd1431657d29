//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use filmroom_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "filmroom API",
        version = "0.1.0",
        description = "Video ingestion and performance analysis service. Uploads are staged locally, normalized with ffmpeg, stored remotely for the duration of analysis, scored, and cleaned up."
    ),
    paths(handlers::videos::upload_video),
    components(schemas(models::AnalysisResult, error::ErrorResponse)),
    tags(
        (name = "videos", description = "Video ingestion and analysis")
    )
)]
pub struct ApiDoc;
