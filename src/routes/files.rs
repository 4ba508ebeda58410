use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /uploads/{file} — serve a previously uploaded image from disk.
/// Only bare filenames resolve; anything that smells like a path is a 404.
pub async fn serve(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> AppResult<Response> {
    if file.contains("..") || file.contains('/') || file.contains('\\') {
        return Err(AppError::NotFound);
    }

    let path = state.config.uploads_path().join(&file);
    let data = tokio::fs::read(&path).await.map_err(|_| AppError::NotFound)?;

    let mime = mime_guess::from_path(&file).first_or_octet_stream();
    Ok((
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        data,
    )
        .into_response())
}
