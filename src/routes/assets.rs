use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

/// Stylesheets and the reaction-timing script, embedded in the binary.
#[derive(Embed)]
#[folder = "assets/"]
struct StaticAssets;

pub async fn serve(axum::extract::Path(path): axum::extract::Path<String>) -> Response {
    let Some(file) = StaticAssets::get(&path) else {
        tracing::debug!(asset = %path, "embedded asset not found");
        return StatusCode::NOT_FOUND.into_response();
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        file.data.to_vec(),
    )
        .into_response()
}
