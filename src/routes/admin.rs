use askama::Template;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use rusqlite::params;

use crate::error::{AppError, AppResult};
use crate::extractors::AdminUser;
use crate::flash::{self, Flash};
use crate::forms::{FieldError, NewPostForm};
use crate::routes::home::Html;
use crate::state::{AppState, DbPool};
use crate::uploads::{RejectedFile, StoredFile, UploadOutcome};

#[derive(Template)]
#[template(path = "pages/new_post.html")]
pub struct NewPostTemplate {
    pub logged_in: bool,
    pub is_admin: bool,
    pub flash: Option<String>,
    pub question: String,
    pub errors: Vec<FieldError>,
    pub rejected: Vec<RejectedFile>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/new-post", get(new_post_page).post(create_post))
}

fn form_response(
    flash_msg: Option<String>,
    question: String,
    errors: Vec<FieldError>,
    rejected: Vec<RejectedFile>,
) -> Response {
    let template = NewPostTemplate {
        logged_in: true,
        is_admin: true,
        flash: flash_msg,
        question,
        errors,
        rejected,
    };
    (
        [(axum::http::header::SET_COOKIE, flash::clear_flash_cookie())],
        Html(template),
    )
        .into_response()
}

/// GET /new-post — render the upload form (admins only)
pub async fn new_post_page(_admin: AdminUser, Flash(flash_msg): Flash) -> Response {
    form_response(flash_msg, String::new(), Vec::new(), Vec::new())
}

/// POST /new-post — store accepted images and persist the set
pub async fn create_post(
    State(state): State<AppState>,
    admin: AdminUser,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut question = String::new();
    let mut outcome = UploadOutcome::default();
    let uploads_dir = state.config.uploads_path().clone();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        // Take the part name by value: text()/bytes() consume the field
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("question") => {
                question = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid question field: {}", e)))?;
            }
            Some("images") => {
                let filename = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid file field: {}", e)))?;
                // A file input with no selection posts a nameless empty part
                if let Some(name) = filename.filter(|n| !n.is_empty()) {
                    outcome.save(&uploads_dir, &name, &data)?;
                }
            }
            _ => {}
        }
    }

    let form = NewPostForm {
        question: question.clone(),
    };
    if let Err(errors) = form.validate() {
        return Ok(form_response(None, question, errors, outcome.rejected));
    }

    if outcome.accepted.is_empty() {
        let errors = vec![FieldError {
            field: "images",
            message: "At least one accepted image is required".to_string(),
        }];
        return Ok(form_response(None, question, errors, outcome.rejected));
    }

    let set_id = insert_image_set(&state.db, question.trim(), &outcome.accepted)?;
    tracing::info!(
        admin = %admin.0.id,
        set = %set_id,
        accepted = outcome.accepted.len(),
        rejected = outcome.rejected.len(),
        "created image set"
    );

    Ok(flash::redirect_with_flash("/", &outcome_notice(&outcome)))
}

/// Persist one set row plus one image row per accepted file, transactionally.
pub fn insert_image_set(
    pool: &DbPool,
    question: &str,
    accepted: &[StoredFile],
) -> AppResult<String> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    let set_id = uuid::Uuid::now_v7().to_string();
    tx.execute(
        "INSERT INTO image_sets (id, question) VALUES (?1, ?2)",
        params![set_id, question],
    )?;

    for (position, file) in accepted.iter().enumerate() {
        let image_id = uuid::Uuid::now_v7().to_string();
        tx.execute(
            "INSERT INTO image_set_images (id, image_set_id, url, position) VALUES (?1, ?2, ?3, ?4)",
            params![image_id, set_id, file.url, position as i64],
        )?;
    }

    tx.commit()?;
    Ok(set_id)
}

/// The per-file accept/reject summary shown to the admin after posting.
fn outcome_notice(outcome: &UploadOutcome) -> String {
    let mut notice = format!("Added {} image(s).", outcome.accepted.len());
    if !outcome.rejected.is_empty() {
        let rejected: Vec<String> = outcome
            .rejected
            .iter()
            .map(|r| format!("{} ({})", r.name, r.reason))
            .collect();
        notice.push_str(&format!(" Rejected: {}.", rejected.join(", ")));
    }
    notice
}
