use axum::extract::{RawForm, State};
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use rusqlite::params;
use std::collections::BTreeMap;

use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::flash;
use crate::state::{AppState, DbPool};

/// One (image, answer, timing) record extracted from the submission form.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionEntry {
    pub image_url: String,
    pub answer: String,
    pub reaction_time: f64,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/submit_form", post(submit_form))
}

/// POST /submit_form — persist one response per answered image, all in one
/// transaction
pub async fn submit_form(
    State(state): State<AppState>,
    user: CurrentUser,
    RawForm(body): RawForm,
) -> AppResult<Response> {
    let pairs = url::form_urlencoded::parse(&body).map(|(k, v)| (k.into_owned(), v.into_owned()));
    let entries = parse_submission(pairs);

    if entries.is_empty() {
        return Ok(flash::redirect_with_flash(
            "/",
            "No responses were submitted.",
        ));
    }

    match insert_batch(&state.db, &user.id, &entries) {
        Ok(count) => {
            tracing::info!(user = %user.id, count, "stored response batch");
            Ok(flash::redirect_with_flash(
                "/thank_you",
                "Your responses have been successfully submitted!",
            ))
        }
        Err(e) => {
            tracing::error!(user = %user.id, "failed to store response batch: {}", e);
            Ok(flash::redirect_with_flash(
                "/",
                "Something went wrong while saving your responses. Please try again.",
            ))
        }
    }
}

/// Collect the indexed field triples (`answer{i}`, `reaction_time{i}`,
/// `image_urls{i}`) into a structured batch.
///
/// Every index present in the payload is considered — a gap in the numbering
/// does not truncate later entries. A record is kept when its image URL and
/// answer and reaction-time field are all non-empty; a reaction time that
/// fails to parse degrades to 0.0 rather than rejecting the submission.
pub fn parse_submission(
    pairs: impl Iterator<Item = (String, String)>,
) -> Vec<SubmissionEntry> {
    let mut answers: BTreeMap<u32, String> = BTreeMap::new();
    let mut times: BTreeMap<u32, String> = BTreeMap::new();
    let mut urls: BTreeMap<u32, String> = BTreeMap::new();

    for (key, value) in pairs {
        if let Some(index) = parse_indexed_key(&key, "answer") {
            answers.insert(index, value);
        } else if let Some(index) = parse_indexed_key(&key, "reaction_time") {
            times.insert(index, value);
        } else if let Some(index) = parse_indexed_key(&key, "image_urls") {
            urls.insert(index, value);
        }
    }

    let mut entries = Vec::new();
    for (index, image_url) in urls {
        if image_url.is_empty() {
            continue;
        }
        let Some(answer) = answers.get(&index).filter(|a| !a.is_empty()) else {
            continue;
        };
        let Some(time_str) = times.get(&index).filter(|t| !t.is_empty()) else {
            continue;
        };

        let reaction_time = match time_str.parse::<f64>() {
            Ok(secs) => secs,
            Err(_) => {
                tracing::warn!(index, value = %time_str, "unparsable reaction time, storing 0.0");
                0.0
            }
        };

        entries.push(SubmissionEntry {
            image_url,
            answer: answer.clone(),
            reaction_time,
        });
    }

    entries
}

fn parse_indexed_key(key: &str, prefix: &str) -> Option<u32> {
    key.strip_prefix(prefix)?.parse().ok()
}

/// Insert the whole batch inside one transaction. Any failure rolls back
/// every row of the batch.
pub fn insert_batch(
    pool: &DbPool,
    user_id: &str,
    entries: &[SubmissionEntry],
) -> AppResult<usize> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    for entry in entries {
        let id = uuid::Uuid::now_v7().to_string();
        tx.execute(
            "INSERT INTO responses (id, user_id, image_url, body, reaction_time, body_len)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                user_id,
                entry.image_url,
                entry.answer,
                entry.reaction_time,
                entry.answer.chars().count() as i64
            ],
        )?;
    }

    tx.commit()?;
    Ok(entries.len())
}
