use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::flash::{self, Flash};
use crate::state::{AppState, DbPool};

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub logged_in: bool,
    pub is_admin: bool,
    pub flash: Option<String>,
    pub sets: Vec<SetView>,
}

/// One admin post: a question and its images in display order.
pub struct SetView {
    pub question: String,
    pub images: Vec<ImageView>,
}

/// `index` numbers images across all sets, 1-based, and names the
/// submission form fields (`answer{i}`, `reaction_time{i}`, `image_urls{i}`).
pub struct ImageView {
    pub index: usize,
    pub url: String,
}

/// Load every image set with its images, in set insertion order and
/// per-set display order.
pub fn load_gallery(pool: &DbPool) -> AppResult<Vec<SetView>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT s.id, s.question, i.url FROM image_sets s \
         JOIN image_set_images i ON i.image_set_id = s.id \
         ORDER BY s.rowid, i.position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut sets: Vec<SetView> = Vec::new();
    let mut last_set_id: Option<String> = None;
    let mut index = 0usize;

    for row in rows {
        let (set_id, question, url) = row?;
        index += 1;
        if last_set_id.as_deref() != Some(set_id.as_str()) {
            sets.push(SetView {
                question,
                images: Vec::new(),
            });
            last_set_id = Some(set_id);
        }
        if let Some(current) = sets.last_mut() {
            current.images.push(ImageView { index, url });
        }
    }

    Ok(sets)
}

/// GET / — the image listing everyone lands on
pub async fn index(
    State(state): State<AppState>,
    user: MaybeUser,
    Flash(flash_msg): Flash,
) -> AppResult<Response> {
    let sets = load_gallery(&state.db)?;

    let template = IndexTemplate {
        logged_in: user.0.is_some(),
        is_admin: user.0.as_ref().map(|u| u.is_admin).unwrap_or(false),
        flash: flash_msg,
        sets,
    };

    Ok((
        [(header::SET_COOKIE, flash::clear_flash_cookie())],
        Html(template),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use r2d2::Pool;
    use r2d2_sqlite::SqliteConnectionManager;
    use rusqlite::params;

    fn test_pool() -> DbPool {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).unwrap();
        pool.get()
            .unwrap()
            .execute_batch("PRAGMA foreign_keys = ON;")
            .unwrap();
        db::run_migrations(&pool).unwrap();
        pool
    }

    fn insert_set(pool: &DbPool, set_id: &str, question: &str, urls: &[&str]) {
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO image_sets (id, question) VALUES (?1, ?2)",
            params![set_id, question],
        )
        .unwrap();
        for (pos, url) in urls.iter().enumerate() {
            conn.execute(
                "INSERT INTO image_set_images (id, image_set_id, url, position) VALUES (?1, ?2, ?3, ?4)",
                params![format!("{}-{}", set_id, pos), set_id, url, pos as i64],
            )
            .unwrap();
        }
    }

    #[test]
    fn empty_store_yields_empty_gallery() {
        let pool = test_pool();
        assert!(load_gallery(&pool).unwrap().is_empty());
    }

    #[test]
    fn gallery_flattens_sets_in_insertion_order() {
        let pool = test_pool();
        insert_set(&pool, "s1", "First impressions?", &["/uploads/a.png", "/uploads/b.png"]);
        insert_set(&pool, "s2", "And this one?", &["/uploads/c.png"]);

        let sets = load_gallery(&pool).unwrap();
        assert_eq!(sets.len(), 2);

        let urls: Vec<&str> = sets
            .iter()
            .flat_map(|s| s.images.iter().map(|i| i.url.as_str()))
            .collect();
        assert_eq!(urls, vec!["/uploads/a.png", "/uploads/b.png", "/uploads/c.png"]);

        let indices: Vec<usize> = sets
            .iter()
            .flat_map(|s| s.images.iter().map(|i| i.index))
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn gallery_respects_position_within_a_set() {
        let pool = test_pool();
        // Insert positions out of order
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO image_sets (id, question) VALUES ('s1', 'q')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO image_set_images (id, image_set_id, url, position) VALUES ('i2', 's1', '/uploads/second.png', 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO image_set_images (id, image_set_id, url, position) VALUES ('i1', 's1', '/uploads/first.png', 0)",
            [],
        )
        .unwrap();
        drop(conn);

        let sets = load_gallery(&pool).unwrap();
        let urls: Vec<&str> = sets[0].images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["/uploads/first.png", "/uploads/second.png"]);
    }
}
