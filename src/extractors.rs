use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rusqlite::params;

use crate::error::AppError;
use crate::flash;
use crate::state::AppState;

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Extractor that requires authentication.
/// Returns 401 if no valid session found.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = flash::get_cookie_value(parts, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?;

        let conn = state.db.get()?;
        conn.query_row(
            "SELECT u.id, u.name, u.email, u.is_admin FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token = ?1 AND s.expires_at > datetime('now')",
            params![token],
            |row| {
                Ok(CurrentUser {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    is_admin: row.get(3)?,
                })
            },
        )
        .map_err(|_| AppError::Unauthorized)
    }
}

/// Optional user extractor — returns None instead of 401 when not
/// authenticated, for pages that render both signed-in and anonymous.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(_) => Ok(MaybeUser(None)),
        }
    }
}

/// Extractor gating admin-only routes on the user's role attribute.
/// Unauthenticated requests get 401; authenticated non-admins get 403.
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.is_admin {
            Ok(AdminUser(user))
        } else {
            Err(AppError::Forbidden)
        }
    }
}
