use rusqlite::{params, OptionalExtension};

use crate::auth::password;
use crate::db::models::User;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Validated registration data, ready to persist.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub gender: String,
    pub age_bracket: String,
    pub profession: String,
    pub password: String,
}

#[derive(Debug)]
pub enum RegisterOutcome {
    Created(User),
    DuplicateEmail,
}

#[derive(Debug)]
pub enum LoginOutcome {
    Success(User),
    UnknownEmail,
    WrongPassword,
}

/// Create a user account. The first account ever registered gets the admin
/// role; everyone after that is a regular user.
pub fn register_user(pool: &DbPool, account: &NewAccount) -> AppResult<RegisterOutcome> {
    let conn = pool.get()?;

    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM users WHERE email = ?1",
            params![account.email],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Ok(RegisterOutcome::DuplicateEmail);
    }

    let user_count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    let is_admin = user_count == 0;

    let id = uuid::Uuid::now_v7().to_string();
    let password_hash = password::hash_password(&account.password)?;

    conn.execute(
        "INSERT INTO users (id, email, name, gender, age_bracket, profession, password_hash, is_admin)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            account.email,
            account.name,
            account.gender,
            account.age_bracket,
            account.profession,
            password_hash,
            is_admin
        ],
    )?;

    let user = load_user(pool, &id)?.ok_or_else(|| {
        AppError::Internal("User row missing immediately after insert".to_string())
    })?;
    Ok(RegisterOutcome::Created(user))
}

/// Check credentials. Unknown email and wrong password are distinct
/// outcomes so the caller can show distinct notices.
pub fn verify_login(pool: &DbPool, email: &str, plain_password: &str) -> AppResult<LoginOutcome> {
    let conn = pool.get()?;

    let user: Option<User> = conn
        .query_row(
            "SELECT id, email, name, gender, age_bracket, profession, password_hash, is_admin, created_at
             FROM users WHERE email = ?1",
            params![email],
            map_user_row,
        )
        .optional()?;

    let Some(user) = user else {
        return Ok(LoginOutcome::UnknownEmail);
    };

    if password::verify_password(plain_password, &user.password_hash)? {
        Ok(LoginOutcome::Success(user))
    } else {
        Ok(LoginOutcome::WrongPassword)
    }
}

pub fn load_user(pool: &DbPool, user_id: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            "SELECT id, email, name, gender, age_bracket, profession, password_hash, is_admin, created_at
             FROM users WHERE id = ?1",
            params![user_id],
            map_user_row,
        )
        .optional()?;
    Ok(user)
}

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        gender: row.get(3)?,
        age_bracket: row.get(4)?,
        profession: row.get(5)?,
        password_hash: row.get(6)?,
        is_admin: row.get(7)?,
        created_at: row.get(8)?,
    })
}
