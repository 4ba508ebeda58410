use askama::Template;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;

use crate::auth::accounts::{self, LoginOutcome, NewAccount, RegisterOutcome};
use crate::auth::session;
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::flash::{self, Flash};
use crate::forms::{FieldError, LoginForm, RegisterForm};
use crate::routes::home::Html;
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate {
    pub logged_in: bool,
    pub is_admin: bool,
    pub flash: Option<String>,
    pub form: RegisterForm,
    pub errors: Vec<FieldError>,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub logged_in: bool,
    pub is_admin: bool,
    pub flash: Option<String>,
    pub form: LoginForm,
    pub errors: Vec<FieldError>,
}

// -- Cookie helpers --

fn session_cookie(state: &AppState, token: &str) -> String {
    let max_age_secs = state.config.auth.session_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        state.config.auth.cookie_name, token, max_age_secs
    )
}

fn clear_session_cookie(state: &AppState) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
        state.config.auth.cookie_name
    )
}

fn register_page_response(
    user: &MaybeUser,
    flash_msg: Option<String>,
    form: RegisterForm,
    errors: Vec<FieldError>,
) -> Response {
    let template = RegisterTemplate {
        logged_in: user.0.is_some(),
        is_admin: user.0.as_ref().map(|u| u.is_admin).unwrap_or(false),
        flash: flash_msg,
        form,
        errors,
    };
    (
        [(header::SET_COOKIE, flash::clear_flash_cookie())],
        Html(template),
    )
        .into_response()
}

fn login_page_response(
    user: &MaybeUser,
    flash_msg: Option<String>,
    form: LoginForm,
    errors: Vec<FieldError>,
) -> Response {
    let template = LoginTemplate {
        logged_in: user.0.is_some(),
        is_admin: user.0.as_ref().map(|u| u.is_admin).unwrap_or(false),
        flash: flash_msg,
        form,
        errors,
    };
    (
        [(header::SET_COOKIE, flash::clear_flash_cookie())],
        Html(template),
    )
        .into_response()
}

// -- Register handlers --

/// GET /register — render the registration form
pub async fn register_page(user: MaybeUser, Flash(flash_msg): Flash) -> Response {
    register_page_response(&user, flash_msg, RegisterForm::default(), Vec::new())
}

/// POST /register — validate, create the account, sign the user in
pub async fn register_submit(
    State(state): State<AppState>,
    user: MaybeUser,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return Ok(register_page_response(&user, None, form, errors));
    }

    let account = NewAccount {
        email: form.email.trim().to_string(),
        name: form.name.trim().to_string(),
        gender: form.gender.clone(),
        age_bracket: form.age.clone(),
        profession: form.profession.trim().to_string(),
        password: form.password.clone(),
    };

    match accounts::register_user(&state.db, &account)? {
        RegisterOutcome::DuplicateEmail => Ok(flash::redirect_with_flash(
            "/login",
            "You've already signed up with that email, log in instead!",
        )),
        RegisterOutcome::Created(new_user) => {
            tracing::info!(email = %new_user.email, admin = new_user.is_admin, "registered user");
            let token =
                session::create_session(&state.db, &new_user.id, state.config.auth.session_hours)?;
            Ok((
                [(header::SET_COOKIE, session_cookie(&state, &token))],
                Redirect::to("/"),
            )
                .into_response())
        }
    }
}

// -- Login handlers --

/// GET /login — render the login form
pub async fn login_page(user: MaybeUser, Flash(flash_msg): Flash) -> Response {
    login_page_response(&user, flash_msg, LoginForm::default(), Vec::new())
}

/// POST /login — check credentials, establish a session
pub async fn login_submit(
    State(state): State<AppState>,
    user: MaybeUser,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return Ok(login_page_response(&user, None, form, errors));
    }

    match accounts::verify_login(&state.db, form.email.trim(), &form.password)? {
        LoginOutcome::UnknownEmail => Ok(flash::redirect_with_flash(
            "/login",
            "That email does not exist, please try again.",
        )),
        LoginOutcome::WrongPassword => Ok(flash::redirect_with_flash(
            "/login",
            "Password incorrect, please try again.",
        )),
        LoginOutcome::Success(found) => {
            let token =
                session::create_session(&state.db, &found.id, state.config.auth.session_hours)?;
            Ok((
                [(header::SET_COOKIE, session_cookie(&state, &token))],
                Redirect::to("/"),
            )
                .into_response())
        }
    }
}

// -- Logout handler --

/// GET /logout — delete session and redirect to the listing
pub async fn logout(
    State(state): State<AppState>,
    request: axum::http::Request<axum::body::Body>,
) -> AppResult<Response> {
    let (parts, _body): (Parts, _) = request.into_parts();

    if let Some(token) = flash::get_cookie_value(&parts, &state.config.auth.cookie_name) {
        let _ = session::delete_session(&state.db, token);
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie(&state))],
        Redirect::to("/"),
    )
        .into_response())
}
