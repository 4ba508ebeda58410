use askama::Template;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::extractors::MaybeUser;
use crate::flash::{self, Flash};
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/about.html")]
struct AboutTemplate {
    logged_in: bool,
    is_admin: bool,
    flash: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/contact.html")]
struct ContactTemplate {
    logged_in: bool,
    is_admin: bool,
    flash: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/thank_you.html")]
struct ThankYouTemplate {
    logged_in: bool,
    is_admin: bool,
    flash: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/thank_you", get(thank_you))
}

async fn about(user: MaybeUser) -> Response {
    Html(AboutTemplate {
        logged_in: user.0.is_some(),
        is_admin: user.0.as_ref().map(|u| u.is_admin).unwrap_or(false),
        flash: None,
    })
    .into_response()
}

async fn contact(user: MaybeUser) -> Response {
    Html(ContactTemplate {
        logged_in: user.0.is_some(),
        is_admin: user.0.as_ref().map(|u| u.is_admin).unwrap_or(false),
        flash: None,
    })
    .into_response()
}

/// The submission success page; shows the flash set by /submit_form.
async fn thank_you(user: MaybeUser, Flash(flash_msg): Flash) -> Response {
    (
        [(header::SET_COOKIE, flash::clear_flash_cookie())],
        Html(ThankYouTemplate {
            logged_in: user.0.is_some(),
            is_admin: user.0.as_ref().map(|u| u.is_admin).unwrap_or(false),
            flash: flash_msg,
        }),
    )
        .into_response()
}
