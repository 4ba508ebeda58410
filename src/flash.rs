//! One-shot notice cookie. A redirect sets it, the next page read clears it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

const FLASH_COOKIE: &str = "firstglance_flash";

/// Set-Cookie value carrying a flash notice across one redirect.
/// The message is form-urlencoded: cookie values must not contain
/// spaces or semicolons per RFC 6265.
pub fn flash_cookie(message: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age=60",
        FLASH_COOKIE, encoded
    )
}

/// Set-Cookie value that clears the flash cookie.
pub fn clear_flash_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", FLASH_COOKIE)
}

/// Read the flash message from request headers, if present.
pub fn read_flash(parts: &Parts) -> Option<String> {
    let raw = get_cookie_value(parts, FLASH_COOKIE)?;
    let decoded = url::form_urlencoded::parse(format!("m={}", raw).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())?;
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}

/// Extractor handing the pending flash notice to a page handler.
/// The page is responsible for clearing the cookie in its response.
pub struct Flash(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for Flash {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Flash(read_flash(parts)))
    }
}

/// 303 redirect that carries a flash notice to the target page.
pub fn redirect_with_flash(to: &str, message: &str) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, to.to_string()),
            (header::SET_COOKIE, flash_cookie(message)),
        ],
    )
        .into_response()
}

pub fn get_cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_cookie(cookie: &str) -> Parts {
        let req = Request::builder()
            .header(header::COOKIE, cookie)
            .body(())
            .unwrap();
        req.into_parts().0
    }

    #[test]
    fn flash_roundtrips_spaces_and_punctuation() {
        let msg = "That email does not exist, please try again.";
        let set_cookie = flash_cookie(msg);
        let value = set_cookie
            .split(';')
            .next()
            .unwrap()
            .split('=')
            .nth(1)
            .unwrap();
        // The encoded cookie value itself must be RFC 6265 safe
        assert!(!value.contains(' '));
        assert!(!value.contains(','));
        let parts = parts_with_cookie(&format!("{}={}", FLASH_COOKIE, value));
        assert_eq!(read_flash(&parts).as_deref(), Some(msg));
    }

    #[test]
    fn missing_flash_reads_none() {
        let parts = parts_with_cookie("other=1");
        assert_eq!(read_flash(&parts), None);
    }

    #[test]
    fn cleared_flash_reads_none() {
        let parts = parts_with_cookie(&format!("{}=", FLASH_COOKIE));
        assert_eq!(read_flash(&parts), None);
    }

    #[test]
    fn get_cookie_value_finds_among_many() {
        let parts = parts_with_cookie("a=1; firstglance_flash=hi; b=2");
        assert_eq!(get_cookie_value(&parts, FLASH_COOKIE), Some("hi"));
        assert_eq!(get_cookie_value(&parts, "b"), Some("2"));
        assert_eq!(get_cookie_value(&parts, "missing"), None);
    }
}
