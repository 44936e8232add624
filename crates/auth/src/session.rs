//! Session extraction from request headers and session-cookie assembly
//!
//! Transport priority is fixed: a valid Bearer token always wins over the
//! session cookie.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

use crate::claims::SessionPayload;
use crate::codec::SessionCodec;

/// Locate and verify a session token in the request headers.
///
/// Tries the `Authorization: Bearer` header first; when it is absent or
/// does not verify, falls back to the configured session cookie. Returns
/// `None` when neither transport yields a valid payload — malformed
/// tokens degrade to "unauthenticated", never to an error.
pub fn session_from_headers(
    headers: &HeaderMap,
    codec: &SessionCodec,
    cookie_name: &str,
) -> Option<SessionPayload> {
    if let Some(header) = headers.get(AUTHORIZATION) {
        if let Ok(raw) = header.to_str() {
            if raw.len() > 7 && raw[..7].eq_ignore_ascii_case("bearer ") {
                if let Some(payload) = codec.verify(raw[7..].trim()) {
                    return Some(payload);
                }
            }
        }
    }

    let cookie_header = headers.get(COOKIE)?.to_str().ok()?;
    for parsed in Cookie::split_parse_encoded(cookie_header.to_owned()) {
        match parsed {
            Ok(c) if c.name() == cookie_name => return codec.verify(c.value()),
            _ => continue,
        }
    }

    None
}

/// Build the session cookie carrying a freshly signed token.
///
/// `HttpOnly`, `SameSite=Lax`, path `/`; `Secure` in production. Without
/// a max-age this is a session cookie living until browser close or
/// explicit logout.
pub fn session_cookie(
    name: &str,
    token: String,
    secure: bool,
    max_age_seconds: Option<u64>,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name.to_owned(), token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/");

    if let Some(seconds) = max_age_seconds {
        builder = builder.max_age(Duration::seconds(seconds as i64));
    }

    builder.build()
}

/// Build the cookie that clears the session on logout.
pub fn expired_session_cookie(name: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_owned(), String::new()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}
