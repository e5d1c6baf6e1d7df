//! Session and one-shot flash cookies, carried through axum-extra's `CookieJar`.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

fn app_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Signed session token, if the browser sent one.
pub fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value())
        .filter(|token| !token.is_empty())
}

pub fn start_session(jar: CookieJar, token: String) -> CookieJar {
    jar.add(app_cookie(SESSION_COOKIE, token))
}

pub fn end_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Queue a message for the next rendered page. The jar percent-encodes it.
pub fn set_flash(jar: CookieJar, message: &str) -> CookieJar {
    jar.add(app_cookie(FLASH_COOKIE, message.to_string()))
}

/// Read the pending flash message and drop its cookie.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let message = Some(cookie.value().to_string()).filter(|text| !text.is_empty());
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), message)
}

/// Render an HTML page along with any cookie changes.
pub fn page(jar: CookieJar, status: StatusCode, html: String) -> Response {
    (status, jar, Html(html)).into_response()
}

/// 303 redirect carrying a flash message for the next page.
pub fn redirect_with_flash(jar: CookieJar, to: &str, message: &str) -> Response {
    (set_flash(jar, message), Redirect::to(to)).into_response()
}
