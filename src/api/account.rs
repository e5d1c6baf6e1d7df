//! Account routes: login, logout, register, change password.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::api::auth;
use crate::api::cookies::{end_session, page, redirect_with_flash, start_session, take_flash};
use crate::api::forms::{ChangePasswordForm, CredentialsForm, RegisterForm, first_error};
use crate::api::routes::AppState;
use crate::api::views;
use crate::error::AppError;
use crate::ledger::LedgerError;

const INVALID_LOGIN: &str = "Invalid username and/or password.";

fn signed_in(
    state: &AppState,
    jar: CookieJar,
    user_id: uuid::Uuid,
) -> Result<CookieJar, AppError> {
    let token = auth::create_token(&state.jwt_secret, user_id)?;
    Ok(start_session(jar, token))
}

pub async fn login_form(jar: CookieJar) -> Response {
    let (jar, flash) = take_flash(end_session(jar));
    page(jar, StatusCode::OK, views::login(flash.as_deref()))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let jar = end_session(jar);
    if let Err(errors) = form.validate() {
        let message = first_error(&errors, &["username", "password"]);
        let html = views::login(message.as_deref());
        return Ok(page(jar, StatusCode::BAD_REQUEST, html));
    }

    let user = match state.ledger.find_user_by_username(&form.username).await? {
        Some(user) if auth::verify_password(&form.password, &user.password_hash) => user,
        _ => {
            tracing::info!(username = %form.username, "rejected login");
            return Ok(page(jar, StatusCode::FORBIDDEN, views::login(Some(INVALID_LOGIN))));
        }
    };

    tracing::info!(user_id = %user.id, "user logged in");
    Ok((signed_in(&state, jar, user.id)?, Redirect::to("/")).into_response())
}

pub async fn logout(jar: CookieJar) -> Response {
    (end_session(jar), Redirect::to("/login")).into_response()
}

pub async fn register_form(jar: CookieJar) -> Response {
    let (jar, flash) = take_flash(jar);
    page(jar, StatusCode::OK, views::register(flash.as_deref()))
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let message = first_error(&errors, &["username", "password", "confirmation"]);
        let html = views::register(message.as_deref());
        return Ok(page(jar, StatusCode::BAD_REQUEST, html));
    }

    let password_hash = auth::hash_password(&form.password)?;
    let user = match state
        .ledger
        .create_user(&form.username, &password_hash, state.starting_cash)
        .await
    {
        Ok(user) => user,
        Err(LedgerError::DuplicateUsername(_)) => {
            let html = views::register(Some(
                "There is already a user with that username. Please select another one.",
            ));
            return Ok(page(jar, StatusCode::BAD_REQUEST, html));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    let jar = signed_in(&state, jar, user.id)?;
    Ok(redirect_with_flash(jar, "/", "Registered!"))
}

pub async fn change_password_form(jar: CookieJar) -> Response {
    let (jar, flash) = take_flash(end_session(jar));
    page(jar, StatusCode::OK, views::change_password(flash.as_deref()))
}

pub async fn change_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Response, AppError> {
    let jar = end_session(jar);
    let respond = |jar, status, message: &str| {
        page(jar, status, views::change_password(Some(message)))
    };

    if let Err(errors) = form.validate() {
        // Problems with the new password are reported; bad credentials stay vague.
        return Ok(match first_error(&errors, &["new_password", "new_confirmation"]) {
            Some(message) => respond(jar, StatusCode::BAD_REQUEST, &message),
            None => respond(jar, StatusCode::FORBIDDEN, INVALID_LOGIN),
        });
    }

    match state.ledger.find_user_by_username(&form.username).await? {
        Some(user) if auth::verify_password(&form.old_password, &user.password_hash) => {
            let password_hash = auth::hash_password(&form.new_password)?;
            state
                .ledger
                .update_password(&user.username, &password_hash)
                .await?;
            tracing::info!(user_id = %user.id, "password changed");
            Ok(respond(jar, StatusCode::OK, "Password changed!"))
        }
        _ => Ok(respond(jar, StatusCode::FORBIDDEN, INVALID_LOGIN)),
    }
}
