//! Account handlers: registration, login, current account and password change.

use actix_web::{HttpResponse, web};

use blogicum_core::domain::User;
use blogicum_core::ports::{AuthError, BaseRepository};
use blogicum_shared::ApiResponse;
use blogicum_shared::dto::AuthResponse;
use blogicum_shared::forms::{LoginForm, PasswordChangeForm, RegistrationForm};

use super::{current_user, presenters};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn token_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state.tokens.generate_token(user.id, &user.username)?;
    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    })
}

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    form: web::Form<RegistrationForm>,
) -> AppResult<HttpResponse> {
    form.clean()?;

    if state.users.find_by_username(&form.username).await?.is_some() {
        return Err(AppError::field(
            "username",
            "A user with that username already exists.",
        ));
    }

    let password_hash = state.passwords.hash(&form.password)?;
    let user = state
        .users
        .insert(User::new(
            form.username.clone(),
            form.email.trim().to_string(),
            password_hash,
        ))
        .await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(token_response(&state, &user)?))
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    form.clean()?;

    let user = state
        .users
        .find_by_username(&form.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&form.password, &user.password_hash)? {
        tracing::debug!(username = %form.username, "Rejected login");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(HttpResponse::Ok().json(token_response(&state, &user)?))
}

/// GET /auth/me/
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(presenters::account(&user))))
}

/// POST /auth/password_change/ - existing tokens stay valid.
pub async fn password_change(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PasswordChangeForm>,
) -> AppResult<HttpResponse> {
    let mut user = current_user(&state, &identity).await?;
    let password = form.clean()?;

    user.set_password_hash(state.passwords.hash(password)?);
    let user = state.users.update(user).await?;
    tracing::info!(user_id = %user.id, "Password changed");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        presenters::account(&user),
        "Your password was changed.",
    )))
}
