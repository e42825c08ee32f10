//! Public profile page and the profile edit form.

use actix_web::{HttpResponse, web};

use blogicum_core::ports::{BaseRepository, PostFilter};
use blogicum_shared::ApiResponse;
use blogicum_shared::dto::{ProfileFormResponse, ProfilePageResponse};
use blogicum_shared::forms::ProfileForm;

use super::{PageQuery, current_user, presenters, profile_url, redirect};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /profile/{username}/ - the owner also sees unpublished and
/// scheduled posts.
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user matches {username}")))?;

    let viewer_id = viewer.user_id();
    let filter = PostFilter::visible_to(viewer_id).by_author(user.id);
    let page = state.posts.list(&filter, query.request()?).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ProfilePageResponse {
        profile: presenters::profile(&user, viewer_id == Some(user.id)),
        page: presenters::page(page),
    })))
}

/// GET /profile/
pub async fn edit_form(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ProfileFormResponse {
        form: presenters::profile_form(&user),
    })))
}

/// POST /profile/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<ProfileForm>,
) -> AppResult<HttpResponse> {
    let mut user = current_user(&state, &identity).await?;
    let cleaned = form.clean()?;

    if cleaned.username != user.username {
        let taken = state
            .users
            .find_by_username(&cleaned.username)
            .await?
            .is_some();
        if taken {
            return Err(AppError::field(
                "username",
                "A user with that username already exists.",
            ));
        }
    }

    user.update_profile(
        cleaned.username,
        cleaned.email,
        cleaned.first_name,
        cleaned.last_name,
    );
    let user = state.users.update(user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "Profile updated");

    Ok(redirect(profile_url(&user.username)))
}
