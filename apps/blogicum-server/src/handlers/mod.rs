//! HTTP handlers and route configuration.

mod auth;
mod category;
mod comments;
mod health;
mod posts;
mod presenters;
mod profile;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, http::header, web};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use blogicum_core::domain::{PostListing, User};
use blogicum_core::pagination::PageRequest;
use blogicum_core::ports::BaseRepository;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// `?page=` of the listing pages.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    fn request(&self) -> AppResult<PageRequest> {
        Ok(PageRequest::parse(self.page.as_deref())?)
    }
}

/// `302 Found` to `location`, the answer to every successful form post.
fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

fn post_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

/// The signed-in user's current record. A token for a deleted account
/// gets not-found like any other unauthenticated request.
async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| {
            tracing::debug!(username = %identity.username, "Token for a missing account");
            AppError::not_found()
        })
}

/// A post with its related data, if `viewer` may see it.
async fn visible_listing(
    state: &AppState,
    post_id: Uuid,
    viewer: Option<Uuid>,
) -> AppResult<PostListing> {
    state
        .posts
        .find_listing(post_id)
        .await?
        .filter(|listing| listing.is_visible_to(viewer, Utc::now()))
        .ok_or_else(AppError::not_found)
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/posts")
                // before `/{post_id}/` so `create` is not taken for an id
                .service(
                    web::resource("/create/")
                        .route(web::get().to(posts::create_form))
                        .route(web::post().to(posts::create)),
                )
                .route("/{post_id}/", web::get().to(posts::detail))
                .service(
                    web::resource("/{post_id}/edit/")
                        .route(web::get().to(posts::edit_form))
                        .route(web::post().to(posts::edit)),
                )
                .service(
                    web::resource("/{post_id}/delete/")
                        .route(web::get().to(posts::delete_form))
                        .route(web::post().to(posts::delete)),
                )
                .route("/{post_id}/comment", web::post().to(comments::add))
                .service(
                    web::resource("/{post_id}/edit_comment/{comment_id}/")
                        .route(web::get().to(comments::edit_form))
                        .route(web::post().to(comments::edit)),
                )
                .service(
                    web::resource("/{post_id}/delete_comment/{comment_id}/")
                        .route(web::get().to(comments::delete_form))
                        .route(web::post().to(comments::delete)),
                ),
        )
        .route("/category/{slug}/", web::get().to(category::category_posts))
        .service(
            web::resource("/profile/")
                .route(web::get().to(profile::edit_form))
                .route(web::post().to(profile::edit)),
        )
        .route("/profile/{username}/", web::get().to(profile::profile))
        .service(
            web::scope("/auth")
                .route("/registration/", web::post().to(auth::register))
                .route("/login/", web::post().to(auth::login))
                .route("/me/", web::get().to(auth::me))
                .route("/password_change/", web::post().to(auth::password_change)),
        );
}
