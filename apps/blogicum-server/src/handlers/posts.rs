//! Post listing, detail and the create/edit/delete form flows.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::domain::{Post, PostContent, ensure_author};
use blogicum_core::ports::{BaseRepository, PostFilter};
use blogicum_shared::ApiResponse;
use blogicum_shared::dto::{PostDetailResponse, PostFormResponse};
use blogicum_shared::forms::{CleanedPost, CommentForm, PostForm};
use blogicum_shared::response::FieldErrors;

use super::{
    PageQuery, current_user, post_url, presenters, profile_url, redirect, visible_listing,
};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// GET / - every post the viewer may see, newest first.
pub async fn index(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let filter = PostFilter::visible_to(viewer.user_id());
    let page = state.posts.list(&filter, query.request()?).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(presenters::page(page))))
}

/// GET /posts/{post_id}/
pub async fn detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let listing = visible_listing(&state, post_id, viewer.user_id()).await?;
    let comments = state.comments.list_for_post(post_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostDetailResponse {
        post: presenters::post(listing),
        comments: comments.into_iter().map(presenters::comment).collect(),
        form: viewer.0.is_some().then(CommentForm::default),
    })))
}

async fn form_response(state: &AppState, form: PostForm) -> AppResult<PostFormResponse> {
    let categories = state.categories.list_all().await?;
    let locations = state.locations.list_all().await?;

    Ok(PostFormResponse {
        form,
        categories: presenters::category_choices(categories),
        locations: presenters::location_choices(locations),
    })
}

/// Validate a submitted post form, including that its category and
/// location exist.
async fn clean_post(state: &AppState, form: &PostForm) -> AppResult<PostContent> {
    let CleanedPost {
        title,
        text,
        pub_date,
        category_id,
        location_id,
        image,
        is_published,
    } = form.clean()?;

    let mut errors = FieldErrors::new();
    if state.categories.find_by_id(category_id).await?.is_none() {
        errors.add("category", INVALID_CHOICE);
    }
    if let Some(location_id) = location_id {
        if state.locations.find_by_id(location_id).await?.is_none() {
            errors.add("location", INVALID_CHOICE);
        }
    }

    Ok(errors.into_result(PostContent {
        title,
        text,
        pub_date,
        category_id: Some(category_id),
        location_id,
        image,
        is_published,
    })?)
}

/// Load a post for a change by `identity`: missing is 404, someone
/// else's is 403.
async fn authored_post(state: &AppState, post_id: Uuid, identity: &Identity) -> AppResult<Post> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    ensure_author(&post, identity.user_id)?;
    Ok(post)
}

/// GET /posts/create/
pub async fn create_form(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let response = form_response(&state, PostForm::default()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

/// POST /posts/create/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let author = current_user(&state, &identity).await?;
    let content = clean_post(&state, &form).await?;

    let post = state.posts.insert(Post::new(author.id, content)).await?;
    tracing::info!(post_id = %post.id, author = %author.username, "Post created");

    Ok(redirect(profile_url(&author.username)))
}

/// GET /posts/{post_id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = authored_post(&state, path.into_inner(), &identity).await?;
    let response = form_response(&state, presenters::post_form(&post)).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

/// POST /posts/{post_id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let mut post = authored_post(&state, path.into_inner(), &identity).await?;
    post.apply(clean_post(&state, &form).await?);

    let post = state.posts.update(post).await?;
    tracing::info!(post_id = %post.id, "Post updated");

    Ok(redirect(post_url(post.id)))
}

/// GET /posts/{post_id}/delete/ - the post, for confirmation.
pub async fn delete_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let listing = state
        .posts
        .find_listing(path.into_inner())
        .await?
        .ok_or_else(AppError::not_found)?;
    ensure_author(&listing.post, identity.user_id)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(presenters::post(listing))))
}

/// POST /posts/{post_id}/delete/ - comments go with the post.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = authored_post(&state, path.into_inner(), &identity).await?;
    let author = current_user(&state, &identity).await?;

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, "Post deleted");

    Ok(redirect(profile_url(&author.username)))
}
