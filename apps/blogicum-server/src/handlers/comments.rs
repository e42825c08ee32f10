//! Comment form flows, always scoped to one post.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::domain::{AuthorRef, Comment, CommentEntry, ensure_author};
use blogicum_core::ports::BaseRepository;
use blogicum_shared::ApiResponse;
use blogicum_shared::dto::CommentFormResponse;
use blogicum_shared::forms::CommentForm;

use super::{current_user, post_url, presenters, redirect, visible_listing};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Load a comment of `post_id` for a change by `identity`.
async fn authored_comment(
    state: &AppState,
    post_id: Uuid,
    comment_id: Uuid,
    identity: &Identity,
) -> AppResult<Comment> {
    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|comment| comment.belongs_to(post_id))
        .ok_or_else(AppError::not_found)?;
    ensure_author(&comment, identity.user_id)?;
    Ok(comment)
}

/// A comment with its author; the author is the signed-in user once
/// ownership has been checked.
async fn entry(state: &AppState, comment: Comment, identity: &Identity) -> AppResult<CommentEntry> {
    let author = current_user(state, identity).await?;
    Ok(CommentEntry {
        comment,
        author: AuthorRef {
            id: author.id,
            username: author.username,
        },
    })
}

/// POST /posts/{post_id}/comment
pub async fn add(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let author = current_user(&state, &identity).await?;
    visible_listing(&state, post_id, Some(author.id)).await?;
    let text = form.clean()?;

    let comment = state
        .comments
        .insert(Comment::new(post_id, author.id, text))
        .await?;
    tracing::info!(%post_id, comment_id = %comment.id, "Comment added");

    Ok(redirect(post_url(post_id)))
}

/// GET /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = authored_comment(&state, post_id, comment_id, &identity).await?;
    let form = CommentForm {
        text: comment.text.clone(),
    };
    let entry = entry(&state, comment, &identity).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CommentFormResponse {
        form,
        comment: presenters::comment(entry),
    })))
}

/// POST /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let mut comment = authored_comment(&state, post_id, comment_id, &identity).await?;
    comment.text = form.clean()?;

    state.comments.update(comment).await?;
    tracing::info!(%post_id, %comment_id, "Comment updated");

    Ok(redirect(post_url(post_id)))
}

/// GET /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = authored_comment(&state, post_id, comment_id, &identity).await?;
    let entry = entry(&state, comment, &identity).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(presenters::comment(entry))))
}

/// POST /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = authored_comment(&state, post_id, comment_id, &identity).await?;

    state.comments.delete(comment.id).await?;
    tracing::info!(%post_id, %comment_id, "Comment deleted");

    Ok(redirect(post_url(post_id)))
}
