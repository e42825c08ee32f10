//! Category page.

use actix_web::{HttpResponse, web};

use blogicum_core::ports::PostFilter;
use blogicum_shared::ApiResponse;
use blogicum_shared::dto::CategoryPageResponse;

use super::{PageQuery, presenters};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /category/{slug}/ - unpublished categories do not exist for readers.
pub async fn category_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No category matches {slug}")))?;

    let filter = PostFilter::visible_to(viewer.user_id()).in_category(category.id);
    let page = state.posts.list(&filter, query.request()?).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CategoryPageResponse {
        category: presenters::category(category),
        page: presenters::page(page),
    })))
}
