//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select, prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use blogicum_core::domain::{
    AuthorRef, Category, CategoryRef, CommentEntry, Location, LocationRef, Post, PostListing, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::{POSTS_PER_PAGE, Page, PageRequest};
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostFilter, PostRepository,
    UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsPublished.eq(true))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// One row of the listing query: post columns, joined related fields and
/// the aggregated comment count.
#[derive(Debug, FromQueryResult)]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub text: String,
    pub pub_date: DateTimeWithTimeZone,
    pub is_published: bool,
    pub image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub author_username: String,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub category_is_published: Option<bool>,
    pub location_name: Option<String>,
    pub location_is_published: Option<bool>,
    pub comment_count: i64,
}

impl From<PostRow> for PostListing {
    fn from(row: PostRow) -> Self {
        let category = match (
            row.category_id,
            row.category_title,
            row.category_slug,
            row.category_is_published,
        ) {
            (Some(id), Some(title), Some(slug), Some(is_published)) => Some(CategoryRef {
                id,
                title,
                slug,
                is_published,
            }),
            _ => None,
        };
        let location = match (row.location_id, row.location_name, row.location_is_published) {
            (Some(id), Some(name), Some(is_published)) => Some(LocationRef {
                id,
                name,
                is_published,
            }),
            _ => None,
        };

        PostListing {
            post: Post {
                id: row.id,
                author_id: row.author_id,
                category_id: row.category_id,
                location_id: row.location_id,
                title: row.title,
                text: row.text,
                pub_date: row.pub_date.into(),
                is_published: row.is_published,
                image: row.image,
                created_at: row.created_at.into(),
            },
            author: AuthorRef {
                id: row.author_id,
                username: row.author_username,
            },
            category,
            location,
            comment_count: row.comment_count.max(0) as u64,
        }
    }
}

/// Posts joined with author, category and location, with comment counts.
fn listing_select() -> Select<PostEntity> {
    PostEntity::find()
        .select_only()
        .columns([
            post::Column::Id,
            post::Column::AuthorId,
            post::Column::CategoryId,
            post::Column::LocationId,
            post::Column::Title,
            post::Column::Text,
            post::Column::PubDate,
            post::Column::IsPublished,
            post::Column::Image,
            post::Column::CreatedAt,
        ])
        .column_as(user::Column::Username, "author_username")
        .column_as(category::Column::Title, "category_title")
        .column_as(category::Column::Slug, "category_slug")
        .column_as(category::Column::IsPublished, "category_is_published")
        .column_as(location::Column::Name, "location_name")
        .column_as(location::Column::IsPublished, "location_is_published")
        .column_as(
            Expr::col((comment::Entity, comment::Column::Id)).count(),
            "comment_count",
        )
        .join(JoinType::InnerJoin, post::Relation::Author.def())
        .join(JoinType::LeftJoin, post::Relation::Category.def())
        .join(JoinType::LeftJoin, post::Relation::Location.def())
        .join(JoinType::LeftJoin, post::Relation::Comments.def())
        .group_by(post::Column::Id)
        .group_by(user::Column::Id)
        .group_by(category::Column::Id)
        .group_by(location::Column::Id)
}

/// SQL form of the visibility rule. Requires the category join.
pub(crate) fn visibility_condition(filter: &PostFilter) -> Condition {
    let public = Condition::all()
        .add(post::Column::IsPublished.eq(true))
        .add(category::Column::IsPublished.eq(true))
        .add(post::Column::PubDate.lte(filter.now));

    match filter.viewer {
        Some(viewer) => Condition::any()
            .add(post::Column::AuthorId.eq(viewer))
            .add(public),
        None => public,
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostListing>, RepoError> {
        let mut select = listing_select().filter(visibility_condition(filter));
        if let Some(author_id) = filter.author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(category_id) = filter.category_id {
            select = select.filter(post::Column::CategoryId.eq(category_id));
        }

        let paginator = select
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::CreatedAt)
            .into_model::<PostRow>()
            .paginate(&self.db, POSTS_PER_PAGE);

        let totals = paginator.num_items_and_pages().await.map_err(query_error)?;
        let number = page.resolve(totals.number_of_pages)?;
        let rows = paginator
            .fetch_page(number - 1)
            .await
            .map_err(query_error)?;

        tracing::debug!(
            page = number,
            total_items = totals.number_of_items,
            "Listed posts"
        );

        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            number,
            per_page: POSTS_PER_PAGE,
            total_items: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<PostListing>, RepoError> {
        let row = listing_select()
            .filter(post::Column::Id.eq(id))
            .into_model::<PostRow>()
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let rows = CommentEntity::find()
            .find_also_related(UserEntity)
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|(comment, author)| {
                let author = author?;
                Some(CommentEntry {
                    author: AuthorRef {
                        id: author.id,
                        username: author.username,
                    },
                    comment: comment.into(),
                })
            })
            .collect())
    }
}
