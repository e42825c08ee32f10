use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentEntry, Location, Post, PostListing, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, together with everything that cascades from it.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Find a category by slug, only if it is published.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// All categories, ordered by title.
    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;
}

#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {
    /// All locations, ordered by name.
    async fn list_all(&self) -> Result<Vec<Location>, RepoError>;
}

/// Which posts a listing covers and who is looking.
#[derive(Debug, Clone)]
pub struct PostFilter {
    /// Requesting user; authors always see their own posts.
    pub viewer: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub now: DateTime<Utc>,
}

impl PostFilter {
    pub fn visible_to(viewer: Option<Uuid>) -> Self {
        Self {
            viewer,
            author_id: None,
            category_id: None,
            now: Utc::now(),
        }
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Visible posts with related data and comment counts, newest
    /// publication date first, one page at a time.
    ///
    /// Returns `RepoError::NotFound` when the page does not exist.
    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostListing>, RepoError>;

    /// A single post with related data and comment count, regardless of
    /// visibility.
    async fn find_listing(&self, id: Uuid) -> Result<Option<PostListing>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError>;
}
