//! In-memory store - used when no database is configured.
//!
//! All repositories handed out by one [`InMemoryStore`] share the same
//! tables, so cascading deletes and set-null references behave like the
//! PostgreSQL schema. Data is lost on process restart.

mod tables;


use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{
    AuthorRef, Category, CategoryRef, Comment, CommentEntry, Location, LocationRef, Post,
    PostListing, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::{POSTS_PER_PAGE, Page, PageRequest};
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostFilter,
    PostRepository, UserRepository,
};

use tables::{Stored, Tables};

type SharedTables = Arc<RwLock<Tables>>;

/// Owner of the shared tables; hands out repositories over them.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: SharedTables,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn repository<T>(&self) -> InMemoryRepository<T> {
        InMemoryRepository {
            tables: Arc::clone(&self.tables),
            _entity: PhantomData,
        }
    }

    pub fn users(&self) -> InMemoryUserRepository {
        self.repository()
    }

    pub fn categories(&self) -> InMemoryCategoryRepository {
        self.repository()
    }

    pub fn locations(&self) -> InMemoryLocationRepository {
        self.repository()
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        self.repository()
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        self.repository()
    }
}

/// Generic in-memory repository over one table of the store.
pub struct InMemoryRepository<T> {
    tables: SharedTables,
    _entity: PhantomData<fn() -> T>,
}

pub type InMemoryUserRepository = InMemoryRepository<User>;
pub type InMemoryCategoryRepository = InMemoryRepository<Category>;
pub type InMemoryLocationRepository = InMemoryRepository<Location>;
pub type InMemoryPostRepository = InMemoryRepository<Post>;
pub type InMemoryCommentRepository = InMemoryRepository<Comment>;

#[async_trait]
impl<T: Stored> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        entity.check_constraints(&tables)?;

        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if !T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::NotFound);
        }
        entity.check_constraints(&tables)?;

        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if T::table_mut(&mut tables).remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        T::on_delete(id, &mut tables);

        tracing::debug!(%id, "Deleted from in-memory store");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|category| category.slug == slug && category.is_published)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let tables = self.tables.read().await;
        let mut locations: Vec<Location> = tables.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }
}

/// Join a post with its related rows, like the SQL listing query.
fn listing(tables: &Tables, post: &Post) -> Option<PostListing> {
    let author = tables.users.get(&post.author_id)?;
    let category = post
        .category_id
        .and_then(|id| tables.categories.get(&id))
        .map(|c| CategoryRef {
            id: c.id,
            title: c.title.clone(),
            slug: c.slug.clone(),
            is_published: c.is_published,
        });
    let location = post
        .location_id
        .and_then(|id| tables.locations.get(&id))
        .map(|l| LocationRef {
            id: l.id,
            name: l.name.clone(),
            is_published: l.is_published,
        });
    let comment_count = tables
        .comments
        .values()
        .filter(|c| c.post_id == post.id)
        .count() as u64;

    Some(PostListing {
        post: post.clone(),
        author: AuthorRef {
            id: author.id,
            username: author.username.clone(),
        },
        category,
        location,
        comment_count,
    })
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostListing>, RepoError> {
        let tables = self.tables.read().await;

        let mut listings: Vec<PostListing> = tables
            .posts
            .values()
            .filter(|p| filter.author_id.is_none_or(|id| p.author_id == id))
            .filter(|p| filter.category_id.is_none_or(|id| p.category_id == Some(id)))
            .filter_map(|p| listing(&tables, p))
            .filter(|l| l.is_visible_to(filter.viewer, filter.now))
            .collect();
        listings.sort_by(|a, b| {
            b.post
                .pub_date
                .cmp(&a.post.pub_date)
                .then(b.post.created_at.cmp(&a.post.created_at))
        });

        Ok(Page::from_sorted(listings, page, POSTS_PER_PAGE)?)
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<PostListing>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).and_then(|p| listing(&tables, p)))
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let tables = self.tables.read().await;

        let mut entries: Vec<CommentEntry> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                let author = tables.users.get(&c.author_id)?;
                Some(CommentEntry {
                    comment: c.clone(),
                    author: AuthorRef {
                        id: author.id,
                        username: author.username.clone(),
                    },
                })
            })
            .collect();
        entries.sort_by_key(|e| e.comment.created_at);

        Ok(entries)
    }
}
