use std::collections::HashMap;

use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Location, Post, User};
use blogicum_core::error::RepoError;

#[derive(Default)]
pub struct Tables {
    pub users: HashMap<Uuid, User>,
    pub categories: HashMap<Uuid, Category>,
    pub locations: HashMap<Uuid, Location>,
    pub posts: HashMap<Uuid, Post>,
    pub comments: HashMap<Uuid, Comment>,
}

/// An entity kept in one of the tables, with the constraints and delete
/// rules the relational schema would enforce.
pub trait Stored: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Unique and foreign key checks before a write.
    fn check_constraints(&self, _tables: &Tables) -> Result<(), RepoError> {
        Ok(())
    }

    /// Propagate the removal of row `id` to dependent rows.
    fn on_delete(_id: Uuid, _tables: &mut Tables) {}
}

fn violation(what: &str) -> RepoError {
    RepoError::Constraint(what.to_string())
}

impl Stored for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.users
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        let taken = tables
            .users
            .values()
            .any(|u| u.id != self.id && u.username == self.username);
        if taken {
            return Err(violation("users_username_key"));
        }
        Ok(())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) {
        let posts: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in posts {
            tables.posts.remove(&post_id);
            Post::on_delete(post_id, tables);
        }
        tables.comments.retain(|_, c| c.author_id != id);
    }
}

impl Stored for Category {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.categories
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        let taken = tables
            .categories
            .values()
            .any(|c| c.id != self.id && c.slug == self.slug);
        if taken {
            return Err(violation("categories_slug_key"));
        }
        Ok(())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) {
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
    }
}

impl Stored for Location {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.locations
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.locations
    }

    fn on_delete(id: Uuid, tables: &mut Tables) {
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
    }
}

impl Stored for Post {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.users.contains_key(&self.author_id) {
            return Err(violation("posts_author_id_fkey"));
        }
        if self
            .category_id
            .is_some_and(|id| !tables.categories.contains_key(&id))
        {
            return Err(violation("posts_category_id_fkey"));
        }
        if self
            .location_id
            .is_some_and(|id| !tables.locations.contains_key(&id))
        {
            return Err(violation("posts_location_id_fkey"));
        }
        Ok(())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) {
        tables.comments.retain(|_, c| c.post_id != id);
    }
}

impl Stored for Comment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.posts.contains_key(&self.post_id) {
            return Err(violation("comments_post_id_fkey"));
        }
        if !tables.users.contains_key(&self.author_id) {
            return Err(violation("comments_author_id_fkey"));
        }
        Ok(())
    }
}
