use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Authored;

/// Post entity - a blog post, possibly scheduled for later publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    /// Opaque reference to an uploaded image.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The author-editable part of a post.
#[derive(Debug, Clone)]
pub struct PostContent {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
    pub is_published: bool,
}

impl Post {
    /// Create a new post owned by `author_id`.
    pub fn new(author_id: Uuid, content: PostContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id: content.category_id,
            location_id: content.location_id,
            title: content.title,
            text: content.text,
            pub_date: content.pub_date,
            is_published: content.is_published,
            image: content.image,
            created_at: Utc::now(),
        }
    }

    /// Replace the editable fields, keeping identity and authorship.
    pub fn apply(&mut self, content: PostContent) {
        self.title = content.title;
        self.text = content.text;
        self.pub_date = content.pub_date;
        self.category_id = content.category_id;
        self.location_id = content.location_id;
        self.image = content.image;
        self.is_published = content.is_published;
    }

    pub fn content(&self) -> PostContent {
        PostContent {
            title: self.title.clone(),
            text: self.text.clone(),
            pub_date: self.pub_date,
            category_id: self.category_id,
            location_id: self.location_id,
            image: self.image.clone(),
            is_published: self.is_published,
        }
    }

    /// Whether the post is out for everybody: published, filed under a
    /// published category and no longer scheduled.
    pub fn is_public(&self, category_published: Option<bool>, now: DateTime<Utc>) -> bool {
        self.is_published && category_published == Some(true) && self.pub_date <= now
    }

    /// The visibility rule: authors always see their own posts, everyone
    /// else only public ones.
    pub fn is_visible_to(
        &self,
        viewer: Option<Uuid>,
        category_published: Option<bool>,
        now: DateTime<Utc>,
    ) -> bool {
        viewer == Some(self.author_id) || self.is_public(category_published, now)
    }
}

impl Authored for Post {
    const KIND: &'static str = "post";

    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

/// Author fields eagerly loaded with a post or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub id: Uuid,
    pub name: String,
    pub is_published: bool,
}

/// A post with its related data and comment count, as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListing {
    pub post: Post,
    pub author: AuthorRef,
    pub category: Option<CategoryRef>,
    pub location: Option<LocationRef>,
    pub comment_count: u64,
}

impl PostListing {
    pub fn is_visible_to(&self, viewer: Option<Uuid>, now: DateTime<Utc>) -> bool {
        self.post.is_visible_to(
            viewer,
            self.category.as_ref().map(|c| c.is_published),
            now,
        )
    }
}
