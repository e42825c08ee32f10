use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthorRef, Authored};

/// Comment entity - a reader's note on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            text,
            created_at: Utc::now(),
        }
    }

    pub fn belongs_to(&self, post_id: Uuid) -> bool {
        self.post_id == post_id
    }
}

impl Authored for Comment {
    const KIND: &'static str = "comment";

    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

/// A comment with its author's name, as shown under a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: AuthorRef,
}
