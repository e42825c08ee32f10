//! Response documents returned by the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::forms::{CommentForm, PostForm, ProfileForm};

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// The signed-in user's own account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationView {
    pub id: Uuid,
    pub name: String,
}

/// A post as shown in listings and on its detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: AuthorView,
    pub category: Option<CategoryView>,
    /// Present only while the location itself is published.
    pub location: Option<LocationView>,
    pub comment_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorView,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// `GET /posts/<id>/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    /// Empty comment form, offered to signed-in viewers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<CommentForm>,
}

/// `GET /category/<slug>/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPageResponse {
    pub category: CategoryView,
    pub page: PageView<PostView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Shown to the profile owner only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub date_joined: DateTime<Utc>,
}

/// `GET /profile/<username>/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePageResponse {
    pub profile: ProfileView,
    pub page: PageView<PostView>,
}

/// A selectable option of a form field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub value: Uuid,
    pub label: String,
}

/// Post form with its current values and the available choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormResponse {
    pub form: PostForm,
    pub categories: Vec<Choice>,
    pub locations: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentFormResponse {
    pub form: CommentForm,
    pub comment: CommentView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFormResponse {
    pub form: ProfileForm,
}
