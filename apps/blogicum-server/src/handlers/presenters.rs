//! Mapping from domain values to response documents.

use blogicum_core::domain::{
    AuthorRef, Category, CommentEntry, Location, Post, PostListing, User,
};
use blogicum_core::pagination::Page;
use blogicum_shared::dto::{
    AccountResponse, AuthorView, CategoryView, Choice, CommentView, LocationView, PageView,
    PostView, ProfileView,
};
use blogicum_shared::forms::{PostForm, ProfileForm};

/// Same layout as the `datetime-local` input the form accepts.
const FORM_DATETIME: &str = "%Y-%m-%dT%H:%M";

fn author(author: AuthorRef) -> AuthorView {
    AuthorView {
        id: author.id,
        username: author.username,
    }
}

pub fn post(listing: PostListing) -> PostView {
    let PostListing {
        post,
        author: post_author,
        category,
        location,
        comment_count,
    } = listing;

    PostView {
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        is_published: post.is_published,
        image: post.image,
        created_at: post.created_at,
        author: author(post_author),
        category: category.map(|c| CategoryView {
            id: c.id,
            title: c.title,
            slug: c.slug,
            description: None,
        }),
        // unpublished locations are not shown
        location: location
            .filter(|l| l.is_published)
            .map(|l| LocationView {
                id: l.id,
                name: l.name,
            }),
        comment_count,
    }
}

pub fn page(page: Page<PostListing>) -> PageView<PostView> {
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    let page = page.map(post);

    PageView {
        items: page.items,
        number: page.number,
        per_page: page.per_page,
        total_items: page.total_items,
        total_pages: page.total_pages,
        has_next,
        has_previous,
    }
}

pub fn comment(entry: CommentEntry) -> CommentView {
    CommentView {
        id: entry.comment.id,
        post_id: entry.comment.post_id,
        text: entry.comment.text,
        created_at: entry.comment.created_at,
        author: author(entry.author),
    }
}

pub fn category(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        title: category.title,
        slug: category.slug,
        description: Some(category.description),
    }
}

pub fn category_choices(categories: Vec<Category>) -> Vec<Choice> {
    categories
        .into_iter()
        .map(|c| Choice {
            value: c.id,
            label: c.title,
        })
        .collect()
}

pub fn location_choices(locations: Vec<Location>) -> Vec<Choice> {
    locations
        .into_iter()
        .map(|l| Choice {
            value: l.id,
            label: l.name,
        })
        .collect()
}

/// The post form prefilled with a post's current values.
pub fn post_form(post: &Post) -> PostForm {
    PostForm {
        title: post.title.clone(),
        text: post.text.clone(),
        pub_date: post.pub_date.format(FORM_DATETIME).to_string(),
        category: post.category_id.map(|id| id.to_string()).unwrap_or_default(),
        location: post.location_id.map(|id| id.to_string()).unwrap_or_default(),
        image: post.image.clone().unwrap_or_default(),
        is_published: Some(post.is_published.to_string()),
    }
}

pub fn profile_form(user: &User) -> ProfileForm {
    ProfileForm {
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
    }
}

pub fn profile(user: &User, is_owner: bool) -> ProfileView {
    ProfileView {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: is_owner.then(|| user.email.clone()),
        date_joined: user.created_at,
    }
}

pub fn account(user: &User) -> AccountResponse {
    AccountResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        date_joined: user.created_at,
    }
}
