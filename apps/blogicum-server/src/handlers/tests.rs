use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Post, PostContent, User};
use blogicum_core::ports::{BaseRepository, CommentRepository};
use blogicum_infra::{InMemoryStore, JwtConfig};

use super::configure_routes;
use crate::state::AppState;

struct Blog {
    store: InMemoryStore,
    state: AppState,
    author: User,
    reader: User,
    category: Category,
}

async fn blog() -> Blog {
    let store = InMemoryStore::new();
    let state = AppState::in_memory(&store, JwtConfig::default());

    let author = store
        .users()
        .insert(User::new("author".into(), "author@example.com".into(), "-".into()))
        .await
        .unwrap();
    let reader = store
        .users()
        .insert(User::new("reader".into(), "reader@example.com".into(), "-".into()))
        .await
        .unwrap();
    let category = store
        .categories()
        .insert(Category::new("Travel".into(), "Trips".into(), "travel".into()))
        .await
        .unwrap();

    Blog {
        store,
        state,
        author,
        reader,
        category,
    }
}

impl Blog {
    fn bearer(&self, user: &User) -> (header::HeaderName, String) {
        let token = self
            .state
            .tokens
            .generate_token(user.id, &user.username)
            .unwrap();
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    async fn post(&self, is_published: bool, pub_date: DateTime<Utc>) -> Post {
        let post = Post::new(
            self.author.id,
            PostContent {
                title: "Fjords".into(),
                text: "Cold and wet.".into(),
                pub_date,
                category_id: Some(self.category.id),
                location_id: None,
                image: None,
                is_published,
            },
        );
        self.store.posts().insert(post).await.unwrap()
    }

    async fn comment(&self, post: &Post, text: &str, created_at: DateTime<Utc>) -> Comment {
        let mut comment = Comment::new(post.id, self.reader.id, text.into());
        comment.created_at = created_at;
        self.store.comments().insert(comment).await.unwrap()
    }

    fn post_form(&self, title: &str) -> Vec<(&'static str, String)> {
        vec![
            ("title", title.to_string()),
            ("text", "Cold and wet.".to_string()),
            ("pub_date", "2024-01-01T10:00".to_string()),
            ("category", self.category.id.to_string()),
        ]
    }
}

macro_rules! init_app {
    ($blog:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($blog.state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn hour_ago() -> DateTime<Utc> {
    Utc::now() - Duration::hours(1)
}

#[actix_rt::test]
async fn test_index_hides_unpublished_posts_from_other_users() {
    let blog = blog().await;
    blog.post(false, hour_ago()).await;
    blog.post(true, hour_ago()).await;
    let app = init_app!(blog);

    let req = test::TestRequest::get().uri("/").to_request();
    let anonymous: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let own: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(anonymous["data"]["total_items"], 1);
    assert_eq!(own["data"]["total_items"], 2);
    assert_eq!(own["data"]["items"][0]["author"]["username"], "author");
}

#[actix_rt::test]
async fn test_index_pagination() {
    let blog = blog().await;
    for i in 0..12 {
        blog.post(true, hour_ago() - Duration::minutes(i)).await;
    }
    let app = init_app!(blog);

    let req = test::TestRequest::get().uri("/?page=last").to_request();
    let last: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(last["data"]["number"], 2);
    assert_eq!(last["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(last["data"]["has_previous"], true);

    for page in ["3", "0", "two"] {
        let req = test::TestRequest::get()
            .uri(&format!("/?page={page}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "page={page}");
    }
}

#[actix_rt::test]
async fn test_login_gated_routes_are_not_found_without_token() {
    let blog = blog().await;
    let post = blog.post(true, hour_ago()).await;
    let app = init_app!(blog);

    for uri in ["/posts/create/", "/profile/", "/auth/me/"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", post.id))
        .set_form([("text", "hi")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/auth/me/")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_create_post_redirects_to_profile() {
    let blog = blog().await;
    let app = init_app!(blog);

    let req = test::TestRequest::get()
        .uri("/posts/create/")
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let form: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(form["data"]["categories"][0]["label"], "Travel");

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(blog.bearer(&blog.author))
        .set_form(blog.post_form("Fjords"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/author/");

    let req = test::TestRequest::get().uri("/profile/author/").to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["data"]["page"]["items"][0]["title"], "Fjords");
}

#[actix_rt::test]
async fn test_create_post_reports_field_errors() {
    let blog = blog().await;
    let app = init_app!(blog);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(blog.bearer(&blog.author))
        .set_form(blog.post_form(""))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["title"].is_array());

    let mut form = blog.post_form("   ");
    form[1].1 = "  \n ".to_string();
    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(blog.bearer(&blog.author))
        .set_form(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["text"].is_array());

    let mut form = blog.post_form("Fjords");
    form[3].1 = Uuid::new_v4().to_string();
    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(blog.bearer(&blog.author))
        .set_form(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["category"].is_array());
}

#[actix_rt::test]
async fn test_only_author_may_edit_post() {
    let blog = blog().await;
    let post = blog.post(true, hour_ago()).await;
    let app = init_app!(blog);
    let uri = format!("/posts/{}/edit/", post.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .set_form(blog.post_form("Hijacked"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let form: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(form["data"]["form"]["title"], "Fjords");

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .set_form(blog.post_form("Glaciers"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let stored = blog.store.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Glaciers");
    assert_eq!(stored.author_id, blog.author.id);
}

#[actix_rt::test]
async fn test_deleting_post_removes_its_comments() {
    let blog = blog().await;
    let post = blog.post(true, hour_ago()).await;
    let comment = blog.comment(&post, "Nice", Utc::now()).await;
    let app = init_app!(blog);
    let uri = format!("/posts/{}/delete/", post.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let confirm: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(confirm["data"]["comment_count"], 1);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/author/");

    assert!(blog.store.posts().find_by_id(post.id).await.unwrap().is_none());
    assert!(
        blog.store
            .comments()
            .find_by_id(comment.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[actix_rt::test]
async fn test_scheduled_post_detail_is_not_found_for_readers() {
    let blog = blog().await;
    let post = blog.post(true, Utc::now() + Duration::days(1)).await;
    let app = init_app!(blog);
    let uri = format!("/posts/{}/", post.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_post_detail_lists_comments_oldest_first() {
    let blog = blog().await;
    let post = blog.post(true, hour_ago()).await;
    let now = Utc::now();
    blog.comment(&post, "later", now).await;
    blog.comment(&post, "earlier", now - Duration::minutes(5)).await;
    let app = init_app!(blog);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(detail["data"]["post"]["comment_count"], 2);
    assert_eq!(detail["data"]["comments"][0]["text"], "earlier");
    assert_eq!(detail["data"]["comments"][1]["text"], "later");
    assert!(detail["data"].get("form").is_none());
}

#[actix_rt::test]
async fn test_add_comment() {
    let blog = blog().await;
    let post = blog.post(true, hour_ago()).await;
    let app = init_app!(blog);
    let uri = format!("/posts/{}/comment", post.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .set_form([("text", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .set_form([("text", "Lovely")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let comments = blog
        .store
        .comments()
        .list_for_post(post.id)
        .await
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author.username, "reader");
}

#[actix_rt::test]
async fn test_comment_from_deleted_account_is_not_found() {
    let blog = blog().await;
    let post = blog.post(true, hour_ago()).await;
    let ghost = blog
        .store
        .users()
        .insert(User::new("ghost".into(), "ghost@example.com".into(), "-".into()))
        .await
        .unwrap();
    let bearer = blog.bearer(&ghost);
    blog.store.users().delete(ghost.id).await.unwrap();
    let app = init_app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", post.id))
        .insert_header(bearer)
        .set_form([("text", "boo")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let comments = blog
        .store
        .comments()
        .list_for_post(post.id)
        .await
        .unwrap();
    assert!(comments.is_empty());
}

#[actix_rt::test]
async fn test_comment_on_hidden_post_is_not_found() {
    let blog = blog().await;
    let post = blog.post(false, hour_ago()).await;
    let app = init_app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", post.id))
        .insert_header(blog.bearer(&blog.reader))
        .set_form([("text", "Lovely")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_comment_edit_checks_post_and_author() {
    let blog = blog().await;
    let post = blog.post(true, hour_ago()).await;
    let other = blog.post(true, hour_ago()).await;
    let comment = blog.comment(&post, "Nice", Utc::now()).await;
    let app = init_app!(blog);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit_comment/{}/", other.id, comment.id))
        .insert_header(blog.bearer(&blog.reader))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let uri = format!("/posts/{}/edit_comment/{}/", post.id, comment.id);
    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .set_form([("text", "Edited by someone else")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .set_form([("text", "Very nice")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let stored = blog
        .store
        .comments()
        .find_by_id(comment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.text, "Very nice");
}

#[actix_rt::test]
async fn test_comment_delete_by_author() {
    let blog = blog().await;
    let post = blog.post(true, hour_ago()).await;
    let comment = blog.comment(&post, "Nice", Utc::now()).await;
    let app = init_app!(blog);
    let uri = format!("/posts/{}/delete_comment/{}/", post.id, comment.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .to_request();
    let confirm: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(confirm["data"]["text"], "Nice");

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(blog.bearer(&blog.reader))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    assert!(
        blog.store
            .comments()
            .find_by_id(comment.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[actix_rt::test]
async fn test_category_page() {
    let blog = blog().await;
    blog.post(true, hour_ago()).await;
    let mut hidden = Category::new("Drafts".into(), "".into(), "drafts".into());
    hidden.is_published = false;
    blog.store.categories().insert(hidden).await.unwrap();
    let app = init_app!(blog);

    let req = test::TestRequest::get().uri("/category/travel/").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["data"]["category"]["slug"], "travel");
    assert_eq!(page["data"]["page"]["total_items"], 1);

    for uri in ["/category/drafts/", "/category/missing/"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_rt::test]
async fn test_profile_page_shows_email_to_owner_only() {
    let blog = blog().await;
    blog.post(false, hour_ago()).await;
    let app = init_app!(blog);

    let req = test::TestRequest::get().uri("/profile/author/").to_request();
    let public: Value = test::call_and_read_body_json(&app, req).await;
    assert!(public["data"]["profile"].get("email").is_none());
    assert_eq!(public["data"]["page"]["total_items"], 0);

    let req = test::TestRequest::get()
        .uri("/profile/author/")
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let own: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(own["data"]["profile"]["email"], "author@example.com");
    assert_eq!(own["data"]["page"]["total_items"], 1);

    let req = test::TestRequest::get().uri("/profile/nobody/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_profile_edit() {
    let blog = blog().await;
    let app = init_app!(blog);
    let profile = |username: &str| {
        vec![
            ("first_name", "Ada".to_string()),
            ("last_name", "Lovelace".to_string()),
            ("username", username.to_string()),
            ("email", "ada@example.com".to_string()),
        ]
    };

    let req = test::TestRequest::post()
        .uri("/profile/")
        .insert_header(blog.bearer(&blog.author))
        .set_form(profile("reader"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["username"].is_array());

    let req = test::TestRequest::post()
        .uri("/profile/")
        .insert_header(blog.bearer(&blog.author))
        .set_form(profile("ada"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/ada/");

    let req = test::TestRequest::get()
        .uri("/profile/")
        .insert_header(blog.bearer(&blog.author))
        .to_request();
    let form: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(form["data"]["form"]["first_name"], "Ada");
}

#[actix_rt::test]
async fn test_registration_login_and_password_change() {
    let blog = blog().await;
    let app = init_app!(blog);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_form([
            ("username", "newcomer"),
            ("email", "new@example.com"),
            ("password", "correct horse"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_form([
            ("username", "newcomer"),
            ("email", "other@example.com"),
            ("password", "correct horse"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "newcomer"), ("password", "wrong password")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["__all__"].is_array());

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "newcomer"), ("password", "correct horse")])
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    let token = login["access_token"].as_str().unwrap().to_string();
    assert_eq!(login["token_type"], "Bearer");

    let req = test::TestRequest::get()
        .uri("/auth/me/")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["data"]["username"], "newcomer");

    let req = test::TestRequest::post()
        .uri("/auth/password_change/")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .set_form([("password1", "battery staple"), ("password2", "battery staple")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "newcomer"), ("password", "battery staple")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_health_reports_memory_storage() {
    let blog = blog().await;
    let app = init_app!(blog);

    let req = test::TestRequest::get().uri("/health").to_request();
    let health: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(health["status"], "ok");
    assert_eq!(health["storage"], "memory");
}
