//! In-memory stand-in for the remote posts service.
//!
//! Serves `GET/POST /api/posts` and `PUT/DELETE /api/posts/{id}` with the
//! same JSON shape the client expects. Ids come from a counter; the server
//! stamps `createdAt` on create and `modifiedAt` on update.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub author: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Create and update bodies. Extra fields (a full record on update) are
/// ignored; server-owned fields are never taken from the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct Db {
    posts: BTreeMap<i64, Post>,
    last_id: i64,
}

pub type SharedDb = Arc<RwLock<Db>>;

enum ApiError {
    NotFound,
    Invalid(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Post not found"),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub fn app() -> Router {
    app_with(SharedDb::default())
}

pub fn app_with(db: SharedDb) -> Router {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/{id}", put(update_post).delete(delete_post))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn validate(input: &PostInput) -> Result<(), ApiError> {
    if input.author.trim().is_empty() || input.content.trim().is_empty() {
        return Err(ApiError::Invalid("author and content are required"));
    }
    Ok(())
}

async fn list_posts(State(db): State<SharedDb>) -> Json<Vec<Post>> {
    let db = db.read().await;
    Json(db.posts.values().cloned().collect())
}

async fn create_post(
    State(db): State<SharedDb>,
    Json(input): Json<PostInput>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    validate(&input)?;

    let mut db = db.write().await;
    db.last_id += 1;
    let post = Post {
        id: db.last_id,
        author: input.author,
        content: input.content,
        image_url: input.image_url,
        created_at: Utc::now(),
        modified_at: None,
    };
    db.posts.insert(post.id, post.clone());

    tracing::info!("Post created: id={}", post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
    Json(input): Json<PostInput>,
) -> Result<Json<Post>, ApiError> {
    validate(&input)?;

    let mut db = db.write().await;
    let post = db.posts.get_mut(&id).ok_or(ApiError::NotFound)?;
    post.author = input.author;
    post.content = input.content;
    post.image_url = input.image_url;
    post.modified_at = Some(Utc::now());

    tracing::info!("Post updated: id={}", id);
    Ok(Json(post.clone()))
}

async fn delete_post(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let mut db = db.write().await;
    db.posts
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_serializes_camel_case() {
        let post = Post {
            id: 1,
            author: "Ann".into(),
            content: "Hi".into(),
            image_url: None,
            created_at: Utc::now(),
            modified_at: None,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["id"], 1);
        assert!(json.get("createdAt").is_some());
        assert!(json["imageUrl"].is_null());
        assert!(json["modifiedAt"].is_null());
    }

    #[test]
    fn input_ignores_server_owned_fields() {
        let input: PostInput = serde_json::from_str(
            r#"{"id":5,"author":"Ann","content":"Hi","imageUrl":null,"createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(input.author, "Ann");
        assert!(input.image_url.is_none());
    }

    #[test]
    fn blank_input_is_invalid() {
        let input = PostInput {
            author: " ".into(),
            content: "Hi".into(),
            image_url: None,
        };
        assert!(validate(&input).is_err());
    }
}
