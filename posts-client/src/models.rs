use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{PostsClientError, Result};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Author and content are required.";

// ==================== Модели постов ====================

/// A post as stored by the remote service. `id`, `created_at` and
/// `modified_at` are assigned there and never touched by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Post {
    /// The modification time worth showing: present and not equal to the
    /// creation time.
    pub fn visible_modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at.filter(|m| *m != self.created_at)
    }

    /// Newest first; equal timestamps fall back to the larger id.
    pub fn recency_cmp(a: &Post, b: &Post) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }
}

pub fn sort_by_recency(posts: &mut [Post]) {
    posts.sort_by(Post::recency_cmp);
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub author: String,
    pub content: String,
    pub image_url: Option<String>,
}

impl PostDraft {
    /// Trims raw input and rejects blank author or content.
    pub fn from_input(author: &str, content: &str, image_url: &str) -> Result<Self> {
        let author = author.trim();
        let content = content.trim();
        if author.is_empty() || content.is_empty() {
            return Err(PostsClientError::Validation(
                REQUIRED_FIELDS_MESSAGE.to_string(),
            ));
        }

        Ok(Self {
            author: author.to_string(),
            content: content.to_string(),
            image_url: normalize_image_url(image_url),
        })
    }

    /// Applies the draft on top of an existing record, keeping every
    /// server-owned field.
    pub fn merge_into(self, post: &Post) -> Post {
        Post {
            author: self.author,
            content: self.content,
            image_url: self.image_url,
            ..post.clone()
        }
    }
}

pub fn normalize_image_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
