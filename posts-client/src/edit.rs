use thiserror::Error;

use crate::error::PostsClientError;
use crate::models::{Post, PostDraft};
use crate::store::PostStore;

/// An open edit of exactly one post.
///
/// The session is consumed when it closes: a successful [`submit`] or a
/// [`cancel`]. A failed submit hands the session back inside
/// [`EditFailed`] so the user can fix the input and retry.
///
/// [`submit`]: EditSession::submit
/// [`cancel`]: EditSession::cancel
#[derive(Debug)]
pub struct EditSession {
    store: PostStore,
    original: Post,
    pub author: String,
    pub content: String,
    pub image_url: String,
    error: Option<String>,
}

#[derive(Debug, Error)]
#[error("{error}")]
pub struct EditFailed {
    pub session: EditSession,
    #[source]
    pub error: PostsClientError,
}

impl EditSession {
    pub fn open(store: PostStore, post: Post) -> Self {
        Self {
            store,
            author: post.author.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone().unwrap_or_default(),
            original: post,
            error: None,
        }
    }

    pub fn post_id(&self) -> i64 {
        self.original.id
    }

    pub fn original(&self) -> &Post {
        &self.original
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sends the original record with the edited fields merged in, then
    /// reloads the collection. Closes the session only on success.
    pub async fn submit(mut self) -> Result<Post, EditFailed> {
        self.error = None;

        let draft = match PostDraft::from_input(&self.author, &self.content, &self.image_url) {
            Ok(draft) => draft,
            Err(error) => return Err(self.fail(error)),
        };

        let merged = draft.merge_into(&self.original);
        let updated = match self.store.update(self.original.id, &merged).await {
            Ok(updated) => updated,
            Err(error) => {
                tracing::warn!("Update of post {} failed: {}", self.original.id, error);
                return Err(self.fail(error));
            }
        };

        if let Err(err) = self.store.refresh().await {
            tracing::warn!("Reload after update failed: {}", err);
        }
        Ok(updated)
    }

    /// Discards the edits without touching the network.
    pub fn cancel(self) -> Post {
        self.original
    }

    fn fail(mut self, error: PostsClientError) -> EditFailed {
        self.error = Some(error.to_string());
        EditFailed {
            session: self,
            error,
        }
    }
}
