//! Listing view controller.
//!
//! Renders the store's posts and keeps them fresh: while the view is open a
//! background task reloads the collection every time the store reports a
//! change. Closing the view (explicitly or by dropping it) aborts that task,
//! together with any reload it has in flight.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::edit::EditSession;
use crate::error::Result;
use crate::models::Post;
use crate::store::{PostStore, StoreEvent, StoreSnapshot};

pub const DELETE_PROMPT: &str = "Delete this post?";
pub const EMPTY_MESSAGE: &str = "No posts yet!";
pub const LOADING_MESSAGE: &str = "Loading...";

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

/// One rendered entry of the listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PostItem {
    pub id: i64,
    pub author: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created: String,
    pub modified: Option<String>,
}

impl From<&Post> for PostItem {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            author: post.author.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            created: format_timestamp(post.created_at),
            modified: post.visible_modified_at().map(format_timestamp),
        }
    }
}

/// What the listing shows at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub loading: bool,
    pub error: Option<String>,
    pub items: Vec<PostItem>,
}

impl Listing {
    /// Loading text while a fetch is outstanding; the empty-state text only
    /// once nothing is loading.
    pub fn status(&self) -> Option<&'static str> {
        if self.loading {
            Some(LOADING_MESSAGE)
        } else if self.items.is_empty() {
            Some(EMPTY_MESSAGE)
        } else {
            None
        }
    }
}

impl From<StoreSnapshot> for Listing {
    fn from(snapshot: StoreSnapshot) -> Self {
        Self {
            loading: snapshot.loading,
            error: snapshot.last_error,
            items: snapshot.posts.iter().map(PostItem::from).collect(),
        }
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub struct ListingView {
    store: PostStore,
    subscription: Option<JoinHandle<()>>,
}

impl ListingView {
    /// Opens the view and subscribes it to store changes. Must be called
    /// from within a tokio runtime.
    pub fn open(store: PostStore) -> Self {
        let mut events = store.subscribe();
        let listener = store.clone();

        let subscription = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(StoreEvent::PostsChanged) | Err(RecvError::Lagged(_)) => {
                        if let Err(err) = listener.refresh().await {
                            tracing::debug!("Listing reload failed: {}", err);
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self {
            store,
            subscription: Some(subscription),
        }
    }

    pub fn is_open(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub async fn refresh(&self) -> Result<Vec<Post>> {
        self.store.refresh().await
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot().await
    }

    pub async fn items(&self) -> Vec<PostItem> {
        self.render().await.items
    }

    pub async fn render(&self) -> Listing {
        Listing::from(self.store.snapshot().await)
    }

    /// Deletes after the user confirms, then reloads. A failed delete leaves
    /// the displayed list untouched.
    pub async fn delete(&self, id: i64, confirm: &impl Confirm) -> Result<DeleteOutcome> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(DeleteOutcome::Declined);
        }

        if let Err(err) = self.store.delete(id).await {
            tracing::warn!("Delete of post {} failed: {}", id, err);
            return Err(err);
        }

        if let Err(err) = self.refresh().await {
            tracing::warn!("Reload after delete failed: {}", err);
        }
        Ok(DeleteOutcome::Deleted)
    }

    /// Edit affordance for a listed post; `None` if it is not in the list.
    pub async fn begin_edit(&self, id: i64) -> Option<EditSession> {
        let post = self.store.find(id).await?;
        Some(EditSession::open(self.store.clone(), post))
    }

    pub fn close(mut self) {
        self.unsubscribe();
    }

    fn unsubscribe(&mut self) {
        if let Some(handle) = self.subscription.take() {
            handle.abort();
        }
    }
}

impl Drop for ListingView {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
