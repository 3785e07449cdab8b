//! Shared post store.
//!
//! The store is the only place the client keeps posts. Views hold a cheap
//! clone of [`PostStore`] and render from [`PostStore::snapshot`]; changes
//! are announced through a broadcast channel of [`StoreEvent`]s.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::api::PostsApi;
use crate::error::Result;
use crate::models::{sort_by_recency, Post, PostDraft};

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A post was created; listeners should reload.
    PostsChanged,
    /// A refresh replaced the list.
    Reloaded { count: usize },
    /// A refresh failed; the list was left as it was.
    LoadFailed { message: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub posts: Vec<Post>,
    pub loading: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct StoreState {
    posts: Vec<Post>,
    last_error: Option<String>,
    issued: u64,
    applied: u64,
}

#[derive(Clone)]
pub struct PostStore {
    api: Arc<dyn PostsApi>,
    state: Arc<RwLock<StoreState>>,
    in_flight: Arc<AtomicUsize>,
    events: broadcast::Sender<StoreEvent>,
}

impl std::fmt::Debug for PostStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostStore")
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

/// Counts an outstanding refresh; released even if the refresh future is
/// dropped half way.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PostStore {
    pub fn new(api: impl PostsApi + 'static) -> Self {
        Self::from_arc(Arc::new(api))
    }

    pub fn from_arc(api: Arc<dyn PostsApi>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            state: Arc::new(RwLock::new(StoreState::default())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        StoreSnapshot {
            posts: state.posts.clone(),
            loading: self.is_loading(),
            last_error: state.last_error.clone(),
        }
    }

    pub async fn find(&self, id: i64) -> Option<Post> {
        self.state
            .read()
            .await
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Fetches the whole collection and replaces the list, newest first.
    ///
    /// Overlapping refreshes each take a ticket when they start; a response
    /// is applied only if no later-started refresh has been applied yet.
    /// That holds for failures too: a stale failure neither sets
    /// `last_error` nor broadcasts, and a stale success is not announced.
    pub async fn refresh(&self) -> Result<Vec<Post>> {
        let _guard = InFlight::enter(&self.in_flight);
        let ticket = {
            let mut state = self.state.write().await;
            state.issued += 1;
            state.issued
        };

        match self.api.list().await {
            Ok(mut posts) => {
                sort_by_recency(&mut posts);
                let mut state = self.state.write().await;
                let fresh = ticket > state.applied;
                if fresh {
                    state.applied = ticket;
                    state.posts = posts;
                    state.last_error = None;
                } else {
                    tracing::debug!("Discarding stale refresh #{}", ticket);
                }
                let current = state.posts.clone();
                drop(state);

                if fresh {
                    let _ = self.events.send(StoreEvent::Reloaded {
                        count: current.len(),
                    });
                }
                Ok(current)
            }
            Err(err) => {
                let message = err.to_string();
                let mut state = self.state.write().await;
                if ticket > state.applied {
                    // Неудача тоже исход: более старый успешный ответ её не затрёт
                    state.applied = ticket;
                    state.last_error = Some(message.clone());
                    drop(state);

                    tracing::warn!("Refresh failed: {}", message);
                    let _ = self.events.send(StoreEvent::LoadFailed { message });
                } else {
                    tracing::debug!("Discarding stale failed refresh #{}: {}", ticket, message);
                }
                Err(err)
            }
        }
    }

    /// Creates a post and tells listeners the collection changed.
    pub async fn create(&self, draft: &PostDraft) -> Result<Post> {
        let post = self.api.create(draft).await?;
        let _ = self.events.send(StoreEvent::PostsChanged);
        Ok(post)
    }

    pub async fn update(&self, id: i64, post: &Post) -> Result<Post> {
        self.api.update(id, post).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(id).await
    }
}
