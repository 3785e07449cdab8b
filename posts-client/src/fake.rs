//! In-memory [`PostsApi`] for unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::api::PostsApi;
use crate::error::{Operation, PostsClientError, Result};
use crate::models::{Post, PostDraft};

#[derive(Default)]
pub struct FakeApi {
    posts: Mutex<Vec<Post>>,
    next_id: Mutex<i64>,
    failing: Mutex<Vec<Operation>>,
    list_delays: Mutex<VecDeque<(Duration, bool)>>,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: Vec<Post>) -> Self {
        let next = posts.iter().map(|p| p.id).max().unwrap_or(0);
        let api = Self::new();
        *api.posts.lock().unwrap() = posts;
        *api.next_id.lock().unwrap() = next;
        api
    }

    pub fn insert(&self, author: &str, content: &str) -> Post {
        let draft = PostDraft::from_input(author, content, "").unwrap();
        self.store_draft(&draft)
    }

    pub fn fail(&self, operation: Operation) {
        self.failing.lock().unwrap().push(operation);
    }

    pub fn recover(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn delay_next_list(&self, delay: Duration) {
        self.list_delays.lock().unwrap().push_back((delay, false));
    }

    /// The next `list` sleeps for `delay` and then fails.
    pub fn fail_next_list_after(&self, delay: Duration) {
        self.list_delays.lock().unwrap().push_back((delay, true));
    }

    pub fn network_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.create_calls.load(Ordering::SeqCst)
            + self.update_calls.load(Ordering::SeqCst)
            + self.delete_calls.load(Ordering::SeqCst)
    }

    fn check(&self, operation: Operation) -> Result<()> {
        if self.failing.lock().unwrap().contains(&operation) {
            return Err(PostsClientError::Status {
                operation,
                status: 500,
                body: "fake failure".to_string(),
            });
        }
        Ok(())
    }

    fn store_draft(&self, draft: &PostDraft) -> Post {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let post = Post {
            id,
            author: draft.author.clone(),
            content: draft.content.clone(),
            image_url: draft.image_url.clone(),
            created_at: at(id * 60),
            modified_at: None,
        };
        self.posts.lock().unwrap().push(post.clone());
        post
    }
}

#[async_trait]
impl PostsApi for FakeApi {
    async fn list(&self) -> Result<Vec<Post>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::List)?;
        let posts = self.posts.lock().unwrap().clone();
        let delay = self.list_delays.lock().unwrap().pop_front();
        if let Some((delay, fails)) = delay {
            tokio::time::sleep(delay).await;
            if fails {
                return Err(PostsClientError::Status {
                    operation: Operation::List,
                    status: 500,
                    body: "fake failure".to_string(),
                });
            }
        }
        Ok(posts)
    }

    async fn create(&self, draft: &PostDraft) -> Result<Post> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::Create)?;
        Ok(self.store_draft(draft))
    }

    async fn update(&self, id: i64, post: &Post) -> Result<Post> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::Update)?;
        let mut posts = self.posts.lock().unwrap();
        let existing = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PostsClientError::NotFound {
                operation: Operation::Update,
            })?;
        existing.author = post.author.clone();
        existing.content = post.content.clone();
        existing.image_url = post.image_url.clone();
        existing.modified_at = Some(existing.created_at + ChronoDuration::minutes(5));
        Ok(existing.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::Delete)?;
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(PostsClientError::NotFound {
                operation: Operation::Delete,
            });
        }
        Ok(())
    }
}
