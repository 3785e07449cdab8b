use crate::error::Result;
use crate::models::{Post, PostDraft};
use crate::store::PostStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
}

/// Creation form: raw field text plus submit state.
///
/// `submit` takes `&mut self`, so one form cannot have two submissions in
/// flight.
pub struct CreatePostForm {
    store: PostStore,
    pub author: String,
    pub content: String,
    pub image_url: String,
    state: FormState,
    error: Option<String>,
}

impl CreatePostForm {
    pub fn new(store: PostStore) -> Self {
        Self {
            store,
            author: String::new(),
            content: String::new(),
            image_url: String::new(),
            state: FormState::Idle,
            error: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.state == FormState::Submitting
    }

    /// Validates, sends the post and on success clears the fields. The store
    /// announces the change to every listening view.
    ///
    /// Errors are returned and also kept in [`CreatePostForm::error`] for
    /// display; fields are left as typed.
    pub async fn submit(&mut self) -> Result<Post> {
        self.error = None;

        let draft = match PostDraft::from_input(&self.author, &self.content, &self.image_url) {
            Ok(draft) => draft,
            Err(err) => {
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        self.state = FormState::Submitting;
        let result = self.store.create(&draft).await;
        self.state = FormState::Idle;

        match result {
            Ok(post) => {
                self.author.clear();
                self.content.clear();
                self.image_url.clear();
                Ok(post)
            }
            Err(err) => {
                tracing::warn!("Create failed: {}", err);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
