pub mod api;
pub mod config;
pub mod edit;
pub mod error;
pub mod form;
pub mod http_client;
pub mod listing;
pub mod models;
pub mod store;

#[cfg(test)]
pub(crate) mod fake;

pub use api::PostsApi;
pub use config::ClientConfig;
pub use edit::{EditFailed, EditSession};
pub use error::{Operation, PostsClientError};
pub use form::{CreatePostForm, FormState};
pub use http_client::HttpClient;
pub use listing::{Confirm, DeleteOutcome, Listing, ListingView, PostItem};
pub use models::{Post, PostDraft};
pub use store::{PostStore, StoreEvent, StoreSnapshot};

/// Shared store talking HTTP to the configured remote service.
pub fn connect(config: &ClientConfig) -> PostStore {
    tracing::debug!("Using posts API at {}", config.api_base_url);
    PostStore::new(HttpClient::new(config))
}
