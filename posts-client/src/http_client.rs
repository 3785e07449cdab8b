use crate::api::PostsApi;
use crate::config::ClientConfig;
use crate::error::{Operation, PostsClientError, Result};
use crate::models::{Post, PostDraft};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// reqwest-backed [`PostsApi`] talking to `{api_base_url}` and
/// `{api_base_url}/{id}`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Self {
        // Только таймаут подключения: сами запросы ждут столько, сколько
        // решит транспорт
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post_url(&self, id: i64) -> String {
        format!("{}/{}", self.base_url, id)
    }

    async fn check_status(operation: Operation, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        tracing::warn!("{}: server answered {}", operation, status);

        match status {
            StatusCode::NOT_FOUND => Err(PostsClientError::NotFound { operation }),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(PostsClientError::Status {
                    operation,
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl PostsApi for HttpClient {
    async fn list(&self) -> Result<Vec<Post>> {
        let op = Operation::List;
        tracing::debug!("GET {}", self.base_url);

        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(PostsClientError::transport(op))?;

        Self::check_status(op, response)
            .await?
            .json::<Vec<Post>>()
            .await
            .map_err(PostsClientError::transport(op))
    }

    async fn create(&self, draft: &PostDraft) -> Result<Post> {
        let op = Operation::Create;
        tracing::debug!("POST {} author={}", self.base_url, draft.author);

        let response = self
            .client
            .post(&self.base_url)
            .json(draft)
            .send()
            .await
            .map_err(PostsClientError::transport(op))?;

        let post = Self::check_status(op, response)
            .await?
            .json::<Post>()
            .await
            .map_err(PostsClientError::transport(op))?;

        tracing::info!("Post created: id={}", post.id);
        Ok(post)
    }

    async fn update(&self, id: i64, post: &Post) -> Result<Post> {
        let op = Operation::Update;
        let url = self.post_url(id);
        tracing::debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .json(post)
            .send()
            .await
            .map_err(PostsClientError::transport(op))?;

        let updated = Self::check_status(op, response)
            .await?
            .json::<Post>()
            .await
            .map_err(PostsClientError::transport(op))?;

        tracing::info!("Post updated: id={}", updated.id);
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let op = Operation::Delete;
        let url = self.post_url(id);
        tracing::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(PostsClientError::transport(op))?;

        // Тело ответа не интересует, достаточно 2xx
        Self::check_status(op, response).await?;

        tracing::info!("Post deleted: id={}", id);
        Ok(())
    }
}
