use std::fmt;
use thiserror::Error;

/// Remote operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::List => "Failed to load posts",
            Operation::Create => "Failed to create post",
            Operation::Update => "Failed to update post",
            Operation::Delete => "Failed to delete post",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum PostsClientError {
    // Проверка ввода на клиенте, до сети не доходит
    #[error("{0}")]
    Validation(String),

    // Ответ сервера не 2xx
    #[error("{operation} (HTTP {status})")]
    Status {
        operation: Operation,
        status: u16,
        body: String,
    },

    #[error("{operation}: post not found")]
    NotFound { operation: Operation },

    // Соединение, таймаут подключения, разбор тела ответа
    #[error("{operation}: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PostsClientError {
    pub fn transport(operation: Operation) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| PostsClientError::Transport { operation, source }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PostsClientError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PostsClientError::NotFound { .. })
    }

    /// Anything that went wrong on the way to or from the remote service.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            PostsClientError::Status { .. }
                | PostsClientError::NotFound { .. }
                | PostsClientError::Transport { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PostsClientError>;
