//! Error types shared by the API client, the session store and the screens.
//!
//! Nothing here is retried or recovered: every error travels back to the
//! command that started the request, which shows it and leaves the screen as
//! it was.

use thiserror::Error;

/// Failure of a single call against the rental API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network unreachable, connection reset, bad URL.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status, with the `{error}` (or `{msg}`) text when the body carried one.
    #[error("server responded with {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Http { status: u16, message: Option<String> },

    /// 2xx status but the body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Message the server attached to an error response, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text for an alert: the server message, or `fallback` when there is none.
    pub fn alert_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    /// 401 from the backend: the stored token is missing, expired or revoked.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Failure of the local key-value store that mirrors the session.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage failure: {0}")]
    Sled(#[from] sled::Error),

    #[error("could not encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure of a login or registration attempt.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The backend accepted the credentials but the account may not use this app.
    #[error("account role '{role}' is not allowed in the {app}")]
    NotAuthorizedRole { role: String, app: &'static str },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    pub fn alert_message(&self, fallback: &str) -> String {
        match self {
            AuthError::Api(e) => e.alert_message(fallback),
            AuthError::NotAuthorizedRole { .. } => self.to_string(),
            AuthError::Storage(e) => e.to_string(),
        }
    }
}

/// A draft failed its required-field checks before submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} form is incomplete: {}", .problems.join("; "))]
pub struct ValidationError {
    pub entity: &'static str,
    pub problems: Vec<String>,
}

/// Failure of a list/modal screen action.
#[derive(Debug, Error)]
pub enum CrudError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("no form is open")]
    NoOpenForm,
}

/// Top-level error of the console binaries.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Crud(#[from] CrudError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The guard redirected to the login view.
    #[error("login required to open {}", .return_url.as_deref().unwrap_or("this view"))]
    LoginRequired { return_url: Option<String> },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
