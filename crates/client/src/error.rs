//! Client error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors from the persisted key-value storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not a JSON object: {0}")]
    Format(#[from] serde_json::Error),
}

/// Errors from the backend HTTP API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("login response did not contain a token")]
    MissingToken,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// True when the backend rejected the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}

/// Errors raised while turning a menu tree into routes.
///
/// A batch that produces any of these is rejected as a whole.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("duplicate route name '{0}'")]
    DuplicateName(String),

    #[error("duplicate route path '{path}' (route '{name}')")]
    DuplicatePath { name: String, path: String },

    #[error("menu leaf '{0}' is missing its {1}")]
    IncompleteLeaf(String, &'static str),

    #[error("menu leaf '{name}' has unresolvable component '{component}'")]
    UnresolvedComponent { name: String, component: String },

    #[error("menu tree nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Errors that stop a navigation.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    NotFound(String),

    #[error("navigation redirected more than {0} times")]
    RedirectLoop(usize),

    #[error("session identity changed while the menu was loading")]
    Interrupted,

    #[error("backend request failed: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type alias for navigation.
pub type NavResult<T> = Result<T, NavigationError>;
