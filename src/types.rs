// Error taxonomy shared by the HTTP client, services and views

/// How a failed call surfaced to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The backend answered with an error status.
    Response,
    /// The request went out but no response came back.
    NoResponse,
    /// The request was never sent.
    Client,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The backend rejected the session token; the session has already been cleared.
    #[error("Session rejected by the server")]
    Unauthorized,

    /// No local profile, the user never logged in on this device.
    #[error("Not logged in")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User already registered")]
    DuplicateUser,

    #[error("Payment error: {0}")]
    Payment(String),

    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },

    #[error("Request timed out")]
    Timeout,

    #[error("Connection error: {0}")]
    Connectivity(String),

    #[error("Request error: {0}")]
    Client(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Session(String),
}

impl AppError {
    /// HTTP status behind the error, when the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            AppError::Unauthorized | AppError::InvalidCredentials => Some(401),
            AppError::Validation(_) => Some(400),
            AppError::NotFound(_) => Some(404),
            AppError::DuplicateUser => Some(409),
            _ => None,
        }
    }

    /// Server-provided message, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::Http { message, .. } => message.as_deref(),
            AppError::Payment(message) | AppError::NotFound(message) => Some(message),
            AppError::Validation(message) => Some(message),
            _ => None,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            AppError::Timeout | AppError::Connectivity(_) => FailureKind::NoResponse,
            AppError::Client(_) | AppError::Session(_) | AppError::Unauthenticated => {
                FailureKind::Client
            }
            _ => FailureKind::Response,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Remaps a raw HTTP status into a domain variant for one operation.
    ///
    /// `f` receives the status and the server message and returns `None` to keep
    /// the error as is.
    pub fn remap<F>(self, f: F) -> Self
    where
        F: FnOnce(u16, Option<String>) -> Option<AppError>,
    {
        match self {
            AppError::Http { status, message } => {
                let fallback = message.clone();
                f(status, message).unwrap_or(AppError::Http {
                    status,
                    message: fallback,
                })
            }
            other => other,
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
