//! Error types.

use crate::types::TradeOfferId;
use reqwest::StatusCode;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error that can occur within the crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid parameter: {}", .0)]
    Parameter(#[from] ParameterError),
    #[error("Login failed: {}", .0)]
    Login(#[from] LoginError),
    #[error("Confirmation error: {}", .0)]
    Confirmation(#[from] ConfirmationError),
    #[error("Invalid secret: {}", .0)]
    InvalidSecret(String),
    #[error("We are being rate limited, try again soon")]
    TooManyRequests,
    #[error("Forbidden: {}", .0)]
    Forbidden(String),
    #[error("Not found: {}", .0)]
    NotFound(String),
    #[error("Error {status}: {message}")]
    Http {
        status: StatusCode,
        message: String,
    },
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Unexpected response: {}", .0)]
    Response(String),
    #[error("Request error: {}", .0)]
    Reqwest(#[from] reqwest::Error),
    #[error("Request middleware error: {}", .0)]
    ReqwestMiddleware(anyhow::Error),
    #[error("Error parsing response: {}", .0)]
    Parse(#[from] serde_json::Error),
    #[error("RSA error: {}", .0)]
    Rsa(#[from] rsa::Error),
}

impl Error {
    /// The connection dropped or could not be made. Retrying the same request may succeed.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::Reqwest(error) => {
                error.is_connect() ||
                error.is_timeout() ||
                error.is_request() ||
                error.is_body()
            },
            _ => false,
        }
    }

    /// Steam no longer recognizes our session and a new login is needed.
    pub fn is_session_expired(&self) -> bool {
        match self {
            Self::NotLoggedIn => true,
            Self::Http { status, .. } => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }

    /// The HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::TooManyRequests => Some(StatusCode::TOO_MANY_REQUESTS),
            Self::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Http { status, .. } => Some(*status),
            Self::Reqwest(error) => error.status(),
            _ => None,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(error: reqwest_middleware::Error) -> Error {
        match error {
            reqwest_middleware::Error::Reqwest(e) => Error::Reqwest(e),
            reqwest_middleware::Error::Middleware(e) => Error::ReqwestMiddleware(e),
        }
    }
}

/// An invalid or missing parameter.
#[derive(thiserror::Error, Debug)]
pub enum ParameterError {
    #[error("An API key is required for this request")]
    MissingApiKey,
    #[error("Request could not be cloned for retrying")]
    UncloneableRequest,
}

/// A failure while negotiating a session.
#[derive(thiserror::Error, Debug)]
pub enum LoginError {
    #[error("Invalid credentials: {}", .0)]
    InvalidCredentials(String),
    #[error("A captcha code is required, please try again later")]
    CaptchaRequired,
    #[error("Could not obtain RSA key after {attempts} attempts")]
    KeyFetch {
        attempts: u32,
    },
    #[error("Cannot perform redirects after login: {}", .0)]
    Redirect(&'static str),
    #[error("No session ID was found on the home page")]
    MissingSessionId,
    #[error("Steam Guard code was rejected {attempts} times")]
    TwoFactorRejected {
        attempts: u32,
    },
    #[error("Failed to read Steam Guard code: {}", .0)]
    Prompt(#[from] std::io::Error),
}

/// A failure involving mobile confirmations.
#[derive(thiserror::Error, Debug)]
pub enum ConfirmationError {
    #[error("No confirmation for offer {}", .0)]
    NotFound(TradeOfferId),
    #[error("An identity secret is required for mobile confirmations")]
    MissingIdentitySecret,
    #[error("Offer {} requires mobile confirmation but no identity secret is configured", .0)]
    Unavailable(TradeOfferId),
    #[error("Failed to confirm offer {tradeofferid} after {attempts} attempts: {reason}")]
    Failed {
        tradeofferid: TradeOfferId,
        attempts: u32,
        reason: String,
    },
    #[error("Confirmation unsuccessful: {}", .0.as_deref().unwrap_or("no message"))]
    Unsuccessful(Option<String>),
}
