use thiserror::Error;

/// Failure talking to the backend API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API error {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected {resource} payload: {message}")]
    Decode {
        resource: &'static str,
        message: String,
    },

    #[error("Response is missing '{0}'")]
    MissingField(&'static str),
}

impl ApiError {
    /// HTTP status code, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The backend rejected the caller's session or credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
