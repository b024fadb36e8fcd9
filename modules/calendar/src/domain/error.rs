use thiserror::Error;

use crate::domain::timezone::TimezoneError;

/// Classification of a domain failure, independent of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Unauthenticated,
    Unauthorized,
    Unexpected,
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("incorrect credentials")]
    Unauthenticated,

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("unexpected error: {message}")]
    Unexpected { message: String },
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// A calendar filter field is outside its legal range.
    pub fn invalid_filter(field: &str) -> Self {
        Self::bad_request(format!("invalid {field} value"))
    }

    pub fn invalid_post_request() -> Self {
        Self::bad_request("invalid post request")
    }

    pub fn name_too_long(max: usize) -> Self {
        Self::bad_request(format!("length should be less than {max} characters"))
    }

    pub fn password_too_short(min: usize) -> Self {
        Self::bad_request(format!("password should be at least {min} characters"))
    }

    pub fn invalid_login_length(min: usize, max: usize) -> Self {
        Self::bad_request(format!(
            "login should be at least {min} and contain up to {max} characters"
        ))
    }

    pub fn invalid_timezone(name: &str) -> Self {
        Self::bad_request(format!("invalid timezone '{name}'"))
    }

    pub fn login_taken() -> Self {
        Self::bad_request("login already taken")
    }

    pub fn event_not_found(id: i64) -> Self {
        Self::NotFound { entity: "event", id }
    }

    pub fn user_not_found(id: i64) -> Self {
        Self::NotFound { entity: "user", id }
    }

    pub fn incorrect_credentials() -> Self {
        Self::Unauthenticated
    }

    pub fn foreign_account() -> Self {
        Self::Unauthorized {
            message: "cannot modify another user's account".to_string(),
        }
    }

    /// The identity context lacks a value the authentication step should have set.
    pub fn missing_identity(field: &str) -> Self {
        Self::unexpected(format!("failed to fetch {field} from context"))
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::unexpected(format!("database error: {}", message.into()))
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }
}

impl From<TimezoneError> for DomainError {
    fn from(e: TimezoneError) -> Self {
        match e {
            // Zones come from stored user data, so an unknown one is an internal inconsistency.
            TimezoneError::InvalidZone(_) => Self::unexpected(e.to_string()),
            TimezoneError::NonexistentLocalTime { .. } => Self::bad_request(e.to_string()),
        }
    }
}
