use crate::contract::context::RequestCtx;
use crate::domain::error::DomainError;

/// Caller's login, required by ownership checks.
///
/// A missing value means the authentication step never ran, which is a wiring
/// defect rather than a client error.
pub fn require_login(ctx: &RequestCtx) -> Result<&str, DomainError> {
    ctx.login().ok_or_else(|| DomainError::missing_identity("login"))
}

/// Caller's timezone, required by every event time conversion.
pub fn require_timezone(ctx: &RequestCtx) -> Result<&str, DomainError> {
    ctx.timezone()
        .ok_or_else(|| DomainError::missing_identity("timezone"))
}
