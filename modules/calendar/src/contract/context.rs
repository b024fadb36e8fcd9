/// Per-request caller identity.
///
/// Produced once by the authentication step and read-only afterwards. A field
/// that was never resolved is `None`, which is distinct from an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCtx {
    login: Option<String>,
    timezone: Option<String>,
}

impl RequestCtx {
    /// Context for an authenticated caller.
    pub fn new(login: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            login: Some(login.into()),
            timezone: Some(timezone.into()),
        }
    }

    /// Context carrying no identity (e.g. self-registration).
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }
}
