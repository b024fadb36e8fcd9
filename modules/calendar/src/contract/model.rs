use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};

/// Calendar entry as seen by a caller: all times are expressed in the caller's timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub description: Option<String>,
    pub alert_time: Option<DateTime<FixedOffset>>,
}

/// Data for creating an event.
///
/// Times are wall-clock values in the caller's own timezone. `None` stands for
/// an absent value; `start_time` and `end_time` are required by the service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewEvent {
    pub name: String,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub alert_time: Option<NaiveDateTime>,
}

/// Partial update data for an event. `None` and empty strings leave the stored value unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub alert_time: Option<NaiveDateTime>,
}

/// Calendar filters over an event's UTC start time. Zero means "unconstrained".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Filters {
    pub day: i32,
    pub month: i32,
    pub year: i32,
}

impl Filters {
    pub fn new(day: i32, month: i32, year: i32) -> Self {
        Self { day, month, year }
    }

    /// True when no field constrains the query.
    pub fn is_empty(&self) -> bool {
        self.day == 0 && self.month == 0 && self.year == 0
    }

    /// Non-zero fields as `(part, value)` pairs, in day/month/year order.
    pub fn constrained_parts(&self) -> impl Iterator<Item = (DatePart, i32)> {
        [
            (DatePart::Day, self.day),
            (DatePart::Month, self.month),
            (DatePart::Year, self.year),
        ]
        .into_iter()
        .filter(|(_, value)| *value != 0)
    }

    /// Whether a UTC instant satisfies every non-zero field.
    pub fn matches(&self, t: &DateTime<Utc>) -> bool {
        self.constrained_parts().all(|(part, value)| match part {
            DatePart::Day => t.day() as i32 == value,
            DatePart::Month => t.month() as i32 == value,
            DatePart::Year => t.year() == value,
        })
    }
}

/// Calendar component a filter field constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Day,
    Month,
    Year,
}

impl DatePart {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatePart::Day => "day",
            DatePart::Month => "month",
            DatePart::Year => "year",
        }
    }
}

/// Public user model. The password hash never leaves the domain layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub timezone: String,
}

/// Data for registering a new user.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub login: String,
    pub password: String,
    pub timezone: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("timezone", &self.timezone)
            .finish()
    }
}

/// Partial update data for a user. `None` and empty strings leave the stored value unchanged.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub login: Option<String>,
    pub password: Option<String>,
    pub timezone: Option<String>,
}

impl std::fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPatch")
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timezone", &self.timezone)
            .finish()
    }
}
