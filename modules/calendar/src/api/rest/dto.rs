use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{Event, EventPatch, Filters, NewEvent, NewUser, User, UserPatch};

/// REST DTO for event representation; times carry the caller's UTC offset
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: i64,
    pub name: String,
    #[schema(value_type = String, format = DateTime)]
    pub start_time: DateTime<FixedOffset>,
    #[schema(value_type = String, format = DateTime)]
    pub end_time: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub alert_time: Option<DateTime<FixedOffset>>,
}

/// REST DTO for creating an event. Times are read as wall-clock values in the caller's zone.
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventReq {
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "wall_clock")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub start_time: Option<chrono::NaiveDateTime>,
    #[serde(default, with = "wall_clock")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end_time: Option<chrono::NaiveDateTime>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "wall_clock")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub alert_time: Option<chrono::NaiveDateTime>,
}

/// REST DTO for updating an event (partial)
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventReq {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "wall_clock")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub start_time: Option<chrono::NaiveDateTime>,
    #[serde(default, with = "wall_clock")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end_time: Option<chrono::NaiveDateTime>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "wall_clock")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub alert_time: Option<chrono::NaiveDateTime>,
}

/// REST DTO for calendar query parameters; a missing or zero value does not constrain
#[derive(Debug, Clone, Copy, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct EventFiltersQuery {
    pub day: Option<i32>,
    pub month: Option<i32>,
    pub year: Option<i32>,
}

/// REST DTO for user representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i64,
    pub login: String,
    pub timezone: String,
}

/// REST DTO for registering a user
#[derive(Clone, Deserialize, ToSchema)]
pub struct CreateUserReq {
    pub login: String,
    pub password: String,
    pub timezone: String,
}

/// REST DTO for updating a user (partial)
#[derive(Clone, Deserialize, ToSchema, Default)]
pub struct UpdateUserReq {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl std::fmt::Debug for CreateUserReq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserReq")
            .field("login", &self.login)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for UpdateUserReq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUserReq")
            .field("login", &self.login)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

/// Accepts RFC 3339 (offset discarded) or a bare `YYYY-MM-DDTHH:MM:SS[.fff]`.
mod wall_clock {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(s, NAIVE_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid time '{s}': {e}"))),
        }
    }
}

// Conversion implementations between REST DTOs and contract models

impl From<Event> for EventDto {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            name: e.name,
            start_time: e.start_time,
            end_time: e.end_time,
            description: e.description,
            alert_time: e.alert_time,
        }
    }
}

impl From<CreateEventReq> for NewEvent {
    fn from(req: CreateEventReq) -> Self {
        Self {
            name: req.name,
            start_time: req.start_time,
            end_time: req.end_time,
            description: req.description,
            alert_time: req.alert_time,
        }
    }
}

impl From<UpdateEventReq> for EventPatch {
    fn from(req: UpdateEventReq) -> Self {
        Self {
            name: req.name,
            start_time: req.start_time,
            end_time: req.end_time,
            description: req.description,
            alert_time: req.alert_time,
        }
    }
}

impl From<EventFiltersQuery> for Filters {
    fn from(q: EventFiltersQuery) -> Self {
        Filters::new(
            q.day.unwrap_or(0),
            q.month.unwrap_or(0),
            q.year.unwrap_or(0),
        )
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            timezone: user.timezone,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            login: req.login,
            password: req.password,
            timezone: req.timezone,
        }
    }
}

impl From<UpdateUserReq> for UserPatch {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            login: req.login,
            password: req.password,
            timezone: req.timezone,
        }
    }
}
