use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info, instrument, warn};

use crate::config::NAME_COLUMN_LENGTH;
use crate::contract::context::RequestCtx;
use crate::contract::model::{DatePart, Event, EventPatch, Filters, NewEvent};
use crate::domain::error::DomainError;
use crate::domain::identity::require_timezone;
use crate::domain::repo::{EventChanges, EventDraft, EventsRepository, StoredEvent};
use crate::domain::timezone;

/// Configuration for the events service
#[derive(Debug, Clone)]
pub struct EventsServiceConfig {
    /// Upper bound for event names, in Unicode code points.
    pub max_name_length: usize,
}

impl Default for EventsServiceConfig {
    fn default() -> Self {
        Self {
            max_name_length: NAME_COLUMN_LENGTH,
        }
    }
}

/// Domain service for events: validation, calendar filters and timezone normalization.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct EventsService {
    repo: Arc<dyn EventsRepository>,
    config: EventsServiceConfig,
}

impl EventsService {
    pub fn new(repo: Arc<dyn EventsRepository>, config: EventsServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(
        name = "calendar.events.get_events",
        skip(self, ctx),
        fields(day = filters.day, month = filters.month, year = filters.year)
    )]
    pub async fn get_events(
        &self,
        ctx: &RequestCtx,
        filters: Filters,
    ) -> Result<Vec<Event>, DomainError> {
        debug!("Listing events");

        // Filter validation happens before any storage access.
        validate_filters(&filters)?;
        let zone = require_timezone(ctx)?;

        let rows = if filters.is_empty() {
            self.repo.list().await
        } else {
            self.repo.list_filtered(filters).await
        }
        .map_err(|e| DomainError::database(e.to_string()))?;

        warn_on_unresolvable_zone(zone);
        let events: Vec<Event> = rows.into_iter().map(|row| localize(row, zone)).collect();

        debug!("Successfully listed {} events", events.len());
        Ok(events)
    }

    #[instrument(name = "calendar.events.get_event", skip(self, ctx), fields(event_id = id))]
    pub async fn get_event(&self, ctx: &RequestCtx, id: i64) -> Result<Event, DomainError> {
        debug!("Getting event by id");
        let zone = require_timezone(ctx)?;

        let row = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::event_not_found(id))?;

        warn_on_unresolvable_zone(zone);
        Ok(localize(row, zone))
    }

    #[instrument(name = "calendar.events.add_event", skip(self, ctx, new_event))]
    pub async fn add_event(&self, ctx: &RequestCtx, new_event: NewEvent) -> Result<Event, DomainError> {
        info!("Adding new event");

        let (start_time, end_time) = match (new_event.start_time, new_event.end_time) {
            (Some(start), Some(end)) if !new_event.name.is_empty() => (start, end),
            _ => return Err(DomainError::invalid_post_request()),
        };
        self.validate_name_length(&new_event.name)?;

        let zone = require_timezone(ctx)?;
        let draft = EventDraft {
            name: new_event.name,
            start_time: timezone::to_utc(start_time, zone)?,
            end_time: timezone::to_utc(end_time, zone)?,
            description: new_event.description.filter(|d| !d.is_empty()),
            alert_time: timezone::opt_to_utc(new_event.alert_time, zone)?,
        };

        let stored = self
            .repo
            .insert(draft)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully added event with id={}", stored.id);
        Ok(localize(stored, zone))
    }

    #[instrument(name = "calendar.events.update_event", skip(self, ctx, patch), fields(event_id = id))]
    pub async fn update_event(
        &self,
        ctx: &RequestCtx,
        id: i64,
        patch: EventPatch,
    ) -> Result<Event, DomainError> {
        info!("Updating event");

        let name = patch.name.filter(|n| !n.is_empty());
        if let Some(ref name) = name {
            self.validate_name_length(name)?;
        }

        let zone = require_timezone(ctx)?;
        let changes = EventChanges {
            name,
            start_time: timezone::opt_to_utc(patch.start_time, zone)?,
            end_time: timezone::opt_to_utc(patch.end_time, zone)?,
            description: patch.description.filter(|d| !d.is_empty()),
            alert_time: timezone::opt_to_utc(patch.alert_time, zone)?,
        };

        let updated = self
            .repo
            .update(id, changes)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::event_not_found(id))?;

        info!("Successfully updated event");
        Ok(localize(updated, zone))
    }

    #[instrument(name = "calendar.events.delete_event", skip(self, _ctx), fields(event_id = id))]
    pub async fn delete_event(&self, _ctx: &RequestCtx, id: i64) -> Result<(), DomainError> {
        info!("Deleting event");

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        if !deleted {
            return Err(DomainError::event_not_found(id));
        }

        info!("Successfully deleted event");
        Ok(())
    }

    // --- validation helpers ---

    fn validate_name_length(&self, name: &str) -> Result<(), DomainError> {
        if name.chars().count() > self.config.max_name_length {
            return Err(DomainError::name_too_long(self.config.max_name_length));
        }
        Ok(())
    }
}

/// Check non-zero filter fields in day, month, year order; the first bad one wins.
pub fn validate_filters(filters: &Filters) -> Result<(), DomainError> {
    for (part, value) in filters.constrained_parts() {
        let valid = match part {
            DatePart::Day => (1..=31).contains(&value),
            DatePart::Month => (1..=12).contains(&value),
            DatePart::Year => value > 0,
        };
        if !valid {
            return Err(DomainError::invalid_filter(part.as_str()));
        }
    }
    Ok(())
}

fn warn_on_unresolvable_zone(zone: &str) {
    if let Err(e) = timezone::parse_zone(zone) {
        warn!(error = %e, "Returning UTC times for caller with unresolvable timezone");
    }
}

/// Express a stored row in the caller's zone; an unknown zone leaves times in UTC.
fn localize(row: StoredEvent, zone: &str) -> Event {
    let convert = |t: DateTime<Utc>| -> DateTime<FixedOffset> {
        timezone::to_user_time(t, zone).unwrap_or_else(|_| t.fixed_offset())
    };

    Event {
        id: row.id,
        name: row.name,
        start_time: convert(row.start_time),
        end_time: convert(row.end_time),
        description: row.description,
        alert_time: row.alert_time.map(convert),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    #[test]
    fn filter_ranges() {
        assert!(validate_filters(&Filters::default()).is_ok());
        assert!(validate_filters(&Filters::new(1, 1, 1)).is_ok());
        assert!(validate_filters(&Filters::new(31, 12, 2024)).is_ok());

        let cases = [
            (Filters::new(32, 0, 0), "invalid day value"),
            (Filters::new(-1, 0, 0), "invalid day value"),
            (Filters::new(0, 13, 0), "invalid month value"),
            (Filters::new(0, -3, 0), "invalid month value"),
            (Filters::new(0, 0, -2020), "invalid year value"),
            // day is checked before month
            (Filters::new(40, 40, 0), "invalid day value"),
        ];
        for (filters, message) in cases {
            let err = validate_filters(&filters).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadRequest);
            assert_eq!(err.to_string(), message, "{filters:?}");
        }
    }

    #[test]
    fn localize_falls_back_to_utc() {
        use chrono::TimeZone;
        let t = Utc.with_ymd_and_hms(2020, 5, 15, 10, 0, 0).unwrap();
        let row = StoredEvent {
            id: 1,
            name: "standup".into(),
            start_time: t,
            end_time: t,
            description: None,
            alert_time: None,
        };
        let event = localize(row, "Atlantis/Capital");
        assert_eq!(event.start_time.offset().local_minus_utc(), 0);
        assert_eq!(event.start_time, t);
    }
}
