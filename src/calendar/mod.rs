//! Calendar adapter.
//!
//! The MCP dispatcher talks to the calendar only through the
//! [`CalendarService`] trait. [`GoogleCalendarClient`] implements it against
//! the Google Calendar v3 REST API; tests substitute a recording fake.
//!
//! All event operations take an optional calendar identifier. `None` selects
//! the calendar the adapter was configured with.

mod error;
pub mod google;
pub mod time;

pub use error::{CalendarError, CalendarResult};
pub use google::GoogleCalendarClient;

use async_trait::async_trait;
use serde::Serialize;

/// Maximum number of events returned by a single list query.
pub const PAGE_SIZE: u32 = 100;

/// An event as presented to the agent.
///
/// `start` and `end` hold an RFC 3339 timestamp, or a bare `YYYY-MM-DD`
/// date for all-day events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    /// Provider event identifier.
    pub id: String,
    /// Event title.
    pub summary: String,
    /// Event description, if any.
    pub description: Option<String>,
    /// Start marker.
    pub start: String,
    /// End marker.
    pub end: String,
    /// Link to the event in the provider's web UI.
    pub html_link: Option<String>,
}

/// Fields for a new timed event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEvent {
    /// Event title.
    pub summary: String,
    /// Optional description.
    pub description: Option<String>,
    /// Date, `YYYY-MM-DD`.
    pub date: String,
    /// Start time, `HH:MM` (24-hour).
    pub start_time: String,
    /// End time, `HH:MM` (24-hour).
    pub end_time: String,
}

/// A sparse set of changes to an existing event.
///
/// Only fields that are `Some` are applied; everything else on the event is
/// left as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventUpdates {
    /// New title.
    pub summary: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// New start time, `HH:MM`.
    pub start_time: Option<String>,
    /// New end time, `HH:MM`.
    pub end_time: Option<String>,
}

impl EventUpdates {
    /// Returns `true` if the update touches the event's date or times.
    #[must_use]
    pub const fn changes_schedule(&self) -> bool {
        self.date.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }
}

/// A calendar visible to the configured credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalendarInfo {
    /// Calendar identifier.
    pub id: String,
    /// Calendar title.
    pub summary: String,
    /// Calendar description, if any.
    pub description: Option<String>,
    /// Whether this is the user's primary calendar.
    pub primary: bool,
}

/// Operations the dispatcher needs from a calendar backend.
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Lists events from now through now + `days` days, ordered by start time.
    async fn list_events_for_days(
        &self,
        calendar_id: Option<&str>,
        days: u32,
    ) -> CalendarResult<Vec<CalendarEvent>>;

    /// Lists events between two `YYYY-MM-DD` dates, end date inclusive.
    async fn list_events_range(
        &self,
        calendar_id: Option<&str>,
        start_date: &str,
        end_date: &str,
    ) -> CalendarResult<Vec<CalendarEvent>>;

    /// Creates a timed event.
    async fn create_event(
        &self,
        calendar_id: Option<&str>,
        event: NewEvent,
    ) -> CalendarResult<CalendarEvent>;

    /// Applies `updates` to an existing event and returns the stored result.
    async fn update_event(
        &self,
        calendar_id: Option<&str>,
        event_id: &str,
        updates: EventUpdates,
    ) -> CalendarResult<CalendarEvent>;

    /// Deletes an event.
    async fn delete_event(&self, calendar_id: Option<&str>, event_id: &str) -> CalendarResult<()>;

    /// Lists the calendars accessible to the configured credentials.
    async fn list_calendars(&self) -> CalendarResult<Vec<CalendarInfo>>;
}
