//! Google Calendar v3 wire types.
//!
//! Only the fields this server reads or writes are typed. Everything else on
//! an event is kept in `extra` so that a fetch-modify-update cycle sends it
//! back unchanged.

use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::calendar::time::{self, decompose, format_timestamp, localize, parse_date, parse_time};
use crate::calendar::{
    CalendarError, CalendarEvent, CalendarInfo, CalendarResult, EventUpdates, NewEvent,
};

/// Start or end of an event: a timestamp, or a date for all-day events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// `YYYY-MM-DD` date of an all-day event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// IANA timezone name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// A timed marker in `tz`.
    #[must_use]
    pub fn timed(at: &DateTime<Tz>, tz: Tz) -> Self {
        Self {
            date_time: Some(format_timestamp(at)),
            date: None,
            time_zone: Some(tz.name().to_string()),
        }
    }

    /// The displayed marker: the timestamp if present, else the date.
    #[must_use]
    pub fn display(&self) -> String {
        self.date_time
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.date.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    /// The local date and time of day of a timed marker, or the date of an
    /// all-day marker.
    fn local_parts(&self, tz: Tz) -> CalendarResult<(Option<NaiveDate>, Option<NaiveTime>)> {
        if let Some(ts) = self.date_time.as_deref().filter(|s| !s.is_empty()) {
            let (date, time) = decompose(ts, tz)?;
            return Ok((Some(date), Some(time)));
        }
        match self.date.as_deref().filter(|s| !s.is_empty()) {
            Some(date) => Ok((Some(parse_date(date)?), None)),
            None => Ok((None, None)),
        }
    }
}

/// A calendar event resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier (absent on insert).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Web UI link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    /// Start marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    /// End marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    /// All other event fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Builds the insert body for a new timed event.
    ///
    /// # Errors
    ///
    /// Returns an error if the date or either time cannot be parsed, or a
    /// composed time does not exist in `tz`.
    pub fn from_new(event: &NewEvent, tz: Tz) -> CalendarResult<Self> {
        let start = time::compose(&event.date, &event.start_time, tz)?;
        let end = time::compose(&event.date, &event.end_time, tz)?;

        Ok(Self {
            summary: Some(event.summary.clone()),
            description: event.description.clone(),
            start: Some(EventDateTime::timed(&start, tz)),
            end: Some(EventDateTime::timed(&end, tz)),
            ..Self::default()
        })
    }

    /// Applies a sparse update in place.
    ///
    /// When any of date, start time or end time is given, the missing ones
    /// are taken from the event's current start and end (read in `tz`) and
    /// both markers are rebuilt as timed markers on the resulting date.
    ///
    /// # Errors
    ///
    /// Returns an error if an update value cannot be parsed, the event lacks a
    /// value that the update does not supply, or a rebuilt time does not
    /// exist in `tz`.
    pub fn apply_updates(&mut self, updates: &EventUpdates, tz: Tz) -> CalendarResult<()> {
        if let Some(summary) = &updates.summary {
            self.summary = Some(summary.clone());
        }
        if let Some(description) = &updates.description {
            self.description = Some(description.clone());
        }

        if !updates.changes_schedule() {
            return Ok(());
        }

        let (current_date, current_start) = match &self.start {
            Some(start) => start.local_parts(tz)?,
            None => (None, None),
        };
        let current_end = match &self.end {
            Some(end) => end.local_parts(tz)?.1,
            None => None,
        };

        let date = match updates.date.as_deref() {
            Some(d) => parse_date(d)?,
            None => current_date.ok_or(CalendarError::MissingEventTime { field: "date" })?,
        };
        let start_time = match updates.start_time.as_deref() {
            Some(t) => parse_time(t)?,
            None => current_start.ok_or(CalendarError::MissingEventTime {
                field: "start_time",
            })?,
        };
        let end_time = match updates.end_time.as_deref() {
            Some(t) => parse_time(t)?,
            None => current_end.ok_or(CalendarError::MissingEventTime { field: "end_time" })?,
        };

        let start = localize(date.and_time(start_time), tz)?;
        let end = localize(date.and_time(end_time), tz)?;

        self.start = Some(EventDateTime::timed(&start, tz));
        self.end = Some(EventDateTime::timed(&end, tz));
        Ok(())
    }
}

impl From<Event> for CalendarEvent {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.unwrap_or_default(),
            summary: event.summary.unwrap_or_default(),
            description: event.description,
            start: event.start.as_ref().map(EventDateTime::display).unwrap_or_default(),
            end: event.end.as_ref().map(EventDateTime::display).unwrap_or_default(),
            html_link: event.html_link,
        }
    }
}

/// A page of events.
#[derive(Debug, Default, Deserialize)]
pub struct EventList {
    /// Events on this page.
    #[serde(default)]
    pub items: Vec<Event>,
}

/// An entry of the user's calendar list.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarListEntry {
    /// Calendar identifier.
    pub id: String,
    /// Title.
    #[serde(default)]
    pub summary: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether this is the primary calendar.
    #[serde(default)]
    pub primary: bool,
}

impl From<CalendarListEntry> for CalendarInfo {
    fn from(entry: CalendarListEntry) -> Self {
        Self {
            id: entry.id,
            summary: entry.summary.unwrap_or_default(),
            description: entry.description,
            primary: entry.primary,
        }
    }
}

/// The calendar list resource.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarList {
    /// Calendars on this page.
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
}

/// Error body returned by Google APIs.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Details of a Google API error.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Extracts the provider's error message from a response body.
///
/// Falls back to the raw body when it is not a Google error document.
#[must_use]
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}
