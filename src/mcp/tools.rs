//! Calendar tools exposed over MCP.
//!
//! Defines the tool descriptors returned by `tools/list`, the argument
//! shapes accepted by `tools/call`, and the text rendering of results.

use std::fmt::Write as _;
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::calendar::{CalendarEvent, EventUpdates, NewEvent};

/// Number of days `list_events` covers when `days` is absent or unusable.
pub const DEFAULT_LIST_DAYS: u32 = 7;

/// The tools this server offers, in the order `tools/list` reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// List events for the next N days.
    ListEvents,
    /// List events between two dates.
    ListEventsRange,
    /// Create an event.
    CreateEvent,
    /// Delete an event.
    DeleteEvent,
    /// Edit an event.
    EditEvent,
}

impl Tool {
    /// All tools in declaration order.
    pub const ALL: [Self; 5] = [
        Self::ListEvents,
        Self::ListEventsRange,
        Self::CreateEvent,
        Self::DeleteEvent,
        Self::EditEvent,
    ];

    /// Returns the tool's wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ListEvents => "list_events",
            Self::ListEventsRange => "list_events_range",
            Self::CreateEvent => "create_event",
            Self::DeleteEvent => "delete_event",
            Self::EditEvent => "edit_event",
        }
    }

    /// Looks a tool up by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    fn definition(self) -> ToolDefinition {
        let (description, input_schema) = match self {
            Self::ListEvents => (
                "List calendar events for the next N days",
                json!({
                    "type": "object",
                    "properties": {
                        "days": {
                            "type": "integer",
                            "description": "Number of days to look ahead (default: 7)",
                            "default": DEFAULT_LIST_DAYS
                        },
                        "calendar_id": calendar_id_schema()
                    }
                }),
            ),
            Self::ListEventsRange => (
                "List calendar events between two dates",
                json!({
                    "type": "object",
                    "properties": {
                        "start_date": {
                            "type": "string",
                            "description": "Start date in YYYY-MM-DD format"
                        },
                        "end_date": {
                            "type": "string",
                            "description": "End date in YYYY-MM-DD format (inclusive)"
                        },
                        "calendar_id": calendar_id_schema()
                    },
                    "required": ["start_date", "end_date"]
                }),
            ),
            Self::CreateEvent => (
                "Create a new calendar event",
                json!({
                    "type": "object",
                    "properties": {
                        "summary": {
                            "type": "string",
                            "description": "Event title"
                        },
                        "date": {
                            "type": "string",
                            "description": "Event date in YYYY-MM-DD format"
                        },
                        "start_time": {
                            "type": "string",
                            "description": "Start time in HH:MM format (24-hour)"
                        },
                        "end_time": {
                            "type": "string",
                            "description": "End time in HH:MM format (24-hour)"
                        },
                        "description": {
                            "type": "string",
                            "description": "Event description (optional)"
                        },
                        "calendar_id": calendar_id_schema()
                    },
                    "required": ["summary", "date", "start_time", "end_time"]
                }),
            ),
            Self::DeleteEvent => (
                "Delete a calendar event",
                json!({
                    "type": "object",
                    "properties": {
                        "event_id": {
                            "type": "string",
                            "description": "Event ID to delete (from list_events)"
                        },
                        "calendar_id": calendar_id_schema()
                    },
                    "required": ["event_id"]
                }),
            ),
            Self::EditEvent => (
                "Edit an existing calendar event. Only the fields given are changed.",
                json!({
                    "type": "object",
                    "properties": {
                        "event_id": {
                            "type": "string",
                            "description": "Event ID to edit (from list_events)"
                        },
                        "summary": {
                            "type": "string",
                            "description": "New event title (optional)"
                        },
                        "description": {
                            "type": "string",
                            "description": "New event description (optional)"
                        },
                        "date": {
                            "type": "string",
                            "description": "New date in YYYY-MM-DD format (optional)"
                        },
                        "start_time": {
                            "type": "string",
                            "description": "New start time in HH:MM format (optional)"
                        },
                        "end_time": {
                            "type": "string",
                            "description": "New end time in HH:MM format (optional)"
                        },
                        "calendar_id": calendar_id_schema()
                    },
                    "required": ["event_id"]
                }),
            ),
        };

        ToolDefinition {
            name: self.name().to_string(),
            description: Some(description.to_string()),
            input_schema,
        }
    }
}

fn calendar_id_schema() -> Value {
    json!({
        "type": "string",
        "description": "Calendar ID (optional, defaults to the configured calendar)"
    })
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Returns the tool descriptors, built once per process.
#[must_use]
pub fn tool_definitions() -> &'static [ToolDefinition] {
    static DEFINITIONS: OnceLock<Vec<ToolDefinition>> = OnceLock::new();
    DEFINITIONS.get_or_init(|| Tool::ALL.into_iter().map(Tool::definition).collect())
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
pub(crate) const fn is_false(b: &bool) -> bool {
    !*b
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

/// Tool arguments that are missing, empty or of the wrong type.
///
/// Reported to the client as a JSON-RPC invalid params error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct InvalidArguments {
    /// Short description of what is wrong.
    pub message: String,
    /// Decoder output, when the arguments did not deserialise.
    pub detail: Option<String>,
}

impl InvalidArguments {
    fn missing(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
        }
    }
}

/// Decodes tool arguments; absent (`null`) arguments decode as the default.
fn decode<T: DeserializeOwned + Default>(arguments: &Value) -> Result<T, InvalidArguments> {
    if arguments.is_null() {
        return Ok(T::default());
    }
    if !arguments.is_object() {
        return Err(InvalidArguments {
            message: "Invalid arguments".to_string(),
            detail: Some("arguments must be a JSON object".to_string()),
        });
    }
    T::deserialize(arguments).map_err(|e| InvalidArguments {
        message: "Invalid arguments".to_string(),
        detail: Some(e.to_string()),
    })
}

/// Keeps a string only if it is non-empty.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Resolves the `days` argument of `list_events`.
///
/// Anything other than a positive integer that fits in `u32` yields
/// [`DEFAULT_LIST_DAYS`].
#[must_use]
pub fn list_days(arguments: &Value) -> u32 {
    arguments
        .get("days")
        .and_then(Value::as_i64)
        .filter(|d| *d > 0)
        .and_then(|d| u32::try_from(d).ok())
        .unwrap_or(DEFAULT_LIST_DAYS)
}

#[derive(Debug, Default, Deserialize)]
struct RawCalendarArg {
    #[serde(default)]
    calendar_id: Option<String>,
}

/// Returns the optional `calendar_id` argument; empty means the default.
///
/// # Errors
///
/// Returns an error if the arguments are not an object or `calendar_id` is
/// not a string.
pub fn calendar_id(arguments: &Value) -> Result<Option<String>, InvalidArguments> {
    let raw: RawCalendarArg = decode(arguments)?;
    Ok(non_empty(raw.calendar_id))
}

/// Returns the `calendar_id` argument of `list_events`, if it is a
/// non-empty string.
///
/// `list_events` never rejects its arguments, so anything else selects the
/// configured calendar.
#[must_use]
pub fn lenient_calendar_id(arguments: &Value) -> Option<String> {
    arguments
        .get("calendar_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Arguments of `list_events_range`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeArgs {
    /// First day, `YYYY-MM-DD`.
    pub start_date: String,
    /// Last day (inclusive), `YYYY-MM-DD`.
    pub end_date: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawRangeArgs {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

impl RangeArgs {
    /// Decodes and checks `list_events_range` arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if either date is missing or empty.
    pub fn parse(arguments: &Value) -> Result<Self, InvalidArguments> {
        let raw: RawRangeArgs = decode(arguments)?;
        match (non_empty(raw.start_date), non_empty(raw.end_date)) {
            (Some(start_date), Some(end_date)) => Ok(Self {
                start_date,
                end_date,
            }),
            _ => Err(InvalidArguments::missing(
                "start_date and end_date are required",
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawCreateArgs {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
}

/// Decodes and checks `create_event` arguments.
///
/// # Errors
///
/// Returns an error if summary, date, start time or end time is missing or
/// empty.
pub fn parse_new_event(arguments: &Value) -> Result<NewEvent, InvalidArguments> {
    let raw: RawCreateArgs = decode(arguments)?;
    match (
        non_empty(raw.summary),
        non_empty(raw.date),
        non_empty(raw.start_time),
        non_empty(raw.end_time),
    ) {
        (Some(summary), Some(date), Some(start_time), Some(end_time)) => Ok(NewEvent {
            summary,
            description: non_empty(raw.description),
            date,
            start_time,
            end_time,
        }),
        _ => Err(InvalidArguments::missing(
            "summary, date, start_time, and end_time are required",
        )),
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawEventIdArgs {
    #[serde(default)]
    event_id: Option<String>,
}

/// Decodes the required `event_id` argument.
///
/// # Errors
///
/// Returns an error if `event_id` is missing or empty.
pub fn parse_event_id(arguments: &Value) -> Result<String, InvalidArguments> {
    let raw: RawEventIdArgs = decode(arguments)?;
    non_empty(raw.event_id).ok_or_else(|| InvalidArguments::missing("event_id is required"))
}

#[derive(Debug, Default, Deserialize)]
struct RawEditArgs {
    #[serde(default)]
    event_id: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
}

/// Decodes `edit_event` arguments into an event ID and a sparse update.
///
/// Every optional field that is present, including an empty string, is
/// passed on as a change.
///
/// # Errors
///
/// Returns an error if `event_id` is missing or empty.
pub fn parse_edit(arguments: &Value) -> Result<(String, EventUpdates), InvalidArguments> {
    let raw: RawEditArgs = decode(arguments)?;
    let event_id =
        non_empty(raw.event_id).ok_or_else(|| InvalidArguments::missing("event_id is required"))?;

    Ok((
        event_id,
        EventUpdates {
            summary: raw.summary,
            description: raw.description,
            date: raw.date,
            start_time: raw.start_time,
            end_time: raw.end_time,
        },
    ))
}

/// Renders a list of events as text.
#[must_use]
pub fn format_events(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return "No events found.".to_string();
    }

    let mut out = format!("Found {} event(s):\n\n", events.len());
    for event in events {
        let _ = write!(
            out,
            "- {}\n  Start: {}\n  End: {}\n  ID: {}\n\n",
            event.summary, event.start, event.end, event.id
        );
    }
    out
}

/// Renders a newly created event.
#[must_use]
pub fn format_created(event: &CalendarEvent) -> String {
    format!(
        "Event created successfully!\nID: {}\nLink: {}",
        event.id,
        event.html_link.as_deref().unwrap_or_default()
    )
}

/// Renders an edited event.
#[must_use]
pub fn format_updated(event: &CalendarEvent) -> String {
    format!(
        "Event updated successfully!\nID: {}\nSummary: {}\nLink: {}",
        event.id,
        event.summary,
        event.html_link.as_deref().unwrap_or_default()
    )
}

/// Confirmation text for a deleted event.
pub const DELETED_TEXT: &str = "Event deleted successfully!";
