//! Shared test fixtures.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use google_calendar_mcp::calendar::{
    CalendarError, CalendarEvent, CalendarInfo, CalendarResult, CalendarService, EventUpdates,
    NewEvent,
};
use google_calendar_mcp::mcp::{Dispatcher, JsonRpcRequest, OutgoingMessage, RequestId};

/// A calendar call as seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListDays {
        calendar_id: Option<String>,
        days: u32,
    },
    ListRange {
        calendar_id: Option<String>,
        start_date: String,
        end_date: String,
    },
    Create {
        calendar_id: Option<String>,
        event: NewEvent,
    },
    Update {
        calendar_id: Option<String>,
        event_id: String,
        updates: EventUpdates,
    },
    Delete {
        calendar_id: Option<String>,
        event_id: String,
    },
    ListCalendars,
}

/// A calendar that records every call and returns canned data.
#[derive(Default)]
pub struct RecordingCalendar {
    events: Vec<CalendarEvent>,
    failure: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns these events from both list operations.
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Fails every operation with an API error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> CalendarResult<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(CalendarError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn owned(calendar_id: Option<&str>) -> Option<String> {
    calendar_id.map(str::to_string)
}

#[async_trait]
impl CalendarService for RecordingCalendar {
    async fn list_events_for_days(
        &self,
        calendar_id: Option<&str>,
        days: u32,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        self.record(Call::ListDays {
            calendar_id: owned(calendar_id),
            days,
        })?;
        Ok(self.events.clone())
    }

    async fn list_events_range(
        &self,
        calendar_id: Option<&str>,
        start_date: &str,
        end_date: &str,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        self.record(Call::ListRange {
            calendar_id: owned(calendar_id),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        })?;
        Ok(self.events.clone())
    }

    async fn create_event(
        &self,
        calendar_id: Option<&str>,
        event: NewEvent,
    ) -> CalendarResult<CalendarEvent> {
        self.record(Call::Create {
            calendar_id: owned(calendar_id),
            event: event.clone(),
        })?;
        Ok(CalendarEvent {
            id: "evt-new".to_string(),
            summary: event.summary,
            description: event.description,
            start: format!("{}T{}:00Z", event.date, event.start_time),
            end: format!("{}T{}:00Z", event.date, event.end_time),
            html_link: Some("https://calendar.google.com/event?eid=evt-new".to_string()),
        })
    }

    async fn update_event(
        &self,
        calendar_id: Option<&str>,
        event_id: &str,
        updates: EventUpdates,
    ) -> CalendarResult<CalendarEvent> {
        self.record(Call::Update {
            calendar_id: owned(calendar_id),
            event_id: event_id.to_string(),
            updates: updates.clone(),
        })?;
        Ok(CalendarEvent {
            id: event_id.to_string(),
            summary: updates.summary.unwrap_or_else(|| "Unchanged".to_string()),
            html_link: Some(format!("https://calendar.google.com/event?eid={event_id}")),
            ..CalendarEvent::default()
        })
    }

    async fn delete_event(&self, calendar_id: Option<&str>, event_id: &str) -> CalendarResult<()> {
        self.record(Call::Delete {
            calendar_id: owned(calendar_id),
            event_id: event_id.to_string(),
        })
    }

    async fn list_calendars(&self) -> CalendarResult<Vec<CalendarInfo>> {
        self.record(Call::ListCalendars)?;
        Ok(vec![CalendarInfo {
            id: "primary".to_string(),
            summary: "Personal".to_string(),
            description: None,
            primary: true,
        }])
    }
}

/// Builds a `tools/call` request with id 1.
pub fn tool_call(name: &str, arguments: Value) -> JsonRpcRequest {
    JsonRpcRequest::new(
        Some(RequestId::from(1)),
        "tools/call",
        Some(serde_json::json!({ "name": name, "arguments": arguments })),
    )
}

/// Runs a tool and returns the outgoing message.
pub fn run_tool(
    dispatcher: &Dispatcher<RecordingCalendar>,
    name: &str,
    arguments: Value,
) -> OutgoingMessage {
    tokio_test::block_on(dispatcher.handle(tool_call(name, arguments)))
        .expect("tools/call always produces a response")
}

/// Returns the text of the first content item of a tool result.
pub fn result_text(message: &OutgoingMessage) -> &str {
    message.result().expect("expected a success response")["content"][0]["text"]
        .as_str()
        .expect("expected text content")
}

pub fn sample_event(id: &str, summary: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        description: None,
        start: "2026-02-20T10:00:00+04:00".to_string(),
        end: "2026-02-20T11:00:00+04:00".to_string(),
        html_link: None,
    }
}
