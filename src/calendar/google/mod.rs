//! Google Calendar v3 REST backend.
//!
//! Requests go straight to `https://www.googleapis.com/calendar/v3/` with a
//! bearer token from [`TokenSource`]. No retries are attempted; a failed call
//! is reported once.

pub mod auth;
pub mod model;

use std::path::Path;

use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::calendar::time::{self, format_timestamp};
use crate::calendar::{
    CalendarError, CalendarEvent, CalendarInfo, CalendarResult, CalendarService, EventUpdates,
    NewEvent, PAGE_SIZE,
};

use self::auth::{Credentials, TokenSource};
use self::model::{CalendarList, Event, EventList};

/// Base URL of the Calendar v3 API.
pub const API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3/";

/// A [`CalendarService`] backed by the Google Calendar API.
pub struct GoogleCalendarClient {
    client: Client,
    tokens: TokenSource,
    base_url: Url,
    calendar_id: String,
    timezone: Tz,
}

impl GoogleCalendarClient {
    /// Creates a client from a credentials file.
    ///
    /// `timezone` is an IANA name; `None` or an unknown name selects UTC.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials file cannot be read or parsed, or
    /// holds an unusable private key.
    pub fn new(
        credentials_file: &Path,
        calendar_id: impl Into<String>,
        timezone: Option<&str>,
    ) -> CalendarResult<Self> {
        let credentials = Credentials::from_file(credentials_file)?;
        let client = Client::new();
        let tokens = TokenSource::new(client.clone(), credentials)?;
        let base_url = Url::parse(API_BASE_URL).map_err(|e| CalendarError::Url {
            message: e.to_string(),
        })?;

        Ok(Self {
            client,
            tokens,
            base_url,
            calendar_id: calendar_id.into(),
            timezone: time::resolve_timezone(timezone),
        })
    }

    /// Returns the timezone dates and times are interpreted in.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Returns the default calendar identifier.
    #[must_use]
    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    fn resolve_calendar_id<'a>(&'a self, calendar_id: Option<&'a str>) -> &'a str {
        calendar_id
            .filter(|id| !id.is_empty())
            .unwrap_or(self.calendar_id.as_str())
    }

    /// Builds an API URL from path segments, percent-encoding each one.
    fn api_url(&self, segments: &[&str]) -> CalendarResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CalendarError::Url {
                message: format!("{} cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn events_url(&self, calendar_id: Option<&str>, event_id: Option<&str>) -> CalendarResult<Url> {
        let calendar_id = self.resolve_calendar_id(calendar_id);
        match event_id {
            Some(event_id) => self.api_url(&["calendars", calendar_id, "events", event_id]),
            None => self.api_url(&["calendars", calendar_id, "events"]),
        }
    }

    /// Sends an authorised request and checks the status.
    async fn send(&self, request: RequestBuilder) -> CalendarResult<Response> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        Err(CalendarError::Api {
            status: status.as_u16(),
            message: model::error_message(&body),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> CalendarResult<T> {
        Ok(self.send(request).await?.json().await?)
    }

    /// Builds the events query for `[start, end)`, expanded into single
    /// instances and ordered by start time.
    fn list_url(
        &self,
        calendar_id: Option<&str>,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> CalendarResult<Url> {
        let mut url = self.events_url(calendar_id, None)?;
        url.query_pairs_mut()
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime")
            .append_pair("maxResults", &PAGE_SIZE.to_string())
            .append_pair("timeMin", &format_timestamp(start))
            .append_pair("timeMax", &format_timestamp(end));
        Ok(url)
    }

    /// Applies `updates` to a fetched event and builds the PUT that stores
    /// the whole event back at `url`.
    fn update_request(
        &self,
        url: Url,
        mut existing: Event,
        updates: &EventUpdates,
    ) -> CalendarResult<RequestBuilder> {
        existing.apply_updates(updates, self.timezone)?;
        Ok(self.client.put(url).json(&existing))
    }

    async fn list_window(
        &self,
        calendar_id: Option<&str>,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        let url = self.list_url(calendar_id, start, end)?;

        tracing::debug!(%url, "Listing events");

        let page: EventList = self.send_json(self.client.get(url)).await?;
        Ok(page.items.into_iter().map(CalendarEvent::from).collect())
    }
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    async fn list_events_for_days(
        &self,
        calendar_id: Option<&str>,
        days: u32,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        let (start, end) = time::days_window(time::now_in(self.timezone), days)?;
        self.list_window(calendar_id, &start, &end).await
    }

    async fn list_events_range(
        &self,
        calendar_id: Option<&str>,
        start_date: &str,
        end_date: &str,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        let (start, end) = time::date_range_window(start_date, end_date, self.timezone)?;
        self.list_window(calendar_id, &start, &end).await
    }

    async fn create_event(
        &self,
        calendar_id: Option<&str>,
        event: NewEvent,
    ) -> CalendarResult<CalendarEvent> {
        let body = Event::from_new(&event, self.timezone)?;
        let url = self.events_url(calendar_id, None)?;

        tracing::debug!(%url, summary = %event.summary, "Creating event");

        let created: Event = self.send_json(self.client.post(url).json(&body)).await?;
        Ok(created.into())
    }

    async fn update_event(
        &self,
        calendar_id: Option<&str>,
        event_id: &str,
        updates: EventUpdates,
    ) -> CalendarResult<CalendarEvent> {
        let url = self.events_url(calendar_id, Some(event_id))?;

        tracing::debug!(%url, "Fetching event for update");

        let existing: Event = self.send_json(self.client.get(url.clone())).await?;
        let request = self.update_request(url, existing, &updates)?;

        let updated: Event = self.send_json(request).await?;
        Ok(updated.into())
    }

    async fn delete_event(&self, calendar_id: Option<&str>, event_id: &str) -> CalendarResult<()> {
        let url = self.events_url(calendar_id, Some(event_id))?;

        tracing::debug!(%url, "Deleting event");

        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn list_calendars(&self) -> CalendarResult<Vec<CalendarInfo>> {
        let url = self.api_url(&["users", "me", "calendarList"])?;
        let list: CalendarList = self.send_json(self.client.get(url)).await?;
        Ok(list.items.into_iter().map(CalendarInfo::from).collect())
    }
}
