//! Request routing.
//!
//! The dispatcher turns one parsed request into at most one outgoing message.
//! It holds no per-session state: every request is answered from its own
//! contents and the calendar adapter.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::calendar::CalendarService;
use crate::mcp::protocol::{
    parse_message, ErrorCode, JsonRpcError, JsonRpcErrorData, JsonRpcRequest, JsonRpcResponse,
    OutgoingMessage, RequestId, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::tools::{
    self, is_false, tool_definitions, InvalidArguments, RangeArgs, Tool, ToolCallParams,
    ToolCallResult,
};

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ToolCapabilities::default()),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
///
/// Only read for logging; the handshake result does not depend on them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    #[serde(default)]
    pub protocol_version: Option<String>,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Routes requests to their handlers.
pub struct Dispatcher<C> {
    calendar: C,
}

impl<C: CalendarService> Dispatcher<C> {
    /// Creates a dispatcher over a calendar adapter.
    #[must_use]
    pub const fn new(calendar: C) -> Self {
        Self { calendar }
    }

    /// Returns the calendar adapter.
    #[must_use]
    pub const fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Parses and handles a single input line.
    ///
    /// Lines that are not valid requests are answered with the protocol
    /// error `parse_message` produced.
    pub async fn handle_line(&self, line: &str) -> Option<OutgoingMessage> {
        match parse_message(line) {
            Ok(request) => self.handle(request).await,
            Err(error) => {
                tracing::warn!(
                    code = error.error.code,
                    data = ?error.error.data,
                    "Rejected malformed message"
                );
                Some(error.into())
            }
        }
    }

    /// Handles a request, returning the message to send back.
    ///
    /// Returns `None` for notifications.
    pub async fn handle(&self, req: JsonRpcRequest) -> Option<OutgoingMessage> {
        tracing::debug!(method = %req.method, id = ?req.id, "Handling request");

        let response = match req.method.as_str() {
            "initialized" | "notifications/initialized" => {
                tracing::debug!("Client finished initialisation");
                return None;
            }
            "initialize" => Ok(Self::handle_initialize(&req)),
            "ping" => Ok(Self::handle_ping(&req)),
            "tools/list" => Self::handle_tools_list(&req),
            "tools/call" => self.handle_tools_call(&req).await,
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        Some(match response {
            Ok(resp) => resp.into(),
            Err(error) => error.into(),
        })
    }

    /// Handles the initialize request.
    fn handle_initialize(req: &JsonRpcRequest) -> JsonRpcResponse {
        match req
            .params
            .as_ref()
            .map(InitializeParams::deserialize)
            .transpose()
        {
            Ok(Some(params)) => {
                let client = params.client_info.as_ref();
                tracing::debug!(
                    client = client.map(|c| c.name.as_str()),
                    client_version = client.and_then(|c| c.version.as_deref()),
                    requested_version = params.protocol_version.as_deref(),
                    "Initialising session"
                );
            }
            Ok(None) => tracing::debug!("Initialising session without params"),
            Err(e) => tracing::debug!(error = %e, "Ignoring unreadable initialize params"),
        }

        let result = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        JsonRpcResponse::success(req.id.clone(), result)
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let tools = serde_json::to_value(tool_definitions())
            .map_err(|e| serialisation_failed(req.id.clone(), &e))?;

        Ok(JsonRpcResponse::success(req.id.clone(), json!({ "tools": tools })))
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(
        &self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        let params: ToolCallParams = req
            .params
            .as_ref()
            .map(ToolCallParams::deserialize)
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid tool call params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing tool call params")
            })?;

        let Some(tool) = Tool::from_name(&params.name) else {
            return Err(JsonRpcError::invalid_params(
                req.id.clone(),
                format!("Unknown tool: {}", params.name),
            ));
        };

        let result = self
            .call_tool(tool, &params.arguments)
            .await
            .map_err(|e| invalid_arguments(req.id.clone(), e))?;

        let result_value =
            serde_json::to_value(&result).map_err(|e| serialisation_failed(req.id.clone(), &e))?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    /// Runs one tool against the calendar.
    ///
    /// Argument problems are returned as errors; calendar failures become an
    /// error-flagged result.
    async fn call_tool(
        &self,
        tool: Tool,
        arguments: &Value,
    ) -> Result<ToolCallResult, InvalidArguments> {
        let outcome = match tool {
            Tool::ListEvents => {
                let calendar_id = tools::lenient_calendar_id(arguments);
                let days = tools::list_days(arguments);
                self.calendar
                    .list_events_for_days(calendar_id.as_deref(), days)
                    .await
                    .map(|events| tools::format_events(&events))
            }
            Tool::ListEventsRange => {
                let range = RangeArgs::parse(arguments)?;
                let calendar_id = tools::calendar_id(arguments)?;
                self.calendar
                    .list_events_range(calendar_id.as_deref(), &range.start_date, &range.end_date)
                    .await
                    .map(|events| tools::format_events(&events))
            }
            Tool::CreateEvent => {
                let event = tools::parse_new_event(arguments)?;
                let calendar_id = tools::calendar_id(arguments)?;
                self.calendar
                    .create_event(calendar_id.as_deref(), event)
                    .await
                    .map(|created| tools::format_created(&created))
            }
            Tool::DeleteEvent => {
                let event_id = tools::parse_event_id(arguments)?;
                let calendar_id = tools::calendar_id(arguments)?;
                self.calendar
                    .delete_event(calendar_id.as_deref(), &event_id)
                    .await
                    .map(|()| tools::DELETED_TEXT.to_string())
            }
            Tool::EditEvent => {
                let (event_id, updates) = tools::parse_edit(arguments)?;
                let calendar_id = tools::calendar_id(arguments)?;
                self.calendar
                    .update_event(calendar_id.as_deref(), &event_id, updates)
                    .await
                    .map(|updated| tools::format_updated(&updated))
            }
        };

        Ok(match outcome {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => {
                tracing::warn!(tool = tool.name(), error = %e, "Calendar operation failed");
                ToolCallResult::error(format!("Error: {e}"))
            }
        })
    }
}

fn invalid_arguments(id: Option<RequestId>, err: InvalidArguments) -> JsonRpcError {
    let mut data = JsonRpcErrorData::with_message(ErrorCode::InvalidParams, err.message);
    if let Some(detail) = err.detail {
        data = data.with_data(Value::String(detail));
    }
    JsonRpcError::new(id, data)
}

fn serialisation_failed(id: Option<RequestId>, err: &serde_json::Error) -> JsonRpcError {
    tracing::error!(error = %err, "Failed to serialise result");
    JsonRpcError::internal_error(id, "Internal error: failed to serialise result")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::calendar::{
        CalendarError, CalendarEvent, CalendarInfo, CalendarResult, EventUpdates, NewEvent,
    };

    /// Records the calendar IDs it was called with and fails on demand.
    #[derive(Default)]
    struct StubCalendar {
        fail: bool,
        calendar_ids: Mutex<Vec<Option<String>>>,
    }

    impl StubCalendar {
        fn record(&self, calendar_id: Option<&str>) -> CalendarResult<()> {
            self.calendar_ids
                .lock()
                .unwrap()
                .push(calendar_id.map(str::to_string));
            if self.fail {
                return Err(CalendarError::Api {
                    status: 404,
                    message: "Not Found".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CalendarService for StubCalendar {
        async fn list_events_for_days(
            &self,
            calendar_id: Option<&str>,
            _days: u32,
        ) -> CalendarResult<Vec<CalendarEvent>> {
            self.record(calendar_id).map(|()| Vec::new())
        }

        async fn list_events_range(
            &self,
            calendar_id: Option<&str>,
            _start_date: &str,
            _end_date: &str,
        ) -> CalendarResult<Vec<CalendarEvent>> {
            self.record(calendar_id).map(|()| Vec::new())
        }

        async fn create_event(
            &self,
            calendar_id: Option<&str>,
            event: NewEvent,
        ) -> CalendarResult<CalendarEvent> {
            self.record(calendar_id).map(|()| CalendarEvent {
                id: "created".to_string(),
                summary: event.summary,
                ..CalendarEvent::default()
            })
        }

        async fn update_event(
            &self,
            calendar_id: Option<&str>,
            event_id: &str,
            _updates: EventUpdates,
        ) -> CalendarResult<CalendarEvent> {
            self.record(calendar_id).map(|()| CalendarEvent {
                id: event_id.to_string(),
                ..CalendarEvent::default()
            })
        }

        async fn delete_event(
            &self,
            calendar_id: Option<&str>,
            _event_id: &str,
        ) -> CalendarResult<()> {
            self.record(calendar_id)
        }

        async fn list_calendars(&self) -> CalendarResult<Vec<CalendarInfo>> {
            Ok(Vec::new())
        }
    }

    fn call(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest::new(Some(RequestId::from(1)), method, Some(params))
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let dispatcher = Dispatcher::new(StubCalendar::default());
        let out = dispatcher
            .handle(call(
                "initialize",
                json!({"protocolVersion": "2024-11-05", "clientInfo": {"name": "test"}}),
            ))
            .await
            .unwrap();

        let result = out.result().unwrap();
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(result["serverInfo"]["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(result["capabilities"], json!({"tools": {}}));
    }

    #[tokio::test]
    async fn initialize_tolerates_odd_params() {
        let dispatcher = Dispatcher::new(StubCalendar::default());
        let out = dispatcher
            .handle(call("initialize", json!("unexpected")))
            .await
            .unwrap();
        assert!(out.result().is_some());
    }

    #[tokio::test]
    async fn notifications_are_silent() {
        let dispatcher = Dispatcher::new(StubCalendar::default());
        for method in ["initialized", "notifications/initialized"] {
            let req = JsonRpcRequest::new(None, method, None);
            assert!(dispatcher.handle(req).await.is_none());
        }
    }

    #[tokio::test]
    async fn unknown_method() {
        let dispatcher = Dispatcher::new(StubCalendar::default());
        let out = dispatcher.handle(call("resources/list", json!({}))).await.unwrap();
        assert_eq!(
            out.error().unwrap().code,
            ErrorCode::MethodNotFound.code()
        );
    }

    #[tokio::test]
    async fn tools_call_without_params() {
        let dispatcher = Dispatcher::new(StubCalendar::default());
        let req = JsonRpcRequest::new(Some(RequestId::from(2)), "tools/call", None);
        let out = dispatcher.handle(req).await.unwrap();
        assert_eq!(out.error().unwrap().code, ErrorCode::InvalidParams.code());
        assert_eq!(out.id(), Some(&RequestId::from(2)));
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let dispatcher = Dispatcher::new(StubCalendar::default());
        let out = dispatcher
            .handle(call("tools/call", json!({"name": "list_calendars"})))
            .await
            .unwrap();
        let error = out.error().unwrap();
        assert_eq!(error.code, ErrorCode::InvalidParams.code());
        assert_eq!(error.message, "Unknown tool: list_calendars");
    }

    #[tokio::test]
    async fn wrong_argument_type_reports_detail() {
        let dispatcher = Dispatcher::new(StubCalendar::default());
        let out = dispatcher
            .handle(call(
                "tools/call",
                json!({"name": "delete_event", "arguments": {"event_id": 42}}),
            ))
            .await
            .unwrap();
        let error = out.error().unwrap();
        assert_eq!(error.code, ErrorCode::InvalidParams.code());
        assert!(error.data.is_some());
        assert!(dispatcher.calendar().calendar_ids.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn calendar_id_is_forwarded() {
        let dispatcher = Dispatcher::new(StubCalendar::default());
        dispatcher
            .handle(call(
                "tools/call",
                json!({"name": "list_events", "arguments": {"calendar_id": "team"}}),
            ))
            .await
            .unwrap();
        dispatcher
            .handle(call("tools/call", json!({"name": "list_events"})))
            .await
            .unwrap();

        let ids = dispatcher.calendar().calendar_ids.lock().unwrap().clone();
        assert_eq!(ids, vec![Some("team".to_string()), None]);
    }

    #[tokio::test]
    async fn calendar_failure_is_flagged_result() {
        let dispatcher = Dispatcher::new(StubCalendar {
            fail: true,
            ..StubCalendar::default()
        });
        let out = dispatcher
            .handle(call(
                "tools/call",
                json!({"name": "delete_event", "arguments": {"event_id": "gone"}}),
            ))
            .await
            .unwrap();

        let result = out.result().unwrap();
        assert_eq!(result["isError"], json!(true));
        assert_eq!(
            result["content"][0]["text"],
            "Error: calendar API returned HTTP 404: Not Found"
        );
    }

    #[tokio::test]
    async fn handle_line_reports_parse_errors() {
        let dispatcher = Dispatcher::new(StubCalendar::default());
        let out = dispatcher.handle_line("{not json").await.unwrap();
        assert_eq!(out.error().unwrap().code, ErrorCode::ParseError.code());
        assert!(out.id().is_none());
    }
}
