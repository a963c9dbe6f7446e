//! google-calendar-mcp: MCP server for AI-assisted Google Calendar management
//!
//! This library lets an AI assistant read and change a Google Calendar through
//! the Model Context Protocol.
//!
//! # Architecture
//!
//! - **Dispatcher**: parses JSON-RPC requests and routes them to five tools
//!   (`list_events`, `list_events_range`, `create_event`, `delete_event`,
//!   `edit_event`)
//! - **Calendar adapter**: the [`calendar::CalendarService`] trait, implemented
//!   against the Google Calendar v3 API
//!
//! # Modules
//!
//! - [`calendar`] - Calendar adapter trait and Google backend
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types
//! - [`mcp`] - MCP protocol implementation

pub mod calendar;
pub mod config;
pub mod error;
pub mod mcp;
