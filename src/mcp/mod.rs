//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes Google Calendar operations as MCP tools. The server
//! communicates over stdio transport using JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌──────────────┐    ┌──────────────┐    │
//! │   │  Transport  │───▶│  Dispatcher  │───▶│    Tools     │    │
//! │   │   (stdio)   │    │  (routing)   │    │ (arguments)  │    │
//! │   └─────────────┘    └──────────────┘    └──────────────┘    │
//! │          │                  │                   │            │
//! │          ▼                  ▼                   ▼            │
//! │   ┌──────────────────────────┐     ┌─────────────────────┐   │
//! │   │    JSON-RPC Messages     │     │   CalendarService   │   │
//! │   └──────────────────────────┘     └─────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod dispatcher;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use protocol::{
    parse_message, JsonRpcError, JsonRpcRequest, JsonRpcResponse, OutgoingMessage, RequestId,
    MCP_PROTOCOL_VERSION,
};
pub use server::McpServer;
pub use transport::StdioTransport;
