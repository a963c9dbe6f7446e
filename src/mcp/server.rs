//! MCP server main loop.
//!
//! Reads one line at a time from the transport, hands it to the
//! [`Dispatcher`] and writes back whatever it returns. A request is fully
//! handled, including any calendar calls, before the next line is read.
//! The loop ends at end of input or on SIGINT/SIGTERM (Ctrl+C on Windows).

use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, Stdin, Stdout};

use crate::calendar::CalendarService;
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::protocol::JsonRpcError;
use crate::mcp::transport::StdioTransport;

/// The MCP server for Google Calendar.
pub struct McpServer<C, R = BufReader<Stdin>, W = Stdout> {
    dispatcher: Dispatcher<C>,
    transport: StdioTransport<R, W>,
}

impl<C: CalendarService> McpServer<C> {
    /// Creates a server on stdio over the given calendar adapter.
    #[must_use]
    pub fn new(calendar: C) -> Self {
        Self::with_transport(calendar, StdioTransport::new())
    }
}

impl<C, R, W> McpServer<C, R, W>
where
    C: CalendarService,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server over an explicit transport.
    #[must_use]
    pub const fn with_transport(calendar: C, transport: StdioTransport<R, W>) -> Self {
        Self {
            dispatcher: Dispatcher::new(calendar),
            transport,
        }
    }

    /// Returns the request dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher<C> {
        &self.dispatcher
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, shutting down");
                Ok(())
            }

            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, shutting down");
                Ok(())
            }

            result = self.serve() => result,
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                Ok(())
            }

            result = self.serve() => result,
        }
    }

    /// Serves requests until the input ends.
    ///
    /// Blank lines are skipped. Every other line produces at most one output
    /// line, written and flushed before the next line is read. Lines that are
    /// not UTF-8 are answered with a parse error.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the transport fails.
    pub async fn serve(&mut self) -> std::io::Result<()> {
        while let Some(line) = self.transport.read_line().await? {
            let reply = match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.dispatcher.handle_line(&line).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Rejected line that is not UTF-8");
                    Some(JsonRpcError::parse_error(e.to_string()).into())
                }
            };

            if let Some(message) = reply {
                self.transport.write_message(&message).await?;
            }
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Consumes the server, returning its transport.
    pub fn into_transport(self) -> StdioTransport<R, W> {
        self.transport
    }
}
