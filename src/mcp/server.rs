//! MCP stdio server: read loop, per-call tasks and a single writer.

use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::mcp::codec::{read_frame, write_frame, Frame};
use crate::mcp::protocol::{error_response, success_response, Incoming, RpcError};
use crate::mcp::router::{route_notification, route_request};
use crate::tools::ToolRegistry;
use crate::types::ServerConfig;

/// Bounded queue between handlers and the writer task.
const OUTBOUND_CAPACITY: usize = 64;

/// MCP server wrapping the tool registry.
#[derive(Debug)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    config: ServerConfig,
    cancel: CancellationToken,
}

impl McpServer {
    pub fn new(registry: Arc<ToolRegistry>, config: ServerConfig) -> Self {
        Self {
            registry,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Serve over the process's stdin/stdout.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Run until EOF on `reader`, cancellation, or a fatal write error.
    ///
    /// `tools/call` requests run on their own tasks so a slow API call does
    /// not hold up other requests; everything else is answered inline. All
    /// responses go through one writer task. In-flight calls are awaited
    /// before returning.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut reader = BufReader::new(reader);
        let (tx, mut rx) = mpsc::channel::<Value>(OUTBOUND_CAPACITY);

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(message) = rx.recv().await {
                write_frame(&mut writer, &message).await?;
            }
            Ok::<(), std::io::Error>(())
        });

        let mut in_flight = JoinSet::new();
        let max_bytes = self.config.max_message_bytes;

        loop {
            let frame = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("MCP server shutting down");
                    break;
                }
                frame = read_frame(&mut reader, max_bytes) => frame?,
            };

            let bytes = match frame {
                None => {
                    tracing::info!("stdin closed, stopping MCP server");
                    break;
                }
                Some(Frame::Oversized(size)) => {
                    tracing::warn!(size, max_bytes, "Dropping oversized message");
                    let reply = error_response(
                        Value::Null,
                        RpcError::invalid_request(format!("Message too large: {} bytes", size)),
                    );
                    if tx.send(reply).await.is_err() {
                        break;
                    }
                    continue;
                }
                Some(Frame::Message(bytes)) => bytes,
            };
            if bytes.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            // Reap finished calls so the set does not grow unbounded.
            while in_flight.try_join_next().is_some() {}

            let reply = match serde_json::from_slice::<Value>(&bytes) {
                Err(e) => Some(error_response(Value::Null, RpcError::parse_error(e))),
                Ok(value) => match Incoming::classify(value) {
                    Err((id, err)) => Some(error_response(id, err)),
                    Ok(Incoming::Response) => None,
                    Ok(Incoming::Notification { method }) => {
                        route_notification(&method);
                        None
                    }
                    Ok(Incoming::Request { id, method, params }) if method == "tools/call" => {
                        let registry = self.registry.clone();
                        let config = self.config.clone();
                        let tx = tx.clone();
                        in_flight.spawn(async move {
                            let reply = respond(&registry, &config, id, &method, params).await;
                            if tx.send(reply).await.is_err() {
                                tracing::warn!("Writer closed before tool result could be sent");
                            }
                        });
                        None
                    }
                    Ok(Incoming::Request { id, method, params }) => {
                        Some(respond(&self.registry, &self.config, id, &method, params).await)
                    }
                },
            };

            if let Some(reply) = reply {
                if tx.send(reply).await.is_err() {
                    break;
                }
            }
        }

        while in_flight.join_next().await.is_some() {}
        drop(tx);

        writer_task
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Token that stops the server when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

async fn respond(
    registry: &ToolRegistry,
    config: &ServerConfig,
    id: Value,
    method: &str,
    params: Value,
) -> Value {
    match route_request(registry, config, method, params).await {
        Ok(result) => success_response(id, result),
        Err(err) => {
            tracing::debug!(method, code = err.code, "Request failed: {}", err.message);
            error_response(id, err)
        }
    }
}
