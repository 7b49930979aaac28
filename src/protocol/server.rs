//! Newline-delimited JSON-RPC server
//!
//! Provides:
//! - A read loop over any `AsyncRead` (stdin in production)
//! - One task per request so slow tool calls never block the channel
//! - A single writer task so response lines never interleave

use std::sync::Arc;

use futures::StreamExt;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::codec::FramedRead;

use super::codec::{LineCodec, LineFrame};
use super::handler::RequestHandler;
use super::messages::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::error::{LawsError, Result};

/// Configuration for the protocol server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Capacity of the outbound response channel
    pub response_channel_capacity: usize,
    /// Longest accepted request line in bytes; longer lines are skipped
    /// without being buffered
    pub max_line_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            response_channel_capacity: 256,
            max_line_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }
}

/// Protocol server driving a `RequestHandler`
pub struct McpServer<H> {
    handler: Arc<H>,
    config: ServerConfig,
}

impl<H: RequestHandler + 'static> McpServer<H> {
    pub fn new(handler: H) -> Self {
        Self::with_config(handler, ServerConfig::default())
    }

    pub fn with_config(handler: H, config: ServerConfig) -> Self {
        Self {
            handler: Arc::new(handler),
            config,
        }
    }

    /// Serve on the process's stdin/stdout until stdin closes
    pub async fn serve_stdio(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve until `reader` reaches EOF, then wait for in-flight calls
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<JsonRpcResponse>(self.config.response_channel_capacity);
        let writer_task = tokio::spawn(write_responses(writer, rx));

        let mut frames = FramedRead::new(reader, LineCodec::with_max_length(self.config.max_line_bytes));
        let mut in_flight = JoinSet::new();

        while let Some(frame) = frames.next().await {
            let text = match frame? {
                LineFrame::Line(text) => text,
                LineFrame::Oversized => {
                    log::warn!("Dropping request line over {} bytes", self.config.max_line_bytes);
                    let error = JsonRpcError::invalid_request(format!(
                        "Message too large: limit is {} bytes",
                        self.config.max_line_bytes
                    ));
                    let _ = tx.send(JsonRpcResponse::error(Value::Null, error)).await;
                    continue;
                }
                LineFrame::Malformed(reason) => {
                    log::warn!("Parse error: {}", reason);
                    let error = JsonRpcError::parse_error(format!("Parse error: {}", reason));
                    let _ = tx.send(JsonRpcResponse::error(Value::Null, error)).await;
                    continue;
                }
            };

            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            match parse_request(text) {
                Ok(request) => {
                    let handler = Arc::clone(&self.handler);
                    let tx = tx.clone();
                    in_flight.spawn(async move {
                        if let Some(response) = handler.handle(request).await {
                            let _ = tx.send(response).await;
                        }
                    });
                }
                Err(response) => {
                    let _ = tx.send(response).await;
                }
            }

            while let Some(joined) = in_flight.try_join_next() {
                log_join(joined);
            }
        }

        log::info!("Input closed, waiting for {} in-flight request(s)", in_flight.len());
        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }

        drop(tx);
        writer_task
            .await
            .map_err(|e| LawsError::Io(std::io::Error::other(e)))?
    }
}

/// Parse one line; on failure, the error response to send back
fn parse_request(text: &str) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        log::warn!("Parse error: {}", e);
        JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error(format!("Parse error: {}", e)))
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::error(id, JsonRpcError::invalid_request(format!("Invalid request: {}", e)))
    })
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::Receiver<JsonRpcResponse>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_vec(&response)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}

fn log_join(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        log::error!("Request task failed: {}", e);
    }
}
