// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for control-plane communication.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP(S) and WebSocket(S) connections for production
//! - Mock transports for unit testing
//!
//! The transport owns the credentials, the TLS-backed clients, and the single
//! session timeout; everything above it only sees paths and byte streams.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{
    HeaderValue, AUTHORIZATION, SEC_WEBSOCKET_PROTOCOL,
};
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The configured base URL (or a derived URL) is unusable.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The server answered a plain request with a non-success status.
    #[error("server returned status {code}: {body}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body, as far as it could be read.
        body: String,
    },
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// A stream of decoded text lines from a long-lived HTTP response.
///
/// One call yields one line; the transport never reads ahead of the consumer
/// beyond the chunk the HTTP client already delivered.
pub trait LineStream: Send {
    /// Returns the next line, or `None` on clean end of stream.
    fn next_line(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<String>>> + Send + '_>>;
}

/// A bidirectional stream of raw WebSocket frames.
pub trait FrameSocket: Send {
    /// Sends one binary frame.
    fn send(
        &mut self,
        frame: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Receives the next frame's bytes, or `None` when the peer closed.
    fn recv(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<Vec<u8>>>> + Send + '_>>;

    /// Closes the connection.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;
}

/// Transport trait for control-plane communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync {
    /// Performs a signed unary request and returns the response body.
    fn request(
        &self,
        method: &str,
        path_and_query: &str,
        body: Option<String>,
        content_type: Option<&str>,
    ) -> Pin<Box<dyn Future<Output = TransportResult<String>> + Send + '_>>;

    /// Opens a streaming GET and returns its line stream.
    fn open_stream(
        &self,
        path_and_query: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Box<dyn LineStream>>> + Send + '_>>;

    /// Upgrades to a WebSocket and returns its frame socket.
    fn open_channels(
        &self,
        path_and_query: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Box<dyn FrameSocket>>> + Send + '_>>;

    /// The single timeout governing every session opened through this
    /// transport. There is no per-call override.
    fn timeout(&self) -> Duration;
}

/// Configuration for the HTTP/WebSocket transport.
///
/// Credentials and TLS material are read-only once built and are safely
/// shared across any number of sequential or concurrent calls.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base HTTP(S) URL of the control plane.
    pub base_url: String,
    /// Bearer token attached to every request, if set.
    pub token: Option<String>,
    /// Session timeout in seconds, inherited by every exec/attach call.
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            base_url: "http://localhost:8080".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// WebSocket sub-protocol spoken on multiplexed channel connections.
const CHANNEL_PROTOCOL: &str = "channel.k8s.io";

/// Transport implementation using reqwest and tokio-tungstenite.
pub struct HttpTransport {
    http: reqwest::Client,
    config: TransportConfig,
}

impl HttpTransport {
    /// Creates a transport with a freshly built HTTP client.
    pub fn new(config: TransportConfig) -> TransportResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        Ok(HttpTransport { http, config })
    }

    /// Creates a transport wrapping an existing, pre-configured client.
    ///
    /// Use this when TLS material or extra middleware was already set up on
    /// the reqwest client.
    pub fn with_client(http: reqwest::Client, config: TransportConfig) -> Self {
        HttpTransport { http, config }
    }

    /// The transport's configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn http_url(&self, path_and_query: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path_and_query.trim_start_matches('/')
        )
    }

    /// Derives the WebSocket endpoint from the HTTP(S) base URL.
    ///
    /// The scheme is always rewritten (`http` to `ws`, `https` to `wss`) so
    /// that channel connections keep TLS parity with the REST transport; an
    /// independently specified ws scheme is never accepted.
    fn ws_url(&self, path_and_query: &str) -> TransportResult<String> {
        let url = self.http_url(path_and_query);
        let mut parsed =
            url::Url::parse(&url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let scheme = match parsed.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => {
                return Err(TransportError::InvalidUrl(format!(
                    "base url must be http or https, got {other}"
                )))
            }
        };
        parsed
            .set_scheme(scheme)
            .map_err(|()| TransportError::InvalidUrl(format!("cannot rewrite scheme to {scheme}")))?;

        Ok(parsed.to_string())
    }
}

impl Transport for HttpTransport {
    fn request(
        &self,
        method: &str,
        path_and_query: &str,
        body: Option<String>,
        content_type: Option<&str>,
    ) -> Pin<Box<dyn Future<Output = TransportResult<String>> + Send + '_>> {
        let url = self.http_url(path_and_query);
        let method = match method.to_uppercase().as_str() {
            "POST" => reqwest::Method::POST,
            "PUT" => reqwest::Method::PUT,
            "DELETE" => reqwest::Method::DELETE,
            "PATCH" => reqwest::Method::PATCH,
            _ => reqwest::Method::GET,
        };
        let content_type = content_type.map(str::to_string);

        Box::pin(async move {
            let mut req = self.http.request(method, &url);
            if let Some(token) = &self.config.token {
                req = req.bearer_auth(token);
            }
            if let Some(ct) = content_type {
                req = req.header(reqwest::header::CONTENT_TYPE, ct);
            }
            if let Some(body) = body {
                req = req.body(body);
            }

            let response = req
                .send()
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let code = response.status().as_u16();
            let text = response
                .text()
                .await
                .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;

            if !(200..300).contains(&code) {
                return Err(TransportError::Status { code, body: text });
            }
            Ok(text)
        })
    }

    fn open_stream(
        &self,
        path_and_query: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Box<dyn LineStream>>> + Send + '_>> {
        let url = self.http_url(path_and_query);

        Box::pin(async move {
            debug!("opening watch stream: {}", url);

            // Compression would buffer ahead of the consumer; the client-level
            // timeout would kill long-lived streams, so it is overridden here
            // and stream lifetime is bounded by the caller's deadline instead.
            let mut req = self
                .http
                .get(&url)
                .header(reqwest::header::ACCEPT_ENCODING, "identity")
                .timeout(Duration::from_secs(86400));
            if let Some(token) = &self.config.token {
                req = req.bearer_auth(token);
            }

            let response = req
                .send()
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let code = response.status().as_u16();
            if !(200..300).contains(&code) {
                let body = response.text().await.unwrap_or_default();
                return Err(TransportError::Status { code, body });
            }

            Ok(Box::new(HttpLineStream::new(response.bytes_stream())) as Box<dyn LineStream>)
        })
    }

    fn open_channels(
        &self,
        path_and_query: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Box<dyn FrameSocket>>> + Send + '_>> {
        let url = self.ws_url(path_and_query);

        Box::pin(async move {
            let url = url?;
            debug!("opening channel socket: {}", url);

            let mut request = url
                .as_str()
                .into_client_request()
                .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
            request.headers_mut().insert(
                SEC_WEBSOCKET_PROTOCOL,
                HeaderValue::from_static(CHANNEL_PROTOCOL),
            );
            if let Some(token) = &self.config.token {
                let value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
                request.headers_mut().insert(AUTHORIZATION, value);
            }

            let (ws_stream, _) = tokio_tungstenite::connect_async(request)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            Ok(Box::new(WebSocketChannels { sink, stream }) as Box<dyn FrameSocket>)
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }
}

/// Buffered line splitter over an HTTP byte-chunk stream.
///
/// Holds partial lines across chunk boundaries; a final unterminated line is
/// delivered when the stream ends.
struct HttpLineStream {
    stream: Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>,
    buffer: Vec<u8>,
    done: bool,
}

impl HttpLineStream {
    fn new(
        stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        HttpLineStream {
            stream: Box::pin(stream),
            buffer: Vec::new(),
            done: false,
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

impl LineStream for HttpLineStream {
    fn next_line(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<String>>> + Send + '_>> {
        Box::pin(async move {
            loop {
                if let Some(line) = self.take_line() {
                    return Ok(Some(line));
                }
                if self.done {
                    if self.buffer.is_empty() {
                        return Ok(None);
                    }
                    let rest = String::from_utf8_lossy(&self.buffer).into_owned();
                    self.buffer.clear();
                    return Ok(Some(rest));
                }

                match self.stream.next().await {
                    Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => {
                        self.done = true;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                    None => self.done = true,
                }
            }
        })
    }
}

/// Internal WebSocket connection wrapper.
struct WebSocketChannels {
    sink: futures_util::stream::SplitSink<
        tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
        Message,
    >,
    stream: futures_util::stream::SplitStream<
        tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    >,
}

impl FrameSocket for WebSocketChannels {
    fn send(
        &mut self,
        frame: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            self.sink
                .send(Message::Binary(frame.into()))
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;

            // Flush so connection failures surface on the write that caused them.
            self.sink
                .flush()
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;

            Ok(())
        })
    }

    fn recv(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<Vec<u8>>>> + Send + '_>> {
        Box::pin(async move {
            loop {
                match self.stream.next().await {
                    Some(Ok(Message::Binary(data))) => return Ok(Some(data.to_vec())),
                    Some(Ok(Message::Text(text))) => return Ok(Some(text.as_bytes().to_vec())),
                    Some(Ok(Message::Close(_))) => return Ok(None),
                    Some(Ok(_)) => {
                        // Ignore ping/pong and raw frames, keep waiting.
                        continue;
                    }
                    Some(Err(e)) => return Err(TransportError::ReceiveFailed(e.to_string())),
                    None => return Ok(None),
                }
            }
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            self.sink
                .close()
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
