//! Blocking round-trip client for the code-execution service.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::protocol::{RunRequest, RunResponse};

/// Headroom added to the page's own timeout. The sandbox is expected to
/// enforce the page timeout itself; the client deadline only has to be at
/// least as large, and the margin absorbs connection setup and transfer.
const TIMEOUT_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Connection or transfer failure. Infrastructure-caused; terminal for
    /// this grading attempt, no retry.
    #[error("run service connection failed: {0}")]
    Io(#[from] std::io::Error),
    /// The service did not complete the round trip within the deadline.
    #[error("run service did not answer within {0:?}")]
    Timeout(Duration),
    /// The response could not be decoded, or carried an unknown result kind.
    /// A fatal configuration error, never mapped to a default score.
    #[error("run service protocol violation: {0}")]
    Protocol(String),
}

/// Client for one code-execution service endpoint. Cheap to clone; every
/// call opens its own connection.
#[derive(Debug, Clone)]
pub struct RunClient {
    host: String,
    port: u16,
}

impl RunClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Build a client from the process configuration.
    pub fn from_config() -> Self {
        let config = common::config::Config::get();
        Self::new(config.run_host.clone(), config.run_port)
    }

    /// Execute one request and decode the response.
    ///
    /// `page_timeout` is the timeout authored on the page descriptor; the
    /// whole round trip runs under that value plus a fixed grace margin.
    /// Expiry is reported as [`RunError::Timeout`].
    pub async fn run(
        &self,
        request: &RunRequest,
        page_timeout: Duration,
    ) -> Result<RunResponse, RunError> {
        let deadline = page_timeout + TIMEOUT_GRACE;
        match tokio::time::timeout(deadline, self.round_trip(request)).await {
            Ok(result) => result,
            Err(_) => Err(RunError::Timeout(deadline)),
        }
    }

    async fn round_trip(&self, request: &RunRequest) -> Result<RunResponse, RunError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| RunError::Protocol(format!("request did not encode: {e}")))?;

        log::debug!(
            "sending run request ({} bytes) to {}:{}",
            body.len(),
            self.host,
            self.port
        );

        let mut stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        stream.write_all(&body).await?;
        // Half-close the write side; the peer replies and then closes.
        stream.shutdown().await?;

        // The protocol has no length prefix: read until end-of-stream.
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await?;

        serde_json::from_slice(&raw)
            .map_err(|e| RunError::Protocol(format!("undecodable response: {e}")))
    }
}
