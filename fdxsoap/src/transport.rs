use crate::error::{FedexError, Result};
use std::io::BufReader;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;
use xmltree::Element;

/// Result of an HTTP exchange:
/// - HTTP status code
/// - raw body (always)
/// - parsed XML document if parsing succeeded
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub raw_body: String,
    pub document: Option<Element>,
}

impl HttpReply {
    /// Builds a reply from a raw body, parsing it on a best-effort basis.
    pub fn new(status: u16, raw_body: String) -> Self {
        let document = Element::parse(BufReader::new(raw_body.as_bytes())).ok();
        Self {
            status,
            raw_body,
            document,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One synchronous POST of an XML document.
///
/// Implementations must not retry.
pub trait Transport: Send + Sync {
    fn post_xml(&self, url: &str, body: &str) -> Result<HttpReply>;
}

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Agent that does NOT treat 4xx/5xx as errors: SOAP faults come back
    /// with HTTP 500 and their body must still be read.
    pub fn new() -> Self {
        let config = Agent::config_builder().http_status_as_error(false).build();
        Self {
            agent: config.into(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: config.into(),
        }
    }

    /// Uses a caller-provided agent. It should be built with
    /// `http_status_as_error(false)` for faults to be readable.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn post_xml(&self, url: &str, body: &str) -> Result<HttpReply> {
        let mut response = self
            .agent
            .post(url)
            .header("Content-Type", "application/xml")
            .send(body.to_string())
            .map_err(|e| FedexError::Transport(format!("POST {url} failed: {e}")))?;

        let status = response.status().as_u16();

        let raw_body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| FedexError::Transport(format!("failed to read response body: {e}")))?;

        debug!(url, status, bytes = raw_body.len(), "Received FedEx response");

        Ok(HttpReply::new(status, raw_body))
    }
}
