use crate::audit::{AuditRecord, AuditSink, JsonLinesAuditSink, Requester, TracingAuditSink};
use crate::builder::{Service, build_request_document};
use crate::classify::outcome;
use crate::error::{FedexError, Result};
use crate::normalize::{normalize_document, normalize_str};
use crate::reply::FromReply;
use crate::transport::{HttpReply, Transport, UreqTransport};
use fdxconfig::{Config, Credentials, Localization};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use xmltree::Element;

/// One FedEx web service operation.
///
/// The operation only supplies its own fields; the authentication, client
/// and version blocks are added by [`FedexClient`].
pub trait Operation {
    type Reply: FromReply;

    /// Label written to the audit log (ex: "Cancel Pickup")
    const LABEL: &'static str;
    const SERVICE: Service;
    /// Root element of the request document (ex: "CancelPickupRequest")
    const ROOT_ELEMENT: &'static str;
    /// Normalized key of the reply element (ex: "cancel_pickup_reply")
    const REPLY_KEY: &'static str;

    /// Checks required fields before any network activity
    fn validate(&self) -> Result<()>;

    /// Appends the operation fields, in schema order
    fn write_body(&self, root: &mut Element);

    fn requester(&self) -> Option<&Requester> {
        None
    }
}

/// Client for the FedEx XML web services
///
/// Holds the immutable credentials; each [`call`](FedexClient::call) builds its
/// own document and performs its own HTTP exchange.
pub struct FedexClient<T: Transport = UreqTransport> {
    credentials: Credentials,
    localization: Localization,
    endpoint: String,
    debug: bool,
    transport: T,
    audit: Arc<dyn AuditSink>,
}

impl FedexClient<UreqTransport> {
    pub fn new(credentials: Credentials) -> Self {
        let endpoint = credentials.environment().default_url().to_string();
        Self {
            credentials,
            localization: Localization::default(),
            endpoint,
            debug: false,
            transport: UreqTransport::new(),
            audit: Arc::new(TracingAuditSink),
        }
    }

    /// Builds a client from the `fedex` and `audit` sections of the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = match config.get_timeout_secs()? {
            Some(secs) => UreqTransport::with_timeout(Duration::from_secs(secs)),
            None => UreqTransport::new(),
        };

        let audit: Arc<dyn AuditSink> = match config.get_audit_log_path()? {
            Some(path) => Arc::new(JsonLinesAuditSink::new(path)),
            None => Arc::new(TracingAuditSink),
        };

        Ok(Self::new(config.get_credentials()?)
            .with_transport(transport)
            .with_localization(config.get_localization()?)
            .with_endpoint(config.get_endpoint_url()?)
            .with_debug(config.get_debug()?)
            .with_audit_sink(audit))
    }
}

impl<T: Transport> FedexClient<T> {
    pub fn with_transport<U: Transport>(self, transport: U) -> FedexClient<U> {
        FedexClient {
            credentials: self.credentials,
            localization: self.localization,
            endpoint: self.endpoint,
            debug: self.debug,
            transport,
            audit: self.audit,
        }
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_localization(mut self, localization: Localization) -> Self {
        self.localization = localization;
        self
    }

    /// Logs every raw response body (at info level)
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Serializes the request document without sending it
    pub fn build_request<O: Operation>(&self, op: &O) -> Result<String> {
        op.validate()?;
        build_request_document(
            O::ROOT_ELEMENT,
            &O::SERVICE,
            &self.credentials,
            &self.localization,
            |root| op.write_body(root),
        )
    }

    /// Runs an operation: build, POST, audit, normalize, classify, map.
    pub fn call<O: Operation>(&self, op: &O) -> Result<O::Reply> {
        let request_body = self.build_request(op)?;

        debug!(operation = O::LABEL, url = %self.endpoint, "Sending FedEx request");
        let exchange = self.transport.post_xml(&self.endpoint, &request_body);

        let (status, response_body) = match &exchange {
            Ok(reply) => (Some(reply.status), Some(reply.raw_body.clone())),
            Err(_) => (None, None),
        };
        self.audit(AuditRecord::new(
            O::LABEL,
            request_body,
            response_body,
            status,
            op.requester().cloned(),
        ));

        let reply = exchange?;

        if self.debug {
            info!(
                operation = O::LABEL,
                status = reply.status,
                body = %reply.raw_body,
                "Raw FedEx response"
            );
        }

        self.interpret::<O>(&reply)
    }

    fn interpret<O: Operation>(&self, reply: &HttpReply) -> Result<O::Reply> {
        let root = match &reply.document {
            Some(document) => normalize_document(document),
            None if !reply.is_success() => {
                return Err(http_status_error(reply));
            }
            None => normalize_str(&reply.raw_body)?,
        };

        let result = outcome(&root, O::REPLY_KEY);

        // Faults arrive with HTTP 500; only an unrecognized body makes the status fatal
        if !reply.is_success() && !result.is_recognized() {
            return Err(http_status_error(reply));
        }

        let node = result.into_result()?;
        O::Reply::from_node(node)
    }

    fn audit(&self, record: AuditRecord) {
        if let Err(e) = self.audit.record(&record) {
            warn!(operation = %record.operation, error = %e, "Failed to record FedEx exchange");
        }
    }
}

fn http_status_error(reply: &HttpReply) -> FedexError {
    let excerpt: String = reply.raw_body.chars().take(200).collect();
    FedexError::Transport(format!("HTTP status {}: {}", reply.status, excerpt))
}
