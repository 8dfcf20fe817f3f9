//! Typed view over a normalized FedEx reply.

use crate::error::{FedexError, Result};
use crate::normalize::Node;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity vocabulary used by FedEx replies and notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Success,
    Warning,
    Note,
    Error,
    Failure,
}

impl Severity {
    /// SUCCESS, WARNING and NOTE count as an overall success
    pub fn is_success(&self) -> bool {
        matches!(self, Severity::Success | Severity::Warning | Severity::Note)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARNING",
            Severity::Note => "NOTE",
            Severity::Error => "ERROR",
            Severity::Failure => "FAILURE",
        }
    }
}

impl FromStr for Severity {
    type Err = FedexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "SUCCESS" => Ok(Severity::Success),
            "WARNING" => Ok(Severity::Warning),
            "NOTE" => Ok(Severity::Note),
            "ERROR" => Ok(Severity::Error),
            "FAILURE" => Ok(Severity::Failure),
            other => Err(FedexError::MalformedResponse(format!(
                "unknown severity '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Notification {
    /// As received; see [`Notification::parsed_severity`]
    pub severity: Option<String>,
    pub source: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
    pub localized_message: Option<String>,
}

impl Notification {
    pub fn from_node(node: &Node) -> Result<Self> {
        Ok(Self {
            severity: owned_text(node, "severity"),
            source: owned_text(node, "source"),
            code: owned_text(node, "code"),
            message: owned_text(node, "message"),
            localized_message: owned_text(node, "localized_message"),
        })
    }

    /// `None` when absent or outside the known vocabulary
    pub fn parsed_severity(&self) -> Option<Severity> {
        self.severity.as_deref().and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TransactionDetail {
    pub customer_transaction_id: Option<String>,
}

/// Version echoed back by the service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VersionId {
    pub service_id: Option<String>,
    pub major: Option<u32>,
    pub intermediate: Option<u32>,
    pub minor: Option<u32>,
}

impl VersionId {
    fn from_node(node: &Node) -> Result<Self> {
        Ok(Self {
            service_id: owned_text(node, "service_id"),
            major: number(node, "major")?,
            intermediate: number(node, "intermediate")?,
            minor: number(node, "minor")?,
        })
    }
}

/// Fields shared by every FedEx reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub highest_severity: Severity,
    pub notifications: Vec<Notification>,
    pub transaction_detail: Option<TransactionDetail>,
    pub version: Option<VersionId>,
}

impl Reply {
    pub fn from_node(node: &Node) -> Result<Self> {
        let highest_severity = text(node, "highest_severity")
            .ok_or_else(|| {
                FedexError::MalformedResponse("reply has no highest_severity".to_string())
            })?
            .parse()?;

        let notifications = node
            .get("notifications")
            .map(Node::as_list)
            .unwrap_or_default()
            .into_iter()
            .map(Notification::from_node)
            .collect::<Result<Vec<_>>>()?;

        let transaction_detail = node.get("transaction_detail").map(|detail| TransactionDetail {
            customer_transaction_id: owned_text(detail, "customer_transaction_id"),
        });

        let version = node
            .get("version")
            .map(VersionId::from_node)
            .transpose()?;

        Ok(Self {
            highest_severity,
            notifications,
            transaction_detail,
            version,
        })
    }

    /// First notification message, if any
    pub fn first_message(&self) -> Option<&str> {
        self.notifications
            .iter()
            .find_map(|n| n.message.as_deref())
    }
}

/// Mapping from a reply node to an operation's typed result
pub trait FromReply: Sized {
    fn from_node(node: &Node) -> Result<Self>;
}

impl FromReply for Reply {
    fn from_node(node: &Node) -> Result<Self> {
        Reply::from_node(node)
    }
}

fn text<'a>(node: &'a Node, key: &str) -> Option<&'a str> {
    node.get(key).and_then(Node::as_text)
}

fn owned_text(node: &Node, key: &str) -> Option<String> {
    text(node, key).map(str::to_string)
}

fn number(node: &Node, key: &str) -> Result<Option<u32>> {
    text(node, key)
        .map(|t| {
            t.parse::<u32>().map_err(|_| {
                FedexError::MalformedResponse(format!("invalid {key} value: {t}"))
            })
        })
        .transpose()
}
