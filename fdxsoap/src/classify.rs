//! Classification d'une réponse normalisée : succès, rejet, SOAP fault ou forme inconnue

use crate::error::{FedexError, Result};
use crate::normalize::Node;
use crate::reply::Severity;

/// Détail d'un SOAP fault FedEx (`fault.detail.fault`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultDetail {
    pub reason: String,
    /// Messages `details.validation_failure_detail.message`, dans l'ordre
    pub messages: Vec<String>,
}

impl FaultDetail {
    /// `reason`, puis chaque message de validation préfixé par `--` sur sa propre ligne
    pub fn message(&self) -> String {
        if self.messages.is_empty() {
            return self.reason.clone();
        }
        format!("{}\n--{}", self.reason, self.messages.join("\n--"))
    }

    fn from_root(root: &Node) -> Option<Self> {
        let fault = root.path(&["fault", "detail", "fault"])?;
        let reason = fault.get("reason").and_then(Node::as_text)?.to_string();

        let messages = fault
            .path(&["details", "validation_failure_detail"])
            .map(Node::as_list)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|detail| detail.get("message").map(Node::as_list).unwrap_or_default())
            .filter_map(Node::as_text)
            .map(str::to_string)
            .collect();

        Some(Self { reason, messages })
    }
}

/// Issue d'un appel, une fois la réponse normalisée
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    /// Réponse de l'opération avec une sévérité acceptable
    Success(&'a Node),
    /// Réponse de l'opération avec une sévérité d'échec
    Rejected {
        severity: Option<String>,
        message: String,
    },
    /// SOAP fault
    Fault(FaultDetail),
    /// Aucune forme reconnue
    Unrecognized(String),
}

impl<'a> Outcome<'a> {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Outcome::Unrecognized(_))
    }

    pub fn into_result(self) -> Result<&'a Node> {
        match self {
            Outcome::Success(reply) => Ok(reply),
            Outcome::Rejected { message, .. } => Err(FedexError::carrier(message)),
            Outcome::Fault(detail) => Err(FedexError::carrier(detail.message())),
            Outcome::Unrecognized(description) => Err(FedexError::MalformedResponse(description)),
        }
    }
}

/// Détermine l'issue d'une réponse pour la clé de réponse d'une opération
/// (ex: `cancel_pickup_reply`).
pub fn outcome<'a>(root: &'a Node, reply_key: &str) -> Outcome<'a> {
    if let Some(reply) = root.get(reply_key) {
        let severity = reply.get("highest_severity").and_then(Node::as_text);
        let accepted = severity
            .and_then(|s| s.parse::<Severity>().ok())
            .is_some_and(|s| s.is_success());

        if accepted {
            return Outcome::Success(reply);
        }

        let message = reply
            .get("notifications")
            .and_then(|n| n.as_list().into_iter().next())
            .and_then(|first| first.get("message"))
            .and_then(Node::as_text);

        return match message {
            Some(message) => Outcome::Rejected {
                severity: severity.map(str::to_string),
                message: message.to_string(),
            },
            None => Outcome::Unrecognized(format!(
                "{reply_key} reported severity {} without a notification message",
                severity.unwrap_or("<none>")
            )),
        };
    }

    if let Some(detail) = FaultDetail::from_root(root) {
        return Outcome::Fault(detail);
    }

    Outcome::Unrecognized(format!(
        "expected {reply_key} or fault, found [{}]",
        root.keys().join(", ")
    ))
}

/// Raccourci : renvoie la réponse en cas de succès, l'erreur typée sinon
pub fn classify<'a>(root: &'a Node, reply_key: &str) -> Result<&'a Node> {
    outcome(root, reply_key).into_result()
}
