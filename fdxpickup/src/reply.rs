use fdxsoap::{FromReply, Node, Notification, Reply, Result, Severity, TransactionDetail, VersionId};
use serde::Serialize;

/// Réponse `CancelPickupReply`
///
/// Garde aussi le sous-arbre normalisé tel que reçu, pour les champs que
/// la vue typée n'expose pas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelPickupReply {
    pub highest_severity: Severity,
    pub notifications: Vec<Notification>,
    pub transaction_detail: Option<TransactionDetail>,
    pub version: Option<VersionId>,
    #[serde(skip)]
    raw: Node,
}

impl CancelPickupReply {
    /// Sous-arbre `cancel_pickup_reply` normalisé
    pub fn raw(&self) -> &Node {
        &self.raw
    }

    pub fn first_message(&self) -> Option<&str> {
        self.notifications
            .iter()
            .find_map(|n| n.message.as_deref())
    }
}

impl FromReply for CancelPickupReply {
    fn from_node(node: &Node) -> Result<Self> {
        let Reply {
            highest_severity,
            notifications,
            transaction_detail,
            version,
        } = Reply::from_node(node)?;

        Ok(Self {
            highest_severity,
            notifications,
            transaction_detail,
            version,
            raw: node.clone(),
        })
    }
}
