//! Normalisation des réponses XML FedEx
//!
//! La réponse (réponse normale ou SOAP fault) est convertie en un arbre de
//! [`Node`] dont les clés sont dérivées des noms de balises :
//! `HighestSeverity` devient `highest_severity`, `v17:Notifications` devient
//! `notifications`. Les balises sœurs répétées deviennent une liste ordonnée.

use crate::error::{FedexError, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::BufReader;
use xmltree::{Element, XMLNode};

static ACRONYM_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("static regex"));
static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("static regex"));

/// Valeur d'une réponse normalisée
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Élément vide
    Null,
    Text(String),
    Map(IndexMap<String, Node>),
    /// Balises sœurs répétées, dans l'ordre du document
    List(Vec<Node>),
}

impl Node {
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Suit un chemin de clés depuis ce noeud
    pub fn path(&self, keys: &[&str]) -> Option<&Node> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Vue liste : une valeur isolée est vue comme une liste d'un élément,
    /// `Null` comme une liste vide.
    pub fn as_list(&self) -> Vec<&Node> {
        match self {
            Node::List(items) => items.iter().collect(),
            Node::Null => Vec::new(),
            other => vec![other],
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        match self {
            Node::Map(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// Convertit un nom de balise en clé : préfixe de namespace retiré puis
/// conversion CamelCase → snake_case.
pub fn underscore(tag: &str) -> String {
    let local = tag.rsplit(':').next().unwrap_or(tag);
    let step = ACRONYM_BOUNDARY.replace_all(local, "${1}_${2}");
    let step = CAMEL_BOUNDARY.replace_all(&step, "${1}_${2}");
    step.replace('-', "_").to_lowercase()
}

/// Parse et normalise le corps brut d'une réponse
pub fn normalize_str(raw: &str) -> Result<Node> {
    let root = Element::parse(BufReader::new(raw.as_bytes()))
        .map_err(|e| FedexError::MalformedResponse(format!("response is not XML: {e}")))?;
    Ok(normalize_document(&root))
}

/// Normalise un document déjà parsé
///
/// Les enveloppes SOAP (`Envelope`/`Body`) sont retirées : la racine du
/// résultat est une table indexée par le premier élément du corps.
pub fn normalize_document(root: &Element) -> Node {
    let payload = unwrap_envelope(root);
    let mut map = IndexMap::new();
    map.insert(underscore(&payload.name), normalize_element(payload));
    Node::Map(map)
}

fn unwrap_envelope(root: &Element) -> &Element {
    if underscore(&root.name) != "envelope" {
        return root;
    }

    root.children
        .iter()
        .filter_map(XMLNode::as_element)
        .find(|e| underscore(&e.name) == "body")
        .and_then(|body| body.children.iter().find_map(XMLNode::as_element))
        .unwrap_or(root)
}

/// Normalise un élément et ses descendants (les attributs sont ignorés)
pub fn normalize_element(element: &Element) -> Node {
    let children: Vec<&Element> = element
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .collect();

    if children.is_empty() {
        return match element.get_text() {
            Some(text) if !text.trim().is_empty() => Node::Text(text.into_owned()),
            _ => Node::Null,
        };
    }

    let mut map: IndexMap<String, Node> = IndexMap::new();
    for child in children {
        let key = underscore(&child.name);
        let value = normalize_element(child);
        match map.get_mut(&key) {
            Some(Node::List(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, Node::Null);
                *existing = Node::List(vec![first, value]);
            }
            None => {
                map.insert(key, value);
            }
        }
    }
    Node::Map(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("HighestSeverity"), "highest_severity");
        assert_eq!(underscore("CancelPickupReply"), "cancel_pickup_reply");
        assert_eq!(underscore("v17:Notifications"), "notifications");
        assert_eq!(underscore("ValidationFailureDetail"), "validation_failure_detail");
        assert_eq!(underscore("HTTPResponseCode"), "http_response_code");
        assert_eq!(underscore("soapenv:Fault"), "fault");
        assert_eq!(underscore("reason"), "reason");
        assert_eq!(underscore("Address2-Line"), "address2_line");
    }

    #[test]
    fn test_normalize_reply() {
        let xml = r#"<?xml version="1.0"?>
<v17:CancelPickupReply xmlns:v17="http://fedex.com/ws/pickup/v17">
  <v17:HighestSeverity>SUCCESS</v17:HighestSeverity>
  <v17:Notifications>
    <v17:Severity>SUCCESS</v17:Severity>
    <v17:Code>0000</v17:Code>
    <v17:Message>Success</v17:Message>
  </v17:Notifications>
  <v17:Notifications>
    <v17:Severity>NOTE</v17:Severity>
    <v17:Message>Second</v17:Message>
  </v17:Notifications>
  <v17:TransactionDetail>
    <v17:CustomerTransactionId/>
  </v17:TransactionDetail>
</v17:CancelPickupReply>"#;

        let root = normalize_str(xml).unwrap();
        let reply = root.get("cancel_pickup_reply").unwrap();
        assert_eq!(reply.get("highest_severity").unwrap().as_text(), Some("SUCCESS"));

        let notifications = reply.get("notifications").unwrap().as_list();
        assert_eq!(notifications.len(), 2);
        assert_eq!(
            notifications[1].get("message").unwrap().as_text(),
            Some("Second")
        );
        assert_eq!(
            reply.path(&["transaction_detail", "customer_transaction_id"]),
            Some(&Node::Null)
        );
        assert_eq!(
            reply.keys(),
            vec!["highest_severity", "notifications", "transaction_detail"]
        );
    }

    #[test]
    fn test_normalize_soap_fault_envelope() {
        let xml = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Header/>
  <soapenv:Body>
    <soapenv:Fault>
      <faultcode>soapenv:Server</faultcode>
      <faultstring>Fault</faultstring>
      <detail>
        <con:fault xmlns:con="http://www.bea.com/wli/sb/context">
          <con:errorCode>BEA-380000</con:errorCode>
          <con:reason>Validation failed</con:reason>
          <con:details>
            <con1:ValidationFailureDetail xmlns:con1="http://www.bea.com/wli/sb/stages/transform/config">
              <con1:message>missing ScheduledDate</con1:message>
            </con1:ValidationFailureDetail>
          </con:details>
        </con:fault>
      </detail>
    </soapenv:Fault>
  </soapenv:Body>
</soapenv:Envelope>"#;

        let root = normalize_str(xml).unwrap();
        assert_eq!(root.keys(), vec!["fault"]);
        assert_eq!(
            root.path(&["fault", "detail", "fault", "reason"])
                .and_then(Node::as_text),
            Some("Validation failed")
        );
        assert_eq!(
            root.path(&[
                "fault",
                "detail",
                "fault",
                "details",
                "validation_failure_detail",
                "message"
            ])
            .and_then(Node::as_text),
            Some("missing ScheduledDate")
        );
    }

    #[test]
    fn test_leaf_text_is_kept_as_received() {
        let root = normalize_str(
            "<CancelPickupReply><Remarks>  ring twice </Remarks><Blank>   </Blank></CancelPickupReply>",
        )
        .unwrap();
        let reply = root.get("cancel_pickup_reply").unwrap();
        assert_eq!(reply.get("remarks").and_then(Node::as_text), Some("  ring twice "));
        assert_eq!(reply.get("blank"), Some(&Node::Null));
    }

    #[test]
    fn test_as_list_views() {
        assert!(Node::Null.as_list().is_empty());
        assert_eq!(Node::Text("x".into()).as_list().len(), 1);
    }

    #[test]
    fn test_not_xml() {
        let err = normalize_str("<html><body>oops").unwrap_err();
        assert!(matches!(err, FedexError::MalformedResponse(_)));
    }
}
