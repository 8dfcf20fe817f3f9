//! Construction des requêtes XML FedEx
//!
//! Chaque requête commence par trois blocs communs (authentification, client,
//! version) suivis des champs propres à l'opération.

use crate::error::Result;
use fdxconfig::{Credentials, Localization};
use xmltree::{Element, XMLNode};

/// Identité et version d'un service FedEx
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    /// Segment d'URL du namespace (ex: "pickup")
    pub domain: &'static str,
    /// Identifiant `ServiceId` du bloc version (ex: "disp")
    pub id: &'static str,
    pub major: u32,
    pub intermediate: u32,
    pub minor: u32,
}

impl Service {
    /// Namespace du document, ex: `http://fedex.com/ws/pickup/v17`
    pub fn namespace(&self) -> String {
        format!("http://fedex.com/ws/{}/v{}", self.domain, self.major)
    }
}

pub fn text_element(name: &str, value: &str) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(value.to_string()));
    elem
}

pub fn push_text(parent: &mut Element, name: &str, value: &str) {
    parent
        .children
        .push(XMLNode::Element(text_element(name, value)));
}

/// Ajoute l'élément seulement si la valeur est présente et non vide.
/// La valeur est émise telle quelle.
pub fn push_optional_text(parent: &mut Element, name: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        push_text(parent, name, value);
    }
}

fn push_element(parent: &mut Element, child: Element) {
    parent.children.push(XMLNode::Element(child));
}

pub fn add_web_authentication_detail(parent: &mut Element, credentials: &Credentials) {
    let mut user_credential = Element::new("UserCredential");
    push_text(&mut user_credential, "Key", credentials.key());
    push_text(&mut user_credential, "Password", credentials.password());

    let mut detail = Element::new("WebAuthenticationDetail");
    push_element(&mut detail, user_credential);
    push_element(parent, detail);
}

pub fn add_client_detail(
    parent: &mut Element,
    credentials: &Credentials,
    localization: &Localization,
) {
    let mut client = Element::new("ClientDetail");
    push_text(&mut client, "AccountNumber", credentials.account_number());
    push_text(&mut client, "MeterNumber", credentials.meter_number());

    let mut loc = Element::new("Localization");
    push_text(&mut loc, "LanguageCode", &localization.language_code);
    push_text(&mut loc, "LocaleCode", &localization.locale_code);
    push_element(&mut client, loc);

    push_element(parent, client);
}

pub fn add_version(parent: &mut Element, service: &Service) {
    let mut version = Element::new("Version");
    push_text(&mut version, "ServiceId", service.id);
    push_text(&mut version, "Major", &service.major.to_string());
    push_text(&mut version, "Intermediate", &service.intermediate.to_string());
    push_text(&mut version, "Minor", &service.minor.to_string());
    push_element(parent, version);
}

/// Construit le document complet d'une requête
///
/// # Arguments
///
/// * `root_name` - Élément racine (ex: "CancelPickupRequest")
/// * `service` - Service dont la version fixe le namespace et le bloc `Version`
/// * `fill` - Ajoute les champs propres à l'opération après les blocs communs
///
/// # Returns
///
/// Le XML sérialisé, identique octet pour octet pour une même entrée
pub fn build_request_document<F>(
    root_name: &str,
    service: &Service,
    credentials: &Credentials,
    localization: &Localization,
    fill: F,
) -> Result<String>
where
    F: FnOnce(&mut Element),
{
    let mut root = Element::new(root_name);
    root.attributes
        .insert("xmlns".to_string(), service.namespace());

    add_web_authentication_detail(&mut root, credentials);
    add_client_detail(&mut root, credentials, localization);
    add_version(&mut root, service);
    fill(&mut root);

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(false);
    root.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}
