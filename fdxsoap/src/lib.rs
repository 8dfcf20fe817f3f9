//! # fdxsoap - Contrat commun des web services XML FedEx
//!
//! Cette crate regroupe ce qui est partagé par toutes les opérations FedEx
//! (annulation d'enlèvement, tarifs, étiquettes...) :
//!
//! - Vérification des paramètres obligatoires avant tout appel réseau
//! - Construction du document XML (authentification, client, version)
//! - Transport HTTP synchrone (`ureq`)
//! - Normalisation de la réponse en arbre de clés snake_case
//! - Classification de l'issue (sévérité ou SOAP fault)
//! - Journal d'audit de chaque échange
//!
//! ## Architecture
//!
//! - [`FedexClient`] : exécute une [`Operation`]
//! - [`Operation`] : champs et clé de réponse propres à une opération
//! - [`Transport`] : envoi du document ([`UreqTransport`] par défaut)
//! - [`AuditSink`] : destination des enregistrements d'audit
//! - [`FedexError`] : erreurs typées
//!
//! ## Example
//!
//! ```ignore
//! use fdxconfig::Config;
//! use fdxsoap::FedexClient;
//!
//! let config = Config::load_config("")?;
//! let client = FedexClient::from_config(&config)?;
//! let reply = client.call(&my_operation)?;
//! println!("{}", reply.highest_severity);
//! ```

pub mod audit;
pub mod builder;
pub mod classify;
pub mod client;
pub mod error;
pub mod normalize;
pub mod reply;
pub mod transport;
pub mod validate;

pub use audit::{
    AuditRecord, AuditSink, JsonLinesAuditSink, MemoryAuditSink, Requester, TracingAuditSink,
};
pub use builder::{Service, build_request_document, push_optional_text, push_text};
pub use classify::{FaultDetail, Outcome, classify, outcome};
pub use client::{FedexClient, Operation};
pub use error::{FedexError, Result};
pub use normalize::{Node, normalize_document, normalize_str, underscore};
pub use reply::{FromReply, Notification, Reply, Severity, TransactionDetail, VersionId};
pub use transport::{HttpReply, Transport, UreqTransport};
pub use validate::require;
