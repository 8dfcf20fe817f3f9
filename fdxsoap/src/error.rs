//! Gestion des erreurs pour les clients FedEx

use thiserror::Error;

/// Type Result personnalisé pour fdxsoap
pub type Result<T> = std::result::Result<T, FedexError>;

/// Erreurs possibles lors d'un appel au web service FedEx
#[derive(Error, Debug)]
pub enum FedexError {
    /// Un ou plusieurs paramètres obligatoires sont absents (aucun appel réseau n'a eu lieu)
    #[error("Missing required parameter(s): {}", fields.join(", "))]
    MissingParameter { fields: Vec<String> },

    /// Échec de connexion, de lecture, ou statut HTTP sans corps exploitable
    #[error("Transport error: {0}")]
    Transport(String),

    /// Le service a traité la requête mais l'a rejetée (sévérité ou SOAP fault)
    #[error("FedEx error: {message}")]
    Carrier { message: String },

    /// Réponse dont la forme n'est pas reconnue
    #[error("Malformed FedEx response: {0}")]
    MalformedResponse(String),

    /// Erreur de sérialisation de la requête XML
    #[error("XML error: {0}")]
    Xml(#[from] xmltree::Error),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl FedexError {
    pub fn missing_parameters<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FedexError::MissingParameter {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn carrier(message: impl Into<String>) -> Self {
        FedexError::Carrier {
            message: message.into(),
        }
    }

    /// Message renvoyé par FedEx, pour les erreurs métier uniquement
    pub fn carrier_message(&self) -> Option<&str> {
        match self {
            FedexError::Carrier { message } => Some(message),
            _ => None,
        }
    }
}
