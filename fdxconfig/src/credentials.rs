//! Identifiants du compte FedEx et sélection de l'environnement

use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

/// Test endpoint (sandbox).
pub const TEST_URL: &str = "https://wsbeta.fedex.com:443/xml";

/// Production endpoint.
pub const PRODUCTION_URL: &str = "https://ws.fedex.com:443/xml";

/// Environnement cible des appels web service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Sandbox FedEx (`wsbeta`)
    #[default]
    Test,
    /// Production FedEx
    Production,
}

impl Environment {
    /// URL par défaut de l'environnement
    pub fn default_url(&self) -> &'static str {
        match self {
            Environment::Test => TEST_URL,
            Environment::Production => PRODUCTION_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "test" | "sandbox" | "development" => Ok(Environment::Test),
            "production" | "live" => Ok(Environment::Production),
            other => Err(anyhow!("Unknown FedEx environment '{other}'")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifiants d'un compte FedEx
///
/// Immuable une fois construit : un même `Credentials` peut être partagé
/// entre plusieurs clients ou threads.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    password: String,
    account_number: String,
    meter_number: String,
    environment: Environment,
}

impl Credentials {
    /// Construit les identifiants en vérifiant qu'aucun champ n'est vide.
    ///
    /// # Errors
    ///
    /// L'erreur nomme tous les champs vides, pas seulement le premier.
    pub fn new(
        key: impl Into<String>,
        password: impl Into<String>,
        account_number: impl Into<String>,
        meter_number: impl Into<String>,
        environment: Environment,
    ) -> Result<Self> {
        let credentials = Self {
            key: key.into(),
            password: password.into(),
            account_number: account_number.into(),
            meter_number: meter_number.into(),
            environment,
        };

        let missing: Vec<&str> = [
            ("key", &credentials.key),
            ("password", &credentials.password),
            ("account_number", &credentials.account_number),
            ("meter_number", &credentials.meter_number),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(anyhow!(
                "Missing FedEx credential(s): {}",
                missing.join(", ")
            ));
        }

        Ok(credentials)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn meter_number(&self) -> &str {
        &self.meter_number
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("password", &"***")
            .field("account_number", &self.account_number)
            .field("meter_number", &self.meter_number)
            .field("environment", &self.environment)
            .finish()
    }
}

/// Marqueurs de langue et de région envoyés dans le bloc `ClientDetail`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localization {
    pub language_code: String,
    pub locale_code: String,
}

impl Default for Localization {
    fn default() -> Self {
        Self {
            language_code: "en".to_string(),
            locale_code: "us".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_aliases() {
        assert_eq!("sandbox".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!("LIVE".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_credentials_report_every_empty_field() {
        let err = Credentials::new("", "secret", " ", "118", Environment::Test).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("key"));
        assert!(msg.contains("account_number"));
        assert!(!msg.contains("password"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds =
            Credentials::new("k", "hunter2", "510087000", "118", Environment::Production).unwrap();
        let dbg = format!("{:?}", creds);
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("510087000"));
    }
}
