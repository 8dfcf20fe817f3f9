//! Vérification des paramètres obligatoires avant tout appel réseau

use crate::error::{FedexError, Result};

/// Checks that every named field carries a non-blank value.
///
/// All missing fields are reported at once, in input order.
pub fn require(fields: &[(&str, Option<&str>)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FedexError::missing_parameters(missing))
    }
}
