//! # fdxpickup - Annulation d'un enlèvement FedEx
//!
//! Opération `CancelPickup` du service `disp` (pickup v17) :
//!
//! - [`CancelPickupRequest`] : champs de la requête, vérifiés à la construction
//! - [`CancelPickupReply`] : vue typée de `cancel_pickup_reply`
//! - [`cancel_pickup`] : exécution via un [`FedexClient`]
//!
//! ## Example
//!
//! ```no_run
//! use fdxconfig::Config;
//! use fdxpickup::{CancelPickupRequest, cancel_pickup};
//! use fdxsoap::FedexClient;
//!
//! let config = Config::load_config("")?;
//! let client = FedexClient::from_config(&config)?;
//!
//! let request = CancelPickupRequest::builder()
//!     .schedule_date("2024-01-01")
//!     .pickup_confirmation_number("123")
//!     .location("AB")
//!     .build()?;
//!
//! let reply = cancel_pickup(&client, &request)?;
//! println!("{}", reply.highest_severity);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod reply;
pub mod request;

pub use reply::CancelPickupReply;
pub use request::{
    CANCEL_PICKUP_SERVICE, CancelPickupRequest, CancelPickupRequestBuilder, DEFAULT_CARRIER_CODE,
};

use fdxsoap::{FedexClient, Result, Transport};
use tracing::info;

/// Annule un enlèvement planifié
///
/// Erreurs : paramètres manquants (avant tout appel réseau), transport,
/// rejet FedEx ou SOAP fault, réponse inattendue.
pub fn cancel_pickup<T: Transport>(
    client: &FedexClient<T>,
    request: &CancelPickupRequest,
) -> Result<CancelPickupReply> {
    let reply = client.call(request)?;
    info!(
        confirmation = request.pickup_confirmation_number(),
        location = request.location(),
        severity = %reply.highest_severity,
        "Pickup cancelled"
    );
    Ok(reply)
}
