//! Requête d'annulation d'enlèvement (`CancelPickupRequest`)

use crate::reply::CancelPickupReply;
use fdxconfig::{Credentials, Localization};
use fdxsoap::{
    Operation, Requester, Result, Service, build_request_document, push_optional_text, push_text,
    require,
};
use xmltree::Element;

/// Code transporteur utilisé quand aucun n'est fourni (FedEx Express)
pub const DEFAULT_CARRIER_CODE: &str = "FDXE";

pub const CANCEL_PICKUP_SERVICE: Service = Service {
    domain: "pickup",
    id: "disp",
    major: 17,
    intermediate: 0,
    minor: 0,
};

/// Annulation d'un enlèvement planifié
///
/// Construite via [`CancelPickupRequest::builder`], qui vérifie tous les
/// champs obligatoires en une fois.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelPickupRequest {
    schedule_date: String,
    pickup_confirmation_number: String,
    location: String,
    carrier_code: Option<String>,
    remarks: Option<String>,
    requester: Option<Requester>,
}

impl CancelPickupRequest {
    /// Requête minimale (code transporteur par défaut, sans remarques)
    pub fn new(
        schedule_date: impl Into<String>,
        pickup_confirmation_number: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self> {
        Self::builder()
            .schedule_date(schedule_date)
            .pickup_confirmation_number(pickup_confirmation_number)
            .location(location)
            .build()
    }

    pub fn builder() -> CancelPickupRequestBuilder {
        CancelPickupRequestBuilder::default()
    }

    pub fn schedule_date(&self) -> &str {
        &self.schedule_date
    }

    pub fn pickup_confirmation_number(&self) -> &str {
        &self.pickup_confirmation_number
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Code transporteur effectif (`FDXE` par défaut)
    pub fn carrier_code(&self) -> &str {
        self.carrier_code.as_deref().unwrap_or(DEFAULT_CARRIER_CODE)
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }

    /// Sérialise la requête sans l'envoyer
    pub fn to_xml(&self, credentials: &Credentials, localization: &Localization) -> Result<String> {
        self.validate()?;
        build_request_document(
            Self::ROOT_ELEMENT,
            &Self::SERVICE,
            credentials,
            localization,
            |root| self.write_body(root),
        )
    }
}

/// Omitting the carrier code selects [`DEFAULT_CARRIER_CODE`]; an explicit
/// blank code is reported as missing.
fn check_required(
    schedule_date: Option<&str>,
    pickup_confirmation_number: Option<&str>,
    location: Option<&str>,
    carrier_code: Option<&str>,
) -> Result<()> {
    require(&[
        ("schedule_date", schedule_date),
        ("pickup_confirmation_number", pickup_confirmation_number),
        ("location", location),
        ("carrier_code", carrier_code.or(Some(DEFAULT_CARRIER_CODE))),
    ])
}

impl Operation for CancelPickupRequest {
    type Reply = CancelPickupReply;

    const LABEL: &'static str = "Cancel Pickup";
    const SERVICE: Service = CANCEL_PICKUP_SERVICE;
    const ROOT_ELEMENT: &'static str = "CancelPickupRequest";
    const REPLY_KEY: &'static str = "cancel_pickup_reply";

    fn validate(&self) -> Result<()> {
        check_required(
            Some(self.schedule_date.as_str()),
            Some(self.pickup_confirmation_number.as_str()),
            Some(self.location.as_str()),
            self.carrier_code.as_deref(),
        )
    }

    fn write_body(&self, root: &mut Element) {
        push_text(root, "CarrierCode", self.carrier_code());
        push_text(root, "PickupConfirmationNumber", &self.pickup_confirmation_number);
        push_text(root, "ScheduledDate", &self.schedule_date);
        push_text(root, "Location", &self.location);
        push_optional_text(root, "Remarks", self.remarks.as_deref());
    }

    fn requester(&self) -> Option<&Requester> {
        self.requester.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancelPickupRequestBuilder {
    schedule_date: Option<String>,
    pickup_confirmation_number: Option<String>,
    location: Option<String>,
    carrier_code: Option<String>,
    remarks: Option<String>,
    user_id: Option<String>,
    app_name: Option<String>,
}

impl CancelPickupRequestBuilder {
    /// Date de l'enlèvement, au format `YYYY-MM-DD`
    pub fn schedule_date(mut self, value: impl Into<String>) -> Self {
        self.schedule_date = Some(value.into());
        self
    }

    pub fn pickup_confirmation_number(mut self, value: impl Into<String>) -> Self {
        self.pickup_confirmation_number = Some(value.into());
        self
    }

    /// Code du site FedEx qui a confirmé l'enlèvement
    pub fn location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    pub fn carrier_code(mut self, value: impl Into<String>) -> Self {
        self.carrier_code = Some(value.into());
        self
    }

    pub fn remarks(mut self, value: impl Into<String>) -> Self {
        self.remarks = Some(value.into());
        self
    }

    pub fn user_id(mut self, value: impl Into<String>) -> Self {
        self.user_id = Some(value.into());
        self
    }

    pub fn app_name(mut self, value: impl Into<String>) -> Self {
        self.app_name = Some(value.into());
        self
    }

    pub fn build(self) -> Result<CancelPickupRequest> {
        check_required(
            self.schedule_date.as_deref(),
            self.pickup_confirmation_number.as_deref(),
            self.location.as_deref(),
            self.carrier_code.as_deref(),
        )?;

        Ok(CancelPickupRequest {
            schedule_date: self.schedule_date.unwrap_or_default(),
            pickup_confirmation_number: self.pickup_confirmation_number.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            carrier_code: self.carrier_code,
            remarks: self.remarks,
            requester: Requester::new(self.user_id, self.app_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fdxconfig::Environment;
    use fdxsoap::FedexError;

    fn credentials() -> Credentials {
        Credentials::new("KEY", "PASS", "510087000", "118695473", Environment::Test).unwrap()
    }

    fn xml(request: &CancelPickupRequest) -> String {
        request
            .to_xml(&credentials(), &Localization::default())
            .unwrap()
    }

    fn sample() -> CancelPickupRequestBuilder {
        CancelPickupRequest::builder()
            .schedule_date("2024-01-01")
            .pickup_confirmation_number("123")
            .location("AB")
    }

    #[test]
    fn test_concrete_scenario() {
        let request = sample().carrier_code("FDXE").build().unwrap();
        let xml = xml(&request);

        assert!(xml.contains("<PickupConfirmationNumber>123</PickupConfirmationNumber>"));
        assert!(xml.contains("<ScheduledDate>2024-01-01</ScheduledDate>"));
        assert!(!xml.contains("Remarks"));
    }

    #[test]
    fn test_field_order() {
        let request = sample().remarks("Back door").build().unwrap();
        let xml = xml(&request);

        let expected = "</Version><CarrierCode>FDXE</CarrierCode>\
            <PickupConfirmationNumber>123</PickupConfirmationNumber>\
            <ScheduledDate>2024-01-01</ScheduledDate>\
            <Location>AB</Location>\
            <Remarks>Back door</Remarks></CancelPickupRequest>";
        assert!(xml.contains(expected), "{xml}");
        assert!(xml.contains(r#"<CancelPickupRequest xmlns="http://fedex.com/ws/pickup/v17">"#));
    }

    #[test]
    fn test_default_and_explicit_carrier_code() {
        let default = xml(&sample().build().unwrap());
        assert!(default.contains("<CarrierCode>FDXE</CarrierCode>"));

        let ground = xml(&sample().carrier_code("FDXG").build().unwrap());
        assert!(ground.contains("<CarrierCode>FDXG</CarrierCode>"));
        assert!(!ground.contains("FDXE"));
    }

    #[test]
    fn test_remarks_omitted_when_blank() {
        for remarks in ["", "   "] {
            let request = sample().remarks(remarks).build().unwrap();
            assert!(!xml(&request).contains("Remarks"));
        }

        let request = sample().remarks("Ring twice").build().unwrap();
        assert!(xml(&request).contains("<Remarks>Ring twice</Remarks>"));
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let err = CancelPickupRequest::builder()
            .schedule_date("2024-01-01")
            .pickup_confirmation_number("123")
            .carrier_code("")
            .build()
            .unwrap_err();

        match err {
            FedexError::MissingParameter { fields } => {
                assert_eq!(fields, vec!["location", "carrier_code"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = CancelPickupRequest::builder().build().unwrap_err();
        match err {
            FedexError::MissingParameter { fields } => assert_eq!(
                fields,
                vec!["schedule_date", "pickup_confirmation_number", "location"]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_builder_is_idempotent() {
        let request = sample().remarks("x").build().unwrap();
        assert_eq!(xml(&request), xml(&request));
    }

    #[test]
    fn test_requester_identity() {
        let request = sample().user_id("u-1").app_name("dispatch").build().unwrap();
        let requester = request.requester().unwrap();
        assert_eq!(requester.user_id.as_deref(), Some("u-1"));
        assert_eq!(requester.app_name.as_deref(), Some("dispatch"));
        assert!(sample().build().unwrap().requester().is_none());
    }
}
