use serde::{Deserialize, Serialize};

/// Fully assembled notification email, ready for the transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub reply_to: String,
}

/// Provider acknowledgement, returned verbatim to the submitting client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub id: String,
}
