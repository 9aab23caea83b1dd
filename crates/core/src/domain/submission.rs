use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::Category;

/// One form submission from the website, in the `{type, data}` wire envelope
/// the front end posts to `/api/send-email`.
///
/// The category-specific quote payload is bound to its tag at the type level,
/// so a mismatched or unknown `details` shape fails deserialization instead of
/// rendering empty fields into the notification email.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Submission {
    Contact(ContactSubmission),
    Quote(QuoteSubmission),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub contact_number: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteSubmission {
    pub personal: PersonalDetails,
    #[serde(flatten)]
    pub details: QuoteDetails,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "lowercase")]
pub enum QuoteDetails {
    Property(PropertyDetails),
    Vehicle(VehicleDetails),
    Business(BusinessDetails),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    #[serde(rename = "propertyAddress")]
    pub address: String,
    #[serde(rename = "propertyValue")]
    pub value: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleDetails {
    #[serde(rename = "vehicleMake")]
    pub make: String,
    #[serde(rename = "vehicleModel")]
    pub model: String,
    #[serde(rename = "vehicleYear")]
    pub year: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessDetails {
    #[serde(rename = "businessName")]
    pub name: String,
    pub industry: String,
    #[serde(rename = "numEmployees")]
    pub employee_count: u32,
}

impl QuoteDetails {
    pub fn category(&self) -> Category {
        match self {
            Self::Property(_) => Category::Property,
            Self::Vehicle(_) => Category::Vehicle,
            Self::Business(_) => Category::Business,
        }
    }
}

impl Submission {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Contact(_) => "contact",
            Self::Quote(_) => "quote",
        }
    }

    /// Subject line of the notification email.
    pub fn subject(&self) -> String {
        match self {
            Self::Contact(contact) => format!("New Web Inquiry: {}", contact.full_name),
            Self::Quote(quote) => format!(
                "New Quote Request ({}) - {} {}",
                quote.details.category(),
                quote.personal.first_name,
                quote.personal.last_name
            ),
        }
    }

    /// Submitter's address, used as the reply-to of the notification email.
    pub fn reply_to(&self) -> &str {
        match self {
            Self::Contact(contact) => &contact.email,
            Self::Quote(quote) => &quote.personal.email,
        }
    }
}
