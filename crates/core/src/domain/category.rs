use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Insurance product line selected in the quote wizard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Property,
    Vehicle,
    Business,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown insurance category `{0}` (expected property|vehicle|business)")]
pub struct ParseCategoryError(pub String);

impl Category {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "property" => Some(Self::Property),
            "vehicle" => Some(Self::Vehicle),
            "business" => Some(Self::Business),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Vehicle => "vehicle",
            Self::Business => "business",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| ParseCategoryError(value.to_string()))
    }
}
