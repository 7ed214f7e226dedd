use serde::{Deserialize, Serialize};

/// A customer's delivery address. At most one per customer has `is_default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i64,
    pub address: String,
    pub phone: String,
    pub ward: String,
    pub district: String,
    pub city: String,
    #[serde(with = "crate::flag")]
    pub is_default: bool,
    pub customer_id: i64,
}

impl Address {
    /// One-line rendering, street to city.
    #[must_use]
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.address, self.ward, self.district, self.city
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub address: String,
    pub phone: String,
    pub ward: String,
    pub district: String,
    pub city: String,
    pub customer_id: i64,
    #[serde(with = "crate::flag")]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(
        with = "crate::flag::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_default: Option<bool>,
}

impl AddressPatch {
    #[must_use]
    pub fn mark_default() -> Self {
        Self {
            is_default: Some(true),
            ..Self::default()
        }
    }
}

/// The address flagged default, if any.
#[must_use]
pub fn default_address(addresses: &[Address]) -> Option<&Address> {
    addresses.iter().find(|a| a.is_default)
}
