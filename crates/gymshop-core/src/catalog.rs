//! Catalog records: bookable services, their variants and assignable staff,
//! plus the reference lists (brands, categories, suppliers, users) the
//! storefront filters by.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a booking type as assigned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingTypeId(pub i64);

impl BookingTypeId {
    pub const REGULAR: BookingTypeId = BookingTypeId(1);
    pub const BUNDLE: BookingTypeId = BookingTypeId(2);

    #[must_use]
    pub fn is_bundle(self) -> bool {
        self == Self::BUNDLE
    }
}

impl std::fmt::Display for BookingTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::REGULAR => write!(f, "regular"),
            Self::BUNDLE => write!(f, "bundle"),
            BookingTypeId(other) => write!(f, "type-{other}"),
        }
    }
}

/// A bookable service or purchasable item, with its variants and staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub booking_type_id: BookingTypeId,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub brand_id: Option<i64>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub staffs: Vec<Staff>,
}

impl Service {
    #[must_use]
    pub fn variant(&self, id: i64) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    #[must_use]
    pub fn staff(&self, id: i64) -> Option<&Staff> {
        self.staffs.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Overrides the service's booking type. Only a bundle override is honoured.
    #[serde(default)]
    pub booking_type_id: Option<BookingTypeId>,
    #[serde(default)]
    pub sizes: Vec<VariantSize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSize {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Wishlist row. `serviceDetail` is embedded when the API joins it in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: i64,
    pub customer_id: i64,
    pub service_id: i64,
    #[serde(default)]
    pub service_detail: Option<crate::cart::ServiceSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_parses_with_nested_variants() {
        let svc: Service = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Personal training",
            "price": 350000,
            "bookingTypeId": 1,
            "variants": [
                { "id": 70, "name": "10 sessions", "bookingTypeId": 2, "sizes": [] },
                { "id": 71, "name": "Single" }
            ],
            "staffs": [{ "id": 3, "name": "Lan" }]
        }))
        .unwrap();
        assert_eq!(svc.booking_type_id, BookingTypeId::REGULAR);
        assert_eq!(svc.variant(70).and_then(|v| v.booking_type_id), Some(BookingTypeId::BUNDLE));
        assert!(svc.variant(71).unwrap().booking_type_id.is_none());
        assert_eq!(svc.staff(3).map(|s| s.name.as_str()), Some("Lan"));
        assert_eq!(svc.price, Decimal::from(350_000));
    }

    #[test]
    fn booking_type_display() {
        assert_eq!(BookingTypeId::BUNDLE.to_string(), "bundle");
        assert_eq!(BookingTypeId(9).to_string(), "type-9");
    }
}
