//! Cart rows and the client-side subtotal.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The slice of a service the API embeds in cart and wishlist rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub service_id: i64,
    pub quantity: u32,
    /// Server-side checkout inclusion flag.
    #[serde(with = "crate::flag")]
    pub selected: bool,
    pub service_detail: ServiceSummary,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.service_detail.price * Decimal::from(self.quantity)
    }
}

/// Sum of `price × quantity` over items whose id is in `selected_ids`.
#[must_use]
pub fn subtotal(items: &[CartItem], selected_ids: &BTreeSet<i64>) -> Decimal {
    items
        .iter()
        .filter(|item| selected_ids.contains(&item.id))
        .map(CartItem::line_total)
        .sum()
}

/// Body of `PATCH api/cart-item/update`. Unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemPatch {
    pub customer_id: i64,
    pub service_id: i64,
    #[serde(
        with = "crate::flag::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub selected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl CartItemPatch {
    #[must_use]
    pub fn selected(customer_id: i64, service_id: i64, selected: bool) -> Self {
        Self {
            customer_id,
            service_id,
            selected: Some(selected),
            quantity: None,
        }
    }

    #[must_use]
    pub fn quantity(customer_id: i64, service_id: i64, quantity: u32) -> Self {
        Self {
            customer_id,
            service_id,
            selected: None,
            quantity: Some(quantity),
        }
    }
}

/// Body of `POST api/cart-item/create`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub customer_id: i64,
    pub service_id: i64,
    pub quantity: u32,
}
