//! Orders and the pending-order record staged across a gateway redirect.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::CartItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentGateway {
    Vnpay,
    Momo,
    Card,
    Paypal,
    Cash,
}

impl PaymentGateway {
    /// Whether checkout leaves the storefront for an external payment page.
    #[must_use]
    pub fn redirects(self) -> bool {
        !matches!(self, PaymentGateway::Cash)
    }
}

impl std::fmt::Display for PaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PaymentGateway::Vnpay => "vnpay",
            PaymentGateway::Momo => "momo",
            PaymentGateway::Card => "card",
            PaymentGateway::Paypal => "paypal",
            PaymentGateway::Cash => "cash",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub service_id: i64,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Body of `POST api/order/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_id: i64,
    pub address_id: Option<i64>,
    pub payment_method: PaymentGateway,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewOrder {
    /// Builds an order from the cart rows chosen for checkout.
    #[must_use]
    pub fn from_cart(
        customer_id: i64,
        address_id: Option<i64>,
        payment_method: PaymentGateway,
        items: &[CartItem],
    ) -> Self {
        let items: Vec<OrderItem> = items
            .iter()
            .map(|item| OrderItem {
                service_id: item.service_id,
                quantity: item.quantity,
                price: item.service_detail.price,
            })
            .collect();
        let total_amount = items
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum();
        Self {
            customer_id,
            address_id,
            payment_method,
            items,
            total_amount,
            note: None,
        }
    }
}

/// An order as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    #[serde(default)]
    pub status: Option<String>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Checkout intent kept locally between the redirect and the gateway callback.
///
/// `reference` travels in the gateway return URL so the callback can find the
/// record it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    pub reference: Uuid,
    pub gateway: PaymentGateway,
    pub order: NewOrder,
    pub created_at: DateTime<Utc>,
}

impl PendingOrder {
    #[must_use]
    pub fn new(gateway: PaymentGateway, order: NewOrder) -> Self {
        Self {
            reference: Uuid::new_v4(),
            gateway,
            order,
            created_at: Utc::now(),
        }
    }

    /// Storage key for this record.
    #[must_use]
    pub fn storage_key(reference: &Uuid) -> String {
        format!("pendingOrder:{reference}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::ServiceSummary;

    #[test]
    fn from_cart_totals_line_items() {
        let item = CartItem {
            id: 1,
            cart_id: 1,
            service_id: 7,
            quantity: 2,
            selected: true,
            service_detail: ServiceSummary {
                id: Some(7),
                name: "Yoga mat".into(),
                price: Decimal::from(100_000),
                images: vec![],
            },
        };
        let order = NewOrder::from_cart(42, Some(3), PaymentGateway::Vnpay, &[item]);
        assert_eq!(order.total_amount, Decimal::from(200_000));
        assert_eq!(order.items.len(), 1);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["paymentMethod"], "vnpay");
        assert_eq!(json["totalAmount"], 200_000.0);
    }

    #[test]
    fn pending_order_key_embeds_reference() {
        let pending = PendingOrder::new(
            PaymentGateway::Momo,
            NewOrder::from_cart(1, None, PaymentGateway::Momo, &[]),
        );
        assert_eq!(
            PendingOrder::storage_key(&pending.reference),
            format!("pendingOrder:{}", pending.reference)
        );
        assert!(PaymentGateway::Momo.redirects());
        assert!(!PaymentGateway::Cash.redirects());
    }
}
