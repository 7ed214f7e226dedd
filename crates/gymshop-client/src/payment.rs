//! Payment gateway hand-off, return verification and order creation.
//!
//! The client never talks to a gateway directly. It asks the API for a
//! redirect URL, and on return forwards the gateway's raw query parameters to
//! the API for verification.

use std::collections::BTreeMap;

use gymshop_core::{NewOrder, Order, PaymentGateway};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::client::StorefrontClient;
use crate::error::ApiError;

const CREATE_CHECKOUT_PATH: &str = "api/payment/create-checkout";
const VERIFY_VNPAY_PATH: &str = "api/payment/verify-checkout";
const VERIFY_MOMO_PATH: &str = "api/payment/momo-callback";
const CREATE_ORDER_PATH: &str = "api/order/create";

/// Body of `POST api/payment/create-checkout`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub gateway: PaymentGateway,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub order_ref: String,
    pub return_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRedirect {
    pub payment_url: String,
}

/// Result of VNPay return verification.
#[derive(Debug, Clone, Deserialize)]
pub struct VnpayVerification {
    pub checked: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of MoMo return verification. `resultCode == 0` means paid.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoVerification {
    pub result_code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

impl MomoVerification {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }
}

impl StorefrontClient {
    /// Asks the API for the gateway page to redirect the customer to.
    ///
    /// # Errors
    ///
    /// [`ApiError`] on transport, status or decoding failure.
    pub async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutRedirect, ApiError> {
        self.send_body(Method::POST, CREATE_CHECKOUT_PATH, request)
            .await
    }

    /// Forwards VNPay return parameters unchanged for verification.
    ///
    /// # Errors
    ///
    /// [`ApiError`] on transport, status or decoding failure.
    pub async fn verify_vnpay(
        &self,
        query: &BTreeMap<String, String>,
    ) -> Result<VnpayVerification, ApiError> {
        self.send_body(Method::POST, VERIFY_VNPAY_PATH, query).await
    }

    /// Forwards MoMo return parameters unchanged for verification.
    ///
    /// # Errors
    ///
    /// [`ApiError`] on transport, status or decoding failure.
    pub async fn verify_momo(
        &self,
        query: &BTreeMap<String, String>,
    ) -> Result<MomoVerification, ApiError> {
        self.send_body(Method::POST, VERIFY_MOMO_PATH, query).await
    }

    /// # Errors
    ///
    /// [`ApiError`] on transport, status or decoding failure.
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let created: Order = self
            .send_body(Method::POST, CREATE_ORDER_PATH, order)
            .await?;
        tracing::info!(
            order_id = created.id,
            customer_id = order.customer_id,
            gateway = %order.payment_method,
            "order created"
        );
        Ok(created)
    }
}
