//! Checkout staging and payment-gateway returns.
//!
//! An order is only created after the gateway reports success. Until then it
//! lives in the local store as a [`PendingOrder`] keyed by a fresh reference;
//! that reference rides along in the gateway return URL so the return
//! handler can find the right record even with several checkouts open.

use std::collections::BTreeMap;
use std::sync::Arc;

use gymshop_client::{CheckoutRequest, StorefrontClient};
use gymshop_core::storage::{load_json, save_json};
use gymshop_core::{KeyValueStore, NewOrder, Order, PaymentGateway, PendingOrder};
use reqwest::Url;
use uuid::Uuid;

use crate::error::StorefrontError;
use crate::notify::{report, Notice, Notifier};

/// Query parameter carrying the pending-order reference through the gateway.
pub const ORDER_REF_PARAM: &str = "orderRef";

const PENDING_PREFIX: &str = "pendingOrder:";

#[derive(Debug, Clone)]
pub enum CheckoutStart {
    /// Send the customer to `payment_url`; the order is created on return.
    Redirect { reference: Uuid, payment_url: String },
    /// The gateway needs no redirect and the order already exists.
    Placed(Order),
}

#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    Success(Order),
    Failed { reason: String },
}

pub struct Checkout {
    client: Arc<StorefrontClient>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn KeyValueStore>,
    return_url: String,
}

impl Checkout {
    #[must_use]
    pub fn new(
        client: Arc<StorefrontClient>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn KeyValueStore>,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            notifier,
            store,
            return_url: return_url.into(),
        }
    }

    /// Starts payment for `order`.
    ///
    /// Redirecting gateways get a pending record and a redirect URL. Cash
    /// orders are created at once.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::Storage`] if the pending record cannot be written,
    /// [`StorefrontError::Api`] if the API refuses the checkout. A refused
    /// checkout removes its pending record again.
    pub async fn stage(
        &self,
        mut order: NewOrder,
        gateway: PaymentGateway,
    ) -> Result<CheckoutStart, StorefrontError> {
        order.payment_method = gateway;
        if !gateway.redirects() {
            let placed = self
                .client
                .create_order(&order)
                .await
                .map_err(|e| report(self.notifier.as_ref(), e))?;
            self.notifier.notify(Notice::success("Order placed"));
            return Ok(CheckoutStart::Placed(placed));
        }

        let pending = PendingOrder::new(gateway, order);
        let reference = pending.reference;
        let request = CheckoutRequest {
            gateway,
            amount: pending.order.total_amount,
            order_ref: reference.to_string(),
            return_url: self.return_url_for(&reference)?,
        };
        let key = PendingOrder::storage_key(&reference);
        save_json(self.store.as_ref(), &key, &pending)
            .map_err(|e| report(self.notifier.as_ref(), e))?;

        match self.client.create_checkout(&request).await {
            Ok(redirect) => {
                tracing::info!(%reference, %gateway, "checkout staged");
                Ok(CheckoutStart::Redirect {
                    reference,
                    payment_url: redirect.payment_url,
                })
            }
            Err(e) => {
                self.store.remove(&key)?;
                Err(report(self.notifier.as_ref(), e))
            }
        }
    }

    /// Verifies a VNPay return and, when paid, creates the staged order.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::Api`] when verification or order creation fails,
    /// [`StorefrontError::NotFound`] when the return names no known pending
    /// order.
    pub async fn handle_vnpay_return(
        &self,
        query: &BTreeMap<String, String>,
    ) -> Result<PaymentOutcome, StorefrontError> {
        let verification = self
            .client
            .verify_vnpay(query)
            .await
            .map_err(|e| report(self.notifier.as_ref(), e))?;
        if !verification.checked {
            return Ok(self.failed(verification.message, "VNPay payment was not completed"));
        }
        self.complete_from_query(query).await
    }

    /// Verifies a MoMo return; `resultCode == 0` means paid.
    ///
    /// # Errors
    ///
    /// As [`Checkout::handle_vnpay_return`].
    pub async fn handle_momo_return(
        &self,
        query: &BTreeMap<String, String>,
    ) -> Result<PaymentOutcome, StorefrontError> {
        let verification = self
            .client
            .verify_momo(query)
            .await
            .map_err(|e| report(self.notifier.as_ref(), e))?;
        if !verification.is_success() {
            return Ok(self.failed(verification.message, "MoMo payment was not completed"));
        }
        self.complete_from_query(query).await
    }

    /// Creates the order staged under `reference` and drops the record.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::NotFound`] without a pending record,
    /// [`StorefrontError::Api`] when creation fails (the record is kept so
    /// the return can be retried).
    pub async fn handle_complete(&self, reference: &Uuid) -> Result<PaymentOutcome, StorefrontError> {
        let key = PendingOrder::storage_key(reference);
        let Some(pending) = load_json::<PendingOrder>(self.store.as_ref(), &key)? else {
            return Err(report(
                self.notifier.as_ref(),
                StorefrontError::NotFound(format!("pending order {reference}")),
            ));
        };
        let order = self
            .client
            .create_order(&pending.order)
            .await
            .map_err(|e| report(self.notifier.as_ref(), e))?;
        self.store.remove(&key)?;
        tracing::info!(%reference, order_id = order.id, gateway = %pending.gateway, "pending order completed");
        self.notifier.notify(Notice::success("Payment successful"));
        Ok(PaymentOutcome::Success(order))
    }

    /// Discards the order staged under `reference`.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::Storage`] if the record cannot be removed.
    pub fn handle_cancel(&self, reference: &Uuid) -> Result<(), StorefrontError> {
        self.store.remove(&PendingOrder::storage_key(reference))?;
        tracing::info!(%reference, "pending order cancelled");
        self.notifier.notify(Notice::info("Payment cancelled"));
        Ok(())
    }

    /// # Errors
    ///
    /// [`StorefrontError::Storage`] on a read or decode failure.
    pub fn pending(&self, reference: &Uuid) -> Result<Option<PendingOrder>, StorefrontError> {
        Ok(load_json(
            self.store.as_ref(),
            &PendingOrder::storage_key(reference),
        )?)
    }

    /// Every staged order still waiting for a gateway return.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::Storage`] on a read or decode failure.
    pub fn pending_orders(&self) -> Result<Vec<PendingOrder>, StorefrontError> {
        let mut orders = Vec::new();
        for key in self.store.keys_with_prefix(PENDING_PREFIX)? {
            if let Some(pending) = load_json(self.store.as_ref(), &key)? {
                orders.push(pending);
            }
        }
        Ok(orders)
    }

    fn return_url_for(&self, reference: &Uuid) -> Result<String, StorefrontError> {
        let mut url = Url::parse(&self.return_url).map_err(|e| {
            report(
                self.notifier.as_ref(),
                StorefrontError::InvalidReturnUrl {
                    url: self.return_url.clone(),
                    reason: e.to_string(),
                },
            )
        })?;
        url.query_pairs_mut()
            .append_pair(ORDER_REF_PARAM, &reference.to_string());
        Ok(url.into())
    }

    async fn complete_from_query(
        &self,
        query: &BTreeMap<String, String>,
    ) -> Result<PaymentOutcome, StorefrontError> {
        let reference = query
            .get(ORDER_REF_PARAM)
            .and_then(|r| Uuid::parse_str(r).ok())
            .ok_or_else(|| {
                report(
                    self.notifier.as_ref(),
                    StorefrontError::NotFound(format!("{ORDER_REF_PARAM} in return query")),
                )
            })?;
        self.handle_complete(&reference).await
    }

    fn failed(&self, message: Option<String>, fallback: &str) -> PaymentOutcome {
        let reason = message.unwrap_or_else(|| fallback.to_owned());
        tracing::warn!(%reason, "payment not verified");
        self.notifier.notify(Notice::error(reason.clone()));
        PaymentOutcome::Failed { reason }
    }
}

/// Splits a gateway return into its query parameters.
///
/// Accepts a full URL, or a bare query string with or without the leading
/// `?`. Later duplicates win.
#[must_use]
pub fn parse_return_query(raw: &str) -> BTreeMap<String, String> {
    let url = Url::parse(raw).or_else(|_| {
        let query = raw.trim_start_matches('?');
        Url::parse(&format!("http://localhost/?{query}"))
    });
    url.map(|u| u.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "checkout_test.rs"]
mod tests;
