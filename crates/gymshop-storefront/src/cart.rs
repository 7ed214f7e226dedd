//! Cart selection and quantity sync.
//!
//! The server's cart list is authoritative: every mutation is followed by a
//! refetch that rebuilds [`CartState`] from it. One mutation runs at a time;
//! a second one issued while the first is in flight is refused with
//! [`StorefrontError::Busy`] before touching the network.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use gymshop_client::catalog::CART_ITEMS_PATH;
use gymshop_client::{ApiError, StorefrontClient};
use gymshop_core::cart::subtotal;
use gymshop_core::{CartItem, CartItemPatch, Filter, ValidationError};
use rust_decimal::Decimal;

use crate::error::StorefrontError;
use crate::notify::{report, Notice, Notifier};

/// Carts are fetched whole; this bounds a single page.
const CART_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Default)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub selected_ids: BTreeSet<i64>,
    pub select_all: bool,
    pub is_updating: bool,
}

impl CartState {
    /// Replaces local state with the server's list.
    fn apply_server_items(&mut self, items: Vec<CartItem>) {
        self.selected_ids = items.iter().filter(|i| i.selected).map(|i| i.id).collect();
        self.select_all = !items.is_empty() && items.iter().all(|i| i.selected);
        self.items = items;
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        subtotal(&self.items, &self.selected_ids)
    }

    #[must_use]
    pub fn selected_items(&self) -> Vec<CartItem> {
        self.items
            .iter()
            .filter(|i| self.selected_ids.contains(&i.id))
            .cloned()
            .collect()
    }
}

struct UpdateGuard<'a>(&'a AtomicBool);

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct CartSync {
    client: Arc<StorefrontClient>,
    notifier: Arc<dyn Notifier>,
    customer_id: i64,
    state: Mutex<CartState>,
    updating: AtomicBool,
}

impl CartSync {
    #[must_use]
    pub fn new(client: Arc<StorefrontClient>, notifier: Arc<dyn Notifier>, customer_id: i64) -> Self {
        Self {
            client,
            notifier,
            customer_id,
            state: Mutex::new(CartState::default()),
            updating: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn state(&self) -> CartState {
        let mut state = self.lock().clone();
        state.is_updating = self.is_updating();
        state
    }

    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lock().subtotal()
    }

    #[must_use]
    pub fn selected_items(&self) -> Vec<CartItem> {
        self.lock().selected_items()
    }

    /// Reloads the cart from the server.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::Api`] when the list cannot be fetched; local state
    /// is left as it was.
    pub async fn refresh(&self) -> Result<(), StorefrontError> {
        let filter = Filter::new()
            .with("customerId", self.customer_id)
            .with("limit", CART_PAGE_LIMIT);
        match self.client.list::<CartItem>(CART_ITEMS_PATH, &filter).await {
            Ok(page) => {
                tracing::debug!(items = page.body.len(), "cart refreshed");
                self.lock().apply_server_items(page.body);
                Ok(())
            }
            Err(e) => Err(report(self.notifier.as_ref(), e)),
        }
    }

    /// Sets every cart row's `selected` flag to `value`.
    ///
    /// All rows are patched concurrently. If any patch fails, the rows that
    /// did change are patched back to their previous flag before the cart is
    /// reloaded, so a partial failure leaves the server where it started.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::Busy`] while another update runs, otherwise the
    /// first failed patch.
    pub async fn toggle_select_all(&self, value: bool) -> Result<(), StorefrontError> {
        let _guard = self.begin()?;
        let (items, previous_all) = {
            let mut state = self.lock();
            let previous = state.select_all;
            state.select_all = value;
            (state.items.clone(), previous)
        };

        let patches: Vec<CartItemPatch> = items
            .iter()
            .map(|item| CartItemPatch::selected(self.customer_id, item.service_id, value))
            .collect();
        let results = join_all(patches.iter().map(|p| self.client.update_cart_item(p))).await;

        let mut first_error: Option<ApiError> = None;
        let mut changed = Vec::new();
        for (item, result) in items.iter().zip(results) {
            match result {
                Ok(()) if item.selected != value => changed.push(item),
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!(error = %e, cart_item_id = item.id, "select-all patch failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(err) = first_error {
            self.lock().select_all = previous_all;
            self.compensate(&changed).await;
            let err = report(self.notifier.as_ref(), err);
            let _ = self.refresh().await;
            return Err(err);
        }

        self.refresh().await
    }

    /// # Errors
    ///
    /// [`StorefrontError::Busy`], [`StorefrontError::NotFound`] for an
    /// unknown row, or [`StorefrontError::Api`] when the patch fails.
    pub async fn toggle_item(&self, item_id: i64, selected: bool) -> Result<(), StorefrontError> {
        let _guard = self.begin()?;
        let item = self.item(item_id)?;
        self.patch(&CartItemPatch::selected(self.customer_id, item.service_id, selected))
            .await?;
        self.notifier.notify(Notice::success("Cart updated"));
        self.refresh().await
    }

    /// # Errors
    ///
    /// [`ValidationError::QuantityBelowOne`] without any request for a
    /// quantity under 1, otherwise as [`CartSync::toggle_item`].
    pub async fn change_quantity(&self, item_id: i64, quantity: i64) -> Result<(), StorefrontError> {
        let quantity = match u32::try_from(quantity) {
            Ok(q) if q >= 1 => q,
            _ => {
                return Err(report(
                    self.notifier.as_ref(),
                    ValidationError::QuantityBelowOne { quantity },
                ))
            }
        };
        let _guard = self.begin()?;
        let item = self.item(item_id)?;
        self.patch(&CartItemPatch::quantity(self.customer_id, item.service_id, quantity))
            .await?;
        self.refresh().await
    }

    /// # Errors
    ///
    /// As [`CartSync::toggle_item`].
    pub async fn remove_item(&self, item_id: i64) -> Result<(), StorefrontError> {
        let _guard = self.begin()?;
        let item = self.item(item_id)?;
        if let Err(e) = self
            .client
            .remove_cart_item(self.customer_id, item.service_id)
            .await
        {
            return Err(report(self.notifier.as_ref(), e));
        }
        self.notifier.notify(Notice::success("Removed from cart"));
        self.refresh().await
    }

    fn begin(&self) -> Result<UpdateGuard<'_>, StorefrontError> {
        if self.updating.swap(true, Ordering::AcqRel) {
            tracing::debug!("cart mutation refused; another is in flight");
            return Err(StorefrontError::Busy);
        }
        Ok(UpdateGuard(&self.updating))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn item(&self, item_id: i64) -> Result<CartItem, StorefrontError> {
        self.lock()
            .items
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
            .ok_or_else(|| {
                report(
                    self.notifier.as_ref(),
                    StorefrontError::NotFound(format!("cart item {item_id}")),
                )
            })
    }

    async fn patch(&self, patch: &CartItemPatch) -> Result<(), StorefrontError> {
        self.client
            .update_cart_item(patch)
            .await
            .map_err(|e| report(self.notifier.as_ref(), e))
    }

    /// Restores the previous `selected` flag on rows a partial select-all
    /// managed to change. Failures are logged; the refetch that follows
    /// shows whatever the server ended up with.
    async fn compensate(&self, changed: &[&CartItem]) {
        if changed.is_empty() {
            return;
        }
        let patches: Vec<CartItemPatch> = changed
            .iter()
            .map(|item| CartItemPatch::selected(self.customer_id, item.service_id, item.selected))
            .collect();
        let results = join_all(patches.iter().map(|p| self.client.update_cart_item(p))).await;
        for (item, result) in changed.iter().zip(results) {
            if let Err(e) = result {
                tracing::error!(error = %e, cart_item_id = item.id, "select-all rollback failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
