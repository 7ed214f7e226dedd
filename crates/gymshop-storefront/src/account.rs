//! Profile, password and wishlist actions for the signed-in customer.

use std::sync::Arc;

use gymshop_client::StorefrontClient;
use gymshop_core::{Customer, Filter, Order, PasswordChange, ProfilePatch, WishlistItem};

use crate::error::StorefrontError;
use crate::list::{self, ListController, ListHandle, ListOptions};
use crate::notify::{report, Notice, Notifier};

pub struct Account {
    client: Arc<StorefrontClient>,
    notifier: Arc<dyn Notifier>,
    customer_id: i64,
}

impl Account {
    #[must_use]
    pub fn new(client: Arc<StorefrontClient>, notifier: Arc<dyn Notifier>, customer_id: i64) -> Self {
        Self {
            client,
            notifier,
            customer_id,
        }
    }

    /// # Errors
    ///
    /// [`StorefrontError::Api`] when the request fails.
    pub async fn profile(&self) -> Result<Customer, StorefrontError> {
        self.client
            .get_customer(self.customer_id)
            .await
            .map_err(|e| report(self.notifier.as_ref(), e))
    }

    /// # Errors
    ///
    /// [`StorefrontError::Api`] when the request fails.
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<Customer, StorefrontError> {
        let customer = self
            .client
            .update_customer(self.customer_id, patch)
            .await
            .map_err(|e| report(self.notifier.as_ref(), e))?;
        self.notifier.notify(Notice::success("Profile updated"));
        Ok(customer)
    }

    /// Checks the confirmation locally before anything is sent.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::Validation`] for an empty or unconfirmed password,
    /// otherwise [`StorefrontError::Api`].
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), StorefrontError> {
        if let Err(e) = change.validate() {
            return Err(report(self.notifier.as_ref(), e));
        }
        self.client
            .change_password(self.customer_id, change)
            .await
            .map_err(|e| report(self.notifier.as_ref(), e))?;
        tracing::info!(customer_id = self.customer_id, "password changed");
        self.notifier.notify(Notice::success("Password changed"));
        Ok(())
    }

    /// # Errors
    ///
    /// [`StorefrontError::Api`] when the request fails.
    pub async fn add_to_wishlist(&self, service_id: i64) -> Result<WishlistItem, StorefrontError> {
        let item = self
            .client
            .add_to_wishlist(self.customer_id, service_id)
            .await
            .map_err(|e| report(self.notifier.as_ref(), e))?;
        self.notifier.notify(Notice::success("Added to wishlist"));
        Ok(item)
    }

    /// # Errors
    ///
    /// [`StorefrontError::Api`] when the request fails.
    pub async fn remove_from_wishlist(&self, wishlist_id: i64) -> Result<(), StorefrontError> {
        self.client
            .remove_from_wishlist(wishlist_id)
            .await
            .map_err(|e| report(self.notifier.as_ref(), e))?;
        self.notifier.notify(Notice::success("Removed from wishlist"));
        Ok(())
    }

    /// The customer's orders, newest page first as the API sorts them.
    #[must_use]
    pub fn order_history(&self, options: ListOptions) -> ListHandle<Order> {
        ListController::spawn(
            list::orders(Arc::clone(&self.client)),
            self.customer_filter(),
            options.require("customerId"),
            Arc::clone(&self.notifier),
        )
    }

    #[must_use]
    pub fn wishlist(&self, options: ListOptions) -> ListHandle<WishlistItem> {
        ListController::spawn(
            list::wishlist(Arc::clone(&self.client)),
            self.customer_filter(),
            options.require("customerId"),
            Arc::clone(&self.notifier),
        )
    }

    fn customer_filter(&self) -> Filter {
        Filter::new().with("customerId", self.customer_id)
    }
}
