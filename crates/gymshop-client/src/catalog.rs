//! Paginated list endpoints and service detail.

use gymshop_core::{Envelope, Filter, Paginated, Service};
use serde::de::DeserializeOwned;

use crate::client::StorefrontClient;
use crate::error::ApiError;

pub const SERVICES_PATH: &str = "api/service";
pub const BRANDS_PATH: &str = "api/brand";
pub const CATEGORIES_PATH: &str = "api/category";
pub const SUPPLIERS_PATH: &str = "api/supplier";
pub const USERS_PATH: &str = "api/user";
pub const BOOKINGS_PATH: &str = "api/booking";
pub const WISHLIST_PATH: &str = "api/wishlist";
pub const CART_ITEMS_PATH: &str = "api/cart-item";
pub const ORDERS_PATH: &str = "api/order";

impl StorefrontClient {
    /// Fetches one page from a list endpoint with `filter` as query parameters.
    ///
    /// A page holding more rows than its own `limit` is truncated and logged.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] if the token was rejected.
    /// - [`ApiError::Status`] on any other non-2xx response.
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::Deserialize`] if the page does not match `T`.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        filter: &Filter,
    ) -> Result<Paginated<T>, ApiError> {
        let mut page: Paginated<T> = self.get_json(path, &filter.to_query_pairs()).await?;
        if page.enforce_limit() {
            tracing::warn!(
                path,
                limit = page.meta.pagination.limit,
                "list page exceeded its limit; truncated"
            );
        }
        Ok(page)
    }

    /// Full service detail including variants and assignable staff.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontClient::list`].
    pub async fn get_service(&self, service_id: i64) -> Result<Service, ApiError> {
        let envelope: Envelope<Service> = self
            .get_json(&format!("{SERVICES_PATH}/{service_id}"), &[])
            .await?;
        Ok(envelope.body)
    }
}
