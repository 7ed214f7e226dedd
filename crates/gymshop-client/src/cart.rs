//! Cart-item and wishlist mutations.

use gymshop_core::{CartItemPatch, NewCartItem, WishlistItem};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::WISHLIST_PATH;
use crate::client::StorefrontClient;
use crate::error::ApiError;

const UPDATE_CART_ITEM_PATH: &str = "api/cart-item/update";
const REMOVE_CART_ITEM_PATH: &str = "api/cart-item/remove";
const CREATE_CART_ITEM_PATH: &str = "api/cart-item/create";
const CREATE_WISHLIST_PATH: &str = "api/wishlist/create";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveCartItem {
    customer_id: i64,
    service_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewWishlistItem {
    customer_id: i64,
    service_id: i64,
}

impl StorefrontClient {
    /// Patches a cart row's `selected` flag and/or quantity.
    ///
    /// # Errors
    ///
    /// [`ApiError`] on transport or status failure.
    pub async fn update_cart_item(&self, patch: &CartItemPatch) -> Result<(), ApiError> {
        self.send_unit(Method::PATCH, UPDATE_CART_ITEM_PATH, Some(patch))
            .await
    }

    /// Removes the customer's cart row for `service_id`.
    ///
    /// # Errors
    ///
    /// [`ApiError`] on transport or status failure.
    pub async fn remove_cart_item(&self, customer_id: i64, service_id: i64) -> Result<(), ApiError> {
        self.send_unit(
            Method::PATCH,
            REMOVE_CART_ITEM_PATH,
            Some(&RemoveCartItem {
                customer_id,
                service_id,
            }),
        )
        .await
    }

    /// # Errors
    ///
    /// [`ApiError`] on transport or status failure.
    pub async fn add_to_cart(&self, item: &NewCartItem) -> Result<(), ApiError> {
        self.send_unit(Method::POST, CREATE_CART_ITEM_PATH, Some(item))
            .await
    }

    /// # Errors
    ///
    /// [`ApiError`] on transport, status or decoding failure.
    pub async fn add_to_wishlist(
        &self,
        customer_id: i64,
        service_id: i64,
    ) -> Result<WishlistItem, ApiError> {
        self.send_body(
            Method::POST,
            CREATE_WISHLIST_PATH,
            &NewWishlistItem {
                customer_id,
                service_id,
            },
        )
        .await
    }

    /// # Errors
    ///
    /// [`ApiError`] on transport or status failure.
    pub async fn remove_from_wishlist(&self, wishlist_id: i64) -> Result<(), ApiError> {
        self.send_unit::<Value>(
            Method::DELETE,
            &format!("{WISHLIST_PATH}/{wishlist_id}"),
            None,
        )
        .await
    }
}
