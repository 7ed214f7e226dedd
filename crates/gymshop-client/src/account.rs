//! Customer profile and address-book endpoints.

use gymshop_core::{
    Address, AddressPatch, Customer, Envelope, Filter, NewAddress, PasswordChange, ProfilePatch,
};
use reqwest::Method;
use serde_json::Value;

use crate::client::StorefrontClient;
use crate::error::ApiError;

const ADDRESSES_PATH: &str = "api/address";
const CREATE_ADDRESS_PATH: &str = "api/address/create";
const CUSTOMERS_PATH: &str = "api/customer";

impl StorefrontClient {
    /// # Errors
    ///
    /// [`ApiError`] on transport, status or decoding failure.
    pub async fn get_customer(&self, customer_id: i64) -> Result<Customer, ApiError> {
        let envelope: Envelope<Customer> = self
            .get_json(&format!("{CUSTOMERS_PATH}/{customer_id}"), &[])
            .await?;
        Ok(envelope.body)
    }

    /// Patches the profile and refreshes the cached user info when the
    /// patched customer is the signed-in one.
    ///
    /// # Errors
    ///
    /// [`ApiError`] on transport, status, decoding or storage failure.
    pub async fn update_customer(
        &self,
        customer_id: i64,
        patch: &ProfilePatch,
    ) -> Result<Customer, ApiError> {
        let customer: Customer = self
            .send_body(
                Method::PATCH,
                &format!("{CUSTOMERS_PATH}/{customer_id}"),
                patch,
            )
            .await?;
        if self.session.customer_id()? == Some(customer.id) {
            self.session.set_user_info(&customer)?;
        }
        Ok(customer)
    }

    /// Sends a password change. Callers validate the confirmation first.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] when the old password is wrong.
    pub async fn change_password(
        &self,
        customer_id: i64,
        change: &PasswordChange,
    ) -> Result<(), ApiError> {
        self.send_unit(
            Method::PATCH,
            &format!("{CUSTOMERS_PATH}/{customer_id}/change-password"),
            Some(change),
        )
        .await
    }

    /// All addresses of a customer. The address list is not paginated.
    ///
    /// # Errors
    ///
    /// [`ApiError`] on transport, status or decoding failure.
    pub async fn list_addresses(&self, customer_id: i64) -> Result<Vec<Address>, ApiError> {
        let filter = Filter::new().with("customerId", customer_id);
        let envelope: Envelope<Vec<Address>> = self
            .get_json(ADDRESSES_PATH, &filter.to_query_pairs())
            .await?;
        Ok(envelope.body)
    }

    /// # Errors
    ///
    /// [`ApiError`] on transport, status or decoding failure.
    pub async fn create_address(&self, address: &NewAddress) -> Result<Address, ApiError> {
        self.send_body(Method::POST, CREATE_ADDRESS_PATH, address)
            .await
    }

    /// # Errors
    ///
    /// [`ApiError`] on transport, status or decoding failure.
    pub async fn update_address(
        &self,
        address_id: i64,
        patch: &AddressPatch,
    ) -> Result<Address, ApiError> {
        self.send_body(
            Method::PATCH,
            &format!("{ADDRESSES_PATH}/{address_id}"),
            patch,
        )
        .await
    }

    /// # Errors
    ///
    /// [`ApiError`] on transport or status failure.
    pub async fn delete_address(&self, address_id: i64) -> Result<(), ApiError> {
        self.send_unit::<Value>(
            Method::DELETE,
            &format!("{ADDRESSES_PATH}/{address_id}"),
            None,
        )
        .await
    }
}
