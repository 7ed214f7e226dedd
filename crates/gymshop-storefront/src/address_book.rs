//! The customer's address book.

use std::sync::Arc;

use gymshop_client::StorefrontClient;
use gymshop_core::address::default_address;
use gymshop_core::{Address, AddressPatch, NewAddress, ProfilePatch, ValidationError};

use crate::error::StorefrontError;
use crate::notify::{report, Notice, Notifier};

pub struct AddressBook {
    client: Arc<StorefrontClient>,
    notifier: Arc<dyn Notifier>,
    customer_id: i64,
    addresses: Vec<Address>,
}

impl AddressBook {
    #[must_use]
    pub fn new(client: Arc<StorefrontClient>, notifier: Arc<dyn Notifier>, customer_id: i64) -> Self {
        Self {
            client,
            notifier,
            customer_id,
            addresses: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// [`StorefrontError::Api`] when the list cannot be fetched.
    pub async fn load(&mut self) -> Result<(), StorefrontError> {
        match self.client.list_addresses(self.customer_id).await {
            Ok(addresses) => {
                self.addresses = addresses;
                Ok(())
            }
            Err(e) => Err(report(self.notifier.as_ref(), e)),
        }
    }

    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        default_address(&self.addresses)
    }

    /// The default address can never be deleted.
    #[must_use]
    pub fn can_delete(&self, address_id: i64) -> bool {
        self.addresses
            .iter()
            .any(|a| a.id == address_id && !a.is_default)
    }

    /// # Errors
    ///
    /// [`ValidationError::DeleteDefaultAddress`] for the default address,
    /// with no request made; [`StorefrontError::NotFound`] for an unknown
    /// id; otherwise [`StorefrontError::Api`].
    pub async fn delete(&mut self, address_id: i64) -> Result<(), StorefrontError> {
        let address = self.find(address_id)?;
        if address.is_default {
            return Err(report(
                self.notifier.as_ref(),
                ValidationError::DeleteDefaultAddress { id: address_id },
            ));
        }
        if let Err(e) = self.client.delete_address(address_id).await {
            return Err(report(self.notifier.as_ref(), e));
        }
        self.notifier.notify(Notice::success("Address deleted"));
        self.load().await
    }

    /// Marks `address_id` as default, then points the customer's
    /// `defaultAddressId` at it.
    ///
    /// The two writes are separate requests. If the second fails the address
    /// flag is already set; the reload shows what the server holds.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::NotFound`] for an unknown id, otherwise the first
    /// failed request.
    pub async fn set_default(&mut self, address_id: i64) -> Result<(), StorefrontError> {
        self.find(address_id)?;
        if let Err(e) = self
            .client
            .update_address(address_id, &AddressPatch::mark_default())
            .await
        {
            return Err(report(self.notifier.as_ref(), e));
        }
        if let Err(e) = self.point_customer_at(address_id).await {
            tracing::warn!(
                error = %e,
                address_id,
                customer_id = self.customer_id,
                "address marked default but customer was not updated"
            );
            let err = report(self.notifier.as_ref(), e);
            let _ = self.load().await;
            return Err(err);
        }
        self.notifier.notify(Notice::success("Default address updated"));
        self.load().await
    }

    /// Creates an address. The first address a customer adds becomes the
    /// default one.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::Api`] when a request fails.
    pub async fn create(&mut self, mut address: NewAddress) -> Result<Address, StorefrontError> {
        address.customer_id = self.customer_id;
        if self.addresses.is_empty() {
            address.is_default = true;
        }
        let created = match self.client.create_address(&address).await {
            Ok(a) => a,
            Err(e) => return Err(report(self.notifier.as_ref(), e)),
        };
        if created.is_default {
            if let Err(e) = self.point_customer_at(created.id).await {
                return Err(report(self.notifier.as_ref(), e));
            }
        }
        self.notifier.notify(Notice::success("Address added"));
        self.load().await?;
        Ok(created)
    }

    /// # Errors
    ///
    /// [`StorefrontError::NotFound`] for an unknown id, otherwise
    /// [`StorefrontError::Api`].
    pub async fn update(
        &mut self,
        address_id: i64,
        patch: &AddressPatch,
    ) -> Result<Address, StorefrontError> {
        self.find(address_id)?;
        let updated = match self.client.update_address(address_id, patch).await {
            Ok(a) => a,
            Err(e) => return Err(report(self.notifier.as_ref(), e)),
        };
        self.notifier.notify(Notice::success("Address updated"));
        self.load().await?;
        Ok(updated)
    }

    fn find(&self, address_id: i64) -> Result<&Address, StorefrontError> {
        self.addresses
            .iter()
            .find(|a| a.id == address_id)
            .ok_or_else(|| {
                report(
                    self.notifier.as_ref(),
                    StorefrontError::NotFound(format!("address {address_id}")),
                )
            })
    }

    async fn point_customer_at(&self, address_id: i64) -> Result<(), StorefrontError> {
        let patch = ProfilePatch {
            default_address_id: Some(address_id),
            ..ProfilePatch::default()
        };
        self.client.update_customer(self.customer_id, &patch).await?;
        Ok(())
    }
}
