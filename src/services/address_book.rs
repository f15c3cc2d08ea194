//! Address book manager.
//!
//! A user holds at most [`MAX_ADDRESSES`] addresses. Slot 0 is home and
//! slot 1 is work; the slot is the position in the list.

use tracing::info;

use crate::error::{Result, ShopError};
use crate::model::{Address, AddressFields, AddressSlot, UserId, MAX_ADDRESSES};
use crate::repository::{Change, UserRepository};
use crate::storage::{Mutation, Pipeline};

use super::pricing::value_from_groups;

/// Manages a user's address slots.
#[derive(Clone)]
pub struct AddressBook {
    repo: UserRepository,
}

impl AddressBook {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Append an address to the next free slot.
    ///
    /// The slot count and the version guarding the write come from the same
    /// read, so two concurrent adds can never both take the last slot.
    #[tracing::instrument(name = "address.add", skip_all, fields(user_id = %user_id))]
    pub async fn add(&self, user_id: UserId, fields: AddressFields) -> Result<Address> {
        let address = Address::new(fields);
        let slot = self
            .repo
            .mutate(user_id, "add_address", |doc| {
                if doc.addresses.len() >= MAX_ADDRESSES {
                    return Err(ShopError::SlotsFull { max: MAX_ADDRESSES });
                }
                Ok(Change::Apply {
                    mutations: vec![Mutation::PushAddress(address.clone())],
                    output: AddressSlot::from_index(doc.addresses.len()),
                })
            })
            .await?;

        info!(address_id = %address.address_id, slot = ?slot, "Address added");
        Ok(address)
    }

    /// Overwrite the fields of an occupied slot.
    #[tracing::instrument(name = "address.edit", skip_all, fields(user_id = %user_id, slot = %slot))]
    pub async fn edit(&self, user_id: UserId, slot: AddressSlot, fields: AddressFields) -> Result<()> {
        self.repo
            .mutate(user_id, "edit_address", |doc| {
                if doc.addresses.get(slot.index()).is_none() {
                    return Err(ShopError::SlotEmpty(slot));
                }
                Ok(Change::Apply {
                    mutations: vec![Mutation::SetAddressFields {
                        slot,
                        fields: fields.clone(),
                    }],
                    output: (),
                })
            })
            .await?;

        info!("Address edited");
        Ok(())
    }

    /// Remove every address. Succeeds when there is nothing to remove.
    #[tracing::instrument(name = "address.delete_all", skip_all, fields(user_id = %user_id))]
    pub async fn delete_all(&self, user_id: UserId) -> Result<()> {
        let removed = self
            .repo
            .mutate(user_id, "delete_addresses", |doc| {
                if doc.addresses.is_empty() {
                    return Ok(Change::Unchanged(0));
                }
                Ok(Change::Apply {
                    mutations: vec![Mutation::ReplaceAddresses(Vec::new())],
                    output: doc.addresses.len(),
                })
            })
            .await?;

        info!(removed, "Addresses deleted");
        Ok(())
    }

    /// Stored addresses in slot order.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>> {
        Ok(self.repo.load(user_id).await?.addresses)
    }

    /// Number of stored addresses, counted by the store.
    ///
    /// The pipeline cannot tell an unknown user from one without addresses,
    /// so the user is resolved first.
    pub async fn count(&self, user_id: UserId) -> Result<usize> {
        self.repo.load(user_id).await?;
        let groups = self
            .repo
            .aggregate(user_id, Pipeline::CountAddresses)
            .await?;
        let count = value_from_groups(&groups)?;
        usize::try_from(count).map_err(|e| ShopError::AggregationFailed(e.to_string()))
    }
}
