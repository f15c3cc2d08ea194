//! Address book entries.

use serde::{Deserialize, Serialize};

use super::ids::AddressId;

/// Maximum number of addresses a user may hold.
pub const MAX_ADDRESSES: usize = 2;

/// Positional slot in a user's address list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressSlot {
    Home,
    Work,
}

impl AddressSlot {
    pub fn index(self) -> usize {
        match self {
            AddressSlot::Home => 0,
            AddressSlot::Work => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(AddressSlot::Home),
            1 => Some(AddressSlot::Work),
            _ => None,
        }
    }
}

impl std::fmt::Display for AddressSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressSlot::Home => f.write_str("home"),
            AddressSlot::Work => f.write_str("work"),
        }
    }
}

/// Editable address fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub house: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

/// A stored address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address_id: AddressId,
    #[serde(flatten)]
    pub fields: AddressFields,
}

impl Address {
    pub fn new(fields: AddressFields) -> Self {
        Self {
            address_id: AddressId::new(),
            fields,
        }
    }
}
