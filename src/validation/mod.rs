//! Input validation for external data.
//!
//! Centralized checks for values that cross trust boundaries: identifiers
//! arriving as strings and products submitted for the catalog.

use std::str::FromStr;

use crate::error::{Result, ShopError};
use crate::model::{IdError, Product};

/// Length limits for validated fields.
pub mod limits {
    /// Maximum product name length.
    pub const MAX_PRODUCT_NAME_LENGTH: usize = 256;
}

/// Error constants for validation failures.
pub mod errmsg {
    pub const PRODUCT_NAME_EMPTY: &str = "product name cannot be empty";
    pub const PRODUCT_NAME_TOO_LONG: &str = "product name exceeds maximum length";
    pub const PRODUCT_PRICE_NEGATIVE: &str = "product price cannot be negative";
}

/// Parse a typed identifier from its string form.
pub fn parse_id<T>(raw: &str) -> Result<T>
where
    T: FromStr<Err = IdError>,
{
    raw.parse().map_err(ShopError::from)
}

/// Validate a product before it enters the catalog.
///
/// Rules:
/// - Name must not be empty or whitespace
/// - Name at most 256 characters
/// - Price must not be negative
pub fn validate_product(product: &Product) -> Result<()> {
    if product.name.trim().is_empty() {
        return Err(ShopError::InvalidProduct(errmsg::PRODUCT_NAME_EMPTY.into()));
    }
    if product.name.chars().count() > limits::MAX_PRODUCT_NAME_LENGTH {
        return Err(ShopError::InvalidProduct(format!(
            "{} (max: {}, got: {})",
            errmsg::PRODUCT_NAME_TOO_LONG,
            limits::MAX_PRODUCT_NAME_LENGTH,
            product.name.chars().count()
        )));
    }
    if product.price < 0 {
        return Err(ShopError::InvalidProduct(
            errmsg::PRODUCT_PRICE_NEGATIVE.into(),
        ));
    }
    Ok(())
}
