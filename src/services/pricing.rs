//! Price aggregation.
//!
//! Totals are integer currency units. The in-process sum and the store's
//! summation pipeline follow the same rules: no items means zero, overflow
//! and negative totals are errors.

use crate::error::{Result, ShopError};
use crate::model::{LineItem, OrderId, UserId};
use crate::repository::UserRepository;
use crate::storage::{GroupResult, Pipeline};

/// Computes totals over line items.
#[derive(Clone)]
pub struct PriceAggregator {
    repo: UserRepository,
}

impl PriceAggregator {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Sum of item prices. Empty is zero; order does not matter.
    pub fn compute_total(items: &[LineItem]) -> Result<i64> {
        let total = items
            .iter()
            .try_fold(0i64, |acc, item| acc.checked_add(item.price))
            .ok_or_else(|| ShopError::AggregationFailed("total overflowed".to_string()))?;
        check_non_negative(total)
    }

    /// Interpret the groups of a single-user summation pipeline.
    pub fn total_from_groups(groups: &[GroupResult]) -> Result<i64> {
        value_from_groups(groups)
    }

    /// Cart total computed by the store.
    pub async fn cart_total(&self, user_id: UserId) -> Result<i64> {
        let groups = self.repo.aggregate(user_id, Pipeline::SumCart).await?;
        Self::total_from_groups(&groups)
    }

    /// Sum of one order's line items computed by the store.
    pub async fn order_total(&self, user_id: UserId, order_id: OrderId) -> Result<i64> {
        let groups = self
            .repo
            .aggregate(user_id, Pipeline::SumOrderItems(order_id))
            .await?;
        Self::total_from_groups(&groups)
    }
}

/// Value of a single-user count or sum pipeline.
///
/// Zero groups means nothing was counted or summed and the value is zero. A
/// pipeline keyed on one user never yields more than one group.
pub fn value_from_groups(groups: &[GroupResult]) -> Result<i64> {
    match groups {
        [] => Ok(0),
        [group] => check_non_negative(group.value),
        _ => Err(ShopError::AggregationFailed(format!(
            "expected one group, got {}",
            groups.len()
        ))),
    }
}

fn check_non_negative(total: i64) -> Result<i64> {
    if total < 0 {
        return Err(ShopError::AggregationFailed(format!(
            "negative total {}",
            total
        )));
    }
    Ok(total)
}
