//! Shared storage helper functions.
//!
//! Document-level semantics of mutations, pipelines and filters, applied in
//! process. The in-memory store uses these directly; the MongoDB store
//! translates the same semantics into update operators and must agree with
//! them.

use std::collections::HashSet;

use crate::model::{OrderStage, UserDocument};

use super::{GroupResult, Mutation, Pipeline, Result, StorageError, UserFilter};

/// Apply every mutation to `doc`, or none of them.
pub fn apply_mutations(doc: &UserDocument, mutations: &[Mutation]) -> Result<UserDocument> {
    let mut next = doc.clone();
    for mutation in mutations {
        apply_mutation(&mut next, mutation)?;
    }
    Ok(next)
}

fn apply_mutation(doc: &mut UserDocument, mutation: &Mutation) -> Result<()> {
    match mutation {
        Mutation::PushAddress(address) => doc.addresses.push(address.clone()),
        Mutation::SetAddressFields { slot, fields } => {
            let address = doc.addresses.get_mut(slot.index()).ok_or_else(|| {
                StorageError::InvalidMutation(format!("no address in {} slot", slot))
            })?;
            address.fields = fields.clone();
        }
        Mutation::ReplaceAddresses(addresses) => doc.addresses = addresses.clone(),
        Mutation::PushCartItem(item) => doc.cart.push(item.clone()),
        Mutation::PullCartProduct(product_id) => {
            doc.cart.retain(|item| item.product_id != *product_id)
        }
        Mutation::PullCartEntries(entry_ids) => {
            let ids: HashSet<_> = entry_ids.iter().collect();
            doc.cart.retain(|item| !ids.contains(&item.entry_id));
        }
        Mutation::PushOrder(order) => doc.orders.push(order.clone()),
        Mutation::AddOrderItems {
            order_id,
            line_items,
            price,
        } => {
            let order = doc.order_mut(*order_id).ok_or_else(|| missing_order(order_id))?;
            for item in line_items {
                if !order.line_items.contains(item) {
                    order.line_items.push(item.clone());
                }
            }
            order.price = *price;
        }
        Mutation::SetOrderStage { order_id, stage } => {
            let order = doc.order_mut(*order_id).ok_or_else(|| missing_order(order_id))?;
            order.stage = *stage;
        }
    }
    Ok(())
}

fn missing_order(order_id: &crate::model::OrderId) -> StorageError {
    StorageError::InvalidMutation(format!("no order {}", order_id))
}

/// Evaluate a pipeline against one document.
///
/// Mirrors `$unwind` + `$group`: when the unwound array is empty there is no
/// group at all rather than a group with value zero.
pub fn evaluate_pipeline(doc: &UserDocument, pipeline: Pipeline) -> Result<Vec<GroupResult>> {
    let values: Vec<i64> = match pipeline {
        Pipeline::CountAddresses => doc.addresses.iter().map(|_| 1).collect(),
        Pipeline::SumCart => doc.cart.iter().map(|item| item.price).collect(),
        Pipeline::SumOrderItems(order_id) => doc
            .order(order_id)
            .map(|order| order.line_items.iter().map(|item| item.price).collect())
            .unwrap_or_default(),
    };

    if values.is_empty() {
        return Ok(Vec::new());
    }

    let value = values
        .into_iter()
        .try_fold(0i64, |acc, v| acc.checked_add(v))
        .ok_or_else(|| StorageError::Aggregation("sum overflowed".to_string()))?;

    Ok(vec![GroupResult {
        key: doc.user_id.to_string(),
        value,
    }])
}

/// Whether a document satisfies a filter.
pub fn matches_filter(doc: &UserDocument, filter: UserFilter) -> bool {
    match filter {
        UserFilter::All => true,
        UserFilter::HasUnplacedOrders => doc
            .orders
            .iter()
            .any(|order| order.stage != OrderStage::Placed),
        UserFilter::CartContains(product_id) => {
            doc.cart.iter().any(|item| item.product_id == product_id)
        }
    }
}

/// Case-insensitive substring match used by catalog search.
pub fn name_matches(name: &str, fragment: &str) -> bool {
    name.to_lowercase().contains(&fragment.to_lowercase())
}
