//! Translation of [`Mutation`] lists into a single MongoDB update.

use std::collections::HashMap;

use mongodb::bson::{doc, Bson, Document};

use crate::model::OrderId;
use crate::storage::{Mutation, Result, StorageError};

use super::to_bson;

/// A filter, update document and array filters for one `update_one` call.
#[derive(Debug, Default)]
pub(super) struct UpdatePlan {
    /// Conditions the document must satisfy for the update to apply.
    pub guards: Document,
    pub update: Document,
    pub array_filters: Vec<Document>,
}

/// Accumulates operators per path.
///
/// `$push` and `$addToSet` on the same path merge their `$each` lists.
/// Any other reuse of a path is rejected, since MongoDB refuses updates
/// whose operators touch the same field.
#[derive(Default)]
pub(super) struct UpdateBuilder {
    set: Document,
    push: HashMap<String, Vec<Bson>>,
    add_to_set: HashMap<String, Vec<Bson>>,
    pull: Document,
    guards: Document,
    order_filters: HashMap<OrderId, String>,
    array_filters: Vec<Document>,
    paths: Vec<(String, &'static str)>,
}

impl UpdateBuilder {
    pub fn build(mutations: &[Mutation]) -> Result<UpdatePlan> {
        let mut builder = Self::default();
        for mutation in mutations {
            builder.add(mutation)?;
        }
        Ok(builder.finish())
    }

    fn add(&mut self, mutation: &Mutation) -> Result<()> {
        match mutation {
            Mutation::PushAddress(address) => self.push("addresses", to_bson(address)?)?,
            Mutation::SetAddressFields { slot, fields } => {
                let index = slot.index();
                self.guards
                    .insert(format!("addresses.{}", index), doc! { "$exists": true });
                self.set(format!("addresses.{}.house", index), fields.house.clone())?;
                self.set(format!("addresses.{}.street", index), fields.street.clone())?;
                self.set(format!("addresses.{}.city", index), fields.city.clone())?;
                self.set(
                    format!("addresses.{}.postal_code", index),
                    fields.postal_code.clone(),
                )?;
            }
            Mutation::ReplaceAddresses(addresses) => {
                self.set("addresses".to_string(), to_bson(addresses)?)?
            }
            Mutation::PushCartItem(item) => self.push("cart", to_bson(item)?)?,
            Mutation::PullCartProduct(product_id) => {
                self.pull("cart", doc! { "product_id": product_id.to_string() })?
            }
            Mutation::PullCartEntries(entry_ids) => {
                let ids: Vec<String> = entry_ids.iter().map(|id| id.to_string()).collect();
                self.pull("cart", doc! { "entry_id": { "$in": ids } })?
            }
            Mutation::PushOrder(order) => self.push("orders", to_bson(order)?)?,
            Mutation::AddOrderItems {
                order_id,
                line_items,
                price,
            } => {
                let ident = self.order_ident(*order_id);
                let path = format!("orders.$[{}].line_items", ident);
                self.claim(&path, "$addToSet")?;
                let entry = self.add_to_set.entry(path).or_default();
                for item in line_items {
                    entry.push(to_bson(item)?);
                }
                self.set(format!("orders.$[{}].price", ident), *price)?;
            }
            Mutation::SetOrderStage { order_id, stage } => {
                let ident = self.order_ident(*order_id);
                self.set(format!("orders.$[{}].stage", ident), to_bson(stage)?)?;
            }
        }
        Ok(())
    }

    /// Array filter identifier for an order, allocated once per order.
    fn order_ident(&mut self, order_id: OrderId) -> String {
        if let Some(ident) = self.order_filters.get(&order_id) {
            return ident.clone();
        }
        let ident = format!("o{}", self.order_filters.len());
        let mut filter = Document::new();
        filter.insert(format!("{}.order_id", ident), order_id.to_string());
        self.array_filters.push(filter);
        self.order_filters.insert(order_id, ident.clone());
        ident
    }

    /// Record that `op` writes `path`; fails if another operator already does.
    fn claim(&mut self, path: &str, op: &'static str) -> Result<()> {
        for (existing, existing_op) in &self.paths {
            let overlaps = existing == path
                || path.starts_with(&format!("{}.", existing))
                || existing.starts_with(&format!("{}.", path));
            if overlaps && !(existing == path && *existing_op == op && op != "$pull") {
                return Err(StorageError::InvalidMutation(format!(
                    "conflicting updates on {}",
                    path
                )));
            }
        }
        self.paths.push((path.to_string(), op));
        Ok(())
    }

    fn set(&mut self, path: String, value: impl Into<Bson>) -> Result<()> {
        self.claim(&path, "$set")?;
        self.set.insert(path, value.into());
        Ok(())
    }

    fn push(&mut self, path: &str, value: Bson) -> Result<()> {
        self.claim(path, "$push")?;
        self.push.entry(path.to_string()).or_default().push(value);
        Ok(())
    }

    fn pull(&mut self, path: &str, condition: Document) -> Result<()> {
        self.claim(path, "$pull")?;
        self.pull.insert(path, condition);
        Ok(())
    }

    fn finish(mut self) -> UpdatePlan {
        if !self.order_filters.is_empty() {
            let ids: Vec<String> = self.order_filters.keys().map(|id| id.to_string()).collect();
            self.guards
                .insert("orders.order_id", doc! { "$all": ids });
        }

        let mut update = Document::new();
        if !self.set.is_empty() {
            update.insert("$set", self.set);
        }
        if !self.push.is_empty() {
            update.insert("$push", each(self.push));
        }
        if !self.add_to_set.is_empty() {
            update.insert("$addToSet", each(self.add_to_set));
        }
        if !self.pull.is_empty() {
            update.insert("$pull", self.pull);
        }
        update.insert("$inc", doc! { "version": 1_i64 });

        UpdatePlan {
            guards: self.guards,
            update,
            array_filters: self.array_filters,
        }
    }
}

fn each(paths: HashMap<String, Vec<Bson>>) -> Document {
    paths
        .into_iter()
        .map(|(path, values)| (path, Bson::Document(doc! { "$each": values })))
        .collect()
}
