// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Purchase transaction engine.
//!
//! The [`Engine`] executes the atomic purchase flow against a [`Store`]: it
//! validates stock and balance, debits the account, decrements inventory,
//! records the order with its line items, and appends a debit ledger entry,
//! all while holding the account and product locks, so either every effect
//! commits or none does.
//!
//! # Atomicity
//!
//! Locks are acquired in canonical order (account first, then products in
//! ascending product-id order) and held across the whole check-then-write
//! sequence. Two concurrent purchases of the same last unit therefore
//! serialize: one succeeds, the other observes the decremented stock and is
//! rejected. Validation completes before the first write, so a failed request
//! never leaves partial state behind.

use crate::account::BalanceView;
use crate::base::AccountId;
use crate::error::{BalanceError, PurchaseError};
use crate::ledger::{EntryKind, LedgerEntry};
use crate::order::{Order, OrderItem, OrderItemView, OrderLine, OrderStatus, OrderWithItems};
use crate::store::Store;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Ledger description attached to every purchase debit.
pub const PURCHASE_DESCRIPTION: &str = "product purchase";

/// Ledger description used when a balance credit carries none.
pub const TOP_UP_DESCRIPTION: &str = "balance top-up";

/// Result of a successful purchase: the created order, its line items, and
/// the balance after the debit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PurchaseReceipt {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub new_balance: Decimal,
}

/// Result of a successful balance credit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BalanceReceipt {
    pub entry: LedgerEntry,
    pub new_balance: Decimal,
}

/// Purchase and balance engine over an explicitly passed store handle.
#[derive(Debug)]
pub struct Engine {
    store: Arc<Store>,
}

impl Engine {
    /// Creates an engine over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Engine { store }
    }

    /// The underlying store handle.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Executes a purchase as a single atomic unit.
    ///
    /// Items are validated in the order supplied by the caller; the balance
    /// check runs once, after the full total is known. Unit prices are read
    /// under the product locks and captured on the line items.
    ///
    /// # Errors
    ///
    /// - [`PurchaseError::EmptyItems`] - the request carried no line items.
    /// - [`PurchaseError::InvalidQuantity`] - a line item requested zero units.
    /// - [`PurchaseError::DuplicateItem`] - a product id appeared twice.
    /// - [`PurchaseError::AccountNotFound`] - the purchaser does not exist.
    /// - [`PurchaseError::ProductNotFound`] - a referenced product is absent.
    /// - [`PurchaseError::InsufficientStock`] - stock cannot cover a line item.
    /// - [`PurchaseError::InsufficientBalance`] - balance cannot cover the total.
    ///
    /// On any error nothing is written: the five effects (order, items, stock
    /// decrements, balance debit, ledger entry) commit together or not at all.
    pub fn purchase(
        &self,
        user_id: AccountId,
        items: &[OrderLine],
    ) -> Result<PurchaseReceipt, PurchaseError> {
        // Request-shape checks run before any store access.
        if items.is_empty() {
            return Err(PurchaseError::EmptyItems);
        }
        for line in items {
            if line.quantity == 0 {
                return Err(PurchaseError::InvalidQuantity(line.product_id));
            }
        }
        let mut seen = HashSet::with_capacity(items.len());
        for line in items {
            if !seen.insert(line.product_id) {
                return Err(PurchaseError::DuplicateItem(line.product_id));
            }
        }

        let account = self
            .store
            .account(user_id)
            .ok_or(PurchaseError::AccountNotFound(user_id))?;

        // Resolve every product handle in request order. Errors report the
        // first failing item by request position, so before a missing product
        // is surfaced the already-resolved lines get their stock check.
        let mut products = Vec::with_capacity(items.len());
        for line in items {
            match self.store.product(line.product_id) {
                Some(product) => products.push(product),
                None => {
                    for (prev, product) in items.iter().zip(products.iter()) {
                        let available = product.stock_quantity();
                        if available < prev.quantity {
                            return Err(PurchaseError::InsufficientStock {
                                product_id: prev.product_id,
                                name: product.name(),
                                available,
                                requested: prev.quantity,
                            });
                        }
                    }
                    return Err(PurchaseError::ProductNotFound(line.product_id));
                }
            }
        }

        // Canonical lock order: account, then products ascending by id.
        let mut acct = account.lock();

        let mut by_product_id: Vec<usize> = (0..items.len()).collect();
        by_product_id.sort_by_key(|&i| items[i].product_id);
        let mut guards: Vec<_> = by_product_id
            .into_iter()
            .map(|i| (i, products[i].lock()))
            .collect();
        // Back to request order for validation and error precedence.
        guards.sort_by_key(|(i, _)| *i);

        // Validate all items, accumulating the total, before any write.
        let mut total = Decimal::ZERO;
        for (line, (_, product)) in items.iter().zip(guards.iter()) {
            if product.stock_quantity() < line.quantity {
                return Err(PurchaseError::InsufficientStock {
                    product_id: line.product_id,
                    name: product.name().to_string(),
                    available: product.stock_quantity(),
                    requested: line.quantity,
                });
            }
            total += product.price() * Decimal::from(line.quantity);
        }

        if acct.balance() < total {
            return Err(PurchaseError::InsufficientBalance {
                current_balance: acct.balance(),
                required_amount: total,
            });
        }

        // All checks passed: apply the five effects under the held locks.
        let order_id = self.store.allocate_order_id();
        let created_at = Utc::now();

        let mut order_items = Vec::with_capacity(items.len());
        for (line, (_, product)) in items.iter().zip(guards.iter_mut()) {
            order_items.push(OrderItem {
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: product.price(),
            });
            product.remove_stock(line.quantity);
        }

        acct.debit(total);
        let new_balance = acct.balance();

        let order = Order {
            id: order_id,
            user_id,
            total_amount: total,
            status: OrderStatus::Confirmed,
            created_at,
        };
        self.store.append_order(order.clone(), order_items.clone());
        self.store.append_entry(LedgerEntry {
            id: self.store.allocate_entry_id(),
            user_id,
            kind: EntryKind::Debit,
            amount: total,
            description: PURCHASE_DESCRIPTION.to_string(),
            order_id: Some(order_id),
            created_at,
        });

        debug!(user = %user_id, order = %order_id, total = %total, "purchase committed");

        Ok(PurchaseReceipt {
            order,
            items: order_items,
            new_balance,
        })
    }

    /// Credits an account and appends the matching ledger entry.
    ///
    /// The two writes happen under the account lock, so they commit together.
    ///
    /// # Errors
    ///
    /// - [`BalanceError::InvalidAmount`] - `amount` is zero or negative; no
    ///   store access is attempted.
    /// - [`BalanceError::AccountNotFound`] - the account does not exist.
    pub fn add_balance(
        &self,
        user_id: AccountId,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<BalanceReceipt, BalanceError> {
        if amount <= Decimal::ZERO {
            return Err(BalanceError::InvalidAmount);
        }

        let account = self
            .store
            .account(user_id)
            .ok_or(BalanceError::AccountNotFound(user_id))?;

        let mut acct = account.lock();
        acct.credit(amount);
        let new_balance = acct.balance();

        let entry = LedgerEntry {
            id: self.store.allocate_entry_id(),
            user_id,
            kind: EntryKind::Credit,
            amount,
            description: description.unwrap_or(TOP_UP_DESCRIPTION).to_string(),
            order_id: None,
            created_at: Utc::now(),
        };
        self.store.append_entry(entry.clone());
        drop(acct);

        debug!(user = %user_id, amount = %amount, "balance credited");

        Ok(BalanceReceipt { entry, new_balance })
    }

    /// A user's order history, newest first, each line item enriched with the
    /// product's current display name. An account with no orders yields an
    /// empty vector.
    pub fn user_orders(&self, user_id: AccountId) -> Vec<OrderWithItems> {
        self.store
            .orders_for(user_id)
            .into_iter()
            .map(|(order, items)| OrderWithItems {
                order,
                items: items
                    .into_iter()
                    .map(|item| OrderItemView {
                        product_id: item.product_id,
                        product_name: self
                            .store
                            .product(item.product_id)
                            .map(|product| product.name()),
                        quantity: item.quantity,
                        price: item.price,
                    })
                    .collect(),
            })
            .collect()
    }

    /// A user's ledger entries, newest first.
    pub fn user_transactions(&self, user_id: AccountId) -> Vec<LedgerEntry> {
        self.store.entries_for(user_id)
    }

    /// A user's profile and current balance.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::AccountNotFound`] if the account is absent.
    pub fn user_balance(&self, user_id: AccountId) -> Result<BalanceView, BalanceError> {
        self.store
            .account(user_id)
            .map(|account| account.view())
            .ok_or(BalanceError::AccountNotFound(user_id))
    }
}
