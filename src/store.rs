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

//! The ledger store: accounts, products, orders, order items, and the
//! transaction ledger.
//!
//! Record tables use [`DashMap`] for concurrent access across users, the
//! order and ledger tables are append-only vectors behind [`RwLock`]s, and
//! order/entry ids come from monotonic counters. The store is an explicit
//! handle passed to the [`Engine`](crate::Engine) rather than an ambient
//! process-wide pool, so tests can build isolated stores.
//!
//! Lock order is canonical throughout the crate: account, then products in
//! ascending id order, then the append-only tables. Every code path that
//! takes more than one lock follows it.

use crate::access::Principal;
use crate::account::Account;
use crate::base::{AccountId, EntryId, OrderId, ProductId};
use crate::error::{AccessError, StoreError};
use crate::ledger::LedgerEntry;
use crate::order::{Order, OrderItem};
use crate::product::Product;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory relational surface for the purchase engine.
#[derive(Debug, Default)]
pub struct Store {
    /// Accounts indexed by id.
    accounts: DashMap<AccountId, Arc<Account>>,
    /// Catalog products indexed by id.
    products: DashMap<ProductId, Arc<Product>>,
    /// Append-only order table.
    orders: RwLock<Vec<Order>>,
    /// Line items indexed by owning order.
    order_items: RwLock<HashMap<OrderId, Vec<OrderItem>>>,
    /// Append-only transaction ledger.
    ledger: RwLock<Vec<LedgerEntry>>,
    next_order_id: AtomicU64,
    next_entry_id: AtomicU64,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an account, rejecting a duplicate id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if an account with the same id exists.
    pub fn insert_account(&self, account: Account) -> Result<Arc<Account>, StoreError> {
        // Entry API for atomic check-and-insert.
        match self.accounts.entry(account.id()) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                let account = Arc::new(account);
                slot.insert(Arc::clone(&account));
                Ok(account)
            }
        }
    }

    /// Inserts a product, rejecting a duplicate id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if a product with the same id exists.
    pub fn insert_product(&self, product: Product) -> Result<Arc<Product>, StoreError> {
        match self.products.entry(product.id()) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                let product = Arc::new(product);
                slot.insert(Arc::clone(&product));
                Ok(product)
            }
        }
    }

    /// Retrieves an account handle by id.
    pub fn account(&self, id: AccountId) -> Option<Arc<Account>> {
        self.accounts.get(&id).map(|entry| Arc::clone(&entry))
    }

    /// Retrieves a product handle by id.
    pub fn product(&self, id: ProductId) -> Option<Arc<Product>> {
        self.products.get(&id).map(|entry| Arc::clone(&entry))
    }

    /// Removes a product from the catalog. Existing order items keep their
    /// captured prices; the order-history read side shows a missing name.
    pub fn remove_product(&self, id: ProductId) -> Option<Arc<Product>> {
        self.products.remove(&id).map(|(_, product)| product)
    }

    /// All accounts, in ascending id order.
    pub fn accounts(&self) -> Vec<Arc<Account>> {
        let mut accounts: Vec<_> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        accounts.sort_by_key(|account| account.id());
        accounts
    }

    /// All products, in ascending id order.
    pub fn products(&self) -> Vec<Arc<Product>> {
        let mut products: Vec<_> = self
            .products
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        products.sort_by_key(|product| product.id());
        products
    }

    /// Resolves an authenticated identity into a [`Principal`].
    ///
    /// # Errors
    ///
    /// - [`AccessError::UnknownPrincipal`] if no account exists for the id.
    /// - [`AccessError::AccountDisabled`] if the account was deactivated.
    pub fn principal(&self, id: AccountId) -> Result<Principal, AccessError> {
        let account = self.account(id).ok_or(AccessError::UnknownPrincipal)?;
        if !account.active() {
            return Err(AccessError::AccountDisabled);
        }
        Ok(Principal {
            account_id: id,
            role: account.role(),
        })
    }

    pub(crate) fn allocate_order_id(&self) -> OrderId {
        OrderId(self.next_order_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub(crate) fn allocate_entry_id(&self) -> EntryId {
        EntryId(self.next_entry_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Appends an order with its line items.
    ///
    /// Called only by the engine while the account and product locks of the
    /// purchase are still held, so the order becomes visible atomically with
    /// the stock and balance mutations.
    pub(crate) fn append_order(&self, order: Order, items: Vec<OrderItem>) {
        self.orders.write().push(order);
        let mut table = self.order_items.write();
        for item in items {
            table.entry(item.order_id).or_default().push(item);
        }
    }

    /// Appends a ledger entry. Same visibility contract as
    /// [`append_order`](Self::append_order).
    pub(crate) fn append_entry(&self, entry: LedgerEntry) {
        self.ledger.write().push(entry);
    }

    /// A user's orders with their raw line items, newest first.
    pub fn orders_for(&self, user_id: AccountId) -> Vec<(Order, Vec<OrderItem>)> {
        let orders = self.orders.read();
        let items = self.order_items.read();
        let mut rows: Vec<_> = orders
            .iter()
            .filter(|order| order.user_id == user_id)
            .map(|order| {
                (
                    order.clone(),
                    items.get(&order.id).cloned().unwrap_or_default(),
                )
            })
            .collect();
        rows.sort_by(|a, b| b.0.id.cmp(&a.0.id));
        rows
    }

    /// A user's ledger entries, newest first.
    pub fn entries_for(&self, user_id: AccountId) -> Vec<LedgerEntry> {
        let mut entries: Vec<_> = self
            .ledger
            .read()
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        entries
    }
}
