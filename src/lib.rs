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

//! # Market Demo
//!
//! This library provides a purchase transaction engine for a storefront:
//! accounts with monetary balances, a product catalog with stock counts, and
//! an atomic purchase flow that debits the buyer, decrements inventory,
//! records the order with its line items, and appends a ledger entry under a
//! single all-or-nothing guarantee.
//!
//! ## Core Components
//!
//! - [`Engine`]: executes purchases, balance credits, and history queries
//! - [`Store`]: the in-memory relational surface the engine mutates
//! - [`Account`] / [`Product`]: lock-guarded records with balances and stock
//! - [`PurchaseError`] / [`BalanceError`]: typed failures with numeric context
//!
//! ## Example
//!
//! ```
//! use market_demo_rs::{
//!     Account, AccountId, Engine, OrderLine, Product, ProductId, Role, Store,
//! };
//! use rust_decimal_macros::dec;
//! use std::sync::Arc;
//!
//! let store = Arc::new(Store::new());
//! store
//!     .insert_account(Account::new(
//!         AccountId(1),
//!         "Alice",
//!         "alice@example.com",
//!         Role::User,
//!         dec!(1000.00),
//!     ))
//!     .unwrap();
//! store
//!     .insert_product(Product::new(ProductId(1), "Widget", dec!(100.00), 50))
//!     .unwrap();
//!
//! let engine = Engine::new(store);
//! let receipt = engine
//!     .purchase(AccountId(1), &[OrderLine { product_id: ProductId(1), quantity: 2 }])
//!     .unwrap();
//!
//! assert_eq!(receipt.order.total_amount, dec!(200.00));
//! assert_eq!(receipt.new_balance, dec!(800.00));
//! ```
//!
//! ## Thread Safety
//!
//! Record locks are acquired in a canonical order (account first, then
//! products by ascending id) and held across each operation's whole
//! check-then-write sequence, so concurrent purchases of the same product or
//! account serialize instead of over-selling.

pub mod access;
pub mod account;
mod base;
mod engine;
pub mod error;
mod ledger;
mod order;
mod product;
mod store;

pub use access::{require_admin, require_owner_or_admin, Principal};
pub use account::{Account, BalanceView, Role};
pub use base::{AccountId, EntryId, OrderId, ProductId};
pub use engine::{
    BalanceReceipt, Engine, PurchaseReceipt, PURCHASE_DESCRIPTION, TOP_UP_DESCRIPTION,
};
pub use error::{AccessError, BalanceError, PurchaseError, StoreError};
pub use ledger::{EntryKind, LedgerEntry};
pub use order::{Order, OrderItem, OrderItemView, OrderLine, OrderStatus, OrderWithItems};
pub use product::Product;
pub use store::Store;
