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

//! Error types for the purchase and balance engines.
//!
//! Business-rule violations (insufficient stock or balance) carry the numeric
//! context a client needs to render a precise message without re-querying.

use crate::base::{AccountId, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Storage-level failures.
///
/// The bundled in-memory store cannot fail mid-transaction; this surface
/// exists for the seeding paths and for fallible backing stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with the same id already exists.
    #[error("record id already in use")]
    Conflict,
}

/// Purchase processing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    /// The request carried no line items.
    #[error("items list must not be empty")]
    EmptyItems,

    /// A line item requested zero units.
    #[error("quantity for product {0} must be positive")]
    InvalidQuantity(ProductId),

    /// The same product appeared in more than one line item.
    #[error("product {0} appears more than once in the request")]
    DuplicateItem(ProductId),

    /// The purchasing account does not exist.
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    /// A referenced product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// A product cannot cover the requested quantity.
    #[error("insufficient stock for product {name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        available: u32,
        requested: u32,
    },

    /// The account balance cannot cover the order total.
    #[error("insufficient balance: current {current_balance}, required {required_amount}")]
    InsufficientBalance {
        current_balance: Decimal,
        required_amount: Decimal,
    },

    /// The backing store failed; the whole unit was rolled back.
    #[error("purchase failed: {0}")]
    PurchaseFailed(#[from] StoreError),
}

/// Balance adjustment errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    /// The credit amount was zero or negative.
    #[error("amount must be positive")]
    InvalidAmount,

    /// The target account does not exist.
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    /// The backing store failed; neither write persisted.
    #[error("balance adjustment failed: {0}")]
    AdjustmentFailed(#[from] StoreError),
}

/// Access-gate errors, raised before the engine is invoked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No account exists for the presented identity.
    #[error("unknown principal")]
    UnknownPrincipal,

    /// The account exists but has been deactivated.
    #[error("account is disabled")]
    AccountDisabled,

    /// The policy denied the operation for this principal.
    #[error("operation not permitted")]
    Forbidden,
}
