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

//! Catalog products.
//!
//! A [`Product`] guards its price and stock count with a mutex, the same
//! pattern [`Account`](crate::Account) uses for balances. The purchase engine
//! locks every product in a request (in ascending id order, after the account)
//! and holds the guards across stock validation and decrement.

use crate::base::ProductId;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug)]
pub(crate) struct ProductData {
    id: ProductId,
    name: String,
    price: Decimal,
    stock_quantity: u32,
}

impl ProductData {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn price(&self) -> Decimal {
        self.price
    }

    pub(crate) fn stock_quantity(&self) -> u32 {
        self.stock_quantity
    }

    /// Removes `quantity` units from stock.
    ///
    /// The caller has already verified availability while holding this
    /// product's lock; `stock_quantity` is unsigned so it can never go
    /// negative.
    pub(crate) fn remove_stock(&mut self, quantity: u32) {
        debug_assert!(
            self.stock_quantity >= quantity,
            "Invariant violated: product {} stock {} cannot cover {}",
            self.id,
            self.stock_quantity,
            quantity
        );
        self.stock_quantity -= quantity;
    }

    pub(crate) fn set_stock(&mut self, quantity: u32) {
        self.stock_quantity = quantity;
    }
}

/// A catalog product with a price and a stock count.
#[derive(Debug)]
pub struct Product {
    inner: Mutex<ProductData>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal, stock_quantity: u32) -> Self {
        debug_assert!(price > Decimal::ZERO);
        Self {
            inner: Mutex::new(ProductData {
                id,
                name: name.into(),
                price,
                stock_quantity,
            }),
        }
    }

    pub fn id(&self) -> ProductId {
        self.inner.lock().id
    }

    pub fn name(&self) -> String {
        self.inner.lock().name.clone()
    }

    pub fn price(&self) -> Decimal {
        self.inner.lock().price
    }

    pub fn stock_quantity(&self) -> u32 {
        self.inner.lock().stock_quantity
    }

    /// Replaces the stock count. Catalog management only; purchases go through
    /// the engine.
    pub fn set_stock(&self, quantity: u32) {
        self.inner.lock().set_stock(quantity);
    }

    /// Acquires the product lock for the duration of a transactional unit.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ProductData> {
        self.inner.lock()
    }
}

impl Serialize for Product {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = self.inner.lock();
        let mut state = serializer.serialize_struct("Product", 4)?;
        state.serialize_field("id", &data.id)?;
        state.serialize_field("name", &data.name)?;
        state.serialize_field("price", &data.price)?;
        state.serialize_field("stock_quantity", &data.stock_quantity)?;
        state.end()
    }
}
