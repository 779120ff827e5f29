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

//! User accounts.
//!
//! An [`Account`] holds a user's profile and monetary balance behind a mutex.
//! The balance is only ever mutated by the purchase engine (debit) and the
//! balance-adjustment engine (credit), both of which hold the account lock for
//! the whole check-then-write sequence.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use market_demo_rs::{Account, AccountId, Role};
//!
//! let account = Account::new(AccountId(1), "Alice", "alice@example.com", Role::User, dec!(100.00));
//! assert_eq!(account.balance(), dec!(100.00));
//! ```

use crate::base::AccountId;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::Deserialize;

/// Authorization role attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug)]
pub(crate) struct AccountData {
    id: AccountId,
    name: String,
    email: String,
    role: Role,
    active: bool,
    balance: Decimal,
}

impl AccountData {
    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: account {} balance went negative: {}",
            self.id,
            self.balance
        );
    }

    pub(crate) fn balance(&self) -> Decimal {
        self.balance
    }

    /// Increases the balance.
    ///
    /// The caller has already validated `amount > 0`.
    pub(crate) fn credit(&mut self, amount: Decimal) {
        debug_assert!(amount > Decimal::ZERO);
        self.balance += amount;
        self.assert_invariants();
    }

    /// Decreases the balance.
    ///
    /// The caller has already validated `amount > 0` and checked that the
    /// balance covers it while holding this account's lock.
    pub(crate) fn debit(&mut self, amount: Decimal) {
        debug_assert!(amount > Decimal::ZERO);
        debug_assert!(self.balance >= amount);
        self.balance -= amount;
        self.assert_invariants();
    }
}

/// Snapshot of an account's public profile and balance.
///
/// This is the read shape returned by the balance query.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct BalanceView {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub balance: Decimal,
}

/// A user account with a monetary balance.
#[derive(Debug)]
pub struct Account {
    inner: Mutex<AccountData>,
}

impl Account {
    /// Monetary values are rendered with two decimal places.
    const DECIMAL_PRECISION: u32 = 2;

    pub fn new(
        id: AccountId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        opening_balance: Decimal,
    ) -> Self {
        debug_assert!(opening_balance >= Decimal::ZERO);
        Self {
            inner: Mutex::new(AccountData {
                id,
                name: name.into(),
                email: email.into(),
                role,
                active: true,
                balance: opening_balance,
            }),
        }
    }

    pub fn id(&self) -> AccountId {
        self.inner.lock().id
    }

    pub fn balance(&self) -> Decimal {
        self.inner.lock().balance
    }

    pub fn role(&self) -> Role {
        self.inner.lock().role
    }

    pub fn active(&self) -> bool {
        self.inner.lock().active
    }

    /// Enables or disables the account. Disabled accounts fail principal
    /// resolution at the access gate; committed balances are untouched.
    pub fn set_active(&self, active: bool) {
        self.inner.lock().active = active;
    }

    /// Returns the profile-and-balance read shape.
    pub fn view(&self) -> BalanceView {
        let data = self.inner.lock();
        BalanceView {
            id: data.id,
            name: data.name.clone(),
            email: data.email.clone(),
            balance: data.balance,
        }
    }

    /// Acquires the account lock for the duration of a transactional unit.
    ///
    /// The engine holds this guard across validation and mutation so that
    /// concurrent operations on the same account serialize.
    pub(crate) fn lock(&self) -> MutexGuard<'_, AccountData> {
        self.inner.lock()
    }
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = self.inner.lock();
        let mut state = serializer.serialize_struct("Account", 6)?;
        state.serialize_field("id", &data.id)?;
        state.serialize_field("name", &data.name)?;
        state.serialize_field("email", &data.email)?;
        state.serialize_field("role", &data.role)?;
        state.serialize_field("active", &data.active)?;
        state.serialize_field(
            "balance",
            &data.balance.round_dp(Account::DECIMAL_PRECISION),
        )?;
        state.end()
    }
}
