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

//! The access-control gate.
//!
//! A [`Principal`] is resolved from an authenticated identity by
//! [`Store::principal`](crate::Store::principal) and checked against a policy
//! function before the engine is invoked. Plain allow/deny functions, no
//! middleware chain.

use crate::account::Role;
use crate::base::AccountId;
use crate::error::AccessError;
use serde::{Deserialize, Serialize};

/// The authenticated identity a request acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub account_id: AccountId,
    pub role: Role,
}

/// Allows the owner of a resource, or any admin.
///
/// # Errors
///
/// Returns [`AccessError::Forbidden`] for any other principal.
pub fn require_owner_or_admin(principal: &Principal, owner: AccountId) -> Result<(), AccessError> {
    if principal.account_id == owner || principal.role == Role::Admin {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}

/// Allows admins only.
///
/// # Errors
///
/// Returns [`AccessError::Forbidden`] for non-admin principals.
pub fn require_admin(principal: &Principal) -> Result<(), AccessError> {
    if principal.role == Role::Admin {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}
