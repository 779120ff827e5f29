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

//! Engine public API integration tests.

use market_demo_rs::{
    Account, AccountId, BalanceError, Engine, EntryKind, OrderLine, OrderStatus, Product,
    ProductId, PurchaseError, Role, Store, PURCHASE_DESCRIPTION, TOP_UP_DESCRIPTION,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn engine() -> Engine {
    Engine::new(Arc::new(Store::new()))
}

fn seed_account(engine: &Engine, id: u32, balance: Decimal) {
    engine
        .store()
        .insert_account(Account::new(
            AccountId(id),
            format!("user{id}"),
            format!("user{id}@example.com"),
            Role::User,
            balance,
        ))
        .unwrap();
}

fn seed_product(engine: &Engine, id: u32, name: &str, price: Decimal, stock: u32) {
    engine
        .store()
        .insert_product(Product::new(ProductId(id), name, price, stock))
        .unwrap();
}

fn line(product_id: u32, quantity: u32) -> OrderLine {
    OrderLine {
        product_id: ProductId(product_id),
        quantity,
    }
}

fn stock_of(engine: &Engine, id: u32) -> u32 {
    engine.store().product(ProductId(id)).unwrap().stock_quantity()
}

fn balance_of(engine: &Engine, id: u32) -> Decimal {
    engine.store().account(AccountId(id)).unwrap().balance()
}

// === Purchase: success path ===

#[test]
fn purchase_debits_balance_and_stock_and_records_everything() {
    let engine = engine();
    seed_account(&engine, 1, dec!(1000.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 50);

    let receipt = engine.purchase(AccountId(1), &[line(1, 2)]).unwrap();

    assert_eq!(receipt.order.total_amount, dec!(200.00));
    assert_eq!(receipt.order.user_id, AccountId(1));
    assert_eq!(receipt.order.status, OrderStatus::Confirmed);
    assert_eq!(receipt.new_balance, dec!(800.00));

    assert_eq!(balance_of(&engine, 1), dec!(800.00));
    assert_eq!(stock_of(&engine, 1), 48);

    // Exactly one debit entry, back-referencing the order.
    let entries = engine.user_transactions(AccountId(1));
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, EntryKind::Debit);
    assert_eq!(entries[0].amount, dec!(200.00));
    assert_eq!(entries[0].order_id, Some(receipt.order.id));
    assert_eq!(entries[0].description, PURCHASE_DESCRIPTION);
}

#[test]
fn purchase_captures_unit_price_on_line_items() {
    let engine = engine();
    seed_account(&engine, 1, dec!(1000.00));
    seed_product(&engine, 1, "Widget", dec!(19.90), 10);

    let receipt = engine.purchase(AccountId(1), &[line(1, 3)]).unwrap();

    assert_eq!(receipt.items.len(), 1);
    assert_eq!(receipt.items[0].price, dec!(19.90));
    assert_eq!(receipt.items[0].quantity, 3);
    assert_eq!(receipt.order.total_amount, dec!(59.70));
}

#[test]
fn purchase_with_multiple_products() {
    let engine = engine();
    seed_account(&engine, 1, dec!(500.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 5);
    seed_product(&engine, 2, "Gadget", dec!(45.50), 8);

    let receipt = engine
        .purchase(AccountId(1), &[line(1, 2), line(2, 3)])
        .unwrap();

    // 2 * 100.00 + 3 * 45.50
    assert_eq!(receipt.order.total_amount, dec!(336.50));
    assert_eq!(receipt.new_balance, dec!(163.50));
    assert_eq!(stock_of(&engine, 1), 3);
    assert_eq!(stock_of(&engine, 2), 5);
    assert_eq!(receipt.items.len(), 2);
}

#[test]
fn sequential_purchases_accumulate() {
    let engine = engine();
    seed_account(&engine, 1, dec!(300.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 5);

    engine.purchase(AccountId(1), &[line(1, 1)]).unwrap();
    engine.purchase(AccountId(1), &[line(1, 2)]).unwrap();

    assert_eq!(balance_of(&engine, 1), Decimal::ZERO);
    assert_eq!(stock_of(&engine, 1), 2);
    assert_eq!(engine.user_orders(AccountId(1)).len(), 2);
    assert_eq!(engine.user_transactions(AccountId(1)).len(), 2);
}

// === Purchase: request-shape errors ===

#[test]
fn empty_items_rejected_without_store_access() {
    let engine = engine();
    // No seeding: the request-shape check must fire before any lookup.
    let result = engine.purchase(AccountId(1), &[]);
    assert_eq!(result, Err(PurchaseError::EmptyItems));
}

#[test]
fn zero_quantity_rejected() {
    let engine = engine();
    seed_account(&engine, 1, dec!(1000.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 50);

    let result = engine.purchase(AccountId(1), &[line(1, 0)]);
    assert_eq!(result, Err(PurchaseError::InvalidQuantity(ProductId(1))));
    assert_eq!(stock_of(&engine, 1), 50);
}

#[test]
fn duplicate_product_ids_rejected() {
    let engine = engine();
    seed_account(&engine, 1, dec!(1000.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 50);

    let result = engine.purchase(AccountId(1), &[line(1, 1), line(1, 1)]);
    assert_eq!(result, Err(PurchaseError::DuplicateItem(ProductId(1))));
    assert_eq!(stock_of(&engine, 1), 50);
    assert_eq!(balance_of(&engine, 1), dec!(1000.00));
}

// === Purchase: not-found errors ===

#[test]
fn unknown_account_rejected() {
    let engine = engine();
    seed_product(&engine, 1, "Widget", dec!(100.00), 50);

    let result = engine.purchase(AccountId(42), &[line(1, 1)]);
    assert_eq!(result, Err(PurchaseError::AccountNotFound(AccountId(42))));
    assert_eq!(stock_of(&engine, 1), 50);
}

#[test]
fn unknown_product_rolls_back_whole_request() {
    let engine = engine();
    seed_account(&engine, 1, dec!(1000.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 50);

    // First line is valid; the missing product must void the whole unit.
    let result = engine.purchase(AccountId(1), &[line(1, 2), line(999, 1)]);
    assert_eq!(result, Err(PurchaseError::ProductNotFound(ProductId(999))));

    assert_eq!(balance_of(&engine, 1), dec!(1000.00));
    assert_eq!(stock_of(&engine, 1), 50);
    assert!(engine.user_orders(AccountId(1)).is_empty());
    assert!(engine.user_transactions(AccountId(1)).is_empty());
}

// === Purchase: business-rule violations ===

#[test]
fn insufficient_balance_reports_both_amounts() {
    let engine = engine();
    seed_account(&engine, 1, dec!(50.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 50);

    let result = engine.purchase(AccountId(1), &[line(1, 2)]);
    assert_eq!(
        result,
        Err(PurchaseError::InsufficientBalance {
            current_balance: dec!(50.00),
            required_amount: dec!(200.00),
        })
    );

    assert_eq!(balance_of(&engine, 1), dec!(50.00));
    assert_eq!(stock_of(&engine, 1), 50);
    assert!(engine.user_transactions(AccountId(1)).is_empty());
}

#[test]
fn insufficient_stock_names_the_product() {
    let engine = engine();
    seed_account(&engine, 1, dec!(1000.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 1);

    let result = engine.purchase(AccountId(1), &[line(1, 5)]);
    assert_eq!(
        result,
        Err(PurchaseError::InsufficientStock {
            product_id: ProductId(1),
            name: "Widget".to_string(),
            available: 1,
            requested: 5,
        })
    );

    assert_eq!(stock_of(&engine, 1), 1);
    assert_eq!(balance_of(&engine, 1), dec!(1000.00));
}

#[test]
fn short_stock_on_earlier_item_precedes_missing_later_product() {
    let engine = engine();
    seed_account(&engine, 1, dec!(1000.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 1);

    // Item validation runs in request order: the first line's stock failure
    // must be reported, not the later line's missing product.
    let result = engine.purchase(AccountId(1), &[line(1, 5), line(999, 1)]);
    assert_eq!(
        result,
        Err(PurchaseError::InsufficientStock {
            product_id: ProductId(1),
            name: "Widget".to_string(),
            available: 1,
            requested: 5,
        })
    );

    assert_eq!(stock_of(&engine, 1), 1);
    assert_eq!(balance_of(&engine, 1), dec!(1000.00));
}

#[test]
fn stock_check_takes_precedence_over_balance_check() {
    let engine = engine();
    seed_account(&engine, 1, dec!(1.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 1);

    // Both stock and balance are insufficient; item validation runs first.
    let result = engine.purchase(AccountId(1), &[line(1, 5)]);
    assert!(matches!(
        result,
        Err(PurchaseError::InsufficientStock { .. })
    ));
}

#[test]
fn balance_check_runs_after_all_items_are_validated() {
    let engine = engine();
    seed_account(&engine, 1, dec!(100.00));
    seed_product(&engine, 1, "Widget", dec!(80.00), 10);
    seed_product(&engine, 2, "Gadget", dec!(80.00), 10);

    // Each line alone is affordable; the total is not.
    let result = engine.purchase(AccountId(1), &[line(1, 1), line(2, 1)]);
    assert_eq!(
        result,
        Err(PurchaseError::InsufficientBalance {
            current_balance: dec!(100.00),
            required_amount: dec!(160.00),
        })
    );
    assert_eq!(stock_of(&engine, 1), 10);
    assert_eq!(stock_of(&engine, 2), 10);
}

// === Balance adjustment ===

#[test]
fn add_balance_credits_and_records_entry() {
    let engine = engine();
    seed_account(&engine, 1, dec!(100.00));

    let receipt = engine.add_balance(AccountId(1), dec!(50.00), None).unwrap();

    assert_eq!(receipt.new_balance, dec!(150.00));
    assert_eq!(receipt.entry.kind, EntryKind::Credit);
    assert_eq!(receipt.entry.amount, dec!(50.00));
    assert_eq!(receipt.entry.order_id, None);
    assert_eq!(receipt.entry.description, TOP_UP_DESCRIPTION);

    assert_eq!(balance_of(&engine, 1), dec!(150.00));
    assert_eq!(engine.user_transactions(AccountId(1)).len(), 1);
}

#[test]
fn add_balance_with_custom_description() {
    let engine = engine();
    seed_account(&engine, 1, dec!(0.00));

    let receipt = engine
        .add_balance(AccountId(1), dec!(25.00), Some("signup bonus"))
        .unwrap();
    assert_eq!(receipt.entry.description, "signup bonus");
}

#[test]
fn add_balance_rejects_non_positive_amounts() {
    let engine = engine();
    seed_account(&engine, 1, dec!(100.00));

    assert_eq!(
        engine.add_balance(AccountId(1), Decimal::ZERO, None),
        Err(BalanceError::InvalidAmount)
    );
    assert_eq!(
        engine.add_balance(AccountId(1), dec!(-5.00), None),
        Err(BalanceError::InvalidAmount)
    );

    // Nothing mutated, nothing logged.
    assert_eq!(balance_of(&engine, 1), dec!(100.00));
    assert!(engine.user_transactions(AccountId(1)).is_empty());
}

#[test]
fn add_balance_unknown_account() {
    let engine = engine();
    let result = engine.add_balance(AccountId(7), dec!(10.00), None);
    assert_eq!(result, Err(BalanceError::AccountNotFound(AccountId(7))));
}

// === Query layer ===

#[test]
fn order_history_is_newest_first_with_enriched_items() {
    let engine = engine();
    seed_account(&engine, 1, dec!(1000.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 50);
    seed_product(&engine, 2, "Gadget", dec!(10.00), 50);

    engine.purchase(AccountId(1), &[line(1, 1)]).unwrap();
    engine.purchase(AccountId(1), &[line(2, 2)]).unwrap();

    let orders = engine.user_orders(AccountId(1));
    assert_eq!(orders.len(), 2);
    assert!(orders[0].order.id > orders[1].order.id);

    // Newest order first: the Gadget purchase.
    assert_eq!(orders[0].items.len(), 1);
    assert_eq!(orders[0].items[0].product_name.as_deref(), Some("Gadget"));
    assert_eq!(orders[0].items[0].price, dec!(10.00));
    assert_eq!(orders[1].items[0].product_name.as_deref(), Some("Widget"));
}

#[test]
fn removed_product_keeps_captured_price_but_loses_name() {
    let engine = engine();
    seed_account(&engine, 1, dec!(1000.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 50);

    engine.purchase(AccountId(1), &[line(1, 1)]).unwrap();
    engine.store().remove_product(ProductId(1));

    let orders = engine.user_orders(AccountId(1));
    assert_eq!(orders[0].items[0].product_name, None);
    assert_eq!(orders[0].items[0].price, dec!(100.00));
}

#[test]
fn fresh_account_has_empty_histories() {
    let engine = engine();
    seed_account(&engine, 1, dec!(100.00));

    assert!(engine.user_orders(AccountId(1)).is_empty());
    assert!(engine.user_transactions(AccountId(1)).is_empty());
}

#[test]
fn transaction_history_is_newest_first() {
    let engine = engine();
    seed_account(&engine, 1, dec!(1000.00));
    seed_product(&engine, 1, "Widget", dec!(100.00), 50);

    engine.add_balance(AccountId(1), dec!(10.00), None).unwrap();
    engine.purchase(AccountId(1), &[line(1, 1)]).unwrap();

    let entries = engine.user_transactions(AccountId(1));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, EntryKind::Debit);
    assert_eq!(entries[1].kind, EntryKind::Credit);
}

#[test]
fn user_balance_returns_profile_view() {
    let engine = engine();
    seed_account(&engine, 1, dec!(42.00));

    let view = engine.user_balance(AccountId(1)).unwrap();
    assert_eq!(view.id, AccountId(1));
    assert_eq!(view.name, "user1");
    assert_eq!(view.email, "user1@example.com");
    assert_eq!(view.balance, dec!(42.00));

    assert_eq!(
        engine.user_balance(AccountId(2)),
        Err(BalanceError::AccountNotFound(AccountId(2)))
    );
}
