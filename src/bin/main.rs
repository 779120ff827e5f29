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

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use market_demo_rs::{
    Account, AccountId, Engine, OrderLine, Product, ProductId, Role, Store,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Market Demo - Replay shop operation CSV files
///
/// Reads seed data and operations from a CSV file, runs them through the
/// purchase engine, and outputs the final account (or product) states to
/// stdout.
#[derive(Parser, Debug)]
#[command(name = "market-demo-rs")]
#[command(about = "A purchase engine that replays shop operation CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: op,user,product,qty,amount,name
    /// Example: cargo run -- operations.csv > accounts.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output the product table instead of the account table
    #[arg(long)]
    products: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let engine = match replay_operations(BufReader::new(file)) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error replaying operations: {}", e);
            process::exit(1);
        }
    };

    let result = if args.products {
        write_products(&engine, std::io::stdout())
    } else {
        write_accounts(&engine, std::io::stdout())
    };
    if let Err(e) = result {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `op, user, product, qty, amount, name`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    op: String,
    #[serde(deserialize_with = "csv::invalid_option", default)]
    user: Option<u32>,
    #[serde(deserialize_with = "csv::invalid_option", default)]
    product: Option<u32>,
    #[serde(deserialize_with = "csv::invalid_option", default)]
    qty: Option<u32>,
    #[serde(deserialize_with = "csv::invalid_option", default)]
    amount: Option<Decimal>,
    #[serde(default)]
    name: Option<String>,
}

/// One replayable shop operation.
#[derive(Debug)]
enum Operation {
    SeedAccount {
        id: AccountId,
        name: String,
        balance: Decimal,
    },
    SeedProduct {
        id: ProductId,
        name: String,
        price: Decimal,
        stock: u32,
    },
    Credit {
        user: AccountId,
        amount: Decimal,
    },
    Purchase {
        user: AccountId,
        line: OrderLine,
    },
}

impl CsvRecord {
    /// Converts a CSV record into an operation.
    ///
    /// Returns `None` for unknown ops or missing required fields.
    fn into_operation(self) -> Option<Operation> {
        match self.op.to_lowercase().as_str() {
            "account" => {
                let id = AccountId(self.user?);
                let name = self
                    .name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| format!("user{}", id));
                Some(Operation::SeedAccount {
                    id,
                    name,
                    balance: self.amount?,
                })
            }
            "product" => {
                let id = ProductId(self.product?);
                let name = self
                    .name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| format!("product{}", id));
                Some(Operation::SeedProduct {
                    id,
                    name,
                    price: self.amount?,
                    stock: self.qty?,
                })
            }
            "credit" => Some(Operation::Credit {
                user: AccountId(self.user?),
                amount: self.amount?,
            }),
            "purchase" => Some(Operation::Purchase {
                user: AccountId(self.user?),
                line: OrderLine {
                    product_id: ProductId(self.product?),
                    quantity: self.qty?,
                },
            }),
            _ => None,
        }
    }
}

/// Replays operations from a CSV reader.
///
/// Uses streaming parsing so arbitrarily large files never load fully into
/// memory. Malformed rows and rejected operations are skipped with a warning.
///
/// # CSV Format
///
/// Expected columns: `op, user, product, qty, amount, name`
/// - `op`: Operation (account, product, credit, purchase)
/// - `user`: Account id (for account, credit, purchase)
/// - `product`: Product id (for product, purchase)
/// - `qty`: Stock count (product) or purchase quantity
/// - `amount`: Opening balance, product price, or credit amount
/// - `name`: Display name for seeded accounts and products
///
/// # Example
///
/// ```csv
/// op,user,product,qty,amount,name
/// account,1,,,1000.00,Alice
/// product,,1,50,100.00,Widget
/// purchase,1,1,2,,
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
/// Individual operation failures do not stop processing.
pub fn replay_operations<R: Read>(reader: R) -> Result<Engine, csv::Error> {
    let store = Arc::new(Store::new());
    let engine = Engine::new(store);

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " purchase "
        .flexible(true) // Allow missing trailing fields
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<CsvRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("skipping malformed row: {}", e);
                continue;
            }
        };

        let Some(op) = record.into_operation() else {
            tracing::warn!("skipping invalid operation record");
            continue;
        };

        let outcome: Result<(), String> = match op {
            Operation::SeedAccount { id, name, balance } => {
                let email = format!("{}@shop.test", name.to_lowercase());
                engine
                    .store()
                    .insert_account(Account::new(id, name, email, Role::User, balance))
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            }
            Operation::SeedProduct {
                id,
                name,
                price,
                stock,
            } => engine
                .store()
                .insert_product(Product::new(id, name, price, stock))
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Operation::Credit { user, amount } => engine
                .add_balance(user, amount, None)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Operation::Purchase { user, line } => engine
                .purchase(user, &[line])
                .map(|_| ())
                .map_err(|e| e.to_string()),
        };

        if let Err(reason) = outcome {
            tracing::warn!("skipping rejected operation: {}", reason);
        }
    }

    Ok(engine)
}

/// Writes final account states as CSV.
///
/// # CSV Format
///
/// Columns: `id, name, email, role, active, balance`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_accounts<W: Write>(engine: &Engine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for account in engine.store().accounts() {
        wtr.serialize(&*account)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes final product states as CSV.
///
/// # CSV Format
///
/// Columns: `id, name, price, stock_quantity`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_products<W: Write>(engine: &Engine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for product in engine.store().products() {
        wtr.serialize(&*product)?;
    }
    wtr.flush()?;
    Ok(())
}
