//! Simple REST API server example for the purchase engine.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `POST /purchases` - Execute a purchase (atomic stock/balance/order/ledger update)
//! - `POST /balance` - Credit an account
//! - `GET /users/:id/orders` - Order history with line items, newest first
//! - `GET /users/:id/transactions` - Ledger entries, newest first
//! - `GET /users/:id/balance` - Profile and current balance
//!
//! Every endpoint requires an `x-user-id` header naming the acting user; the
//! owner-or-admin policy is enforced against the addressed account before the
//! engine runs, on writes and reads alike.
//!
//! ## Example Usage
//!
//! ```bash
//! # Purchase two units of product 1 as user 1
//! curl -X POST http://localhost:3000/purchases \
//!   -H "Content-Type: application/json" -H "x-user-id: 1" \
//!   -d '{"user_id": 1, "items": [{"product_id": 1, "quantity": 2}]}'
//!
//! # Credit user 1
//! curl -X POST http://localhost:3000/balance \
//!   -H "Content-Type: application/json" -H "x-user-id: 1" \
//!   -d '{"user_id": 1, "amount": "50.00"}'
//!
//! # Order history
//! curl -H "x-user-id: 1" http://localhost:3000/users/1/orders
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use market_demo_rs::{
    require_owner_or_admin, Account, AccountId, AccessError, BalanceError, BalanceReceipt,
    BalanceView, Engine, LedgerEntry, OrderLine, OrderWithItems, Product, ProductId,
    PurchaseError, PurchaseReceipt, Role, Store,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

// === Request/Response DTOs ===

/// Request body for executing a purchase.
///
/// ```json
/// {"user_id": 1, "items": [{"product_id": 1, "quantity": 2}]}
/// ```
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub user_id: u32,
    pub items: Vec<LineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct LineRequest {
    pub product_id: u32,
    pub quantity: u32,
}

/// Request body for crediting an account.
#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    pub user_id: u32,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the purchase engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

// === Error Handling ===

/// Wrapper converting engine errors into HTTP responses.
pub enum AppError {
    Purchase(PurchaseError),
    Balance(BalanceError),
    Access(AccessError),
}

impl From<PurchaseError> for AppError {
    fn from(err: PurchaseError) -> Self {
        AppError::Purchase(err)
    }
}

impl From<BalanceError> for AppError {
    fn from(err: BalanceError) -> Self {
        AppError::Balance(err)
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        AppError::Access(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Purchase(err) => {
                let (status, code) = match err {
                    PurchaseError::EmptyItems
                    | PurchaseError::InvalidQuantity(_)
                    | PurchaseError::DuplicateItem(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
                    PurchaseError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND"),
                    PurchaseError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
                    PurchaseError::InsufficientStock { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_STOCK")
                    }
                    PurchaseError::InsufficientBalance { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_BALANCE")
                    }
                    PurchaseError::PurchaseFailed(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "PURCHASE_FAILED")
                    }
                };
                (status, code, err.to_string())
            }
            AppError::Balance(err) => {
                let (status, code) = match err {
                    BalanceError::InvalidAmount => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
                    BalanceError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND"),
                    BalanceError::AdjustmentFailed(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "ADJUSTMENT_FAILED")
                    }
                };
                (status, code, err.to_string())
            }
            AppError::Access(err) => {
                let (status, code) = match err {
                    AccessError::UnknownPrincipal => (StatusCode::UNAUTHORIZED, "UNKNOWN_PRINCIPAL"),
                    AccessError::AccountDisabled => (StatusCode::FORBIDDEN, "ACCOUNT_DISABLED"),
                    AccessError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                };
                (status, code, err.to_string())
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

/// Resolves the acting principal from the `x-user-id` header and enforces the
/// owner-or-admin policy for the addressed resource.
fn authorize(state: &AppState, headers: &HeaderMap, owner: AccountId) -> Result<(), AppError> {
    let acting_id = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u32>().ok())
        .ok_or(AccessError::UnknownPrincipal)?;
    let principal = state.engine.store().principal(AccountId(acting_id))?;
    require_owner_or_admin(&principal, owner)?;
    Ok(())
}

// === Handlers ===

/// POST /purchases - Execute a purchase.
async fn create_purchase(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<PurchaseReceipt>, AppError> {
    authorize(&state, &headers, AccountId(request.user_id))?;
    let items: Vec<OrderLine> = request
        .items
        .iter()
        .map(|line| OrderLine {
            product_id: ProductId(line.product_id),
            quantity: line.quantity,
        })
        .collect();
    let receipt = state.engine.purchase(AccountId(request.user_id), &items)?;
    Ok(Json(receipt))
}

/// POST /balance - Credit an account.
async fn add_balance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BalanceRequest>,
) -> Result<Json<BalanceReceipt>, AppError> {
    authorize(&state, &headers, AccountId(request.user_id))?;
    let receipt = state.engine.add_balance(
        AccountId(request.user_id),
        request.amount,
        request.description.as_deref(),
    )?;
    Ok(Json(receipt))
}

/// GET /users/:id/orders - Order history.
async fn get_orders(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderWithItems>>, AppError> {
    let owner = AccountId(id);
    authorize(&state, &headers, owner)?;
    Ok(Json(state.engine.user_orders(owner)))
}

/// GET /users/:id/transactions - Ledger history.
async fn get_transactions(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    headers: HeaderMap,
) -> Result<Json<Vec<LedgerEntry>>, AppError> {
    let owner = AccountId(id);
    authorize(&state, &headers, owner)?;
    Ok(Json(state.engine.user_transactions(owner)))
}

/// GET /users/:id/balance - Profile and current balance.
async fn get_balance(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    headers: HeaderMap,
) -> Result<Json<BalanceView>, AppError> {
    let owner = AccountId(id);
    authorize(&state, &headers, owner)?;
    let view = state.engine.user_balance(owner)?;
    Ok(Json(view))
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/purchases", post(create_purchase))
        .route("/balance", post(add_balance))
        .route("/users/{id}/orders", get(get_orders))
        .route("/users/{id}/transactions", get(get_transactions))
        .route("/users/{id}/balance", get(get_balance))
        .with_state(state)
}

/// Seeds a small demo catalog and two users.
fn seed(store: &Store) {
    let seeds = [
        Account::new(AccountId(1), "Alice", "alice@shop.test", Role::User, dec!(1000.00)),
        Account::new(AccountId(2), "Bob", "bob@shop.test", Role::User, dec!(50.00)),
        Account::new(AccountId(9), "Root", "root@shop.test", Role::Admin, dec!(0.00)),
    ];
    for account in seeds {
        let _ = store.insert_account(account);
    }

    let products = [
        Product::new(ProductId(1), "Mechanical Keyboard", dec!(100.00), 50),
        Product::new(ProductId(2), "Trackball Mouse", dec!(45.50), 20),
        Product::new(ProductId(3), "Laptop Stand", dec!(79.90), 1),
    ];
    for product in products {
        let _ = store.insert_product(product);
    }
}

// === Main ===

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let store = Arc::new(Store::new());
    seed(&store);

    let state = AppState {
        engine: Arc::new(Engine::new(store)),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
    println!("Market API server running on http://127.0.0.1:3000");
    println!();
    println!("Endpoints:");
    println!("  POST /purchases               - Execute a purchase");
    println!("  POST /balance                 - Credit an account");
    println!("  GET  /users/:id/orders        - Order history");
    println!("  GET  /users/:id/transactions  - Ledger history");
    println!("  GET  /users/:id/balance       - Current balance");

    axum::serve(listener, app).await.unwrap();
}
