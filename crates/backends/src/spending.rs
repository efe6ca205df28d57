use std::collections::BTreeMap;

use axum::routing::{get, post};
use axum::{Json, Router};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy)]
struct Transaction {
    category: &'static str,
    amount: i64,
}

const fn txn(category: &'static str, amount: i64) -> Transaction {
    Transaction { category, amount }
}

static TRANSACTIONS: Lazy<BTreeMap<&'static str, Vec<Transaction>>> = Lazy::new(|| {
    BTreeMap::from([
        (
            "user_123",
            vec![
                txn("Food", 2500),
                txn("Transport", 1200),
                txn("Shopping", 4500),
                txn("Utilities", 800),
                txn("Entertainment", 1500),
            ],
        ),
        (
            "user_456",
            vec![txn("Food", 1800), txn("Rent", 15000), txn("Shopping", 3200)],
        ),
        (
            "user_789",
            vec![txn("Gym", 500), txn("Food", 3000), txn("Transport", 2000)],
        ),
    ])
});

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryRequest {
    pub user_id: String,
    pub month: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub user_id: String,
    pub total_spent: i64,
    pub by_category: BTreeMap<String, i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_category_amount: Option<i64>,
    pub transaction_count: usize,
    pub insight: String,
}

pub fn spending_summary(user_id: &str, _month: Option<&str>) -> SpendingSummary {
    let transactions = TRANSACTIONS.get(user_id).map(Vec::as_slice).unwrap_or(&[]);

    if transactions.is_empty() {
        return SpendingSummary {
            user_id: user_id.to_string(),
            total_spent: 0,
            by_category: BTreeMap::new(),
            top_category: None,
            top_category_amount: None,
            transaction_count: 0,
            insight: format!("No transactions found for {user_id}"),
        };
    }

    let mut by_category: BTreeMap<String, i64> = BTreeMap::new();
    let mut total = 0_i64;
    for transaction in transactions {
        total += transaction.amount;
        *by_category
            .entry(transaction.category.to_string())
            .or_default() += transaction.amount;
    }

    // Strictly-greater keeps the first category in alphabetical order on ties.
    let (top_category, top_amount) = by_category
        .iter()
        .fold(("", 0_i64), |(top, top_amount), (category, amount)| {
            if *amount > top_amount {
                (category.as_str(), *amount)
            } else {
                (top, top_amount)
            }
        });

    SpendingSummary {
        user_id: user_id.to_string(),
        total_spent: total,
        insight: format!(
            "User spent ₹{} across {} transactions. Top category: {} (₹{})",
            group_digits(total),
            transactions.len(),
            top_category,
            group_digits(top_amount)
        ),
        top_category: Some(top_category.to_string()),
        top_category_amount: Some(top_amount),
        transaction_count: transactions.len(),
        by_category,
    }
}

pub(crate) fn group_digits(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, ch) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

async fn summarize(Json(request): Json<SummaryRequest>) -> Json<SpendingSummary> {
    let summary = spending_summary(&request.user_id, request.month.as_deref());
    tracing::info!(
        user_id = %summary.user_id,
        total_spent = summary.total_spent,
        transaction_count = summary.transaction_count,
        "spending summary served"
    );
    Json(summary)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "spending-analysis" }))
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/summary", post(summarize))
}
