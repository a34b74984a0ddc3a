//! Transaction and budget models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

/// A stored income or expense entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

/// Writable fields of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInput {
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

/// A spending limit for one category over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub total_budget: f64,
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Writable fields of a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetInput {
    pub total_budget: f64,
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial budget update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetPatch {
    pub total_budget: Option<f64>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// How close spending is to a budget's limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    Warning,
    Exceeded,
}

/// A budget together with what has been spent against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetProgress {
    pub budget: Budget,
    pub spent: f64,
    pub remaining: f64,
    pub status: BudgetStatus,
}
