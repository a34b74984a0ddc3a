//! Transactions, budgets and the spending aggregates computed over them.

pub mod memory;
pub mod queries;
pub mod store;

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use thiserror::Error;

use crate::models::ledger::{
    Budget, BudgetInput, BudgetPatch, BudgetProgress, BudgetStatus, Transaction,
    TransactionInput, TransactionKind,
};

pub use store::LedgerStore;

/// Categories accepted for income transactions.
pub const INCOME_CATEGORIES: &[&str] = &["Salary", "Gift", "Bonus", "Miscellaneous"];

/// Categories accepted for expense transactions.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Grocery",
    "Vehicle",
    "Travelling Expense",
    "Food & Beverages",
    "Rent",
    "Personal Use",
    "Entertainment",
    "Fees",
    "Government Fees",
    "Other",
];

/// Fraction of a budget at which spending is flagged as a warning.
pub const WARNING_THRESHOLD: f64 = 0.8;

/// Ledger errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

pub fn categories_for(kind: TransactionKind) -> &'static [&'static str] {
    match kind {
        TransactionKind::Income => INCOME_CATEGORIES,
        TransactionKind::Expense => EXPENSE_CATEGORIES,
    }
}

/// Check amount and kind/category pairing.
pub fn validate_transaction(input: &TransactionInput) -> Result<(), LedgerError> {
    if !input.amount.is_finite() || input.amount <= 0.0 {
        return Err(LedgerError::Validation(
            "Amount must be a positive number".into(),
        ));
    }
    if !categories_for(input.kind).contains(&input.category.as_str()) {
        return Err(LedgerError::Validation(format!(
            "Invalid category \"{}\" for transaction type \"{}\"",
            input.category,
            input.kind.as_str()
        )));
    }
    Ok(())
}

/// Check limit, category and date range of a budget.
pub fn validate_budget(input: &BudgetInput) -> Result<(), LedgerError> {
    if !input.total_budget.is_finite() || input.total_budget <= 0.0 {
        return Err(LedgerError::Validation(
            "Total budget must be a positive number".into(),
        ));
    }
    if input.category.trim().is_empty() {
        return Err(LedgerError::Validation("Category is required".into()));
    }
    if input.start_date > input.end_date {
        return Err(LedgerError::Validation(
            "Start date must not be after end date".into(),
        ));
    }
    Ok(())
}

/// Merge a partial update over a stored budget.
pub fn apply_patch(budget: &Budget, patch: BudgetPatch) -> BudgetInput {
    BudgetInput {
        total_budget: patch.total_budget.unwrap_or(budget.total_budget),
        category: patch.category.unwrap_or_else(|| budget.category.clone()),
        start_date: patch.start_date.unwrap_or(budget.start_date),
        end_date: patch.end_date.unwrap_or(budget.end_date),
    }
}

/// Half-open UTC range `[first day of month, first day of next month)` containing `now`.
pub fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let (year, month) = (now.year(), now.month());
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    (start, end)
}

/// Sum expense amounts per day of month.
pub fn monthly_expense_summary<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> BTreeMap<u32, f64> {
    let mut by_day = BTreeMap::new();
    for tx in transactions {
        if tx.kind == TransactionKind::Expense {
            *by_day.entry(tx.date.day()).or_insert(0.0) += tx.amount;
        }
    }
    by_day
}

fn within(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start <= date && date <= end
}

/// Spending against one budget: expenses in the budget's category whose date
/// falls inside the inclusive range.
pub fn budget_progress<'a>(
    budget: &Budget,
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> BudgetProgress {
    let spent: f64 = transactions
        .into_iter()
        .filter(|tx| {
            tx.kind == TransactionKind::Expense
                && tx.category == budget.category
                && within(tx.date.date_naive(), budget.start_date, budget.end_date)
        })
        .map(|tx| tx.amount)
        .sum();

    let status = if spent >= budget.total_budget {
        BudgetStatus::Exceeded
    } else if spent >= WARNING_THRESHOLD * budget.total_budget {
        BudgetStatus::Warning
    } else {
        BudgetStatus::OnTrack
    };

    BudgetProgress {
        budget: budget.clone(),
        spent,
        remaining: budget.total_budget - spent,
        status,
    }
}

/// Progress for every budget of a user, reading expenses once for the
/// combined date span.
pub async fn budgets_with_progress(
    store: &dyn LedgerStore,
    user_id: &str,
) -> Result<Vec<BudgetProgress>, LedgerError> {
    let budgets = store.list_budgets(user_id).await?;
    let (Some(from), Some(to)) = (
        budgets.iter().map(|b| b.start_date).min(),
        budgets.iter().map(|b| b.end_date).max(),
    ) else {
        return Ok(Vec::new());
    };
    let expenses = store.expenses_between(user_id, from, to).await?;
    Ok(budgets
        .iter()
        .map(|b| budget_progress(b, &expenses))
        .collect())
}

/// Current-month expense summary for a user.
pub async fn current_month_summary(
    store: &dyn LedgerStore,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<BTreeMap<u32, f64>, LedgerError> {
    let (start, end) = month_bounds(now);
    let transactions = store.list_transactions(user_id).await?;
    Ok(monthly_expense_summary(
        transactions
            .iter()
            .filter(|tx| tx.date >= start && tx.date < end),
    ))
}
