//! Ledger persistence contract.
//!
//! Every read and write is scoped by `user_id`. A record owned by another
//! user is indistinguishable from a missing one.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::LedgerError;
use crate::models::ledger::{Budget, BudgetInput, Transaction, TransactionInput};

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn insert_transaction(
        &self,
        user_id: &str,
        input: TransactionInput,
    ) -> Result<Transaction, LedgerError>;

    /// All transactions of a user, newest first.
    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, LedgerError>;

    async fn get_transaction(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Transaction>, LedgerError>;

    /// Replace the writable fields; `None` when the transaction does not exist.
    async fn update_transaction(
        &self,
        user_id: &str,
        id: &str,
        input: TransactionInput,
    ) -> Result<Option<Transaction>, LedgerError>;

    /// Returns whether a transaction was removed.
    async fn delete_transaction(&self, user_id: &str, id: &str) -> Result<bool, LedgerError>;

    /// Expenses whose calendar date (UTC) lies within `[from, to]`.
    async fn expenses_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, LedgerError>;

    async fn insert_budget(&self, user_id: &str, input: BudgetInput)
    -> Result<Budget, LedgerError>;

    async fn list_budgets(&self, user_id: &str) -> Result<Vec<Budget>, LedgerError>;

    async fn get_budget(&self, user_id: &str, id: &str) -> Result<Option<Budget>, LedgerError>;

    async fn update_budget(
        &self,
        user_id: &str,
        id: &str,
        input: BudgetInput,
    ) -> Result<Option<Budget>, LedgerError>;

    async fn delete_budget(&self, user_id: &str, id: &str) -> Result<bool, LedgerError>;
}
