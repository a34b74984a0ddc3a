//! Postgres ledger store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use super::LedgerError;
use super::store::LedgerStore;
use crate::models::ledger::{Budget, BudgetInput, Transaction, TransactionInput, TransactionKind};
use crate::uuid::{parse_id, uuidv7};

const TRANSACTION_COLUMNS: &str =
    "id::text, user_id::text, kind, amount, category, date, description";

const BUDGET_COLUMNS: &str =
    "id::text, user_id::text, total_budget, category, start_date, end_date, created_at";

type TransactionRow = (
    String,
    String,
    String,
    f64,
    String,
    DateTime<Utc>,
    Option<String>,
);

type BudgetRow = (
    String,
    String,
    f64,
    String,
    NaiveDate,
    NaiveDate,
    DateTime<Utc>,
);

fn transaction_from_row(row: TransactionRow) -> Result<Transaction, LedgerError> {
    let (id, user_id, kind, amount, category, date, description) = row;
    let kind = TransactionKind::parse(&kind)
        .ok_or_else(|| LedgerError::Validation(format!("unknown transaction kind '{kind}'")))?;
    Ok(Transaction {
        id,
        user_id,
        kind,
        amount,
        category,
        date,
        description,
    })
}

fn budget_from_row(row: BudgetRow) -> Budget {
    let (id, user_id, total_budget, category, start_date, end_date, created_at) = row;
    Budget {
        id,
        user_id,
        total_budget,
        category,
        start_date,
        end_date,
        created_at,
    }
}

/// `LedgerStore` backed by the `transactions` and `budgets` tables.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn insert_transaction(
        &self,
        user_id: &str,
        input: TransactionInput,
    ) -> Result<Transaction, LedgerError> {
        let owner = parse_id(user_id).ok_or(LedgerError::NotFound("User"))?;
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "INSERT INTO transactions (id, user_id, kind, amount, category, date, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(uuidv7())
        .bind(owner)
        .bind(input.kind.as_str())
        .bind(input.amount)
        .bind(&input.category)
        .bind(input.date)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;
        transaction_from_row(row)
    }

    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, LedgerError> {
        let Some(owner) = parse_id(user_id) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE user_id = $1 ORDER BY date DESC, id DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(transaction_from_row).collect()
    }

    async fn get_transaction(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Transaction>, LedgerError> {
        let (Some(owner), Some(id)) = (parse_id(user_id), parse_id(id)) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        row.map(transaction_from_row).transpose()
    }

    async fn update_transaction(
        &self,
        user_id: &str,
        id: &str,
        input: TransactionInput,
    ) -> Result<Option<Transaction>, LedgerError> {
        let (Some(owner), Some(id)) = (parse_id(user_id), parse_id(id)) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "UPDATE transactions SET kind = $3, amount = $4, category = $5, date = $6, \
             description = $7 WHERE id = $1 AND user_id = $2 \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .bind(input.kind.as_str())
        .bind(input.amount)
        .bind(&input.category)
        .bind(input.date)
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await?;
        row.map(transaction_from_row).transpose()
    }

    async fn delete_transaction(&self, user_id: &str, id: &str) -> Result<bool, LedgerError> {
        let (Some(owner), Some(id)) = (parse_id(user_id), parse_id(id)) else {
            return Ok(false);
        };
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn expenses_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let Some(owner) = parse_id(user_id) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE user_id = $1 AND kind = 'expense' \
               AND (date AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3 \
             ORDER BY date DESC"
        ))
        .bind(owner)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(transaction_from_row).collect()
    }

    async fn insert_budget(
        &self,
        user_id: &str,
        input: BudgetInput,
    ) -> Result<Budget, LedgerError> {
        let owner = parse_id(user_id).ok_or(LedgerError::NotFound("User"))?;
        let row = sqlx::query_as::<_, BudgetRow>(&format!(
            "INSERT INTO budgets (id, user_id, total_budget, category, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {BUDGET_COLUMNS}"
        ))
        .bind(uuidv7())
        .bind(owner)
        .bind(input.total_budget)
        .bind(&input.category)
        .bind(input.start_date)
        .bind(input.end_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(budget_from_row(row))
    }

    async fn list_budgets(&self, user_id: &str) -> Result<Vec<Budget>, LedgerError> {
        let Some(owner) = parse_id(user_id) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query_as::<_, BudgetRow>(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(budget_from_row).collect())
    }

    async fn get_budget(&self, user_id: &str, id: &str) -> Result<Option<Budget>, LedgerError> {
        let (Some(owner), Some(id)) = (parse_id(user_id), parse_id(id)) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, BudgetRow>(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(budget_from_row))
    }

    async fn update_budget(
        &self,
        user_id: &str,
        id: &str,
        input: BudgetInput,
    ) -> Result<Option<Budget>, LedgerError> {
        let (Some(owner), Some(id)) = (parse_id(user_id), parse_id(id)) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, BudgetRow>(&format!(
            "UPDATE budgets SET total_budget = $3, category = $4, start_date = $5, end_date = $6 \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {BUDGET_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .bind(input.total_budget)
        .bind(&input.category)
        .bind(input.start_date)
        .bind(input.end_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(budget_from_row))
    }

    async fn delete_budget(&self, user_id: &str, id: &str) -> Result<bool, LedgerError> {
        let (Some(owner), Some(id)) = (parse_id(user_id), parse_id(id)) else {
            return Ok(false);
        };
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
