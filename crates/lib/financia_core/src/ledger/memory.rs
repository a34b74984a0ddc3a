//! In-memory ledger store for tests and database-less development runs.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use super::LedgerError;
use super::store::LedgerStore;
use crate::models::ledger::{Budget, BudgetInput, Transaction, TransactionInput, TransactionKind};
use crate::uuid::uuidv7;

#[derive(Default)]
pub struct MemoryLedgerStore {
    transactions: RwLock<Vec<Transaction>>,
    budgets: RwLock<Vec<Budget>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn insert_transaction(
        &self,
        user_id: &str,
        input: TransactionInput,
    ) -> Result<Transaction, LedgerError> {
        let tx = Transaction {
            id: uuidv7().to_string(),
            user_id: user_id.to_string(),
            kind: input.kind,
            amount: input.amount,
            category: input.category,
            date: input.date,
            description: input.description,
        };
        self.transactions.write().await.push(tx.clone());
        Ok(tx)
    }

    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, LedgerError> {
        let mut owned: Vec<Transaction> = self
            .transactions
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn get_transaction(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Transaction>, LedgerError> {
        Ok(self
            .transactions
            .read()
            .await
            .iter()
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned())
    }

    async fn update_transaction(
        &self,
        user_id: &str,
        id: &str,
        input: TransactionInput,
    ) -> Result<Option<Transaction>, LedgerError> {
        let mut transactions = self.transactions.write().await;
        let Some(tx) = transactions
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
        else {
            return Ok(None);
        };
        tx.kind = input.kind;
        tx.amount = input.amount;
        tx.category = input.category;
        tx.date = input.date;
        tx.description = input.description;
        Ok(Some(tx.clone()))
    }

    async fn delete_transaction(&self, user_id: &str, id: &str) -> Result<bool, LedgerError> {
        let mut transactions = self.transactions.write().await;
        let before = transactions.len();
        transactions.retain(|t| !(t.id == id && t.user_id == user_id));
        Ok(transactions.len() < before)
    }

    async fn expenses_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self
            .list_transactions(user_id)
            .await?
            .into_iter()
            .filter(|t| {
                let day = t.date.date_naive();
                t.kind == TransactionKind::Expense && from <= day && day <= to
            })
            .collect())
    }

    async fn insert_budget(
        &self,
        user_id: &str,
        input: BudgetInput,
    ) -> Result<Budget, LedgerError> {
        let budget = Budget {
            id: uuidv7().to_string(),
            user_id: user_id.to_string(),
            total_budget: input.total_budget,
            category: input.category,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: Utc::now(),
        };
        self.budgets.write().await.push(budget.clone());
        Ok(budget)
    }

    async fn list_budgets(&self, user_id: &str) -> Result<Vec<Budget>, LedgerError> {
        let mut owned: Vec<Budget> = self
            .budgets
            .read()
            .await
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn get_budget(&self, user_id: &str, id: &str) -> Result<Option<Budget>, LedgerError> {
        Ok(self
            .budgets
            .read()
            .await
            .iter()
            .find(|b| b.id == id && b.user_id == user_id)
            .cloned())
    }

    async fn update_budget(
        &self,
        user_id: &str,
        id: &str,
        input: BudgetInput,
    ) -> Result<Option<Budget>, LedgerError> {
        let mut budgets = self.budgets.write().await;
        let Some(budget) = budgets
            .iter_mut()
            .find(|b| b.id == id && b.user_id == user_id)
        else {
            return Ok(None);
        };
        budget.total_budget = input.total_budget;
        budget.category = input.category;
        budget.start_date = input.start_date;
        budget.end_date = input.end_date;
        Ok(Some(budget.clone()))
    }

    async fn delete_budget(&self, user_id: &str, id: &str) -> Result<bool, LedgerError> {
        let mut budgets = self.budgets.write().await;
        let before = budgets.len();
        budgets.retain(|b| !(b.id == id && b.user_id == user_id));
        Ok(budgets.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration};

    use super::*;
    use crate::ledger::{budgets_with_progress, current_month_summary};
    use crate::models::ledger::BudgetStatus;

    fn expense(amount: f64, category: &str, date: DateTime<Utc>) -> TransactionInput {
        TransactionInput {
            kind: TransactionKind::Expense,
            amount,
            category: category.into(),
            date,
            description: None,
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[tokio::test]
    async fn transactions_are_listed_newest_first() {
        let store = MemoryLedgerStore::new();
        let now = Utc::now();
        store
            .insert_transaction("u1", expense(1.0, "Rent", now - Duration::days(2)))
            .await
            .unwrap();
        store
            .insert_transaction("u1", expense(2.0, "Rent", now))
            .await
            .unwrap();
        let listed = store.list_transactions("u1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].amount, 2.0);
    }

    #[tokio::test]
    async fn records_are_scoped_to_their_owner() {
        let store = MemoryLedgerStore::new();
        let tx = store
            .insert_transaction("owner", expense(5.0, "Fees", Utc::now()))
            .await
            .unwrap();

        assert!(store.list_transactions("intruder").await.unwrap().is_empty());
        assert!(store.get_transaction("intruder", &tx.id).await.unwrap().is_none());
        assert!(
            store
                .update_transaction("intruder", &tx.id, expense(9.0, "Fees", Utc::now()))
                .await
                .unwrap()
                .is_none()
        );
        assert!(!store.delete_transaction("intruder", &tx.id).await.unwrap());
        assert!(store.delete_transaction("owner", &tx.id).await.unwrap());
        assert!(store.list_transactions("owner").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn budget_progress_reads_from_store() {
        let store = MemoryLedgerStore::new();
        store
            .insert_budget(
                "u1",
                BudgetInput {
                    total_budget: 100.0,
                    category: "Grocery".into(),
                    start_date: "2024-05-01".parse().unwrap(),
                    end_date: "2024-05-31".parse().unwrap(),
                },
            )
            .await
            .unwrap();
        store
            .insert_transaction("u1", expense(85.0, "Grocery", at("2024-05-20T12:00:00Z")))
            .await
            .unwrap();
        store
            .insert_transaction("u2", expense(500.0, "Grocery", at("2024-05-20T12:00:00Z")))
            .await
            .unwrap();

        let progress = budgets_with_progress(&store, "u1").await.unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].spent, 85.0);
        assert_eq!(progress[0].status, BudgetStatus::Warning);
        assert!(budgets_with_progress(&store, "nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn month_summary_ignores_other_months() {
        let store = MemoryLedgerStore::new();
        for (amount, when) in [
            (10.0, "2024-06-01T00:00:00Z"),
            (4.0, "2024-06-30T23:59:59Z"),
            (99.0, "2024-05-31T23:59:59Z"),
            (99.0, "2024-07-01T00:00:00Z"),
        ] {
            store
                .insert_transaction("u1", expense(amount, "Other", at(when)))
                .await
                .unwrap();
        }
        let summary = current_month_summary(&store, "u1", at("2024-06-15T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[&1], 10.0);
        assert_eq!(summary[&30], 4.0);
    }
}
