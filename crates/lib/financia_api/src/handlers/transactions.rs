//! Transaction request handlers. Every query is scoped to the caller.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use financia_core::ledger::{self, LedgerError};
use financia_core::models::ledger::TransactionInput;
use tracing::info;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    CreateTransactionRequest, MessageResponse, MonthlySummaryResponse, TransactionResponse,
    UpdateTransactionRequest,
};

/// `POST /api/transactions`
pub async fn create_transaction_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(body): Json<CreateTransactionRequest>,
) -> AppResult<Json<TransactionResponse>> {
    let input = TransactionInput {
        kind: body.kind,
        amount: body.amount,
        category: body.category,
        date: body.date.unwrap_or_else(Utc::now),
        description: body.description,
    };
    ledger::validate_transaction(&input)?;
    let tx = state.ledger.insert_transaction(&user.id, input).await?;
    info!(user_id = %user.id, transaction_id = %tx.id, "transaction added");
    Ok(Json(tx.into()))
}

/// `GET /api/transactions`: newest first.
pub async fn list_transactions_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<TransactionResponse>>> {
    let txs = state.ledger.list_transactions(&user.id).await?;
    Ok(Json(txs.into_iter().map(Into::into).collect()))
}

/// `PUT /api/transactions/{id}`
pub async fn update_transaction_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTransactionRequest>,
) -> AppResult<Json<TransactionResponse>> {
    let existing = state
        .ledger
        .get_transaction(&user.id, &id)
        .await?
        .ok_or(LedgerError::NotFound("Transaction"))?;

    let input = TransactionInput {
        kind: body.kind.unwrap_or(existing.kind),
        amount: body.amount,
        category: body.category,
        date: body.date.unwrap_or(existing.date),
        description: body.description,
    };
    ledger::validate_transaction(&input)?;
    let tx = state
        .ledger
        .update_transaction(&user.id, &id, input)
        .await?
        .ok_or(LedgerError::NotFound("Transaction"))?;
    Ok(Json(tx.into()))
}

/// `DELETE /api/transactions/{id}`
pub async fn delete_transaction_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    if !state.ledger.delete_transaction(&user.id, &id).await? {
        return Err(LedgerError::NotFound("Transaction").into());
    }
    Ok(Json(MessageResponse::new("Transaction deleted")))
}

/// `GET /api/transactions/summary`: current month's expenses by day.
pub async fn monthly_summary_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<MonthlySummaryResponse>> {
    let summary = ledger::current_month_summary(state.ledger.as_ref(), &user.id, Utc::now()).await?;
    Ok(Json(summary))
}
