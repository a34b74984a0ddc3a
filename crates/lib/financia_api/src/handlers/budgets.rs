//! Budget request handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use financia_core::ledger::{self, LedgerError};
use financia_core::models::ledger::{BudgetInput, BudgetPatch};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    BudgetProgressResponse, BudgetResponse, CreateBudgetRequest, MessageResponse,
    UpdateBudgetRequest,
};

/// `POST /api/budgets`: 201 with the stored budget.
pub async fn create_budget_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(body): Json<CreateBudgetRequest>,
) -> AppResult<(StatusCode, Json<BudgetResponse>)> {
    let input = BudgetInput {
        total_budget: body.total_budget,
        category: body.category.trim().to_string(),
        start_date: body.start_date,
        end_date: body.end_date,
    };
    ledger::validate_budget(&input)?;
    let budget = state.ledger.insert_budget(&user.id, input).await?;
    Ok((StatusCode::CREATED, Json(budget.into())))
}

/// `GET /api/budgets`
pub async fn list_budgets_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<BudgetResponse>>> {
    let budgets = state.ledger.list_budgets(&user.id).await?;
    Ok(Json(budgets.into_iter().map(Into::into).collect()))
}

/// `PUT /api/budgets/{id}`: partial update.
pub async fn update_budget_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBudgetRequest>,
) -> AppResult<Json<BudgetResponse>> {
    let existing = state
        .ledger
        .get_budget(&user.id, &id)
        .await?
        .ok_or(LedgerError::NotFound("Budget"))?;

    let input = ledger::apply_patch(
        &existing,
        BudgetPatch {
            total_budget: body.total_budget,
            category: body
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            start_date: body.start_date,
            end_date: body.end_date,
        },
    );
    ledger::validate_budget(&input)?;
    let budget = state
        .ledger
        .update_budget(&user.id, &id, input)
        .await?
        .ok_or(LedgerError::NotFound("Budget"))?;
    Ok(Json(budget.into()))
}

/// `DELETE /api/budgets/{id}`
pub async fn delete_budget_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    if !state.ledger.delete_budget(&user.id, &id).await? {
        return Err(LedgerError::NotFound("Budget").into());
    }
    Ok(Json(MessageResponse::new("Budget removed")))
}

/// `GET /api/budgets/progress`
pub async fn budget_progress_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<BudgetProgressResponse>>> {
    let progress = ledger::budgets_with_progress(state.ledger.as_ref(), &user.id).await?;
    Ok(Json(progress.into_iter().map(Into::into).collect()))
}
