//! Request and response bodies of the HTTP API.
//!
//! Field names are camelCase on the wire.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use financia_core::models::auth::User;
use financia_core::models::ledger::{
    Budget, BudgetProgress, BudgetStatus, Transaction, TransactionKind,
};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            profile_image: user.profile_image,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// ID token obtained by the browser from Google's sign-in widget.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedResponse {
    pub msg: String,
    pub user: AuthUser,
}

/// Query string of the provider redirect back to us.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    /// Defaults to the time of the request.
    #[serde(default, deserialize_with = "de_opt_datetime")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Full replacement of a transaction; `type` may be omitted to keep the stored one.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<TransactionKind>,
    pub amount: f64,
    pub category: String,
    #[serde(default, deserialize_with = "de_opt_datetime")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            user_id: tx.user_id,
            kind: tx.kind,
            amount: tx.amount,
            category: tx.category,
            date: tx.date,
            description: tx.description,
        }
    }
}

/// Expense totals keyed by day of month.
pub type MonthlySummaryResponse = BTreeMap<u32, f64>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    pub total_budget: f64,
    pub category: String,
    #[serde(deserialize_with = "de_day")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "de_day")]
    pub end_date: NaiveDate,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetRequest {
    #[serde(default)]
    pub total_budget: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de_opt_day")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_opt_day")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    pub id: String,
    pub user_id: String,
    pub total_budget: f64,
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<Budget> for BudgetResponse {
    fn from(b: Budget) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            total_budget: b.total_budget,
            category: b.category,
            start_date: b.start_date,
            end_date: b.end_date,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetProgressResponse {
    #[serde(flatten)]
    pub budget: BudgetResponse,
    pub spent: f64,
    pub remaining: f64,
    pub status: BudgetStatus,
}

impl From<BudgetProgress> for BudgetProgressResponse {
    fn from(p: BudgetProgress) -> Self {
        Self {
            budget: p.budget.into(),
            spent: p.spent,
            remaining: p.remaining,
            status: p.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` days (midnight UTC).
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its UTC calendar day).
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date_naive()))
}

fn de_opt_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_datetime(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'"))),
    }
}

fn de_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(raw.trim()).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
}

fn de_opt_day<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_day(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'"))),
    }
}
