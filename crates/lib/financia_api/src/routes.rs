//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";

pub const POST_AUTH_REGISTER: &str = "/api/auth/register";
pub const POST_AUTH_LOGIN: &str = "/api/auth/login";
pub const POST_AUTH_GOOGLE_LOGIN: &str = "/api/auth/google-login";
pub const GET_AUTH_GOOGLE: &str = "/api/auth/google";
pub const GET_AUTH_GOOGLE_CALLBACK: &str = "/api/auth/google/callback";
pub const GET_AUTH_PROTECTED: &str = "/api/auth/protected";
pub const PUT_AUTH_CHANGE_PASSWORD: &str = "/api/auth/change-password";
pub const PUT_AUTH_UPDATE_PROFILE: &str = "/api/auth/update-profile";

pub const TRANSACTIONS: &str = "/api/transactions";
pub const TRANSACTIONS_ID: &str = "/api/transactions/{id}";
pub const GET_TRANSACTIONS_SUMMARY: &str = "/api/transactions/summary";

pub const BUDGETS: &str = "/api/budgets";
pub const BUDGETS_ID: &str = "/api/budgets/{id}";
pub const GET_BUDGETS_PROGRESS: &str = "/api/budgets/progress";
