//! Postgres credential store.

use async_trait::async_trait;
use sqlx::PgPool;

use super::normalize_email;
use super::store::{StoreError, UserStore};
use crate::models::auth::{NewUser, User, UserWithPassword};
use crate::uuid::{parse_id, uuidv7};

/// Columns selected for every user lookup, in `UserRow` order.
const USER_COLUMNS: &str = "id::text, name, email, password_hash, provider_id, profile_image";

type UserRow = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn from_row(row: UserRow) -> UserWithPassword {
    let (id, name, email, password_hash, provider_id, profile_image) = row;
    UserWithPassword {
        user: User {
            id,
            name,
            email,
            provider_id,
            profile_image,
        },
        password_hash,
    }
}

/// `UserStore` backed by the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = $1"
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }

    async fn find_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<UserWithPassword>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE provider_id = $1"
        ))
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserWithPassword>, StoreError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }

    async fn insert(&self, user: NewUser) -> Result<UserWithPassword, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, name, email, password_hash, provider_id, profile_image) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(uuidv7())
        .bind(&user.name)
        .bind(normalize_email(&user.email))
        .bind(&user.password_hash)
        .bind(&user.provider_id)
        .bind(&user.profile_image)
        .fetch_one(&self.pool)
        .await?;
        Ok(from_row(row))
    }

    async fn link_provider(
        &self,
        id: &str,
        provider_id: &str,
        profile_image: Option<&str>,
    ) -> Result<UserWithPassword, StoreError> {
        let id = parse_id(id).ok_or(StoreError::NotFound)?;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET provider_id = $2, \
             profile_image = COALESCE($3, profile_image), updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(provider_id)
        .bind(profile_image)
        .fetch_optional(&self.pool)
        .await?;
        row.map(from_row).ok_or(StoreError::NotFound)
    }

    async fn set_password_hash(&self, id: &str, password_hash: &str) -> Result<(), StoreError> {
        let id = parse_id(id).ok_or(StoreError::NotFound)?;
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        profile_image: Option<&str>,
    ) -> Result<UserWithPassword, StoreError> {
        let id = parse_id(id).ok_or(StoreError::NotFound)?;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET name = COALESCE($2, name), \
             profile_image = COALESCE($3, profile_image), updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(profile_image)
        .fetch_optional(&self.pool)
        .await?;
        row.map(from_row).ok_or(StoreError::NotFound)
    }
}
