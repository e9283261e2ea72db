use sqlx::SqlitePool;

use super::{Credential, Role, User, UserRow};

/// Persistence for user accounts
#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account and return its id. A duplicate username or email
    /// fails with a unique constraint violation from the store.
    pub async fn insert(
        &self,
        username: &str,
        email: &str,
        credential: &Credential,
        role: Role,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password, password_kind, role) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(credential.stored_value())
        .bind(credential.kind())
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    pub async fn update_credential(
        &self,
        id: i64,
        credential: &Credential,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password = ?, password_kind = ? WHERE id = ?")
            .bind(credential.stored_value())
            .bind(credential.kind())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
