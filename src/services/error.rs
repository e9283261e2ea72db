use thiserror::Error;

/// Failures of the auth and booking services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or inconsistent input
    #[error("{0}")]
    Validation(String),

    /// Username or email already registered
    #[error("{0}")]
    Conflict(String),

    /// Wrong password for an existing account
    #[error("{0}")]
    Auth(String),

    /// No account with the given username
    #[error("{0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[source] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let msg = db_err.message();
                if msg.contains("users.email") {
                    return ServiceError::Conflict("Email is already registered".to_string());
                }
                if msg.contains("users.username") {
                    return ServiceError::Conflict("Username is already taken".to_string());
                }
                return ServiceError::Conflict("Account already exists".to_string());
            }
        }
        ServiceError::Store(err)
    }
}

impl From<argon2::password_hash::Error> for ServiceError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ServiceError::Hash(err.to_string())
    }
}
