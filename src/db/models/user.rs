//! User, credential and auth request/response models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Page the client is sent to after registering
pub const LOGIN_PAGE: &str = "/login.html";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Where a freshly logged in user of this role lands
    pub fn landing_page(&self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::User => "/forms",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

/// A stored password.
///
/// `LegacyPlaintext` exists only for accounts created before passwords were
/// hashed. Such credentials are upgraded to `Hashed` on the next successful
/// login.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Argon2 PHC string, or a bcrypt string carried over from an older store
    Hashed(String),
    LegacyPlaintext(String),
}

impl Credential {
    pub const HASHED: &'static str = "hashed";
    pub const PLAINTEXT: &'static str = "plaintext";

    /// Rebuild a credential from its stored columns. Unknown kinds are
    /// treated as hashed so they can never match by plain equality.
    pub fn from_parts(kind: &str, value: String) -> Self {
        match kind {
            Self::PLAINTEXT => Self::LegacyPlaintext(value),
            _ => Self::Hashed(value),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hashed(_) => Self::HASHED,
            Self::LegacyPlaintext(_) => Self::PLAINTEXT,
        }
    }

    pub fn stored_value(&self) -> &str {
        match self {
            Self::Hashed(v) | Self::LegacyPlaintext(v) => v,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyPlaintext(_))
    }

    /// Whether a verified credential should be re-hashed with argon2:
    /// plaintext and bcrypt hashes from before the switch.
    pub fn needs_upgrade(&self) -> bool {
        match self {
            Self::LegacyPlaintext(_) => true,
            Self::Hashed(hash) => is_bcrypt_hash(hash),
        }
    }
}

/// `$2a$`, `$2b$` and `$2y$` modular-crypt bcrypt strings
pub fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential::{}(<redacted>)", self.kind())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_kind: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub credential: Credential,
    pub role: Role,
    pub created_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            credential: Credential::from_parts(&row.password_kind, row.password),
            role: Role::from(row.role),
            created_at: row.created_at,
        }
    }
}

/// Registration form. Every field is optional so that missing input is
/// reported as a validation failure rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub redirect: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub role: Role,
    pub redirect: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_string() {
        assert_eq!(Role::from("admin".to_string()), Role::Admin);
        assert_eq!(Role::from("user".to_string()), Role::User);
        assert_eq!(Role::from("superuser".to_string()), Role::User);
    }

    #[test]
    fn test_role_landing_page() {
        assert_eq!(Role::Admin.landing_page(), "/admin");
        assert_eq!(Role::User.landing_page(), "/forms");
    }

    #[test]
    fn test_credential_from_parts() {
        let legacy = Credential::from_parts("plaintext", "secret".to_string());
        assert!(legacy.is_legacy());
        assert_eq!(legacy.stored_value(), "secret");

        let unknown = Credential::from_parts("md5", "secret".to_string());
        assert_eq!(unknown.kind(), Credential::HASHED);
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = Credential::LegacyPlaintext("hunter2".to_string());
        let printed = format!("{:?}", cred);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("plaintext"));
    }

    #[test]
    fn test_credential_needs_upgrade() {
        assert!(Credential::LegacyPlaintext("pw".to_string()).needs_upgrade());
        assert!(Credential::Hashed("$2y$10$abcdefghijklmnopqrstuv".to_string()).needs_upgrade());
        assert!(!Credential::Hashed("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string())
            .needs_upgrade());
    }
}
