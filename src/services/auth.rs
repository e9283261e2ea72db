use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::ServiceError;
use crate::config::AdminAccount;
use crate::db::{
    is_bcrypt_hash, Credential, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    Role, UserStore, LOGIN_PAGE,
};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Check `password` against a stored credential. Hashed credentials only
/// ever go through a hash verifier.
pub fn credential_matches(credential: &Credential, password: &str) -> bool {
    match credential {
        Credential::Hashed(hash) if is_bcrypt_hash(hash) => {
            bcrypt::verify(password, hash).unwrap_or(false)
        }
        Credential::Hashed(hash) => verify_password(password, hash),
        Credential::LegacyPlaintext(stored) => {
            let stored = stored.as_bytes();
            let provided = password.as_bytes();
            stored.len() == provided.len() && stored.ct_eq(provided).into()
        }
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

#[derive(Debug, Clone)]
pub struct AuthService {
    users: UserStore,
}

impl AuthService {
    pub fn new(users: UserStore) -> Self {
        Self { users }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, ServiceError> {
        let (username, email, password) =
            match (present(&req.username), present(&req.email), present(&req.password)) {
                (Some(u), Some(e), Some(p)) => (u, e, p),
                _ => {
                    return Err(ServiceError::Validation(
                        "Username, email and password are required".to_string(),
                    ))
                }
            };

        if let Some(confirm) = req.confirm_password.as_deref() {
            if confirm != password {
                return Err(ServiceError::Validation("Passwords do not match".to_string()));
            }
        }

        let credential = Credential::Hashed(hash_password(password)?);
        let id = self
            .users
            .insert(username, email, &credential, Role::User)
            .await?;

        info!(user_id = id, username = %username, "Registered new user");

        Ok(RegisterResponse {
            success: true,
            redirect: LOGIN_PAGE.to_string(),
        })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let (username, password) = match (present(&req.username), present(&req.password)) {
            (Some(u), Some(p)) => (u, p),
            _ => {
                return Err(ServiceError::Validation(
                    "Username and password are required".to_string(),
                ))
            }
        };

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Unknown username".to_string()))?;

        if !credential_matches(&user.credential, password) {
            warn!(username = %username, "Login failed: incorrect password");
            return Err(ServiceError::Auth("Incorrect password".to_string()));
        }

        if user.credential.needs_upgrade() {
            self.upgrade_legacy_credential(user.id, password).await;
        }

        info!(user_id = user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            success: true,
            role: user.role,
            redirect: user.role.landing_page().to_string(),
        })
    }

    /// Replace a plaintext or bcrypt credential with an argon2 hash after it
    /// has been verified. Failure leaves the old credential in place and does
    /// not fail the login.
    async fn upgrade_legacy_credential(&self, user_id: i64, password: &str) {
        let hashed = match hash_password(password) {
            Ok(hash) => Credential::Hashed(hash),
            Err(e) => {
                warn!(user_id, "Failed to hash legacy credential: {}", e);
                return;
            }
        };

        match self.users.update_credential(user_id, &hashed).await {
            Ok(_) => info!(user_id, "Upgraded legacy credential to argon2"),
            Err(e) => warn!(user_id, "Failed to store upgraded credential: {}", e),
        }
    }

    /// Create the configured admin account unless the username exists.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, admin: &AdminAccount) -> Result<bool, ServiceError> {
        if self.users.find_by_username(&admin.username).await?.is_some() {
            return Ok(false);
        }

        let credential = Credential::Hashed(hash_password(&admin.password)?);
        self.users
            .insert(&admin.username, &admin.email, &credential, Role::Admin)
            .await?;

        info!(username = %admin.username, "Created admin account");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn service() -> (AuthService, UserStore) {
        let users = UserStore::new(test_pool().await);
        (AuthService::new(users.clone()), users)
    }

    fn register_req(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            confirm_password: None,
        }
    }

    fn login_req(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-phc-string"));
    }

    #[test]
    fn test_hashed_credential_never_matches_by_equality() {
        let stored = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g";
        let cred = Credential::Hashed(stored.to_string());
        assert!(!credential_matches(&cred, stored));
    }

    #[test]
    fn test_legacy_credential_matches_by_equality() {
        let cred = Credential::LegacyPlaintext("letmein".to_string());
        assert!(credential_matches(&cred, "letmein"));
        assert!(!credential_matches(&cred, "letmein!"));
        assert!(!credential_matches(&cred, "LETMEIN"));
    }

    #[tokio::test]
    async fn test_register_stores_hashed_user() {
        let (auth, users) = service().await;
        let resp = auth
            .register(register_req("alice", "alice@example.com", "s3cret"))
            .await
            .unwrap();
        assert!(resp.success);
        assert_eq!(resp.redirect, "/login.html");

        let user = users.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.role, Role::User);
        assert!(!user.credential.is_legacy());
        assert_ne!(user.credential.stored_value(), "s3cret");
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let (auth, _) = service().await;
        auth.register(register_req("alice", "alice@example.com", "pw"))
            .await
            .unwrap();

        let err = auth
            .register(register_req("alice", "alice2@example.com", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let err = auth
            .register(register_req("alice2", "alice@example.com", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let (auth, _) = service().await;
        let err = auth
            .register(register_req("alice", "", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = auth.register(RegisterRequest::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_mismatched_confirmation_leaves_store_untouched() {
        let (auth, users) = service().await;
        let mut req = register_req("alice", "alice@example.com", "pw-one");
        req.confirm_password = Some("pw-two".to_string());

        let err = auth.register(req).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(users.find_by_username("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_matching_confirmation() {
        let (auth, _) = service().await;
        let mut req = register_req("alice", "alice@example.com", "pw");
        req.confirm_password = Some("pw".to_string());
        assert!(auth.register(req).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_success_returns_role_and_redirect() {
        let (auth, _) = service().await;
        auth.register(register_req("alice", "alice@example.com", "pw"))
            .await
            .unwrap();

        let resp = auth.login(login_req("alice", "pw")).await.unwrap();
        assert!(resp.success);
        assert_eq!(resp.role, Role::User);
        assert_eq!(resp.redirect, "/forms");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (auth, _) = service().await;
        auth.register(register_req("alice", "alice@example.com", "pw"))
            .await
            .unwrap();

        let err = auth.login(login_req("alice", "nope")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(_)));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (auth, _) = service().await;
        let err = auth.login(login_req("ghost", "pw")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let (auth, _) = service().await;
        let err = auth
            .login(LoginRequest {
                username: Some("alice".to_string()),
                password: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_legacy_login_upgrades_credential() {
        let (auth, users) = service().await;
        users
            .insert(
                "admin",
                "admin@example.com",
                &Credential::LegacyPlaintext("admin123".to_string()),
                Role::Admin,
            )
            .await
            .unwrap();

        let resp = auth.login(login_req("admin", "admin123")).await.unwrap();
        assert_eq!(resp.role, Role::Admin);
        assert_eq!(resp.redirect, "/admin");

        let user = users.find_by_username("admin").await.unwrap().unwrap();
        assert!(!user.credential.is_legacy());
        assert!(credential_matches(&user.credential, "admin123"));

        // Still works once hashed
        assert!(auth.login(login_req("admin", "admin123")).await.is_ok());
    }

    #[test]
    fn test_bcrypt_credential_matches() {
        // Openwall crypt_blowfish test vector for "U*U"
        let cred = Credential::Hashed(
            "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW".to_string(),
        );
        assert!(credential_matches(&cred, "U*U"));
        assert!(!credential_matches(&cred, "U*U*"));
    }

    #[tokio::test]
    async fn test_bcrypt_login_upgrades_to_argon2() {
        let (auth, users) = service().await;
        let imported = bcrypt::hash("from-the-old-app", 4).unwrap();
        users
            .insert(
                "imported",
                "imported@example.com",
                &Credential::Hashed(imported.clone()),
                Role::User,
            )
            .await
            .unwrap();

        assert!(matches!(
            auth.login(login_req("imported", "wrong")).await,
            Err(ServiceError::Auth(_))
        ));
        let user = users.find_by_username("imported").await.unwrap().unwrap();
        assert_eq!(user.credential.stored_value(), imported);

        let resp = auth
            .login(login_req("imported", "from-the-old-app"))
            .await
            .unwrap();
        assert_eq!(resp.redirect, "/forms");

        let user = users.find_by_username("imported").await.unwrap().unwrap();
        assert!(user.credential.stored_value().starts_with("$argon2"));
        assert!(auth.login(login_req("imported", "from-the-old-app")).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_legacy_login_keeps_plaintext() {
        let (auth, users) = service().await;
        users
            .insert(
                "old",
                "old@example.com",
                &Credential::LegacyPlaintext("pw".to_string()),
                Role::User,
            )
            .await
            .unwrap();

        assert!(auth.login(login_req("old", "bad")).await.is_err());
        let user = users.find_by_username("old").await.unwrap().unwrap();
        assert!(user.credential.is_legacy());
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let (auth, users) = service().await;
        let admin = AdminAccount {
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            password: "toor".to_string(),
        };

        assert!(auth.ensure_admin(&admin).await.unwrap());
        assert!(!auth.ensure_admin(&admin).await.unwrap());

        let user = users.find_by_username("root").await.unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_login_store_outage_is_store_error() {
        let pool = test_pool().await;
        let auth = AuthService::new(UserStore::new(pool.clone()));
        pool.close().await;

        let err = auth.login(login_req("alice", "pw")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
    }
}
