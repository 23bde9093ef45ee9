//! Authentication service: login, token rotation, user creation.

use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString, rand_core::OsRng},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use arbor_common::{AppError, AppResult, IdGenerator};
use arbor_db::entities::user;
use arbor_db::repositories::UserRepository;

/// Input for logging in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Public view of a user account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            is_admin: u.is_admin,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Response for a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Service for account authentication.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Verify credentials and rotate the account's API token.
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        let user = self
            .user_repo
            .set_token(&user.id, Some(token.clone()))
            .await?;

        tracing::info!(user_id = %user.id, "user logged in");

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    /// Invalidate the account's current API token.
    pub async fn logout(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.set_token(user_id, None).await?;
        Ok(())
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Create a user account. Used by setup tooling, not exposed as a
    /// public endpoint.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> AppResult<UserResponse> {
        if username.is_empty() || username.len() > 128 {
            return Err(AppError::Validation(
                "Username must be between 1 and 128 characters".to_string(),
            ));
        }
        if password.len() < 8 {
            return Err(AppError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)?),
            api_token: Set(None),
            is_admin: Set(is_admin),
            created_at: Set(chrono::Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        Ok(user.into())
    }
}

/// Hash a password with Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?
        .to_string())
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn sample_user() -> user::Model {
        user::Model {
            id: "01hq0000000000000000000000".to_string(),
            username: "admin".to_string(),
            password_hash: "hash".to_string(),
            api_token: None,
            is_admin: true,
            created_at: chrono::Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> AuthService {
        AuthService::new(UserRepository::new(Arc::new(db.into_connection())))
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_user_rejects_short_password() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let err = svc.create_user("admin", "short", true).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_user_rejects_taken_username() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![sample_user()]]),
        );

        let err = svc
            .create_user("admin", "long enough password", true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_user_stores_admin_account() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([vec![sample_user()]]),
        );

        let user = svc
            .create_user("admin", "long enough password", true)
            .await
            .unwrap();
        assert!(user.is_admin);
    }
}
