//! Login/Password Controller (C13), §4.13.

use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::error::{IdentityError, Result};
use crate::models::{LoginRequest, LoginResponse, User};
use crate::repository::{CredentialRepository, TenantRepository, UserRepository};
use crate::session::SessionManager;

pub struct LoginController {
    users: Arc<dyn UserRepository>,
    credentials: Arc<dyn CredentialRepository>,
    credential_store: CredentialStore,
    tenants: Arc<dyn TenantRepository>,
    sessions: Arc<SessionManager>,
}

impl LoginController {
    pub fn new(
        users: Arc<dyn UserRepository>,
        credentials: Arc<dyn CredentialRepository>,
        credential_store: CredentialStore,
        tenants: Arc<dyn TenantRepository>,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            users,
            credentials,
            credential_store,
            tenants,
            sessions,
        }
    }

    /// Returns the login response and the `Set-Cookie` value to attach on
    /// success. Any credential miss collapses to `InvalidCredentials` so the
    /// caller can't distinguish "no such user" from "wrong password".
    pub async fn login(&self, request: &LoginRequest) -> Result<(LoginResponse, String)> {
        let user = self.resolve_user(&request.email).await?;

        let credential = self
            .credentials
            .find_password_credential(user.id)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        if !self
            .credential_store
            .verify(&credential.secret_hash, &request.password)?
        {
            return Err(IdentityError::InvalidCredentials);
        }

        self.users.touch_last_login(user.id).await.ok();
        self.credentials.touch_last_used(credential.id).await.ok();

        let tenants = self.tenants.memberships_for_user(user.id).await?;
        let cookie = self.sessions.set(user.id)?;

        Ok((LoginResponse { user, tenants }, cookie))
    }

    /// Resolves a user by id, for callers that already hold a verified session
    /// subject (e.g. the authorization endpoint reading the `idsess` cookie).
    pub async fn find_user(&self, id: uuid::Uuid) -> Result<Option<User>> {
        self.users.find_by_id(id).await
    }

    /// `/api/v1/auth/change-password`, §4.13: re-verifies the current password
    /// before rotating to the new one, same credential-miss collapsing as login.
    pub async fn change_password(
        &self,
        user_id: uuid::Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let credential = self
            .credentials
            .find_password_credential(user_id)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        if !self
            .credential_store
            .verify(&credential.secret_hash, current_password)?
        {
            return Err(IdentityError::InvalidCredentials);
        }

        self.credential_store
            .update_password(credential.id, new_password)
            .await
    }

    /// Builds the `Set-Cookie` value that clears the session (`/api/v1/auth/logout`).
    pub fn logout(&self) -> String {
        self.sessions.clear()
    }

    /// Verifies the current session cookie and re-issues it with a fresh
    /// expiry (`/api/v1/auth/refresh`).
    pub fn refresh_session(&self, cookie_value: &str) -> Result<String> {
        let user_id = self.sessions.verify(cookie_value)?;
        self.sessions.set(user_id)
    }

    async fn resolve_user(&self, email_or_username: &str) -> Result<User> {
        if let Some(user) = self.users.find_by_email(email_or_username).await? {
            return Ok(user);
        }
        self.users
            .find_by_username(email_or_username)
            .await?
            .ok_or(IdentityError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credential;
    use crate::repository::NullTenantRepository;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    struct FakeUsers {
        user: User,
    }

    #[async_trait]
    impl UserRepository for FakeUsers {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
            Ok((email == self.user.email).then(|| self.user.clone()))
        }
        async fn find_by_username(&self, _username: &str) -> Result<Option<User>> {
            Ok(None)
        }
        async fn find_by_id(&self, id: uuid::Uuid) -> Result<Option<User>> {
            Ok((id == self.user.id).then(|| self.user.clone()))
        }
        async fn touch_last_login(&self, _id: uuid::Uuid) -> Result<()> {
            Ok(())
        }
    }

    struct FakeCredentials {
        credential: Credential,
    }

    #[async_trait]
    impl CredentialRepository for FakeCredentials {
        async fn find_password_credential(&self, user_id: uuid::Uuid) -> Result<Option<Credential>> {
            Ok((user_id == self.credential.user_id).then(|| self.credential.clone()))
        }
        async fn create_password_credential(
            &self,
            _user_id: uuid::Uuid,
            _identifier: &str,
            _secret_hash: &str,
        ) -> Result<()> {
            Ok(())
        }
        async fn update_secret_hash(&self, _credential_id: uuid::Uuid, _secret_hash: &str) -> Result<()> {
            Ok(())
        }
        async fn touch_last_used(&self, _credential_id: uuid::Uuid) -> Result<()> {
            Ok(())
        }
    }

    fn controller(password_hash: String) -> LoginController {
        let user = User {
            id: uuid::Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            username: None,
            name: None,
            picture: None,
            email_verified: true,
            last_login_at: None,
            created_at: Utc::now(),
        };
        let credential = Credential {
            id: uuid::Uuid::new_v4(),
            user_id: user.id,
            credential_type: "password".to_string(),
            identifier: user.email.clone(),
            secret_hash: password_hash,
            last_used_at: None,
        };
        let users: Arc<dyn UserRepository> = Arc::new(FakeUsers { user });
        let credentials: Arc<dyn CredentialRepository> = Arc::new(FakeCredentials { credential });
        LoginController::new(
            users,
            credentials.clone(),
            CredentialStore::new(credentials, 4),
            Arc::new(NullTenantRepository),
            Arc::new(SessionManager::new(
                b"a-32-byte-or-longer-test-secret".to_vec(),
                Duration::hours(1),
                false,
            )),
        )
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let hash = bcrypt::hash("Correct1Password!", 4).unwrap();
        let controller = controller(hash);
        let result = controller
            .login(&LoginRequest {
                email: "jane@example.com".to_string(),
                password: "Wrong1Password!".to_string(),
            })
            .await;
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn correct_password_issues_a_session_cookie() {
        let hash = bcrypt::hash("Correct1Password!", 4).unwrap();
        let controller = controller(hash);
        let (response, cookie) = controller
            .login(&LoginRequest {
                email: "jane@example.com".to_string(),
                password: "Correct1Password!".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.user.email, "jane@example.com");
        assert!(response.tenants.is_none());
        assert!(cookie.starts_with("idsess="));
    }

    #[tokio::test]
    async fn unknown_email_is_rejected_without_revealing_the_miss() {
        let hash = bcrypt::hash("Correct1Password!", 4).unwrap();
        let controller = controller(hash);
        let result = controller
            .login(&LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "whatever".to_string(),
            })
            .await;
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }
}
