//! Credential Store (C6): password hashing, verification, rotation, §4.6.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{IdentityError, Result};
use crate::repository::CredentialRepository;

const MIN_BCRYPT_COST: u32 = 10;
const MAX_BCRYPT_COST: u32 = 15;
const DEFAULT_BCRYPT_COST: u32 = 12;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

pub struct CredentialStore {
    credentials: Arc<dyn CredentialRepository>,
    cost: u32,
}

impl CredentialStore {
    pub fn new(credentials: Arc<dyn CredentialRepository>, cost: u32) -> Self {
        Self {
            credentials,
            cost: cost.clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST),
        }
    }

    pub fn with_default_cost(credentials: Arc<dyn CredentialRepository>) -> Self {
        Self::new(credentials, DEFAULT_BCRYPT_COST)
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    pub fn verify(&self, hash: &str, password: &str) -> Result<bool> {
        Ok(bcrypt::verify(password, hash)?)
    }

    /// Length in `[8, 128]`; at least one upper, one lower, one digit, one
    /// punctuation/symbol character.
    pub fn validate(&self, password: &str) -> Result<()> {
        let len = password.chars().count();
        if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
            return Err(IdentityError::WeakPassword);
        }
        let has_upper = password.chars().any(|c| c.is_uppercase());
        let has_lower = password.chars().any(|c| c.is_lowercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_symbol = password.chars().any(|c| !c.is_alphanumeric());
        if has_upper && has_lower && has_digit && has_symbol {
            Ok(())
        } else {
            Err(IdentityError::WeakPassword)
        }
    }

    pub async fn create_password(&self, user_id: Uuid, email: &str, password: &str) -> Result<()> {
        self.validate(password)?;
        let hash = self.hash(password)?;
        self.credentials
            .create_password_credential(user_id, email, &hash)
            .await
    }

    pub async fn update_password(&self, credential_id: Uuid, new_password: &str) -> Result<()> {
        self.validate(new_password)?;
        let hash = self.hash(new_password)?;
        self.credentials
            .update_secret_hash(credential_id, &hash)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credential;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeCredentialRepository {
        updated: Mutex<Option<(Uuid, String)>>,
    }

    #[async_trait]
    impl CredentialRepository for FakeCredentialRepository {
        async fn find_password_credential(&self, _user_id: Uuid) -> Result<Option<Credential>> {
            Ok(None)
        }
        async fn create_password_credential(
            &self,
            _user_id: Uuid,
            _identifier: &str,
            _secret_hash: &str,
        ) -> Result<()> {
            Ok(())
        }
        async fn update_secret_hash(&self, credential_id: Uuid, secret_hash: &str) -> Result<()> {
            *self.updated.lock().expect("lock poisoned") =
                Some((credential_id, secret_hash.to_string()));
            Ok(())
        }
        async fn touch_last_used(&self, _credential_id: Uuid) -> Result<()> {
            Ok(())
        }
    }

    fn store() -> CredentialStore {
        CredentialStore::with_default_cost(Arc::new(FakeCredentialRepository::default()))
    }

    #[test]
    fn validate_rejects_passwords_missing_a_character_class() {
        let store = store();
        assert!(store.validate("alllowercase1!").is_err());
        assert!(store.validate("ALLUPPERCASE1!").is_err());
        assert!(store.validate("NoDigitsHere!").is_err());
        assert!(store.validate("NoSymbols123").is_err());
        assert!(store.validate("short1!").is_err());
        assert!(store.validate("Valid1Password!").is_ok());
    }

    #[test]
    fn hash_then_verify_round_trips() {
        let store = CredentialStore::new(Arc::new(FakeCredentialRepository::default()), 4);
        let hash = store.hash("Valid1Password!").unwrap();
        assert!(store.verify(&hash, "Valid1Password!").unwrap());
        assert!(!store.verify(&hash, "WrongPassword1!").unwrap());
    }

    #[tokio::test]
    async fn update_password_rejects_weak_replacement() {
        let store = store();
        let result = store.update_password(Uuid::new_v4(), "weak").await;
        assert!(result.is_err());
    }
}
