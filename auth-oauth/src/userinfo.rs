//! UserInfo endpoint (C10). Claims are read back from the access token's grant
//! row rather than re-queried from a user store: §4.7 step 4 already baked the
//! subject's profile fields into the OIDC session claims at authorize time, and
//! C8 copies them onto the access token's `form` so this endpoint stays a pure
//! token lookup with no second dependency on the identity side.

use database_layer::GrantStore;

use crate::error::{OAuthError, Result};
use crate::models::UserInfoResponse;
use crate::scopes;

pub struct UserInfoService {
    grants: GrantStore,
    codec: crypto::TokenCodec,
}

impl UserInfoService {
    pub fn new(grants: GrantStore, codec: crypto::TokenCodec) -> Self {
        Self { grants, codec }
    }

    pub async fn userinfo(&self, bearer_token: &str) -> Result<UserInfoResponse> {
        let signature = self.codec.hash(bearer_token);
        let row = self
            .grants
            .get_access_token(&signature)
            .await
            .map_err(|_| OAuthError::InvalidToken)?;

        if !scopes::contains(&row.granted_scopes, "openid") {
            return Err(OAuthError::InsufficientScope("openid".to_string()));
        }

        let profile_claim = |field: &str| {
            row.form
                .get(field)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        let mut response = UserInfoResponse {
            sub: row.subject,
            email: None,
            email_verified: None,
            preferred_username: None,
            name: None,
            picture: None,
            updated_at: chrono::Utc::now().timestamp(),
        };

        if scopes::contains(&row.granted_scopes, "email") {
            response.email = profile_claim("email");
            response.email_verified = row.form.get("email_verified").and_then(|v| v.as_bool());
        }
        if scopes::contains(&row.granted_scopes, "profile") {
            response.preferred_username = profile_claim("preferred_username");
            response.name = profile_claim("name");
            response.picture = profile_claim("picture");
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_claims_are_withheld_without_the_email_scope() {
        let scopes = vec!["openid".to_string(), "profile".to_string()];
        assert!(!scopes::contains(&scopes, "email"));
    }
}
