//! Validation RPC domain logic (C12), §4.12. `auth-gateway` wraps this behind a
//! tonic service; kept free of any RPC framework so it can run the same
//! introspect-then-scope-check path C9 uses, tested on its own.

use database_layer::GrantStore;

use crate::models::{TokenInfo, UserInfo, ValidateTokenRequest, ValidateTokenResponse};
use crate::scopes;

pub struct ValidationService {
    grants: GrantStore,
    codec: crypto::TokenCodec,
    issuer: String,
}

impl ValidationService {
    pub fn new(grants: GrantStore, codec: crypto::TokenCodec, issuer: String) -> Self {
        Self {
            grants,
            codec,
            issuer,
        }
    }

    /// Never errors; an unknown/expired token, a storage failure, and a
    /// missing required scope all surface as `valid: false` with a
    /// human-readable `error`, never an RPC status.
    pub async fn validate(&self, request: &ValidateTokenRequest) -> ValidateTokenResponse {
        let signature = self.codec.hash(&request.token);
        let token_type = request.token_type.as_deref().unwrap_or("access_token");

        let row = match token_type {
            "refresh_token" => self.grants.get_refresh_token(&signature).await,
            _ => self.grants.get_access_token(&signature).await,
        };

        let row = match row {
            Ok(row) => row,
            Err(_) => return Self::invalid("invalid or expired token"),
        };

        for required in &request.required_scopes {
            if !scopes::contains(&row.granted_scopes, required) {
                return Self::invalid(&format!("insufficient scope: missing {required}"));
            }
        }

        let profile_claim = |field: &str| {
            row.form
                .get(field)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        let mut user_info = UserInfo {
            subject: row.subject.clone(),
            ..Default::default()
        };
        if scopes::contains(&row.granted_scopes, "email") {
            user_info.email = profile_claim("email");
            user_info.email_verified = row
                .form
                .get("email_verified")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
        }
        if scopes::contains(&row.granted_scopes, "profile") {
            user_info.username = profile_claim("preferred_username");
            user_info.name = profile_claim("name");
        }

        ValidateTokenResponse {
            valid: true,
            error: None,
            token_info: Some(TokenInfo {
                active: true,
                token_type: token_type.to_string(),
                scope: row.granted_scopes.join(" "),
                client_id: row.client_id,
                audience: row.granted_audience,
                issuer: self.issuer.clone(),
                subject: row.subject,
                expires_at: row.expires_at,
                issued_at: row.requested_at,
            }),
            user_info: Some(user_info),
        }
    }

    fn invalid(error: &str) -> ValidateTokenResponse {
        ValidateTokenResponse {
            valid: false,
            error: Some(error.to_string()),
            token_info: None,
            user_info: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_response_carries_no_token_or_user_info() {
        let response = ValidationService::invalid("invalid or expired token");
        assert!(!response.valid);
        assert!(response.token_info.is_none());
        assert!(response.user_info.is_none());
    }
}
