//! [`CredentialProvider`] implementations for non-interactive use.

use async_trait::async_trait;
use claims::{AuthToken, ClaimError, CredentialProvider};

/// Environment variable read by [`EnvTokenProvider::default`].
pub const TOKEN_ENV_VAR: &str = "CLAIMWATCH_TOKEN";

/// A fixed token, or no session at all.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<AuthToken>,
}

impl StaticTokenProvider {
    /// Blank tokens are treated as "signed out".
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AuthToken::new(token),
        }
    }

    pub fn signed_out() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn auth_token(&self) -> Result<AuthToken, ClaimError> {
        self.token.clone().ok_or_else(|| ClaimError::NotAuthenticated {
            reason: "no session token configured".into(),
        })
    }
}

/// Reads the token from an environment variable on every request, so a token
/// refreshed by an external helper is picked up without restarting.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(TOKEN_ENV_VAR)
    }
}

#[async_trait]
impl CredentialProvider for EnvTokenProvider {
    async fn auth_token(&self) -> Result<AuthToken, ClaimError> {
        std::env::var(&self.var)
            .ok()
            .and_then(AuthToken::new)
            .ok_or_else(|| ClaimError::NotAuthenticated {
                reason: format!("environment variable {} is not set", self.var),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_returned() {
        let token = StaticTokenProvider::new("abc").auth_token().await.unwrap();
        assert_eq!(token.expose(), "abc");
    }

    #[tokio::test]
    async fn blank_static_token_is_signed_out() {
        for provider in [StaticTokenProvider::new("  "), StaticTokenProvider::signed_out()] {
            assert!(matches!(
                provider.auth_token().await,
                Err(ClaimError::NotAuthenticated { .. })
            ));
        }
    }

    #[tokio::test]
    async fn env_provider_reports_missing_variable() {
        let provider = EnvTokenProvider::new("CLAIMWATCH_TEST_TOKEN_NEVER_SET");
        match provider.auth_token().await {
            Err(ClaimError::NotAuthenticated { reason }) => {
                assert!(reason.contains("CLAIMWATCH_TEST_TOKEN_NEVER_SET"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
