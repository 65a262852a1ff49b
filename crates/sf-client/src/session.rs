//! Session access
//!
//! The client never stores credentials itself; it asks a [`SessionProvider`]
//! for the current access token on every request.

use std::fmt;

/// Bearer access token
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token text
    #[inline]
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value
    #[must_use]
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Source of the current access token
pub trait SessionProvider: Send + Sync {
    /// Current token, or `None` when signed out
    fn access_token(&self) -> Option<AccessToken>;
}

impl<F> SessionProvider for F
where
    F: Fn() -> Option<AccessToken> + Send + Sync,
{
    fn access_token(&self) -> Option<AccessToken> {
        self()
    }
}

/// Fixed token, or none at all
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<AccessToken>,
}

impl StaticSession {
    /// Session holding `token`
    pub fn new(token: impl Into<AccessToken>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Signed-out session
    #[must_use]
    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

impl SessionProvider for StaticSession {
    fn access_token(&self) -> Option<AccessToken> {
        self.token.clone()
    }
}

/// Token read from an environment variable on each request
#[derive(Debug, Clone)]
pub struct EnvSession {
    var: String,
}

impl EnvSession {
    /// Read from `var`
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Variable name
    #[inline]
    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl SessionProvider for EnvSession {
    fn access_token(&self) -> Option<AccessToken> {
        std::env::var(&self.var)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(AccessToken::from)
    }
}
