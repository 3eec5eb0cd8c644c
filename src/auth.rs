//! Credentials seam: the client asks an [`AuthProvider`] for a fresh token before every call.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

pub type BoxError = Box<dyn StdError + Send + Sync>;
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Clone, Default, Eq, PartialEq)]
/// String that never prints its content through `Debug` or `Display`.
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Bearer token plus the API authority it is valid for.
pub struct TokenData {
    pub access_token: SecretString,
    /// Scheme and host (optionally a base path) requests are sent to, e.g.
    /// `https://api.example.com`.
    pub api_url: String,
}

impl TokenData {
    pub fn new(access_token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token),
            api_url: api_url.into(),
        }
    }
}

/// Source of bearer credentials.
///
/// Implementations own the token cache and its refresh policy. They must be safe to call
/// concurrently; coalescing parallel refreshes is their job, not the client's.
pub trait AuthProvider: Send + Sync {
    /// Cached token, if any, without touching the network.
    fn current_token_data(&self) -> Option<TokenData>;

    /// Return a token that is valid now, refreshing it first when it has expired.
    fn ensure_fresh(&self) -> BoxFuture<'_, Result<TokenData, BoxError>>;
}

#[derive(Debug, Clone)]
/// Provider for a long-lived token that never needs refreshing.
pub struct StaticToken {
    token: TokenData,
}

impl StaticToken {
    pub fn new(access_token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            token: TokenData::new(access_token, api_url),
        }
    }
}

impl AuthProvider for StaticToken {
    fn current_token_data(&self) -> Option<TokenData> {
        Some(self.token.clone())
    }

    fn ensure_fresh(&self) -> BoxFuture<'_, Result<TokenData, BoxError>> {
        Box::pin(async move { Ok(self.token.clone()) })
    }
}
