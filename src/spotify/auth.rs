use std::fmt;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use reqwest::Client;

use crate::{
    config::Config,
    management::TokenCache,
    observer::{ConversionObserver, ErrorEvent, ProgressEvent},
    types::{Credential, TokenResponse},
};

#[derive(Debug)]
pub enum AuthError {
    RequestError(reqwest::Error),
    InvalidResponse(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::RequestError(err)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::RequestError(e) => write!(f, "token request failed: {}", e),
            AuthError::InvalidResponse(msg) => write!(f, "invalid token response: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Source of fresh bearer tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn request_token(&self) -> Result<TokenResponse, AuthError>;
}

/// Client Credentials flow against the Spotify accounts service.
pub struct SpotifyTokenProvider {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl SpotifyTokenProvider {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            token_url: config.spotify_token_url.clone(),
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
        }
    }

    fn basic_credentials(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret))
    }
}

#[async_trait]
impl TokenProvider for SpotifyTokenProvider {
    /// Exchanges the client id and secret for an access token.
    ///
    /// Sends a single `grant_type=client_credentials` form request with the
    /// credentials in a Basic `Authorization` header. There is no retry:
    /// network errors, non-2xx responses and bodies that are not a token
    /// response all become an [`AuthError`].
    ///
    /// # API Documentation
    ///
    /// <https://developer.spotify.com/documentation/web-api/tutorials/client-credentials-flow>
    async fn request_token(&self) -> Result<TokenResponse, AuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .header("Authorization", format!("Basic {}", self.basic_credentials()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?;

        let token = response.json::<TokenResponse>().await?;
        if token.access_token.is_empty() {
            return Err(AuthError::InvalidResponse("empty access_token".to_string()));
        }

        Ok(token)
    }
}

/// Hands out a valid bearer credential, reusing the cached one when possible.
pub struct Authenticator<P> {
    provider: P,
    cache: TokenCache,
}

impl<P: TokenProvider> Authenticator<P> {
    pub fn new(provider: P, cache: TokenCache) -> Self {
        Self { provider, cache }
    }

    pub async fn obtain_token(
        &self,
        observer: &dyn ConversionObserver,
    ) -> Result<Credential, AuthError> {
        self.obtain_token_at(Utc::now(), observer).await
    }

    /// Returns a credential valid at `now`.
    ///
    /// # Cache Behavior
    ///
    /// - A cached credential that is still valid (outside the 300 second
    ///   safety margin) is returned as-is and nothing is written.
    /// - A missing, expired or unreadable cache leads to exactly one token
    ///   request. An unreadable cache is reported and then ignored.
    /// - A freshly obtained credential overwrites the cache file. Failing to
    ///   write it is reported but does not fail authentication.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`AuthError`] when a new token is needed and
    /// the request fails. The caller is expected to abort.
    pub async fn obtain_token_at(
        &self,
        now: DateTime<Utc>,
        observer: &dyn ConversionObserver,
    ) -> Result<Credential, AuthError> {
        match self.cache.load().await {
            Ok(Some(credential)) if credential.is_valid_at(now.timestamp()) => {
                observer.on_progress(ProgressEvent::UsingCachedToken);
                return Ok(credential);
            }
            Ok(_) => {}
            Err(error) => observer.on_error(ErrorEvent::TokenCacheUnreadable {
                path: self.cache.path(),
                error: &error,
            }),
        }

        observer.on_progress(ProgressEvent::RequestingToken);
        let response = match self.provider.request_token().await {
            Ok(response) => response,
            Err(error) => {
                observer.on_error(ErrorEvent::TokenRequestFailed { error: &error });
                return Err(error);
            }
        };

        let credential = Credential::issue(response, now);
        match self.cache.persist(&credential).await {
            Ok(()) => observer.on_progress(ProgressEvent::TokenCached),
            Err(error) => observer.on_error(ErrorEvent::TokenCacheNotWritten {
                path: self.cache.path(),
                error: &error,
            }),
        }

        Ok(credential)
    }
}
