//! Azure AD credentials
//!
//! ARM requests are signed with an OAuth2 bearer token. Three sources are
//! supported, picked from the environment by [`default_credential_from_env`]:
//!
//! - workload identity (`AZURE_FEDERATED_TOKEN_FILE`), the normal case in-cluster
//! - client secret (`AZURE_CLIENT_SECRET`)
//! - a pre-issued token (`AZURE_ACCESS_TOKEN`), for local runs

use crate::error::GalleryError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// OAuth2 scope for Azure Resource Manager
pub const ARM_SCOPE: &str = "https://management.azure.com/.default";

/// Default Azure AD authority
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN_SECONDS: i64 = 300;

/// A bearer token and its expiry
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_on - ChronoDuration::seconds(REFRESH_MARGIN_SECONDS) > now
    }
}

/// Source of ARM bearer tokens
#[async_trait::async_trait]
pub trait TokenCredential: Send + Sync {
    /// Get a token valid for `scope`
    async fn get_token(&self, scope: &str) -> Result<AccessToken, GalleryError>;
}

/// A fixed token, never refreshed
#[derive(Clone)]
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait::async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken, GalleryError> {
        Ok(AccessToken {
            token: self.token.clone(),
            expires_on: DateTime::<Utc>::MAX_UTC,
        })
    }
}

/// How a confidential client proves its identity
#[derive(Debug, Clone)]
enum ClientAuth {
    Secret(String),
    /// Path to a projected service account token exchanged via federation
    FederatedTokenFile(PathBuf),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Tokens cached per OAuth2 scope
#[derive(Debug, Default)]
struct TokenCache {
    tokens: HashMap<String, AccessToken>,
}

impl TokenCache {
    fn fresh(&self, scope: &str, now: DateTime<Utc>) -> Option<AccessToken> {
        self.tokens.get(scope).filter(|token| token.is_fresh(now)).cloned()
    }

    fn store(&mut self, scope: &str, token: AccessToken) {
        self.tokens.insert(scope.to_string(), token);
    }
}

/// Client-credentials grant against Azure AD, with an in-memory token cache
pub struct ClientCredential {
    http: Client,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    auth: ClientAuth,
    cached: Mutex<TokenCache>,
}

impl std::fmt::Debug for ClientCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredential")
            .field("authority_host", &self.authority_host)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl ClientCredential {
    /// Authenticate with a client secret
    pub fn with_secret(http: Client, tenant_id: String, client_id: String, secret: String) -> Self {
        Self::build(http, tenant_id, client_id, ClientAuth::Secret(secret))
    }

    /// Authenticate with a federated token file (AKS workload identity)
    pub fn with_federated_token_file(
        http: Client,
        tenant_id: String,
        client_id: String,
        token_file: impl Into<PathBuf>,
    ) -> Self {
        Self::build(http, tenant_id, client_id, ClientAuth::FederatedTokenFile(token_file.into()))
    }

    /// Override the Azure AD authority (sovereign clouds)
    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into().trim_end_matches('/').to_string();
        self
    }

    fn build(http: Client, tenant_id: String, client_id: String, auth: ClientAuth) -> Self {
        Self {
            http,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            tenant_id,
            client_id,
            auth,
            cached: Mutex::new(TokenCache::default()),
        }
    }

    async fn request_token(&self, scope: &str) -> Result<AccessToken, GalleryError> {
        let url = format!("{}/{}/oauth2/v2.0/token", self.authority_host, self.tenant_id);
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", self.client_id.clone()),
            ("scope", scope.to_string()),
        ];
        match &self.auth {
            ClientAuth::Secret(secret) => form.push(("client_secret", secret.clone())),
            ClientAuth::FederatedTokenFile(path) => {
                let assertion = tokio::fs::read_to_string(path).await.map_err(|e| {
                    GalleryError::Credential(format!(
                        "failed to read federated token file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                form.push(("client_assertion_type", CLIENT_ASSERTION_TYPE.to_string()));
                form.push(("client_assertion", assertion.trim().to_string()));
            }
        }

        debug!("Requesting Azure AD token for client {}", self.client_id);
        let response = self.http.post(&url).form(&form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GalleryError::Credential(format!(
                "token request failed: {} - {}",
                status, body
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        let lifetime = i64::try_from(parsed.expires_in).unwrap_or(i64::MAX);
        Ok(AccessToken {
            token: parsed.access_token,
            expires_on: Utc::now() + ChronoDuration::seconds(lifetime.min(86_400)),
        })
    }
}

#[async_trait::async_trait]
impl TokenCredential for ClientCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, GalleryError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.fresh(scope, Utc::now()) {
            return Ok(token);
        }
        let token = self.request_token(scope).await?;
        cached.store(scope, token.clone());
        Ok(token)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Pick a credential from the standard `AZURE_*` environment variables
pub fn default_credential_from_env(http: Client) -> Result<Arc<dyn TokenCredential>, GalleryError> {
    let authority = non_empty_var("AZURE_AUTHORITY_HOST").unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());
    let tenant = non_empty_var("AZURE_TENANT_ID");
    let client = non_empty_var("AZURE_CLIENT_ID");

    if let (Some(tenant_id), Some(client_id)) = (tenant, client) {
        if let Some(token_file) = non_empty_var("AZURE_FEDERATED_TOKEN_FILE") {
            debug!("Using workload identity credential");
            return Ok(Arc::new(
                ClientCredential::with_federated_token_file(http, tenant_id, client_id, token_file)
                    .with_authority_host(authority),
            ));
        }
        if let Some(secret) = non_empty_var("AZURE_CLIENT_SECRET") {
            debug!("Using client secret credential");
            return Ok(Arc::new(
                ClientCredential::with_secret(http, tenant_id, client_id, secret).with_authority_host(authority),
            ));
        }
    }

    if let Some(token) = non_empty_var("AZURE_ACCESS_TOKEN") {
        debug!("Using static access token credential");
        return Ok(Arc::new(StaticTokenCredential::new(token)));
    }

    Err(GalleryError::Credential(
        "no Azure credential configured: set AZURE_TENANT_ID and AZURE_CLIENT_ID with \
         AZURE_FEDERATED_TOKEN_FILE or AZURE_CLIENT_SECRET, or set AZURE_ACCESS_TOKEN"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token_never_expires() {
        let credential = StaticTokenCredential::new("abc");
        let token = credential.get_token(ARM_SCOPE).await.unwrap();
        assert_eq!(token.token, "abc");
        assert!(token.is_fresh(Utc::now()));
    }

    #[test]
    fn test_token_refreshed_inside_margin() {
        let now = Utc::now();
        let token = AccessToken {
            token: "t".to_string(),
            expires_on: now + ChronoDuration::seconds(REFRESH_MARGIN_SECONDS - 1),
        };
        assert!(!token.is_fresh(now));

        let token = AccessToken {
            token: "t".to_string(),
            expires_on: now + ChronoDuration::seconds(3600),
        };
        assert!(token.is_fresh(now));
    }

    #[test]
    fn test_token_cache_is_keyed_by_scope() {
        let now = Utc::now();
        let mut cache = TokenCache::default();
        cache.store(
            ARM_SCOPE,
            AccessToken {
                token: "arm".to_string(),
                expires_on: now + ChronoDuration::seconds(3600),
            },
        );

        assert_eq!(cache.fresh(ARM_SCOPE, now).map(|t| t.token).as_deref(), Some("arm"));
        assert!(cache.fresh("https://vault.azure.net/.default", now).is_none());

        // An expired token is not served
        assert!(cache.fresh(ARM_SCOPE, now + ChronoDuration::seconds(3600)).is_none());
    }

    #[test]
    fn test_access_token_debug_redacts() {
        let token = AccessToken {
            token: "secret-value".to_string(),
            expires_on: Utc::now(),
        };
        assert!(!format!("{:?}", token).contains("secret-value"));
    }
}
