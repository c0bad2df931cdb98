use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{AppError, AppResult};

const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const ASSERTION_TTL: u64 = 3600;
// Google tokens live for an hour; refresh well before that.
const TOKEN_CACHE_TTL: Duration = Duration::from_secs(50 * 60);
const CACHE_KEY: &str = "spreadsheets";

/// The parts of a service-account key file the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Exchanges a signed service-account assertion for a bearer token and keeps it
/// cached until shortly before it expires.
#[derive(Clone)]
pub struct TokenSource {
    key: ServiceAccountKey,
    http: reqwest::Client,
    cache: Cache<&'static str, Arc<String>>,
}

impl TokenSource {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Self {
        Self {
            key,
            http,
            cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(TOKEN_CACHE_TTL)
                .build(),
        }
    }

    pub async fn access_token(&self) -> AppResult<Arc<String>> {
        self.cache
            .try_get_with(CACHE_KEY, self.fetch())
            .await
            .map_err(|e: Arc<AppError>| (*e).clone())
    }

    async fn fetch(&self) -> AppResult<Arc<String>> {
        let iat = now();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_TTL,
        };

        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| AppError::store(format!("invalid service account key: {e}")))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| AppError::store(format!("failed to sign assertion: {e}")))?;

        debug!(client = %self.key.client_email, "Requesting spreadsheet access token");

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(AppError::store)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Token exchange rejected");
            return Err(AppError::store(format!("token exchange failed with {status}")));
        }

        let token: TokenResponse = response.json().await.map_err(AppError::store)?;
        Ok(Arc::new(token.access_token))
    }
}
