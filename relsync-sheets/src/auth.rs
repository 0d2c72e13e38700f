//! Service-account authentication.
//!
//! Signs an RS256 JWT assertion with the key's private key and exchanges it
//! at the key's `token_uri` for a bearer token.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{decode_err, request_err, SheetsError};

/// Scopes requested for the access token.
pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_TTL_SECS: i64 = 3600;

/// The fields of a service-account JSON key that relsync uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_owned()
}

impl ServiceAccountKey {
    pub fn load(path: &Path) -> Result<Self, SheetsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SheetsError::Credentials {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SheetsError::CredentialsJson {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Build the signed JWT assertion for `key`, issued at `now`.
pub fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, SheetsError> {
    let claims = Claims {
        iss: &key.client_email,
        scope: SCOPES,
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ASSERTION_TTL_SECS)).timestamp(),
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SheetsError::Auth(format!("unusable private key: {e}")))?;
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| SheetsError::Auth(format!("failed to sign assertion: {e}")))
}

/// Exchange a freshly signed assertion for an access token.
pub fn fetch_access_token(
    agent: &ureq::Agent,
    key: &ServiceAccountKey,
) -> Result<String, SheetsError> {
    let assertion = sign_assertion(key, Utc::now())?;
    let response = agent
        .post(&key.token_uri)
        .send_form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
        .map_err(|e| match e {
            ureq::Error::Status(status, resp) => SheetsError::Auth(format!(
                "token endpoint returned HTTP {status}: {}",
                resp.into_string().unwrap_or_default()
            )),
            other => request_err("token exchange", other),
        })?;
    let token: TokenResponse = response
        .into_json()
        .map_err(|e| decode_err("token exchange", e))?;
    tracing::info!(account = %key.client_email, "obtained Google access token");
    Ok(token.access_token)
}
