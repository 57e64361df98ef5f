use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::IdentityCfg;
use crate::errors::ContentScriptError;
use crate::models::usage::Usage;

#[derive(Deserialize)]
struct SessionClaims {
    sub: String,
}

/// User record as returned by the auth provider backend API.
#[derive(Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub public_metadata: Value,
    #[serde(default)]
    pub private_metadata: Value,
}

impl ProviderUser {
    /// `pro` counts only when it is literally `true`; `freeCount` only when it is a non-negative number.
    /// A fractional count is truncated, so `2.5` still leaves one free generation.
    pub fn usage(&self) -> Usage {
        let pro = self.public_metadata["pro"].as_bool() == Some(true);
        let free_count = self.private_metadata["freeCount"]
            .as_u64()
            .or_else(|| {
                self.private_metadata["freeCount"]
                    .as_f64()
                    .filter(|count| count.is_finite() && *count >= 0.0)
                    .map(|count| count.floor() as u64)
            })
            .map_or(0, |count| u32::try_from(count).unwrap_or(u32::MAX));

        Usage::new(pro, free_count)
    }
}

/// Client for the auth provider: verifies its session tokens locally and
/// reads/writes user metadata through its backend API.
pub struct IdentityClient {
    http: reqwest::Client,
    api_url: String,
    secret_key: String,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl IdentityClient {
    pub fn new(cfg: &IdentityCfg) -> Result<Self, ContentScriptError> {
        let algorithm = Algorithm::from_str(&cfg.session_algorithm).map_err(|e| {
            ContentScriptError::ConfigError(format!("Invalid session_algorithm {}: {}", cfg.session_algorithm, e))
        })?;

        let key = cfg.session_key.as_bytes();
        let decoding_key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(DecodingKey::from_secret(key)),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(key),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(key),
            _ => DecodingKey::from_rsa_pem(key),
        }
        .map_err(|e| ContentScriptError::ConfigError(format!("Invalid session_key: {}", e)))?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            secret_key: cfg.secret_key.clone(),
            decoding_key,
            validation: Validation::new(algorithm),
        })
    }

    /// Returns the user id (`sub`) of a valid session token.
    pub fn verify_session_token(&self, token: &str) -> Result<String, ContentScriptError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims.sub)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<ProviderUser, ContentScriptError> {
        let user = self
            .http
            .get(format!("{}/users/{}", self.api_url, user_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await?
            .error_for_status()?
            .json::<ProviderUser>()
            .await?;

        Ok(user)
    }

    pub async fn fetch_usage(&self, user_id: &str) -> Result<Usage, ContentScriptError> {
        let user = self.get_user(user_id).await?;
        let usage = user.usage();

        log::debug!("User {} usage: {:?}", user.id, usage);

        Ok(usage)
    }

    pub async fn update_free_count(&self, user_id: &str, free_count: u32) -> Result<(), ContentScriptError> {
        self.update_metadata(user_id, json!({ "private_metadata": { "freeCount": free_count } }))
            .await
    }

    pub async fn grant_pro(&self, user_id: &str) -> Result<(), ContentScriptError> {
        self.update_metadata(user_id, json!({ "public_metadata": { "pro": true } }))
            .await?;

        log::info!("Granted pro plan to user {}", user_id);

        Ok(())
    }

    /// Metadata updates are merged into the existing record by the provider.
    async fn update_metadata(&self, user_id: &str, metadata: Value) -> Result<(), ContentScriptError> {
        self.http
            .patch(format!("{}/users/{}/metadata", self.api_url, user_id))
            .bearer_auth(&self.secret_key)
            .json(&metadata)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
