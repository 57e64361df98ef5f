use std::sync::Arc;
use std::{env, fs};

use actix_cors::Cors;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::{cookie, http};
use serde::Deserialize;

use crate::constants::{DEFAULT_GENERATION_DELAY_MS, DEFAULT_SESSION_EXPIRATION_IN_DAYS, SESSION_COOKIE_NAME};
use crate::errors::ContentScriptError;
use crate::resources::pages::Pages;
use crate::resources::quota_store::QuotaStore;
use crate::resources::resource::Resource;
use crate::utils::logger::log_warning;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuotaStrategy {
    /// Counter lives in the auth provider's user metadata.
    Metadata,
    /// Counter lives in the signed session cookie.
    Cookie,
}

#[derive(Clone, Deserialize)]
pub struct QuotaCfg {
    pub strategy: QuotaStrategy,
}

#[derive(Clone, Deserialize)]
pub struct IdentityCfg {
    pub api_url: String,
    pub secret_key: String,
    /// PEM public key (or shared secret for HS*) used to verify session tokens.
    pub session_key: String,
    #[serde(default = "default_session_algorithm")]
    pub session_algorithm: String,
}

#[derive(Clone, Deserialize)]
pub struct StripeCfg {
    pub secret_key: String,
    pub price_id: String,
    pub webhook_secret_key: Option<String>,
    /// Overrides `https://api.stripe.com/`.
    pub api_url: Option<String>,
}

impl StripeCfg {
    pub fn client(&self) -> stripe::Client {
        match &self.api_url {
            Some(api_url) => stripe::Client::from_url(api_url.as_str(), self.secret_key.clone()),
            None => stripe::Client::new(self.secret_key.clone()),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub client_url: String,
    pub allowed_origin: String,
    pub secret_key: String,
    #[serde(default = "default_session_expiration")]
    pub session_expiration_in_days: i64,
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_generation_delay")]
    pub generation_delay_ms: u64,
    pub quota: QuotaCfg,
    pub identity: Option<IdentityCfg>,
    pub stripe: Option<StripeCfg>,
}

fn default_session_algorithm() -> String {
    "RS256".to_string()
}

fn default_session_expiration() -> i64 {
    DEFAULT_SESSION_EXPIRATION_IN_DAYS
}

fn default_generation_delay() -> u64 {
    DEFAULT_GENERATION_DELAY_MS
}

#[derive(Clone)]
pub struct App {
    pub config: Config,
    pub session_key: Key,
    pub quota_store: Arc<QuotaStore>,
    pub pages: Arc<Pages>,
}

impl App {
    pub async fn new() -> Result<Self, ContentScriptError> {
        dotenv::dotenv().ok();

        let env = env::var("ENV").map_err(|_| ContentScriptError::ConfigError("ENV must be set".to_string()))?;
        let config_file = format!("config.{}.toml", env);
        let contents = fs::read_to_string(&config_file)
            .map_err(|e| ContentScriptError::ConfigError(format!("Unable to read {}: {}", config_file, e)))?;
        let config = toml::from_str::<Config>(&contents)?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ContentScriptError> {
        let session_key = Key::try_from(config.secret_key.as_bytes()).map_err(|e| {
            ContentScriptError::ConfigError(format!("secret_key must be at least 64 bytes long: {}", e))
        })?;

        match config.stripe.as_ref().map(|stripe| stripe.api_url.as_deref()) {
            None => log_warning("Missing [stripe] config. Checkout is disabled.".to_string()),
            Some(Some(api_url)) => {
                reqwest::Url::parse(api_url).map_err(|e| {
                    ContentScriptError::ConfigError(format!("Invalid stripe api_url {}: {}", api_url, e))
                })?;
            }
            Some(None) => {}
        }

        let quota_store = QuotaStore::init_resource(&config)?;
        let pages = Pages::init_resource(())?;

        log::info!("Quota strategy: {}", quota_store.strategy());

        Ok(Self {
            config,
            session_key,
            quota_store: Arc::new(quota_store),
            pages: Arc::new(pages),
        })
    }

    pub fn stripe_cfg(&self) -> Result<&StripeCfg, ContentScriptError> {
        self.config
            .stripe
            .as_ref()
            .ok_or_else(|| ContentScriptError::InternalServerError("Stripe config not found".to_string()))
    }

    pub fn cors(&self) -> Cors {
        Cors::default()
            .allowed_origin(self.config.allowed_origin.as_str())
            .supports_credentials()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::ORIGIN,
                http::header::CONTENT_TYPE,
            ])
            .expose_headers(vec![http::header::LOCATION])
            .max_age(86400)
    }

    pub fn session_middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        let ttl =
            PersistentSession::default().session_ttl(cookie::time::Duration::days(self.config.session_expiration_in_days));

        SessionMiddleware::builder(CookieSessionStore::default(), self.session_key.clone())
            .cookie_name(SESSION_COOKIE_NAME.to_string())
            .cookie_content_security(CookieContentSecurity::Signed)
            .session_lifecycle(ttl)
            .cookie_secure(self.config.secure_cookies)
            .build()
    }
}
