use crate::app::{Config, IdentityCfg, QuotaStrategy};
use crate::errors::ContentScriptError;
use crate::resources::identity_client::IdentityClient;
use crate::resources::pages::Pages;
use crate::resources::quota_store::QuotaStore;

/// Resources live for the whole application runtime. They wrap external
/// services like the auth provider API or hold precompiled state.
pub trait Resource<'a>: Sized {
    type Cfg;

    fn init_resource(config: Self::Cfg) -> Result<Self, ContentScriptError>;
}

impl<'a> Resource<'a> for QuotaStore {
    type Cfg = &'a Config;

    fn init_resource(config: Self::Cfg) -> Result<Self, ContentScriptError> {
        match config.quota.strategy {
            QuotaStrategy::Metadata => {
                let identity_cfg = config.identity.as_ref().ok_or_else(|| {
                    ContentScriptError::ConfigError("Missing [identity] config for metadata quota strategy".to_string())
                })?;

                Ok(QuotaStore::Metadata(IdentityClient::init_resource(identity_cfg)?))
            }
            QuotaStrategy::Cookie => Ok(QuotaStore::Cookie),
        }
    }
}

impl<'a> Resource<'a> for IdentityClient {
    type Cfg = &'a IdentityCfg;

    fn init_resource(config: Self::Cfg) -> Result<Self, ContentScriptError> {
        IdentityClient::new(config)
    }
}

impl<'a> Resource<'a> for Pages {
    type Cfg = ();

    fn init_resource(_cfg: ()) -> Result<Self, ContentScriptError> {
        Pages::new()
    }
}
