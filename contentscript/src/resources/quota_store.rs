use actix_session::Session;
use log::error;

use crate::app::QuotaStrategy;
use crate::constants::{FREE_COUNT_SESSION_KEY, PRO_SESSION_KEY};
use crate::errors::ContentScriptError;
use crate::models::identity::Identity;
use crate::models::usage::Usage;
use crate::resources::identity_client::IdentityClient;

/// Where usage counters are kept. Exactly one variant is active per deployment.
pub enum QuotaStore {
    Metadata(IdentityClient),
    Cookie,
}

impl QuotaStore {
    pub fn strategy(&self) -> QuotaStrategy {
        match self {
            QuotaStore::Metadata(_) => QuotaStrategy::Metadata,
            QuotaStore::Cookie => QuotaStrategy::Cookie,
        }
    }

    pub async fn load(&self, identity: &Identity, client_session: &Session) -> Result<Usage, ContentScriptError> {
        match self {
            QuotaStore::Metadata(client) => client.fetch_usage(require_user(identity)?).await,
            QuotaStore::Cookie => Ok(Usage::new(
                get_session_value::<bool>(client_session, PRO_SESSION_KEY)?.unwrap_or(false),
                get_session_value::<u32>(client_session, FREE_COUNT_SESSION_KEY)?.unwrap_or(0),
            )),
        }
    }

    /// Persists the counter of `usage`. The pro flag is only ever written by [`QuotaStore::grant_pro`].
    pub async fn save(
        &self,
        identity: &Identity,
        client_session: &Session,
        usage: &Usage,
    ) -> Result<(), ContentScriptError> {
        match self {
            QuotaStore::Metadata(client) => {
                client
                    .update_free_count(require_user(identity)?, usage.free_count)
                    .await
            }
            QuotaStore::Cookie => set_session_value(client_session, FREE_COUNT_SESSION_KEY, usage.free_count),
        }
    }

    /// Metadata grants go to the signed-in user's record; cookie grants to the visitor's session.
    pub async fn grant_pro(&self, identity: &Identity, client_session: &Session) -> Result<(), ContentScriptError> {
        match self {
            QuotaStore::Metadata(client) => client.grant_pro(require_user(identity)?).await,
            QuotaStore::Cookie => set_session_value(client_session, PRO_SESSION_KEY, true),
        }
    }
}

fn require_user(identity: &Identity) -> Result<&str, ContentScriptError> {
    identity
        .user_id()
        .ok_or(ContentScriptError::Unauthorized("You must be signed in to use this feature!"))
}

pub fn get_session_value<T: serde::de::DeserializeOwned>(
    client_session: &Session,
    key: &str,
) -> Result<Option<T>, ContentScriptError> {
    client_session.get::<T>(key).map_err(|e| {
        error!("Could not get {} from session. {}", key, e);

        ContentScriptError::ClientSessionError(format!("Could not get {} from session.", key))
    })
}

pub fn set_session_value<T: serde::Serialize>(client_session: &Session, key: &str, value: T) -> Result<(), ContentScriptError> {
    client_session.insert(key, value).map_err(|e| {
        error!("Could not set {} in session. {}", key, e);

        ContentScriptError::ClientSessionError(format!("Could not set {} in session.", key))
    })
}
