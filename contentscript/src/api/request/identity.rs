use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{http, web, FromRequest, HttpRequest};

use crate::app::App;
use crate::constants::SESSION_TOKEN_COOKIE;
use crate::errors::ContentScriptError;
use crate::models::identity::Identity;
use crate::resources::quota_store::QuotaStore;

/// Session token of the auth provider, from the bearer header or its session cookie.
fn session_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| req.cookie(SESSION_TOKEN_COOKIE).map(|c| c.value().to_string()))
}

pub fn resolve_identity(req: &HttpRequest) -> Result<Identity, ContentScriptError> {
    let app = req
        .app_data::<web::Data<App>>()
        .ok_or_else(|| ContentScriptError::InternalServerError("Could not get app data".to_string()))?;

    match app.quota_store.as_ref() {
        QuotaStore::Cookie => Ok(Identity::Visitor),
        QuotaStore::Metadata(client) => {
            let token = session_token(req).ok_or(ContentScriptError::Unauthorized(
                "You must be signed in to perform this action!",
            ))?;

            client.verify_session_token(&token).map(Identity::User)
        }
    }
}

impl FromRequest for Identity {
    type Error = ContentScriptError;
    type Future = Ready<Result<Identity, ContentScriptError>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve_identity(req))
    }
}

pub struct OptIdentity(pub Option<Identity>);

impl FromRequest for OptIdentity {
    type Error = ContentScriptError;
    type Future = Ready<Result<Self, ContentScriptError>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match resolve_identity(req) {
            Ok(identity) => ready(Ok(OptIdentity(Some(identity)))),
            Err(ContentScriptError::Unauthorized(_)) | Err(ContentScriptError::TokenError(_)) => {
                ready(Ok(OptIdentity(None)))
            }
            Err(e) => ready(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Config, QuotaStrategy};
    use crate::resources::identity_client::tests::session_token as signed_token;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    fn request(strategy: QuotaStrategy) -> TestRequest {
        let app = App::from_config(Config::test(strategy)).expect("test app should build");

        TestRequest::default().app_data(web::Data::new(app))
    }

    #[test]
    fn visitors_under_cookie_strategy() {
        let req = request(QuotaStrategy::Cookie).to_http_request();

        assert_eq!(resolve_identity(&req).ok(), Some(Identity::Visitor));
    }

    #[test]
    fn reads_bearer_token() {
        let token = signed_token("user_bearer", chrono::Duration::hours(1));
        let req = request(QuotaStrategy::Metadata)
            .insert_header((http::header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request();

        assert_eq!(
            resolve_identity(&req).ok(),
            Some(Identity::User("user_bearer".to_string()))
        );
    }

    #[test]
    fn reads_session_cookie() {
        let token = signed_token("user_cookie", chrono::Duration::hours(1));
        let req = request(QuotaStrategy::Metadata)
            .cookie(Cookie::new(SESSION_TOKEN_COOKIE, token))
            .to_http_request();

        assert_eq!(
            resolve_identity(&req).ok(),
            Some(Identity::User("user_cookie".to_string()))
        );
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let req = request(QuotaStrategy::Metadata).to_http_request();

        assert!(matches!(
            resolve_identity(&req),
            Err(ContentScriptError::Unauthorized(_))
        ));
    }
}
