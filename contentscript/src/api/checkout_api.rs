use actix_session::Session;
use actix_web::{get, http, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::request::identity::OptIdentity;
use crate::api::types::Response;
use crate::app::{App, QuotaStrategy};
use crate::constants::PENDING_CHECKOUT_SESSION_KEY;
use crate::errors::ContentScriptError;
use crate::models::checkout::Checkout;
use crate::models::identity::Identity;
use crate::resources::quota_store::{get_session_value, set_session_value};

fn request_origin<'a>(req: &'a HttpRequest, app: &'a App) -> &'a str {
    req.headers()
        .get(http::header::ORIGIN)
        .and_then(|origin| origin.to_str().ok())
        .filter(|origin| !origin.is_empty() && *origin != "null")
        .unwrap_or(&app.config.client_url)
}

#[post("/create-checkout-session")]
pub async fn create_checkout_session(
    req: HttpRequest,
    app: web::Data<App>,
    identity: OptIdentity,
    client_session: Session,
) -> Response {
    let stripe_cfg = app.stripe_cfg()?;
    let checkout = Checkout {
        origin: request_origin(&req, &app),
        strategy: app.quota_store.strategy(),
        identity: identity.0.as_ref(),
    };

    let redirect = checkout.build_stripe_url(stripe_cfg).await.map_err(|e| {
        log::error!("Stripe checkout error: {}", e);

        ContentScriptError::InternalServerError("Failed to create checkout session".to_string())
    })?;

    // only the session that started a checkout may confirm it
    if checkout.strategy == QuotaStrategy::Cookie {
        set_session_value(&client_session, PENDING_CHECKOUT_SESSION_KEY, &redirect.session_id)?;
    }

    Ok(HttpResponse::Ok().json(json!({ "url": redirect.url })))
}

#[derive(Deserialize)]
pub struct CheckoutSuccessQuery {
    pub session_id: String,
}

/// Stripe redirects here after a cookie-strategy checkout; marks the visitor's session as pro.
#[get("/checkout-success")]
pub async fn checkout_success(
    app: web::Data<App>,
    client_session: Session,
    query: web::Query<CheckoutSuccessQuery>,
) -> Response {
    if app.quota_store.strategy() != QuotaStrategy::Cookie {
        return Err(ContentScriptError::BadRequest(
            "Checkout confirmation is handled by the webhook".to_string(),
        ));
    }

    let pending = get_session_value::<String>(&client_session, PENDING_CHECKOUT_SESSION_KEY)?;
    if pending.as_deref() != Some(query.session_id.as_str()) {
        log::warn!("Checkout session {} was not started by this visitor", query.session_id);

        return Err(ContentScriptError::BadRequest(
            "Checkout session was not started by this visitor".to_string(),
        ));
    }

    let stripe_cfg = app.stripe_cfg()?;
    let location = if Checkout::is_paid(stripe_cfg, &query.session_id).await? {
        app.quota_store.grant_pro(&Identity::Visitor, &client_session).await?;
        client_session.remove(PENDING_CHECKOUT_SESSION_KEY);
        log::info!("Checkout session {} paid, visitor upgraded", query.session_id);

        "/generate?paid=1"
    } else {
        log::warn!("Checkout session {} is not paid", query.session_id);

        "/generate?canceled=1"
    };

    Ok(HttpResponse::SeeOther()
        .insert_header((http::header::LOCATION, location))
        .finish())
}

#[post("/stripe-webhook")]
pub async fn stripe_webhook(
    req: HttpRequest,
    payload: web::Bytes,
    app: web::Data<App>,
    client_session: Session,
) -> Response {
    let payload_str = std::str::from_utf8(&payload).map_err(|e| {
        log::error!("Failed to convert payload to string: {:?}", e);
        ContentScriptError::BadRequest("Invalid UTF-8 payload".to_string())
    })?;

    let stripe_signature = req
        .headers()
        .get("Stripe-Signature")
        .ok_or_else(|| ContentScriptError::BadRequest("Stripe-Signature header not found".to_string()))?
        .to_str()
        .map_err(|_| ContentScriptError::BadRequest("Failed to parse Stripe-Signature header".to_string()))?;

    let secret = app.stripe_cfg()?.webhook_secret_key.as_ref().ok_or_else(|| {
        ContentScriptError::InternalServerError("Stripe webhook secret key not found".to_string())
    })?;

    let event = stripe::Webhook::construct_event(payload_str, stripe_signature, secret).map_err(|e| {
        log::error!("Failed to construct event: {}", e);
        ContentScriptError::BadRequest("Failed to construct event".to_string())
    })?;

    match event.type_ {
        stripe::EventType::CheckoutSessionCompleted => {
            if let stripe::EventObject::CheckoutSession(session) = event.data.object {
                match (app.quota_store.strategy(), session.client_reference_id) {
                    (QuotaStrategy::Metadata, Some(user_id)) => {
                        app.quota_store
                            .grant_pro(&Identity::User(user_id), &client_session)
                            .await?
                    }
                    (QuotaStrategy::Metadata, None) => {
                        log::warn!("Checkout session {} has no client_reference_id", session.id)
                    }
                    (QuotaStrategy::Cookie, _) => {
                        log::debug!("Ignoring checkout session {} under cookie quota", session.id)
                    }
                }
            } else {
                log::error!(
                    "Failed to parse CheckoutSessionCompleted event object {:?}",
                    event.data.object
                );
            }
        }
        _ => {
            log::warn!("Unhandled event type: {:?}", event.type_);
        }
    }

    Ok(HttpResponse::Ok().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::test;
    use serde_json::Value;

    use crate::api::tests::{cookie_config, session_cookie, test_app};
    use crate::app::{Config, QuotaStrategy, StripeCfg};
    use crate::models::checkout::tests::{StripeStub, STUB_CHECKOUT_SESSION_ID, STUB_CHECKOUT_URL};
    use crate::resources::identity_client::tests::session_token;

    fn stripe_config(strategy: QuotaStrategy, stub: &StripeStub) -> Config {
        let mut config = Config::test(strategy);
        config.stripe = Some(StripeCfg::test(stub.start()));

        config
    }

    fn success_uri(session_id: &str) -> String {
        format!("/api/checkout-success?session_id={}", session_id)
    }

    #[actix_web::test]
    async fn checkout_without_stripe_config_fails() {
        let service = test::init_service(test_app(cookie_config())).await;

        let resp = test::call_service(
            &service,
            test::TestRequest::post().uri("/api/create-checkout-session").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Internal Server Error");
    }

    #[actix_web::test]
    async fn checkout_returns_hosted_page_url() {
        let stub = StripeStub::new(stripe::CheckoutSessionPaymentStatus::Paid);
        let service = test::init_service(test_app(stripe_config(QuotaStrategy::Metadata, &stub))).await;
        let token = session_token("user_1", chrono::Duration::hours(1));

        let resp = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/create-checkout-session")
                .insert_header((header::ORIGIN, "https://contentscript.example"))
                .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["url"], STUB_CHECKOUT_URL);

        let forms = stub.forms();
        assert_eq!(forms.len(), 1);
        assert!(forms[0].contains("client_reference_id=user_1"));
        assert!(forms[0].contains("contentscript.example"));
    }

    #[actix_web::test]
    async fn checkout_success_upgrades_only_the_paying_visitor() {
        let stub = StripeStub::new(stripe::CheckoutSessionPaymentStatus::Paid);
        let service = test::init_service(test_app(stripe_config(QuotaStrategy::Cookie, &stub))).await;

        let resp = test::call_service(
            &service,
            test::TestRequest::post().uri("/api/create-checkout-session").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let buyer = session_cookie(&resp).expect("checkout should be remembered in the session");

        // another visitor replaying the paid session id
        let resp = test::call_service(
            &service,
            test::TestRequest::get().uri(&success_uri(STUB_CHECKOUT_SESSION_ID)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(session_cookie(&resp).is_none());

        let resp = test::call_service(
            &service,
            test::TestRequest::get()
                .uri(&success_uri(STUB_CHECKOUT_SESSION_ID))
                .cookie(buyer)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).and_then(|l| l.to_str().ok()),
            Some("/generate?paid=1")
        );
        let upgraded = session_cookie(&resp).expect("pro should be stored in the session");

        let resp = test::call_service(
            &service,
            test::TestRequest::get().uri("/api/usage").cookie(upgraded.clone()).to_request(),
        )
        .await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["pro"], true);
        assert_eq!(body["remaining"], Value::Null);

        // the checkout is consumed once confirmed
        let resp = test::call_service(
            &service,
            test::TestRequest::get()
                .uri(&success_uri(STUB_CHECKOUT_SESSION_ID))
                .cookie(upgraded)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unpaid_checkout_redirects_as_canceled() {
        let stub = StripeStub::new(stripe::CheckoutSessionPaymentStatus::Unpaid);
        let service = test::init_service(test_app(stripe_config(QuotaStrategy::Cookie, &stub))).await;

        let resp = test::call_service(
            &service,
            test::TestRequest::post().uri("/api/create-checkout-session").to_request(),
        )
        .await;
        let buyer = session_cookie(&resp).expect("checkout should be remembered in the session");

        let resp = test::call_service(
            &service,
            test::TestRequest::get()
                .uri(&success_uri(STUB_CHECKOUT_SESSION_ID))
                .cookie(buyer)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).and_then(|l| l.to_str().ok()),
            Some("/generate?canceled=1")
        );
    }

    #[actix_web::test]
    async fn webhook_requires_signature() {
        let mut config = cookie_config();
        config.stripe = Some(StripeCfg::test("http://127.0.0.1:9/".to_string()));
        let service = test::init_service(test_app(config)).await;

        let resp = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/stripe-webhook")
                .set_payload("{}")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/stripe-webhook")
                .insert_header(("Stripe-Signature", "t=1,v1=deadbeef"))
                .set_payload("{}")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn checkout_success_requires_session_id() {
        let service = test::init_service(test_app(cookie_config())).await;

        let resp = test::call_service(
            &service,
            test::TestRequest::get().uri("/api/checkout-success").to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
