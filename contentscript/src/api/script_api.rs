use std::time::Duration;

use actix_session::Session;
use actix_web::{post, web, HttpResponse};

use crate::api::types::Response;
use crate::app::App;
use crate::models::identity::Identity;
use crate::models::script::{Script, ScriptRequest};

/// Checks run in order: identity (401), quota (402), body (400).
#[post("/generate-script")]
pub async fn generate_script(
    app: web::Data<App>,
    identity: Identity,
    client_session: Session,
    body: web::Bytes,
) -> Response {
    let mut usage = app.quota_store.load(&identity, &client_session).await?;

    usage.check()?;

    let request = ScriptRequest::from_body(&body)?.validate()?;
    let script = Script::generate(&request.topic, request.tone);

    if app.config.generation_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(app.config.generation_delay_ms)).await;
    }

    if usage.record_generation() {
        app.quota_store.save(&identity, &client_session, &usage).await?;
    }

    log::info!(
        "Generated {} {} script for {:?} ({} free scripts used)",
        request.tone,
        request.length,
        identity,
        usage.free_count
    );

    Ok(HttpResponse::Ok().json(script))
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::test;
    use serde_json::{json, Value};

    use crate::api::tests::{cookie_config, session_cookie, test_app};
    use crate::app::{Config, QuotaStrategy};
    use crate::constants::FREE_LIMIT;
    use crate::models::script::Script;
    use crate::resources::identity_client::tests::{metadata_config, session_token, ProviderStub};

    fn script_request(body: Value) -> test::TestRequest {
        test::TestRequest::post().uri("/api/generate-script").set_json(body)
    }

    fn signed_in_request(user_id: &str) -> test::TestRequest {
        let token = session_token(user_id, chrono::Duration::hours(1));

        script_request(json!({ "topic": "rust", "tone": "Casual", "length": "45s" }))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
    }

    #[actix_web::test]
    async fn fourth_free_request_requires_payment() {
        let service = test::init_service(test_app(cookie_config())).await;
        let mut cookie = None;

        for _ in 0..FREE_LIMIT {
            let mut req = script_request(json!({ "topic": "rust", "tone": "Comedic", "length": "30s" }));
            if let Some(c) = cookie.clone() {
                req = req.cookie(c);
            }

            let resp = test::call_service(&service, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK);

            cookie = session_cookie(&resp).or(cookie);

            let script: Script = test::read_body_json(resp).await;
            assert_eq!(script.hook, "I tried rust so you don't have to. Here's what happened...");
        }

        let req = script_request(json!({ "topic": "rust", "tone": "Casual", "length": "30s" }))
            .cookie(cookie.expect("session cookie should be set"));
        let resp = test::call_service(&service, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Free limit reached");
    }

    #[actix_web::test]
    async fn invalid_requests_do_not_consume_quota() {
        let service = test::init_service(test_app(cookie_config())).await;

        let resp = test::call_service(&service, script_request(json!({ "tone": "Casual" })).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(session_cookie(&resp).is_none());

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(body["fields"], json!(["topic", "length"]));

        let resp = test::call_service(
            &service,
            script_request(json!({ "topic": "rust", "tone": "Sarcastic", "length": "30s" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/generate-script")
                .insert_header((header::CONTENT_TYPE, "application/json"))
                .set_payload("{not json")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn metadata_strategy_requires_session_token() {
        let service = test::init_service(test_app(Config::test(QuotaStrategy::Metadata))).await;
        let body = json!({ "topic": "rust", "tone": "Informative", "length": "60s" });

        let resp = test::call_service(&service, script_request(body.clone()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let expired = session_token("user_1", chrono::Duration::hours(-2));
        let resp = test::call_service(
            &service,
            script_request(body)
                .insert_header((header::AUTHORIZATION, format!("Bearer {}", expired)))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn metadata_quota_counts_free_users_only() {
        let stub = ProviderStub::default()
            .with_user("user_free", json!({}), json!({}))
            .with_user("user_pro", json!({ "pro": true }), json!({ "freeCount": 3 }));
        let service = test::init_service(test_app(metadata_config(stub.start()))).await;

        let mut statuses = vec![];
        for _ in 0..=FREE_LIMIT {
            let resp = test::call_service(&service, signed_in_request("user_free").to_request()).await;
            statuses.push(resp.status());
        }
        assert_eq!(
            statuses,
            vec![StatusCode::OK, StatusCode::OK, StatusCode::OK, StatusCode::PAYMENT_REQUIRED]
        );
        assert_eq!(
            stub.patches(),
            (1..=FREE_LIMIT)
                .map(|count| ("user_free".to_string(), json!({ "private_metadata": { "freeCount": count } })))
                .collect::<Vec<_>>()
        );

        for _ in 0..=FREE_LIMIT {
            let resp = test::call_service(&service, signed_in_request("user_pro").to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
        assert!(stub.patches().iter().all(|(user_id, _)| user_id != "user_pro"));
    }

    #[actix_web::test]
    async fn fractional_metadata_count_allows_one_more_script() {
        let stub = ProviderStub::default().with_user("user_1", json!({}), json!({ "freeCount": 2.5 }));
        let service = test::init_service(test_app(metadata_config(stub.start()))).await;

        let resp = test::call_service(&service, signed_in_request("user_1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            stub.patches(),
            vec![("user_1".to_string(), json!({ "private_metadata": { "freeCount": 3 } }))]
        );

        let resp = test::call_service(&service, signed_in_request("user_1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
    }
}
