use actix_session::Session;
use actix_web::{get, web, HttpResponse};

use crate::api::types::Response;
use crate::app::App;
use crate::models::identity::Identity;
use crate::models::usage::UsageSummary;

#[get("/usage")]
pub async fn get_usage(app: web::Data<App>, identity: Identity, client_session: Session) -> Response {
    let usage = app.quota_store.load(&identity, &client_session).await?;

    Ok(HttpResponse::Ok().json(UsageSummary::from(usage)))
}
