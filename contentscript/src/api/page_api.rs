use actix_session::Session;
use actix_web::http::header::ContentType;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::api::request::identity::OptIdentity;
use crate::api::types::Response;
use crate::app::App;
use crate::models::usage::UsageSummary;
use crate::resources::pages::CheckoutBanner;

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

#[get("/")]
pub async fn home_page(app: web::Data<App>) -> Response {
    Ok(html(app.pages.render_home()?))
}

#[derive(Deserialize)]
pub struct GenerateQuery {
    pub paid: Option<String>,
    pub canceled: Option<String>,
}

impl GenerateQuery {
    fn banner(&self) -> Option<CheckoutBanner> {
        if self.paid.as_deref() == Some("1") {
            Some(CheckoutBanner::Paid)
        } else if self.canceled.as_deref() == Some("1") {
            Some(CheckoutBanner::Canceled)
        } else {
            None
        }
    }
}

#[get("/generate")]
pub async fn generate_page(app: web::Data<App>, query: web::Query<GenerateQuery>) -> Response {
    Ok(html(app.pages.render_generate(query.banner())?))
}

#[get("/dashboard")]
pub async fn dashboard_page(app: web::Data<App>, identity: OptIdentity, client_session: Session) -> Response {
    let usage = match identity.0 {
        Some(identity) => Some(UsageSummary::from(
            app.quota_store.load(&identity, &client_session).await?,
        )),
        None => None,
    };

    Ok(html(app.pages.render_dashboard(usage)?))
}
