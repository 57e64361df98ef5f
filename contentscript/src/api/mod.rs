pub mod checkout_api;
pub mod page_api;
pub mod request;
pub mod script_api;
pub mod types;
pub mod usage_api;

use actix_web::web;

pub use checkout_api::*;
pub use page_api::*;
pub use script_api::*;
pub use usage_api::*;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(generate_script)
            .service(get_usage)
            .service(create_checkout_session)
            .service(checkout_success)
            .service(stripe_webhook),
    )
    .service(home_page)
    .service(generate_page)
    .service(dashboard_page);
}
