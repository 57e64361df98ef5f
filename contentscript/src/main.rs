mod api;
mod app;
mod constants;
mod errors;
mod models;
mod resources;
mod utils;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use crate::app::App as ContentScriptApp;
use crate::utils::logger::log_fatal;

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app = ContentScriptApp::new().await.unwrap_or_else(|e| {
        log_fatal(format!("Could not initialize app. {}", e));
        std::process::exit(1);
    });
    let port = app.config.port;
    let app_data = web::Data::new(app);

    log::info!("Starting server on port {}", port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%a %r %s %b %{Referer}i %{User-Agent}i %T"))
            .wrap(app_data.cors())
            .wrap(app_data.session_middleware())
            .app_data(app_data.clone())
            .configure(api::config)
    })
    .bind(("0.0.0.0", port))
    .unwrap_or_else(|e| panic!("Could not bind to port {}.\n{}", port, e))
    .run()
    .await
    .unwrap_or_else(|e| panic!("Could not run server to port {}.\n{}", port, e));
}
