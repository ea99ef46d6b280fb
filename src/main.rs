mod codegen;
mod error;
mod model;
mod pages;
mod routes;
mod store;

use actix_cors::Cors;
use actix_files as fs;
use actix_web::{web, App, HttpServer};
use store::MessageStore;
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let store_path =
        std::env::var("RELAY_STORE_PATH").unwrap_or_else(|_| String::from("messages.json"));
    let host = std::env::var("RELAY_HOST").unwrap_or_else(|_| String::from("127.0.0.1"));
    let port: u16 = std::env::var("RELAY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let store = MessageStore::open(&store_path).await;
    info!(%host, port, store = %store_path, "starting whisperbox");

    HttpServer::new(move || {
        let cors = Cors::permissive(); // For development only

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(store.clone()))
            .service(routes::relay::home)
            .service(routes::relay::new_code)
            .service(routes::relay::show_submit_page)
            .service(routes::relay::login)
            .service(routes::relay::submit_message)
            .service(routes::relay::view_messages)
            .service(fs::Files::new("/static", "static"))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
