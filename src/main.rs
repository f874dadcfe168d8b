mod api;
mod blockchain;
mod config;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use api::AppState;
use blockchain::ChainStore;
use config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();
    info!(
        "⛓️ Starting blockchain API at http://{}:{} (difficulty={})",
        config.host, config.port, config.difficulty
    );

    let chain = ChainStore::new(config.difficulty);
    let state = web::Data::new(AppState::new(chain, &config));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
