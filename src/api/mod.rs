mod chain;
mod error;
mod health;
mod mining;
pub mod models;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(health::health_check)
        .service(chain::get_blockchain)
        .service(chain::validate_chain)
        .service(chain::get_difficulty)
        .service(
            web::resource("/mine")
                .route(web::post().to(mining::mine_block))
                .default_service(web::to(mining::method_not_allowed)),
        );
}
