use actix_web::{HttpResponse, Responder, get, web};
use log::debug;

use super::models::{AppState, DifficultyResponse, ValidateResponse};

/// Get the full blockchain, genesis first.
#[get("/blockchain")]
pub async fn get_blockchain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.chain.snapshot();
    debug!("GET /blockchain - {} blocks", chain.len());
    HttpResponse::Ok().json(chain)
}

/// Validate the whole chain.
#[get("/validate")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ValidateResponse {
        valid: state.chain.is_valid_chain(),
        length: state.chain.len(),
        difficulty: state.chain.difficulty(),
    })
}

/// Get the (fixed) PoW difficulty.
#[get("/difficulty")]
pub async fn get_difficulty(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: state.chain.difficulty(),
    })
}
