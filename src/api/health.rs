use actix_web::{HttpResponse, Responder, get};

/// Liveness probe; does not touch the chain.
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("ok")
}
