use std::pin::pin;

use actix_web::rt::time::timeout;
use actix_web::{HttpResponse, web};
use log::{debug, info, warn};

use super::error::ApiError;
use super::models::{AppState, MineRequest};
use crate::blockchain::CancelToken;

/// Mine a block carrying the posted `data` and append it to the chain.
///
/// The nonce search runs on the blocking pool, outside the chain lock. When a
/// deadline is configured and expires, the search is cancelled and the task
/// is awaited once more: a block that made it in just before the cancel is
/// returned as usual, otherwise the caller gets a 503 and no block is added.
pub async fn mine_block(
    state: web::Data<AppState>,
    payload: web::Payload,
) -> Result<HttpResponse, ApiError> {
    let body = payload
        .to_bytes()
        .await
        .map_err(|e| ApiError::ReadBody(e.to_string()))?;
    let data = MineRequest::from_body(&body)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
        .into_data();
    debug!("POST /mine - received {} bytes of data", data.len());

    let token = CancelToken::new();
    let miner = state.miner().with_cancel(token.clone());
    let task_state = state.clone();
    let mut task = pin!(web::block(move || {
        task_state.chain.mine_and_append(&miner, &data)
    }));

    let joined = match state.mine_timeout {
        Some(limit) => match timeout(limit, task.as_mut()).await {
            Ok(joined) => joined,
            Err(_) => {
                token.cancel();
                match task.await {
                    Ok(Ok(block)) => Ok(Ok(block)),
                    _ => {
                        warn!("POST /mine - gave up after {:?}", limit);
                        return Err(ApiError::Timeout(limit));
                    }
                }
            }
        },
        None => task.await,
    };

    let block = joined.map_err(|e| ApiError::Internal(e.to_string()))??;
    info!("POST /mine - block #{} accepted (hash={})", block.index, block.hash);
    Ok(HttpResponse::Ok().json(block))
}

/// Fallback for `/mine` with any method other than POST.
pub async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed)
}
