use actix_web::{get, post, web, HttpResponse, Responder};
use log::*;
use serde_json::json;

use crate::{errors::ServerError, server::GatewayOrchestrator};

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Triggers a sync run. The run proceeds in the background; poll the status route for its outcome. While a run is
/// in flight, further triggers are acknowledged as no-ops rather than queued.
#[post("/sync/run")]
pub async fn trigger_sync(orchestrator: web::Data<GatewayOrchestrator>) -> impl Responder {
    if orchestrator.is_running() {
        debug!("💻️ Sync trigger ignored: a run is already in flight");
        return HttpResponse::Ok().json(json!({"status": "already_running"}));
    }
    let orchestrator = orchestrator.into_inner();
    tokio::spawn(async move {
        orchestrator.run().await;
    });
    HttpResponse::Accepted().json(json!({"status": "started"}))
}

/// The most recent run's counts and error sample. 404 until the first run has finished.
#[get("/sync/status")]
pub async fn sync_status(orchestrator: web::Data<GatewayOrchestrator>) -> Result<HttpResponse, ServerError> {
    match orchestrator.last_result() {
        Some(result) => {
            Ok(HttpResponse::Ok().json(json!({"running": orchestrator.is_running(), "last_run": result})))
        },
        None => Err(ServerError::NoRunYet),
    }
}

/// Aborts the in-flight run at the next item boundary. Decisions already applied stay applied.
#[post("/sync/cancel")]
pub async fn cancel_sync(orchestrator: web::Data<GatewayOrchestrator>) -> impl Responder {
    if !orchestrator.is_running() {
        return HttpResponse::Ok().json(json!({"status": "idle"}));
    }
    info!("💻️ Cancelling the in-flight sync run");
    orchestrator.cancel_handle().cancel();
    HttpResponse::Accepted().json(json!({"status": "cancelling"}))
}
