use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use log::*;
use marketplace_tools::MarketplaceApi;
use stock_sync_engine::SyncOrchestrator;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{ErpInventory, MarketplaceCatalog, MarketplaceUpdates},
    routes::{cancel_sync, health, sync_status, trigger_sync},
    sync_worker::start_sync_worker,
};

/// The orchestrator as wired for production: marketplace client on both marketplace seams, JSON-RPC ERP on the
/// inventory seam.
pub type GatewayOrchestrator = SyncOrchestrator<MarketplaceCatalog, MarketplaceUpdates, ErpInventory>;

pub fn build_orchestrator(config: &ServerConfig) -> Result<GatewayOrchestrator, ServerError> {
    let api = MarketplaceApi::new(config.marketplace.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let catalog = MarketplaceCatalog::new(api.clone());
    let updates = MarketplaceUpdates::new(api);
    let inventory = ErpInventory::new(config.erp.clone())?;
    Ok(SyncOrchestrator::new(catalog, updates, inventory, config.policy.clone()))
}

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let orchestrator = web::Data::new(build_orchestrator(&config)?);
    if config.sync_interval.is_zero() {
        info!("🕰️ Automatic sync worker is disabled");
    } else {
        start_sync_worker(orchestrator.clone().into_inner(), config.sync_interval, config.sync_on_startup);
    }
    let srv = create_server_instance(&config, orchestrator)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: &ServerConfig,
    orchestrator: web::Data<GatewayOrchestrator>,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ssg::access_log"))
            .app_data(orchestrator.clone())
            .service(health)
            .service(web::scope("/api").service(trigger_sync).service(sync_status).service(cancel_sync))
    })
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
