use stock_sync_engine::{reconcile, traits::{CatalogSource, LocalInventory}};
use stock_sync_server::{
    config::ServerConfig,
    integrations::{ErpInventory, MarketplaceCatalog},
    server::build_orchestrator,
};

use crate::{command_def::SyncCommand, command_handler::new_marketplace_api, formatting::{format_decisions, format_run_result}};

pub async fn handle_sync_command(command: SyncCommand) {
    match command {
        SyncCommand::DryRun => dry_run().await,
        SyncCommand::Run => run_in_process().await,
        SyncCommand::Trigger { server_url } => trigger_remote(server_url).await,
        SyncCommand::Status { server_url } => remote_status(server_url).await,
    }
}

/// Runs the read-and-decide half of the pipeline and prints what a real run would do. No update is dispatched.
async fn dry_run() {
    let config = ServerConfig::from_env_or_default();
    let catalog = MarketplaceCatalog::new(new_marketplace_api());
    let inventory = match ErpInventory::new(config.erp.clone()) {
        Ok(inventory) => inventory,
        Err(e) => {
            eprintln!("Error creating ERP client: {e}");
            std::process::exit(1);
        },
    };
    println!("Fetching platform stock and requesting an offer export. This can take a couple of minutes.");
    let result = async {
        let platform_stock = catalog.platform_stock().await.map_err(|e| e.to_string())?;
        let snapshot = catalog.current_catalog().await.map_err(|e| e.to_string())?;
        let eans: Vec<_> = {
            let mut eans: Vec<_> = snapshot.offers.iter().map(|o| o.ean.clone()).collect();
            eans.sort();
            eans.dedup();
            eans
        };
        let local_stock = inventory.free_stock(&eans).await.map_err(|e| e.to_string())?;
        let safety = inventory.safety_stock_overrides(&eans).await.map_err(|e| e.to_string())?;
        Ok::<_, String>(reconcile(&snapshot.offers, &platform_stock, &local_stock, &safety, &config.policy))
    }
    .await;
    match result {
        Ok(decisions) => println!("{}", format_decisions(&decisions)),
        Err(e) => eprintln!("Dry run failed: {e}"),
    }
}

async fn run_in_process() {
    let config = ServerConfig::from_env_or_default();
    let orchestrator = match build_orchestrator(&config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            eprintln!("Error wiring the sync pipeline: {e}");
            std::process::exit(1);
        },
    };
    println!("Starting a full sync run. This can take a couple of minutes.");
    let result = orchestrator.run().await;
    println!("{}", format_run_result(&result));
}

async fn trigger_remote(server_url: String) {
    let url = format!("{}/api/sync/run", server_url.trim_end_matches('/'));
    match reqwest::Client::new().post(&url).send().await {
        Ok(response) => {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            println!("{status}: {body}");
        },
        Err(e) => eprintln!("Error triggering sync on {server_url}: {e}"),
    }
}

async fn remote_status(server_url: String) {
    let url = format!("{}/api/sync/status", server_url.trim_end_matches('/'));
    match reqwest::Client::new().get(&url).send().await {
        Ok(response) => {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let pretty = serde_json::from_str::<serde_json::Value>(&body)
                .and_then(|v| serde_json::to_string_pretty(&v))
                .unwrap_or(body);
            println!("{status}\n{pretty}");
        },
        Err(e) => eprintln!("Error fetching sync status from {server_url}: {e}"),
    }
}
