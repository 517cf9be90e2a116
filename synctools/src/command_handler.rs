use marketplace_tools::{ExportJobRunner, MarketplaceApi, MarketplaceConfig};

use crate::{
    command_def::{ExportCommand, InventoryCommand},
    formatting::{format_catalog, format_inventory},
};

pub fn new_marketplace_api() -> MarketplaceApi {
    let config = MarketplaceConfig::new_from_env_or_default();
    match MarketplaceApi::new(config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error creating marketplace API client: {e}");
            std::process::exit(1);
        },
    }
}

pub async fn handle_export_command(command: ExportCommand) {
    match command {
        ExportCommand::Request => request_export().await,
        ExportCommand::Status { job_id } => export_status(job_id).await,
        ExportCommand::Download { report_id } => download_export(report_id).await,
        ExportCommand::Run => run_export().await,
    }
}

pub async fn handle_inventory_command(command: InventoryCommand) {
    match command {
        InventoryCommand::Platform => platform_inventory().await,
    }
}

async fn request_export() {
    let api = new_marketplace_api();
    match api.request_export().await {
        Ok(job) => {
            let json = serde_json::to_string_pretty(&job)
                .unwrap_or_else(|e| format!("Could not represent job as JSON. {e}"));
            println!("Export job requested\n{json}");
        },
        Err(e) => {
            eprintln!("Error requesting export: {e}");
        },
    }
}

async fn export_status(job_id: String) {
    let api = new_marketplace_api();
    match api.export_status(&job_id).await {
        Ok(job) => {
            let json = serde_json::to_string_pretty(&job)
                .unwrap_or_else(|e| format!("Could not represent job as JSON. {e}"));
            println!("Export job {job_id}\n{json}");
        },
        Err(e) => {
            eprintln!("Error fetching status for job {job_id}: {e}");
        },
    }
}

async fn download_export(report_id: String) {
    let runner = ExportJobRunner::new(new_marketplace_api());
    match runner.download_and_parse(&report_id).await {
        Ok(catalog) => println!("{}", format_catalog(&catalog)),
        Err(e) => {
            eprintln!("Error downloading report {report_id}: {e}");
        },
    }
}

async fn run_export() {
    let runner = ExportJobRunner::new(new_marketplace_api());
    println!("Requesting export and polling until it completes. This can take a couple of minutes.");
    match runner.run().await {
        Ok(catalog) => println!("{}", format_catalog(&catalog)),
        Err(e) => {
            eprintln!("Export did not complete: {e}");
        },
    }
}

async fn platform_inventory() {
    let api = new_marketplace_api();
    match api.fetch_platform_stock().await {
        Ok(entries) => println!("{}", format_inventory(&entries)),
        Err(e) => {
            eprintln!("Error fetching platform stock: {e}");
        },
    }
}
