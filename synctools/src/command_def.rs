use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Operator tooling for the stock sync gateway")]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(subcommand)]
    /// Drive the bulk offer export pipeline step by step, or end to end
    Export(ExportCommand),
    #[command(subcommand)]
    /// Inspect the platform warehouse stock
    Inventory(InventoryCommand),
    #[command(subcommand)]
    /// Run or inspect catalog sync runs
    Sync(SyncCommand),
}

#[derive(Debug, Subcommand)]
pub enum ExportCommand {
    /// Request a new export job and print its id
    Request,
    /// Fetch the status of an export job
    Status {
        #[arg(required = true, index = 1)]
        job_id: String,
    },
    /// Download a completed export report and print the parsed offers
    Download {
        #[arg(required = true, index = 1)]
        report_id: String,
    },
    /// Request, poll and download an export in one go, then print the parsed offers
    Run,
}

#[derive(Debug, Subcommand)]
pub enum InventoryCommand {
    /// Fetch the complete platform warehouse stock listing
    Platform,
}

#[derive(Debug, Subcommand)]
pub enum SyncCommand {
    /// Run the full pipeline up to, but not including, dispatch and print the decisions
    DryRun,
    /// Run a complete sync in-process and print the run report
    Run,
    /// Trigger a sync run on a running gateway server
    Trigger {
        /// Base URL of the gateway, e.g. http://localhost:8460
        #[arg(required = true, index = 1)]
        server_url: String,
    },
    /// Show the last run of a running gateway server
    Status {
        /// Base URL of the gateway, e.g. http://localhost:8460
        #[arg(required = true, index = 1)]
        server_url: String,
    },
}
