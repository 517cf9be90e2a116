use clap::Parser;
use dotenvy::dotenv;

mod command_def;
mod command_handler;
mod formatting;
mod sync;

use command_def::{Arguments, Command};
use command_handler::{handle_export_command, handle_inventory_command};
use sync::handle_sync_command;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let args = Arguments::parse();
    match args.command {
        Command::Export(cmd) => handle_export_command(cmd).await,
        Command::Inventory(cmd) => handle_inventory_command(cmd).await,
        Command::Sync(cmd) => handle_sync_command(cmd).await,
    }
}
