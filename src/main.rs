//! Example binary demonstrating the binarylane_client library.
//!
//! Lists the catalog and the account's servers. When
//! `BINARYLANE_REBOOT_SERVER_ID` is set, reboots that server and waits for the
//! reboot action to finish.
//!
//! ## Usage
//!
//! 1. Create a `.env` file with your configuration
//! 2. Run: `cargo run`

#![allow(clippy::print_stdout)] // Allow println! in the binary example

use binarylane_client::{BinaryLaneClient, BinaryLaneClientConfig, ListOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration from environment
    let cfg = BinaryLaneClientConfig::from_env()?;
    println!("Configuration loaded:");
    println!("  API URL: {}", cfg.api_url);
    println!("  Poll interval: {:?}", cfg.action_poll_interval());
    println!("  Action timeout: {:?}", cfg.action_timeout());

    let timeout = cfg.action_timeout();
    let client = BinaryLaneClient::new(cfg)?;

    println!("\nRegions:");
    for region in client.regions().list(ListOptions::all()).await? {
        println!("  {:<6} {} (available: {})", region.slug, region.name, region.available);
    }

    println!("\nSizes:");
    for size in client.sizes().list(ListOptions::all()).await? {
        println!(
            "  {:<12} {} vCPU, {} MB, {} GB, ${}/mo",
            size.slug, size.vcpus, size.memory, size.disk, size.price_monthly
        );
    }

    println!("\nServers:");
    let servers = client.servers().list(ListOptions::all()).await?;
    for server in &servers {
        println!(
            "  {} {} [{}] {}",
            server.id,
            server.name,
            server.status,
            server.public_ipv4().unwrap_or("-")
        );
    }
    println!("  ({} total)", servers.len());

    if let Ok(raw) = std::env::var("BINARYLANE_REBOOT_SERVER_ID") {
        let server_id: u64 = raw.parse()?;

        println!("\nRebooting server {server_id}...");
        let action = client.server_actions().reboot(server_id).await?;
        println!("  Action {} is {}", action.id, action.status);

        client
            .wait_for_action_with_timeout(&action.reference(), timeout)
            .await?;
        println!("  Reboot completed");
    }

    Ok(())
}
