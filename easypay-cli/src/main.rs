//! # easypay
//!
//! Command-line front end for the `easypay` crate.
//!
//! ## Usage
//!
//! ```bash
//! # Print a signed redirect URL
//! easypay -c pay.toml pay --type alipay --out-trade-no 20240101001 --name Test --money 1.00
//!
//! # Merchant API calls print the gateway's JSON
//! easypay -c pay.toml query
//! easypay -c pay.toml order --out-trade-no 20240101001
//! easypay -c pay.toml refund --trade-no T123 --money 5.00
//!
//! # Check a notification
//! easypay -c pay.toml verify 'pid=1000&trade_no=...&sign=...&sign_type=MD5'
//! ```

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

mod cli;
mod observability;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use easypay::{EasyPay, GatewayConfig, Params};
use serde_json::Value;
use tracing::info;

use crate::{
    cli::{Cli, Commands},
    observability::{LogFormat, init_observability, verbosity_to_level},
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_observability(LogFormat::from_env(), verbosity_to_level(cli.verbose));

    let config = match &cli.config {
        Some(path) => GatewayConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => GatewayConfig::from_env().context("failed to load config from environment")?,
    };
    let client = EasyPay::new(config).context("failed to create client")?;
    info!(base_url = client.base_url(), "client ready");

    run(&client, cli.command).await
}

async fn run(client: &EasyPay, command: Commands) -> Result<ExitCode> {
    let response = match command {
        Commands::Pay(payment) => {
            println!("{}", client.pay(&payment.to_args())?);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Verify { query } => {
            let params: Params =
                url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
                    .into_owned()
                    .collect();
            return Ok(if client.verify_notify(&params) {
                println!("valid");
                ExitCode::SUCCESS
            } else {
                println!("invalid");
                ExitCode::FAILURE
            });
        }
        Commands::Mapi { payment, clientip, device } => {
            client.mapi(&cli::api_args(&payment, clientip.as_deref(), device)).await?
        }
        Commands::Query => client.query().await?,
        Commands::Settle => client.settle().await?,
        Commands::Order(ids) => {
            client.order(ids.out_trade_no.as_deref(), ids.trade_no.as_deref()).await?
        }
        Commands::Orders => client.orders().await?,
        Commands::Refund { ids, money } => {
            client.refund(ids.trade_no.as_deref(), ids.out_trade_no.as_deref(), money).await?
        }
    };

    print_response(&response)?;
    Ok(ExitCode::SUCCESS)
}

fn print_response(response: &Value) -> Result<()> {
    match response {
        Value::String(raw) => println!("{raw}"),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}
