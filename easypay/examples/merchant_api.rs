//! Calls the merchant API with credentials from the environment.
//!
//! # Running this example
//!
//! ```bash
//! export EASYPAY_DOMAIN=https://pay.example.com
//! export EASYPAY_PID=1000
//! export EASYPAY_KEY=<merchant key>
//! RUST_LOG=easypay=debug cargo run --example merchant_api -- 20240101001
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "examples are allowed to use println"
)]

use std::env;

use easypay::{
    EasyPay, GatewayConfig, GatewayError,
    models::{self, MerchantInfo, OrderInfo},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let client = match GatewayConfig::from_env().and_then(EasyPay::new) {
        Ok(client) => client,
        Err(GatewayError::InvalidConfig(msg)) => {
            eprintln!("Configuration error: {msg}");
            eprintln!("Set EASYPAY_DOMAIN, EASYPAY_PID and EASYPAY_KEY.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let merchant: MerchantInfo = models::decode(client.query().await?)?;
    if merchant.is_success() {
        println!("Merchant {:?}: balance {:?}", merchant.pid, merchant.money);
    } else {
        println!("Query failed: {:?}", merchant.msg);
    }

    if let Some(out_trade_no) = env::args().nth(1) {
        match client.order(Some(&out_trade_no), None).await {
            Ok(response) => {
                let order: OrderInfo = models::decode(response)?;
                println!("Order {out_trade_no}: paid = {}", order.is_paid());
            }
            Err(GatewayError::Http(e)) => eprintln!("Network error: {e}"),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
