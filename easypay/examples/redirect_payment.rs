//! Builds a signed redirect payment URL.
//!
//! No request is made; the printed URL is where the buyer's browser goes.
//!
//! # Running this example
//!
//! ```bash
//! cargo run --example redirect_payment
//! ```

#![allow(clippy::print_stdout, reason = "examples are allowed to use println")]

use easypay::{EasyPay, GatewayConfig, PaymentArgs, PaymentType, Result};
use rust_decimal::Decimal;

fn main() -> Result<()> {
    let config = GatewayConfig::new("https://pay.example.com", "1000", "testkey")
        .with_notify_url("https://shop.example.com/notify")
        .with_return_url("https://shop.example.com/return");
    let client = EasyPay::new(config)?;

    let args = PaymentArgs::new(PaymentType::Alipay, "20240101001", "Test", Decimal::new(100, 2))
        .with_sitename("Example Shop")
        .with_params("order-42");

    println!("Canonical string:");
    println!("  {}", easypay::Md5Signer::canonical_string(&args.to_params()));
    println!();
    println!("Redirect URL:");
    println!("  {}", client.pay(&args)?);

    Ok(())
}
