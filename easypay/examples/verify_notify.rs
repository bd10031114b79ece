//! Verifies a notification as a merchant server would on `notify_url`.
//!
//! Simulates the gateway side by signing a callback with the shared key,
//! then checks it and a tampered copy.
//!
//! # Running this example
//!
//! ```bash
//! cargo run --example verify_notify
//! ```

#![allow(clippy::print_stdout, reason = "examples are allowed to use println")]

use easypay::{EasyPay, GatewayConfig, Md5Signer, Params, Result, models::NotifyParams};

fn main() -> Result<()> {
    let client = EasyPay::new(GatewayConfig::new("https://pay.example.com", "1000", "testkey"))?;

    let mut callback: Params = [
        ("pid", "1000"),
        ("trade_no", "2024010100001"),
        ("out_trade_no", "20240101001"),
        ("type", "alipay"),
        ("name", "Test"),
        ("money", "1.00"),
        ("trade_status", "TRADE_SUCCESS"),
    ]
    .into_iter()
    .collect();
    callback.insert("sign", Md5Signer::new("testkey").sign(&callback));
    callback.insert("sign_type", "MD5");

    if client.verify_notify(&callback) {
        let notify = NotifyParams::from_params(&callback)?;
        println!(
            "Verified: order {} paid {} ({})",
            notify.out_trade_no,
            notify.money,
            if notify.is_paid() { "success" } else { "pending" }
        );
        // Reply "success" so the gateway stops retrying
        println!("Response body: success");
    }

    let mut tampered = callback.clone();
    tampered.insert("money", "0.01");
    println!("Tampered callback verifies: {}", client.verify_notify(&tampered));

    Ok(())
}
