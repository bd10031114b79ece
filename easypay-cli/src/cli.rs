//! Command-line argument definitions.
//!
//! - `easypay pay` - Print a signed redirect payment URL
//! - `easypay mapi` - Create a payment through the direct API
//! - `easypay query` - Show merchant information
//! - `easypay settle` - List settlement records
//! - `easypay order` - Look up one order
//! - `easypay orders` - List orders
//! - `easypay refund` - Refund an order
//! - `easypay verify <QUERY>` - Check a notification's signature

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use easypay::{ApiPaymentArgs, Device, PaymentArgs, PaymentType};
use rust_decimal::Decimal;

/// Command-line client for EasyPay-compatible payment gateways.
#[derive(Debug, Parser)]
#[command(name = "easypay")]
#[command(author, version, about = "EasyPay gateway client")]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a TOML config file
    ///
    /// Without it, credentials are read from `EASYPAY_DOMAIN`, `EASYPAY_PID`
    /// and `EASYPAY_KEY`.
    #[arg(short, long, global = true, value_name = "PATH", env = "EASYPAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print a signed redirect payment URL (submit.php)
    Pay(PaymentOpts),

    /// Create a payment through the direct API (mapi.php)
    Mapi {
        /// Common payment fields
        #[command(flatten)]
        payment: PaymentOpts,

        /// End-user IP address
        #[arg(long)]
        clientip: Option<String>,

        /// End-user device: pc, mobile, qq, wechat or alipay
        #[arg(long)]
        device: Option<Device>,
    },

    /// Show merchant information
    Query,

    /// List settlement records
    Settle,

    /// Look up one order by merchant or gateway order number
    Order(OrderIds),

    /// List orders
    Orders,

    /// Refund an order
    Refund {
        /// Order identifiers
        #[command(flatten)]
        ids: OrderIds,

        /// Amount to refund; the gateway refunds in full when omitted
        #[arg(long)]
        money: Option<Decimal>,
    },

    /// Check the signature of a notification query string
    ///
    /// Exits with status 1 when verification fails.
    Verify {
        /// Raw query string as received on notify_url or return_url
        query: String,
    },
}

/// Fields shared by `pay` and `mapi`.
#[derive(Debug, Args)]
pub struct PaymentOpts {
    /// Payment channel, e.g. alipay, wxpay, qqpay
    #[arg(long = "type", value_name = "TYPE")]
    pub payment_type: PaymentType,

    /// Merchant order number
    #[arg(long)]
    pub out_trade_no: String,

    /// Product name
    #[arg(long)]
    pub name: String,

    /// Amount, e.g. 1.00
    #[arg(long)]
    pub money: Decimal,

    /// Notification URL, overriding the configured default
    #[arg(long)]
    pub notify_url: Option<String>,

    /// Return URL, overriding the configured default
    #[arg(long)]
    pub return_url: Option<String>,

    /// Site name shown on the cashier page
    #[arg(long)]
    pub sitename: Option<String>,

    /// Extra field as KEY=VALUE (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

impl PaymentOpts {
    /// Builds library payment arguments.
    #[must_use]
    pub fn to_args(&self) -> PaymentArgs {
        let mut args = PaymentArgs::new(
            self.payment_type.clone(),
            &self.out_trade_no,
            &self.name,
            self.money,
        );
        args.notify_url.clone_from(&self.notify_url);
        args.return_url.clone_from(&self.return_url);
        args.sitename.clone_from(&self.sitename);
        for (key, value) in &self.fields {
            args = args.with_field(key, value);
        }
        args
    }
}

/// Builds direct API payment arguments.
#[must_use]
pub fn api_args(payment: &PaymentOpts, clientip: Option<&str>, device: Option<Device>) -> ApiPaymentArgs {
    let mut args = ApiPaymentArgs::new(payment.to_args());
    args.clientip = clientip.map(str::to_owned);
    args.device = device;
    args
}

/// Order identifiers; at least one is required by the gateway.
#[derive(Debug, Args)]
pub struct OrderIds {
    /// Gateway order number
    #[arg(long)]
    pub trade_no: Option<String>,

    /// Merchant order number
    #[arg(long)]
    pub out_trade_no: Option<String>,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pay() {
        let cli = Cli::try_parse_from([
            "easypay",
            "pay",
            "--type",
            "alipay",
            "--out-trade-no",
            "20240101001",
            "--name",
            "Test",
            "--money",
            "1.00",
            "--field",
            "attach=vip",
        ])
        .unwrap();

        let Commands::Pay(opts) = cli.command else { panic!("expected pay") };
        let params = opts.to_args().to_params();
        assert_eq!(params.get("money").unwrap().to_string(), "1.00");
        assert_eq!(params.get("attach").unwrap().to_string(), "vip");
        assert_eq!(params.get("type").unwrap().to_string(), "alipay");
    }

    #[test]
    fn test_parse_refund_with_global_flags() {
        let cli = Cli::try_parse_from([
            "easypay", "-vv", "refund", "--trade-no", "T123", "--money", "5.00", "-c", "pay.toml",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("pay.toml")));
        let Commands::Refund { ids, money } = cli.command else { panic!("expected refund") };
        assert_eq!(ids.trade_no.as_deref(), Some("T123"));
        assert_eq!(ids.out_trade_no, None);
        assert_eq!(money.map(|m| m.to_string()).as_deref(), Some("5.00"));
    }

    #[test]
    fn test_parse_mapi_device() {
        let cli = Cli::try_parse_from([
            "easypay", "mapi", "--type", "wxpay", "--out-trade-no", "A1", "--name", "N",
            "--money", "2", "--device", "mobile", "--clientip", "203.0.113.7",
        ])
        .unwrap();

        let Commands::Mapi { payment, clientip, device } = cli.command else {
            panic!("expected mapi")
        };
        let params = api_args(&payment, clientip.as_deref(), device).to_params();
        assert_eq!(params.get("device").unwrap().to_string(), "mobile");
        assert_eq!(params.get("clientip").unwrap().to_string(), "203.0.113.7");
    }

    #[test]
    fn test_unknown_device_rejected() {
        let result = Cli::try_parse_from([
            "easypay", "mapi", "--type", "alipay", "--out-trade-no", "A1", "--name", "N",
            "--money", "1", "--device", "tv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("a=b=c").unwrap(), ("a".to_owned(), "b=c".to_owned()));
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }
}
