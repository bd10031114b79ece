//! Integration tests for the gateway client.
//!
//! Network tests run the reqwest transport against a one-shot HTTP server on
//! a loopback port.

use easypay::{
    ApiPaymentArgs, Device, EasyPay, GatewayConfig, GatewayError, Md5Signer, Params, PaymentArgs,
    PaymentType,
    models::{self, OrderInfo, RefundResponse},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};
use url::{Url, form_urlencoded};

/// Request as seen by the loopback server.
#[derive(Debug)]
struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn form(&self) -> Params {
        form_urlencoded::parse(self.body.as_bytes()).into_owned().collect()
    }
}

/// Serves exactly one request with the given status and body.
async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default().to_owned();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
            .collect();

        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .map_or(0, |(_, v)| v.parse::<usize>().unwrap());
        let mut request_body = buf[header_end + 4..].to_vec();
        while request_body.len() < content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body was complete");
            request_body.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len(),
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        CapturedRequest {
            request_line,
            headers,
            body: String::from_utf8(request_body).unwrap(),
        }
    });

    (format!("http://{addr}"), handle)
}

fn client_for(domain: &str) -> EasyPay {
    EasyPay::new(GatewayConfig::new(domain, "1000", "testkey")).unwrap()
}

fn sample_args() -> PaymentArgs {
    PaymentArgs::new(PaymentType::Alipay, "20240101001", "Test", "1.00".parse().unwrap())
}

#[test]
fn test_pay_url_signature_vector() {
    let client = client_for("https://pay.example.com/");
    let url = client.pay(&sample_args()).unwrap();

    assert!(url.starts_with("https://pay.example.com/submit.php?"));
    let parsed = Url::parse(&url).unwrap();
    let params: Params = parsed.query_pairs().into_owned().collect();
    assert_eq!(params.get("pid").unwrap().to_string(), "1000");
    assert_eq!(params.get("sign_type").unwrap().to_string(), "MD5");
    assert_eq!(params.get("sign").unwrap().to_string(), "724dc8d0a793b2ed68f34019f2245e29");
}

#[test]
fn test_config_from_toml_drives_client() {
    let config = GatewayConfig::from_toml(
        r#"
        domain = "https://pay.example.com//"
        pid = "1000"
        key = "testkey"
        notify_url = "https://shop.example.com/notify"

        [http]
        timeout_secs = 15
        "#,
    )
    .unwrap();
    let client = EasyPay::new(config).unwrap();
    assert_eq!(client.base_url(), "https://pay.example.com");

    let url = client.pay(&sample_args()).unwrap();
    let parsed = Url::parse(&url).unwrap();
    let params: Params = parsed.query_pairs().into_owned().collect();
    assert_eq!(
        params.get("notify_url").unwrap().to_string(),
        "https://shop.example.com/notify"
    );
    assert!(Md5Signer::new("testkey").verify(&params));
}

#[tokio::test]
async fn test_mapi_sends_signed_form_over_http() {
    let (domain, server) =
        serve_once(200, r#"{"code":1,"trade_no":"2024010100001","qrcode":"weixin://x"}"#).await;
    let client = client_for(&domain);

    let args = ApiPaymentArgs::new(sample_args().with_sitename("Shop"))
        .with_clientip("203.0.113.7")
        .with_device(Device::Pc);
    let response = client.mapi(&args).await.unwrap();

    let captured = server.await.unwrap();
    assert_eq!(captured.request_line, "POST /mapi.php HTTP/1.1");
    assert!(
        captured
            .header("content-type")
            .unwrap()
            .starts_with("application/x-www-form-urlencoded")
    );

    let form = captured.form();
    assert_eq!(form.get("clientip").unwrap().to_string(), "203.0.113.7");
    assert_eq!(form.get("sitename").unwrap().to_string(), "Shop");
    assert!(Md5Signer::new("testkey").verify(&form));

    let mapi: models::MapiResponse = models::decode(response).unwrap();
    assert!(mapi.is_success());
    assert_eq!(mapi.qrcode.as_deref(), Some("weixin://x"));
}

#[tokio::test]
async fn test_refund_posts_credentials_and_trade_no() {
    let (domain, server) = serve_once(200, r#"{"code":1,"msg":"refund ok"}"#).await;
    let client = client_for(&domain);

    let response = client.refund(Some("T123"), None, None).await.unwrap();

    let captured = server.await.unwrap();
    assert_eq!(captured.request_line, "POST /api.php HTTP/1.1");
    assert_eq!(captured.body, "act=refund&pid=1000&key=testkey&trade_no=T123");

    let refund: RefundResponse = models::decode(response).unwrap();
    assert!(refund.is_success());
}

#[tokio::test]
async fn test_order_uses_get_query() {
    let (domain, server) = serve_once(
        200,
        r#"{"code":1,"trade_no":"2024010100001","out_trade_no":"20240101001","type":"alipay","money":"1.00","status":1}"#,
    )
    .await;
    let client = client_for(&domain);

    let response = client.order(Some("20240101001"), None).await.unwrap();

    let captured = server.await.unwrap();
    assert_eq!(
        captured.request_line,
        "GET /api.php?act=order&pid=1000&key=testkey&out_trade_no=20240101001 HTTP/1.1"
    );

    let order: OrderInfo = models::decode(response).unwrap();
    assert!(order.is_paid());
    assert_eq!(order.trade_no.as_deref(), Some("2024010100001"));
}

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let (domain, server) = serve_once(500, r#"{"code":-1}"#).await;
    let client = client_for(&domain);

    let err = client.query().await.unwrap_err();
    assert!(matches!(err, GatewayError::Http(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_non_json_body_is_returned_as_string() {
    let (domain, server) = serve_once(200, "success").await;
    let client = client_for(&domain);

    let response = client.settle().await.unwrap();
    assert_eq!(response, serde_json::Value::String("success".to_owned()));
    server.await.unwrap();
}

#[tokio::test]
async fn test_refund_without_ids_never_connects() {
    let client = client_for("http://127.0.0.1:9");
    let err = client.refund(None, None, Some("5.00".parse().unwrap())).await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidArgument(_)));
}
