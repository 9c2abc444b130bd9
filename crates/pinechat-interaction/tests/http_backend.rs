use pinechat_core::backend::{AssistantBackend, InsightsBackend, QueryRequest};
use pinechat_core::PinechatError;
use pinechat_interaction::HttpBackend;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves exactly one HTTP response and hands back the raw request it received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();

        String::from_utf8_lossy(&buf).to_string()
    });

    (base_url, handle)
}

#[tokio::test]
async fn test_ask_posts_question_and_merchant() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"question":"What is my success rate?","response":"92%"}"#,
    )
    .await;
    let backend = HttpBackend::new(base_url);

    let answer = backend
        .ask(&QueryRequest {
            question: "What is my success rate?".to_string(),
            merchant: "Acme".to_string(),
        })
        .await
        .expect("Should parse answer");

    assert_eq!(answer.response.as_deref(), Some("92%"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /query "));
    assert!(request.contains(r#""question":"What is my success rate?""#));
    assert!(request.contains(r#""merchant":"Acme""#));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (base_url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
    let backend = HttpBackend::new(base_url);

    let err = backend
        .ask(&QueryRequest {
            question: "hi".to_string(),
            merchant: "Acme".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, PinechatError::status(500, r#"{"error":"boom"}"#));
    server.await.unwrap();
}

#[tokio::test]
async fn test_empty_success_body_is_empty_payload() {
    let (base_url, server) = serve_once("200 OK", "").await;
    let backend = HttpBackend::new(base_url);

    let err = backend.business_insights("Acme").await.unwrap_err();
    assert!(err.is_empty_payload());
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let backend = HttpBackend::new(base_url);
    let err = backend.weekly_insights().await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn test_card_insights_posts_merchant() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"totalTransactions":15234,"totalRefundAmount":48250.5,"averageSettlementAmount":1250,"successRate":0.927}"#,
    )
    .await;
    let backend = HttpBackend::new(base_url);

    let metrics = backend.card_insights("IRCTC E-ticketing").await.unwrap();
    assert_eq!(metrics.total_transactions, 15234.0);
    assert_eq!(metrics.success_rate, 0.927);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /get-cards-data "));
    assert!(request.contains(r#"{"merchant":"IRCTC E-ticketing"}"#));
}

#[tokio::test]
async fn test_weekly_insights_uses_get() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"totalTransactions":10,"transactionChange":1.5,"totalRevenue":2000,"revenueChange":-3,
            "activeCustomers":40,"customerChange":2,"failureRate":0.02,"failureChange":0.1,
            "topPaymentMethod":"UPI","averageTicket":200}"#,
    )
    .await;
    let backend = HttpBackend::new(base_url);

    let weekly = backend.weekly_insights().await.unwrap();
    assert_eq!(weekly.top_payment_method, "UPI");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /weekly-insights "));
}
