use std::path::Path;
use std::time::Duration;

use price_tracker::{PriceLog, Tracker, TrackerConfig, TrackerError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const PRODUCT_PAGE: &str = r#"<html><body>
<h1>Coffee</h1>
<span class="price">19.99</span>
</body></html>"#;

/// `/price` だけ200を返す簡易HTTPサーバー
async fn serve_shop() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let path = request.split_whitespace().nth(1).unwrap_or("/");

                let (status, body) = if path == "/price" {
                    ("200 OK", PRODUCT_PAGE)
                } else {
                    ("404 Not Found", "not here")
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

fn write_products(path: &Path, rows: &[String]) {
    let mut content = String::from("product_name,url,selector,type\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(path, content).unwrap();
}

fn config(dir: &Path) -> TrackerConfig {
    TrackerConfig::new(dir.join("products.csv"), dir.join("price_data.csv"))
        .with_polite_delay(Duration::ZERO)
        .with_request_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn static_product_logs_one_row() {
    let base = serve_shop().await;
    let dir = tempfile::tempdir().unwrap();
    write_products(
        &dir.path().join("products.csv"),
        &[format!("Coffee,{}/price,span.price,static", base)],
    );

    let mut tracker = Tracker::new(config(dir.path())).unwrap();
    let summary = tracker.run().await.unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed_writes, 0);

    let raw = std::fs::read_to_string(dir.path().join("price_data.csv")).unwrap();
    assert!(raw.starts_with("date,product,price\r\n"));

    let records = PriceLog::new(dir.path().join("price_data.csv")).read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].product_name, "Coffee");
    assert_eq!(records[0].price, "19.99");
}

#[tokio::test]
async fn unknown_type_logs_empty_price() {
    let dir = tempfile::tempdir().unwrap();
    write_products(
        &dir.path().join("products.csv"),
        &["Mystery,https://shop.invalid/p,span.price,unknown".to_string()],
    );

    let mut tracker = Tracker::new(config(dir.path())).unwrap();
    tracker.run().await.unwrap();

    let records = PriceLog::new(dir.path().join("price_data.csv")).read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].product_name, "Mystery");
    assert_eq!(records[0].price, "");
}

#[tokio::test]
async fn failures_do_not_stop_later_products() {
    let base = serve_shop().await;
    let dir = tempfile::tempdir().unwrap();
    write_products(
        &dir.path().join("products.csv"),
        &[
            format!("Gone,{}/missing,span.price,static", base),
            format!("NoPrice,{}/price,span.old-price,static", base),
            format!("Coffee,{}/price,span.price,static", base),
        ],
    );

    let mut tracker = Tracker::new(config(dir.path())).unwrap();
    let summary = tracker.run().await.unwrap();
    assert_eq!(summary.processed, 3);

    let records = PriceLog::new(dir.path().join("price_data.csv")).read_all().unwrap();
    let names: Vec<_> = records.iter().map(|r| r.product_name.as_str()).collect();
    assert_eq!(names, ["Gone", "NoPrice", "Coffee"]);
    // "Error (static): HTTP status client error (404 Not Found) ..." の数字が残る
    assert!(records[0].price.starts_with("404"));
    // "Element not found" は空になる
    assert_eq!(records[1].price, "");
    assert_eq!(records[2].price, "19.99");
}

#[tokio::test]
async fn repeated_runs_append() {
    let base = serve_shop().await;
    let dir = tempfile::tempdir().unwrap();
    write_products(
        &dir.path().join("products.csv"),
        &[
            format!("Coffee,{}/price,span.price,static", base),
            "Mystery,https://shop.invalid/p,span.price,unknown".to_string(),
        ],
    );

    let mut tracker = Tracker::new(config(dir.path())).unwrap();
    tracker.run().await.unwrap();
    let first = PriceLog::new(dir.path().join("price_data.csv")).read_all().unwrap();

    let mut tracker = Tracker::new(config(dir.path())).unwrap();
    tracker.run().await.unwrap();
    let second = PriceLog::new(dir.path().join("price_data.csv")).read_all().unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 4);
    assert_eq!(&second[..2], &first[..]);
    assert_eq!(second[2].price, "19.99");
    assert_eq!(second[3].price, "");

    let raw = std::fs::read_to_string(dir.path().join("price_data.csv")).unwrap();
    assert_eq!(raw.matches("date,product,price").count(), 1);
}

#[tokio::test]
async fn malformed_row_does_not_abort_run() {
    let dir = tempfile::tempdir().unwrap();
    write_products(
        &dir.path().join("products.csv"),
        &[
            "Good,https://shop.invalid/g,span.price,unknown".to_string(),
            "Broken,https://x.invalid/q".to_string(),
            "Later,https://shop.invalid/l,span.price,unknown".to_string(),
        ],
    );

    let mut tracker = Tracker::new(config(dir.path())).unwrap();
    let summary = tracker.run().await.unwrap();
    assert_eq!(summary.processed, 2);

    let records = PriceLog::new(dir.path().join("price_data.csv")).read_all().unwrap();
    let names: Vec<_> = records.iter().map(|r| r.product_name.as_str()).collect();
    assert_eq!(names, ["Good", "Later"]);
}

#[tokio::test]
async fn missing_products_file_aborts_before_logging() {
    let dir = tempfile::tempdir().unwrap();

    let mut tracker = Tracker::new(config(dir.path())).unwrap();
    let err = tracker.run().await.unwrap_err();

    assert!(matches!(err, TrackerError::ConfigNotFound(_)));
    assert!(!dir.path().join("price_data.csv").exists());
}
