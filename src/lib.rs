//! 商品価格トラッカー
//!
//! - products.csv の各商品ページから価格テキストを取得（静的HTTP / ヘッドレスブラウザ）
//! - 価格文字列を正規化して price_data.csv に追記
//!
//! # 使用例
//!
//! ```rust,ignore
//! use price_tracker::{Tracker, TrackerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TrackerConfig::new("./products.csv", "./price_data.csv")
//!         .with_headless(true);
//!
//!     let mut tracker = Tracker::new(config).unwrap();
//!     let summary = tracker.run().await.unwrap();
//!     println!("processed: {}", summary.processed);
//! }
//! ```

pub mod clean;
pub mod config;
pub mod error;
pub mod fetch;
pub mod history;
pub mod poll;
pub mod products;
pub mod record_log;
pub mod runner;
pub mod service;
pub mod site_rules;
pub mod traits;
pub mod types;

// 主要な型をリエクスポート
pub use clean::{clean_price, clean_price_opt};
pub use config::{BrowserOptions, TrackerConfig};
pub use error::TrackerError;
pub use fetch::{ChromeLauncher, DynamicFetcher, StaticFetcher};
pub use record_log::PriceLog;
pub use runner::{RunSummary, Tracker};
pub use service::TrackerService;
pub use site_rules::{FallbackRule, SiteRules};
pub use traits::{BrowserLauncher, BrowserSession, PriceFetcher};
pub use types::{FetchMode, FetchOutcome, PriceRecord, ProductSpec};
