use futures::future::poll_fn;
use tokio::time::sleep;
use tower::Service;
use tracing::{error, info};

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::products::load_products;
use crate::record_log::PriceLog;
use crate::service::TrackerService;

/// 1回の実行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed_writes: usize,
}

pub struct Tracker {
    config: TrackerConfig,
    service: TrackerService,
    log: PriceLog,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        let service = TrackerService::new(&config)?;
        Ok(Self::with_service(config, service))
    }

    pub fn with_service(config: TrackerConfig, service: TrackerService) -> Self {
        let log = PriceLog::new(config.log_path.clone());
        Self {
            config,
            service,
            log,
        }
    }

    /// 全商品を順番に処理する
    ///
    /// products.csv がない場合のみエラーで中断する。個々の商品の失敗はログに記録して続行。
    pub async fn run(&mut self) -> Result<RunSummary, TrackerError> {
        info!("Starting price tracker...");
        let products = load_products(&self.config.products_path)?;

        let mut summary = RunSummary::default();
        let total = products.len();

        for (i, product) in products.into_iter().enumerate() {
            let name = product.name.clone();

            poll_fn(|cx| self.service.poll_ready(cx)).await?;
            let record = self.service.call(product).await?;

            if let Err(e) = self.log.append(&record) {
                error!("Failed to log price for '{}': {}", name, e);
                summary.failed_writes += 1;
            }
            summary.processed += 1;

            if i + 1 < total && !self.config.polite_delay.is_zero() {
                sleep(self.config.polite_delay).await;
            }
        }

        info!(
            "Price tracking complete: {} products, {} failed writes",
            summary.processed, summary.failed_writes
        );
        Ok(summary)
    }
}
