use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::clean::clean_price;
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::fetch::{DynamicFetcher, StaticFetcher};
use crate::traits::PriceFetcher;
use crate::types::{FetchMode, FetchOutcome, PriceRecord, ProductSpec};

/// 1商品分の取得 → 正規化を行う tower::Service
///
/// 取得失敗もレコードとして返すため、`call` がエラーになることはない。
#[derive(Clone)]
pub struct TrackerService {
    static_fetcher: Arc<dyn PriceFetcher>,
    dynamic_fetcher: Arc<dyn PriceFetcher>,
}

impl TrackerService {
    pub fn new(config: &TrackerConfig) -> Result<Self, TrackerError> {
        Ok(Self::with_fetchers(
            Arc::new(StaticFetcher::new(config)?),
            Arc::new(DynamicFetcher::new(config)),
        ))
    }

    pub fn with_fetchers(
        static_fetcher: Arc<dyn PriceFetcher>,
        dynamic_fetcher: Arc<dyn PriceFetcher>,
    ) -> Self {
        Self {
            static_fetcher,
            dynamic_fetcher,
        }
    }
}

/// モードに応じた取得器で取得する
async fn dispatch(
    static_fetcher: &dyn PriceFetcher,
    dynamic_fetcher: &dyn PriceFetcher,
    product: &ProductSpec,
) -> FetchOutcome {
    match &product.mode {
        FetchMode::Static => static_fetcher.fetch(&product.url, &product.selector).await,
        FetchMode::Dynamic => dynamic_fetcher.fetch(&product.url, &product.selector).await,
        FetchMode::Unknown(mode) => FetchOutcome::UnknownMode(mode.clone()),
    }
}

impl Service<ProductSpec> for TrackerService {
    type Response = PriceRecord;
    type Error = TrackerError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, product: ProductSpec) -> Self::Future {
        info!("Tracking '{}' ({})", product.name, product.mode);

        let static_fetcher = self.static_fetcher.clone();
        let dynamic_fetcher = self.dynamic_fetcher.clone();

        Box::pin(async move {
            let outcome = dispatch(static_fetcher.as_ref(), dynamic_fetcher.as_ref(), &product).await;
            let price = clean_price(&outcome.to_string());
            let record = PriceRecord::now(product.name, price);

            info!("Price found: {:?} (raw: {})", record.price, outcome);
            Ok(record)
        })
    }
}
