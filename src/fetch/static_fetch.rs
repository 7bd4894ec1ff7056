//! 静的取得: HTTP GET + HTMLパース

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::traits::PriceFetcher;
use crate::types::{FetchMode, FetchOutcome};

pub struct StaticFetcher {
    client: reqwest::Client,
}

impl StaticFetcher {
    pub fn new(config: &TrackerConfig) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// ページを取得してセレクタで価格テキストを抽出
    pub async fn fetch_static(&self, url: &str, selector: &str) -> FetchOutcome {
        info!("Fetching (static) {}", url);

        let result = async {
            let html = self.fetch_html(url).await?;
            extract_text(&html, selector)
        }
        .await;

        match result {
            Ok(Some(text)) => FetchOutcome::Found(text),
            Ok(None) => {
                debug!("Selector '{}' matched nothing on {}", selector, url);
                FetchOutcome::NotFound
            }
            Err(e) => FetchOutcome::failed(FetchMode::Static, e),
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<String, TrackerError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        debug!("GET {} -> {}", url, response.status());
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PriceFetcher for StaticFetcher {
    async fn fetch(&self, url: &str, selector: &str) -> FetchOutcome {
        self.fetch_static(url, selector).await
    }
}

/// 最初に一致した要素の（子孫を含む）テキストを trim して返す
pub fn extract_text(html: &str, selector: &str) -> Result<Option<String>, TrackerError> {
    let parsed = Selector::parse(selector).map_err(|e| TrackerError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    Ok(document
        .select(&parsed)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string()))
}
