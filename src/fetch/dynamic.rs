//! 動的取得: ヘッドレスブラウザでレンダリングしてから価格テキストを読む
//!
//! 1. 遷移 → クッキー同意バナーを閉じる（ベストエフォート）
//! 2. 要素が可視になるまで待機（上限 `visible_timeout`）
//! 3. テキストが入るまで一定間隔でポーリング（上限 `text_timeout`）
//! 4. 空のままなら `SiteRules` の代替セレクタを順に試す
//!
//! ブラウザは取得ごとに起動し、成功・失敗どちらでも必ず `close` する。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{BrowserOptions, TrackerConfig};
use crate::error::TrackerError;
use crate::poll::poll_until;
use crate::site_rules::SiteRules;
use crate::traits::{BrowserLauncher, BrowserSession, PriceFetcher};
use crate::types::{FetchMode, FetchOutcome};

use super::chrome::ChromeLauncher;

pub struct DynamicFetcher {
    launcher: Arc<dyn BrowserLauncher>,
    options: BrowserOptions,
    rules: SiteRules,
}

impl DynamicFetcher {
    pub fn new(config: &TrackerConfig) -> Self {
        let launcher = ChromeLauncher::new(config.browser.clone(), config.user_agent.clone());
        Self::with_launcher(
            Arc::new(launcher),
            config.browser.clone(),
            config.site_rules.clone(),
        )
    }

    pub fn with_launcher(
        launcher: Arc<dyn BrowserLauncher>,
        options: BrowserOptions,
        rules: SiteRules,
    ) -> Self {
        Self {
            launcher,
            options,
            rules,
        }
    }

    pub async fn fetch_dynamic(&self, url: &str, selector: &str) -> FetchOutcome {
        info!("Fetching (dynamic) {}", url);

        let mut session = match self.launcher.launch().await {
            Ok(session) => session,
            Err(e) => return FetchOutcome::failed(FetchMode::Dynamic, e),
        };

        let result = self.scrape(session.as_ref(), url, selector).await;

        if result.is_err() && self.options.debug {
            log_screenshot(session.as_ref()).await;
        }

        if let Err(e) = session.close().await {
            warn!("Failed to close browser: {}", e);
        }

        match result {
            Ok(text) => FetchOutcome::Found(text),
            Err(e) => FetchOutcome::failed(FetchMode::Dynamic, e),
        }
    }

    async fn scrape(
        &self,
        session: &dyn BrowserSession,
        url: &str,
        selector: &str,
    ) -> Result<String, TrackerError> {
        session.goto(url).await?;
        self.dismiss_cookie_banner(session).await;

        let visible = poll_until(
            self.options.visible_timeout,
            self.options.poll_interval,
            move || async move {
                match session.is_visible(selector).await {
                    Ok(visible) => visible.then_some(()),
                    Err(e) => {
                        debug!("Visibility check failed for '{}': {}", selector, e);
                        None
                    }
                }
            },
        )
        .await;

        if visible.is_none() {
            return Err(TrackerError::Timeout(format!(
                "'{}' not visible after {:?}",
                selector, self.options.visible_timeout
            )));
        }

        if let Some(text) = self.wait_for_text(session, selector).await {
            return Ok(text);
        }

        for alternative in self.rules.fallback_selectors(url) {
            info!("Text still empty, trying fallback selector '{}'", alternative);
            if let Some(text) = self.wait_for_text(session, alternative).await {
                return Ok(text);
            }
        }

        Err(TrackerError::ElementNotFound(format!(
            "no text for '{}' after {:?}",
            selector, self.options.text_timeout
        )))
    }

    /// 要素のテキストが空でなくなるまでポーリング
    async fn wait_for_text(&self, session: &dyn BrowserSession, selector: &str) -> Option<String> {
        let text = poll_until(
            self.options.text_timeout,
            self.options.poll_interval,
            move || async move {
                match session.text(selector).await {
                    Ok(Some(text)) if !text.is_empty() => Some(text),
                    Ok(_) => None,
                    Err(e) => {
                        debug!("Text check failed for '{}': {}", selector, e);
                        None
                    }
                }
            },
        )
        .await;

        if let Some(text) = &text {
            debug!("Text for '{}': {}", selector, text);
        }
        text
    }

    /// 可視の同意ボタンを定義順に探し、最初の1つだけクリックする。失敗しても取得は続行する
    async fn dismiss_cookie_banner(&self, session: &dyn BrowserSession) {
        for selector in &self.rules.cookie_consent {
            match session.is_visible(selector).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!("Cookie banner check failed for '{}': {}", selector, e);
                    continue;
                }
            }

            match session.click(selector).await {
                Ok(true) => {
                    info!("Dismissed cookie banner via '{}'", selector);
                    tokio::time::sleep(self.options.poll_interval.min(Duration::from_secs(1))).await;
                    return;
                }
                Ok(false) => {}
                Err(e) => debug!("Cookie banner click failed for '{}': {}", selector, e),
            }
        }
    }
}

#[async_trait]
impl PriceFetcher for DynamicFetcher {
    async fn fetch(&self, url: &str, selector: &str) -> FetchOutcome {
        self.fetch_dynamic(url, selector).await
    }
}

async fn log_screenshot(session: &dyn BrowserSession) {
    match session.screenshot().await {
        Ok(png) => {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
            debug!("Failure screenshot: data:image/png;base64,{}", encoded);
        }
        Err(e) => debug!("Failed to take screenshot: {}", e),
    }
}
