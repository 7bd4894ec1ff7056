//! chromiumoxide によるブラウザ実装
//!
//! 取得1回ごとに専用のプロファイルディレクトリでChromeを起動し、`close` で
//! ブラウザ終了・子プロセス回収・イベントタスク停止・プロファイル削除まで行う。

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::BrowserOptions;
use crate::error::TrackerError;
use crate::traits::{BrowserLauncher, BrowserSession};

/// 自動化フラグを隠す
const STEALTH_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

static LAUNCH_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct ChromeLauncher {
    options: BrowserOptions,
    user_agent: String,
}

impl ChromeLauncher {
    pub fn new(options: BrowserOptions, user_agent: impl Into<String>) -> Self {
        Self {
            options,
            user_agent: user_agent.into(),
        }
    }

    fn build_config(&self, profile_dir: &Path) -> Result<BrowserConfig, TrackerError> {
        let (width, height) = self.options.window_size;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir)
            .window_size(width, height)
            .viewport(Viewport {
                width,
                height,
                ..Default::default()
            });

        if let Some(path) = &self.options.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        if !self.options.headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .request_timeout(Duration::from_secs(60))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--log-level=3")
            .arg(format!("--user-agent={}", self.user_agent));

        builder.build().map_err(TrackerError::BrowserInit)
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, TrackerError> {
        let profile_dir = std::env::temp_dir().join(format!(
            "price-tracker-{}-{}",
            std::process::id(),
            LAUNCH_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        debug!("Launching browser with profile {:?}", profile_dir);

        let config = self.build_config(&profile_dir)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| TrackerError::BrowserInit(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let mut session = ChromeSession {
            browser: Some(browser),
            page: None,
            handler_task: Some(handler_task),
            profile_dir,
        };

        if let Err(e) = session.open_page().await {
            if let Err(close_err) = session.close().await {
                warn!("Failed to close browser after init error: {}", close_err);
            }
            return Err(e);
        }

        Ok(Box::new(session))
    }
}

pub struct ChromeSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    profile_dir: PathBuf,
}

impl ChromeSession {
    async fn open_page(&mut self) -> Result<(), TrackerError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| TrackerError::BrowserInit("browser already closed".into()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| TrackerError::BrowserInit(e.to_string()))?;

        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
            .await
            .map_err(|e| TrackerError::BrowserInit(e.to_string()))?;

        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page, TrackerError> {
        self.page
            .as_ref()
            .ok_or_else(|| TrackerError::BrowserInit("page not initialized".into()))
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T, TrackerError> {
        self.page()?
            .evaluate(script)
            .await
            .map_err(|e| TrackerError::JavaScript(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| TrackerError::JavaScript(e.to_string()))
    }
}

/// セレクタをJS文字列リテラルにする
fn js_string(selector: &str) -> String {
    serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string())
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn goto(&self, url: &str) -> Result<(), TrackerError> {
        self.page()?
            .goto(url)
            .await
            .map_err(|e| TrackerError::Navigation(e.to_string()))?;
        debug!("Navigated to {}", url);
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, TrackerError> {
        let script = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return false;
                const style = window.getComputedStyle(el);
                const rect = el.getBoundingClientRect();
                return style.display !== 'none' &&
                       style.visibility !== 'hidden' &&
                       style.opacity !== '0' &&
                       (rect.width > 0 || rect.height > 0);
            }})()
            "#,
            js_string(selector)
        );
        self.eval(&script).await
    }

    async fn text(&self, selector: &str) -> Result<Option<String>, TrackerError> {
        // null は値なし扱いになるため配列で返す
        let script = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return [];
                return [(el.innerText || el.textContent || '').trim()];
            }})()
            "#,
            js_string(selector)
        );
        let mut found: Vec<String> = self.eval(&script).await?;
        Ok(found.pop())
    }

    async fn click(&self, selector: &str) -> Result<bool, TrackerError> {
        let script = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return false;
                el.click();
                return true;
            }})()
            "#,
            js_string(selector)
        );
        self.eval(&script).await
    }

    async fn screenshot(&self) -> Result<Vec<u8>, TrackerError> {
        self.page()?
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(|e| TrackerError::JavaScript(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TrackerError> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close page: {}", e);
            }
        }

        let mut result = Ok(());
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Browser close failed, killing process: {}", e);
                result = Err(TrackerError::BrowserInit(e.to_string()));
                if let Some(Err(kill_err)) = browser.kill().await {
                    warn!("Failed to kill browser: {}", kill_err);
                }
            }
            if let Err(e) = browser.wait().await {
                debug!("Failed to reap browser process: {}", e);
            }
        }

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        if self.profile_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.profile_dir) {
                debug!("Failed to remove profile {:?}: {}", self.profile_dir, e);
            }
        }

        info!("Browser closed");
        result
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        // close されずに破棄された場合（panic等）もイベントタスクは止める
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}
