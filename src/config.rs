use std::path::PathBuf;
use std::time::Duration;

use crate::site_rules::SiteRules;

/// 取得時に名乗るデスクトップChromeのUser-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// ヘッドレスブラウザの設定
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_size: (u32, u32),
    /// 要素が可視になるまでの上限
    pub visible_timeout: Duration,
    /// テキストが入るまでの上限（セレクタごと）
    pub text_timeout: Duration,
    pub poll_interval: Duration,
    /// 失敗時にスクリーンショットをdebugログへ出す
    pub debug: bool,
    pub chrome_executable: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            visible_timeout: Duration::from_secs(30),
            text_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
            debug: false,
            chrome_executable: std::env::var("CHROME_PATH")
                .or_else(|_| std::env::var("CHROMIUM_PATH"))
                .ok()
                .map(PathBuf::from),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub products_path: PathBuf,
    pub log_path: PathBuf,
    /// 商品間の待機
    pub polite_delay: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub browser: BrowserOptions,
    pub site_rules: SiteRules,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            products_path: PathBuf::from("./products.csv"),
            log_path: PathBuf::from("./price_data.csv"),
            polite_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser: BrowserOptions::default(),
            site_rules: SiteRules::default(),
        }
    }
}

impl TrackerConfig {
    pub fn new(products_path: impl Into<PathBuf>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            products_path: products_path.into(),
            log_path: log_path.into(),
            ..Default::default()
        }
    }

    pub fn with_polite_delay(mut self, delay: Duration) -> Self {
        self.polite_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.browser.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.browser.debug = debug;
        self
    }

    pub fn with_browser(mut self, browser: BrowserOptions) -> Self {
        self.browser = browser;
        self
    }

    pub fn with_site_rules(mut self, rules: SiteRules) -> Self {
        self.site_rules = rules;
        self
    }
}
