use std::path::PathBuf;

use thiserror::Error;

/// メッセージは英語。取得失敗時の原因文字列は `Error (<mode>): <cause>` として
/// そのまま price_data.csv に書き込まれる。
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("browser init failed: {0}")]
    BrowserInit(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("script evaluation failed: {0}")]
    JavaScript(String),

    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file error: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("{} not found!", .0.display())]
    ConfigNotFound(PathBuf),
}

impl TrackerError {
    /// 実行全体を中断すべきエラーかどうか
    pub fn is_fatal(&self) -> bool {
        matches!(self, TrackerError::ConfigNotFound(_))
    }
}
