//! パイプライン共通の型定義

use std::fmt;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// 価格ログの日時フォーマット
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 取得モード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FetchMode {
    /// HTTP GET + HTMLパース
    Static,
    /// ヘッドレスブラウザでレンダリング
    Dynamic,
    /// 未知のモード（値はそのまま保持）
    Unknown(String),
}

impl FetchMode {
    pub fn as_str(&self) -> &str {
        match self {
            FetchMode::Static => "static",
            FetchMode::Dynamic => "dynamic",
            FetchMode::Unknown(s) => s,
        }
    }
}

impl From<String> for FetchMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "static" => FetchMode::Static,
            "dynamic" => FetchMode::Dynamic,
            _ => FetchMode::Unknown(s),
        }
    }
}

impl From<&str> for FetchMode {
    fn from(s: &str) -> Self {
        FetchMode::from(s.to_string())
    }
}

impl From<FetchMode> for String {
    fn from(mode: FetchMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 追跡対象の商品（products.csv の1行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    #[serde(rename = "product_name")]
    pub name: String,
    pub url: String,
    pub selector: String,
    #[serde(rename = "type")]
    pub mode: FetchMode,
}

impl ProductSpec {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        selector: impl Into<String>,
        mode: impl Into<FetchMode>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            selector: selector.into(),
            mode: mode.into(),
        }
    }
}

/// 価格ログの1レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(rename = "date")]
    pub timestamp: String,
    #[serde(rename = "product")]
    pub product_name: String,
    pub price: String,
}

impl PriceRecord {
    pub fn new(
        timestamp: impl Into<String>,
        product_name: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            product_name: product_name.into(),
            price: price.into(),
        }
    }

    /// 現在時刻（ローカル）でレコードを作成
    pub fn now(product_name: impl Into<String>, price: impl Into<String>) -> Self {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        Self::new(timestamp, product_name, price)
    }
}

/// 1回の取得結果
///
/// 失敗もログに残す通常の結果として扱う。文字列化はログ出力の境界でのみ行う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(String),
    NotFound,
    Failed { mode: FetchMode, cause: String },
    UnknownMode(String),
}

impl FetchOutcome {
    pub fn failed(mode: FetchMode, cause: impl fmt::Display) -> Self {
        FetchOutcome::Failed {
            mode,
            cause: cause.to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, FetchOutcome::Found(_))
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Found(text) => f.write_str(text),
            FetchOutcome::NotFound => f.write_str("Element not found"),
            FetchOutcome::Failed { mode, cause } => write!(f, "Error ({}): {}", mode, cause),
            FetchOutcome::UnknownMode(mode) => write!(f, "Unknown type '{}'", mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_mode_from_str() {
        assert_eq!(FetchMode::from("static"), FetchMode::Static);
        assert_eq!(FetchMode::from("dynamic"), FetchMode::Dynamic);
        assert_eq!(
            FetchMode::from("Static"),
            FetchMode::Unknown("Static".to_string())
        );
    }

    #[test]
    fn test_outcome_sentinels() {
        assert_eq!(FetchOutcome::NotFound.to_string(), "Element not found");
        assert_eq!(
            FetchOutcome::failed(FetchMode::Static, "boom").to_string(),
            "Error (static): boom"
        );
        assert_eq!(
            FetchOutcome::failed(FetchMode::Dynamic, "timeout").to_string(),
            "Error (dynamic): timeout"
        );
        assert_eq!(
            FetchOutcome::UnknownMode("unknown".into()).to_string(),
            "Unknown type 'unknown'"
        );
        assert_eq!(FetchOutcome::Found("19.99".into()).to_string(), "19.99");
    }

    #[test]
    fn test_record_now_format() {
        let record = PriceRecord::now("Widget", "1.00");
        assert_eq!(record.timestamp.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT).is_ok());
    }
}
