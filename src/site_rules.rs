//! サイト別のヒューリスティック設定
//!
//! クッキー同意バナーのセレクタと、テキストが空のままだった場合に試す代替セレクタ。
//! JSONファイルから読み込めるので、サイト追加にコード変更は不要。

use std::path::Path;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// ホスト単位の代替セレクタ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRule {
    /// 対象ホスト（サブドメインも一致）
    pub host: String,
    /// 試行順のセレクタ
    pub selectors: Vec<String>,
}

impl FallbackRule {
    pub fn new<S: Into<String>>(host: impl Into<String>, selectors: impl IntoIterator<Item = S>) -> Self {
        Self {
            host: host.into(),
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }

    /// 大文字小文字と末尾の `.`（FQDN表記）は区別しない
    pub fn matches_host(&self, host: &str) -> bool {
        let rule = normalize_host(&self.host);
        let rule = rule.strip_prefix("www.").unwrap_or(&rule);
        let host = normalize_host(host);
        host == rule || host.ends_with(&format!(".{}", rule))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRules {
    #[serde(default)]
    pub cookie_consent: Vec<String>,
    #[serde(default)]
    pub fallbacks: Vec<FallbackRule>,
}

impl Default for SiteRules {
    fn default() -> Self {
        Self {
            cookie_consent: vec![
                "#onetrust-accept-btn-handler".to_string(),
                "#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll".to_string(),
                "button[data-testid='cookie-accept']".to_string(),
            ],
            fallbacks: Vec::new(),
        }
    }
}

impl SiteRules {
    pub fn from_json(json: &str) -> Result<Self, TrackerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TrackerError::ConfigNotFound(path.to_path_buf()));
        }
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// URLのホストに一致する代替セレクタを定義順に返す
    pub fn fallback_selectors<'a>(&'a self, url: &str) -> Vec<&'a str> {
        let Some(host) = host_of(url) else {
            return Vec::new();
        };

        self.fallbacks
            .iter()
            .filter(|rule| rule.matches_host(&host))
            .flat_map(|rule| rule.selectors.iter().map(String::as_str))
            .collect()
    }
}

/// ブラウザと同じWHATWG URLパーサでホスト部分を取り出す
fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}

fn normalize_host(host: &str) -> String {
    host.trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://www.shop.bg/p/1?x=1").as_deref(), Some("www.shop.bg"));
        assert_eq!(host_of("http://127.0.0.1:8080/").as_deref(), Some("127.0.0.1"));
        assert_eq!(host_of("http://user@shop.bg").as_deref(), Some("shop.bg"));
        assert_eq!(host_of("not a url"), None);
    }

    #[test]
    fn test_fallback_selectors_match_browser_host_parsing() {
        let rules = SiteRules {
            cookie_consent: Vec::new(),
            fallbacks: vec![FallbackRule::new("shop.bg", [".p"])],
        };

        // バックスラッシュは特殊スキームではパス区切りとして扱われる
        assert_eq!(rules.fallback_selectors("https://shop.bg\\item/1"), vec![".p"]);
        assert_eq!(rules.fallback_selectors("https://SHOP.bg./item"), vec![".p"]);
        assert_eq!(rules.fallback_selectors("https://shop.bg:443/x"), vec![".p"]);
        assert_eq!(rules.fallback_selectors("https://user:pw@shop.bg/x"), vec![".p"]);
    }

    #[test]
    fn test_rule_host_normalized() {
        let rule = FallbackRule::new("WWW.Shop.BG.", [".p"]);
        assert!(rule.matches_host("shop.bg"));
        assert!(rule.matches_host("m.shop.bg."));
        assert!(!rule.matches_host("notshop.bg"));
    }

    #[test]
    fn test_fallback_selectors_by_host() {
        let rules = SiteRules {
            cookie_consent: Vec::new(),
            fallbacks: vec![
                FallbackRule::new("www.shop.bg", [".price-new", ".product-price"]),
                FallbackRule::new("other.com", [".amount"]),
            ],
        };

        assert_eq!(
            rules.fallback_selectors("https://shop.bg/item/42"),
            vec![".price-new", ".product-price"]
        );
        assert_eq!(
            rules.fallback_selectors("https://m.shop.bg/item/42"),
            vec![".price-new", ".product-price"]
        );
        assert!(rules.fallback_selectors("https://notshop.bg/").is_empty());
        assert!(rules.fallback_selectors("https://example.org/").is_empty());
    }

    #[test]
    fn test_from_json_defaults_missing_fields() {
        let rules = SiteRules::from_json(
            r#"{ "fallbacks": [{ "host": "shop.bg", "selectors": [".p"] }] }"#,
        )
        .unwrap();
        assert!(rules.cookie_consent.is_empty());
        assert_eq!(rules.fallbacks.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SiteRules::load("/definitely/missing/rules.json").unwrap_err();
        assert!(matches!(err, TrackerError::ConfigNotFound(_)));
    }
}
