use async_trait::async_trait;

use crate::error::TrackerError;
use crate::types::FetchOutcome;

/// URLとセレクタから価格テキストを取得する
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// 失敗は `FetchOutcome::Failed` として返す（エラーは伝播しない）
    async fn fetch(&self, url: &str, selector: &str) -> FetchOutcome;
}

/// 1回の取得専用にブラウザを起動する
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, TrackerError>;
}

/// 起動済みブラウザの1ページ分の操作
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// ページ遷移
    async fn goto(&self, url: &str) -> Result<(), TrackerError>;

    /// セレクタに一致する要素が表示されているか
    async fn is_visible(&self, selector: &str) -> Result<bool, TrackerError>;

    /// 要素の表示テキスト（要素がなければ `None`）
    async fn text(&self, selector: &str) -> Result<Option<String>, TrackerError>;

    /// 要素をクリック（要素がなければ `false`）
    async fn click(&self, selector: &str) -> Result<bool, TrackerError>;

    /// デバッグ用スクリーンショット (PNG)
    async fn screenshot(&self) -> Result<Vec<u8>, TrackerError>;

    /// リソース解放。どの終了経路でも必ず呼ばれる
    async fn close(&mut self) -> Result<(), TrackerError>;
}
