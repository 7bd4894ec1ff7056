//! 価格テキストの取得（静的 / 動的）

mod chrome;
mod dynamic;
mod static_fetch;

pub use chrome::{ChromeLauncher, ChromeSession};
pub use dynamic::DynamicFetcher;
pub use static_fetch::{extract_text, StaticFetcher};
