use std::path::Path;

use tracing::{debug, warn};

use crate::error::TrackerError;
use crate::types::ProductSpec;

/// products.csv を読み込む（列: product_name,url,selector,type）
///
/// ファイルがなければ `ConfigNotFound`。実行全体を止める唯一のエラー。
/// 列が欠けた行などは警告を出して読み飛ばし、前後の行はそのまま処理する。
pub fn load_products(path: impl AsRef<Path>) -> Result<Vec<ProductSpec>, TrackerError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TrackerError::ConfigNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut products = Vec::new();
    for row in reader.deserialize::<ProductSpec>() {
        match row {
            Ok(product) => products.push(product),
            Err(e) => warn!("Skipping malformed product row: {}", e),
        }
    }

    debug!("Loaded {} products from {:?}", products.len(), path);
    Ok(products)
}
