//! 価格ログ (price_data.csv)
//!
//! 追記専用。ファイルがなければヘッダー行を書いてから追記する。

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::TrackerError;
use crate::types::PriceRecord;

pub const LOG_HEADER: [&str; 3] = ["date", "product", "price"];

#[derive(Debug, Clone)]
pub struct PriceLog {
    path: PathBuf,
}

impl PriceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1行追記する
    pub fn append(&self, record: &PriceRecord) -> Result<(), TrackerError> {
        let is_new = !self.path.exists();

        if is_new {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            info!("Creating price log {:?}", self.path);
            writer.write_record(LOG_HEADER)?;
        }

        writer.write_record([
            record.timestamp.as_str(),
            record.product_name.as_str(),
            record.price.as_str(),
        ])?;
        writer.flush()?;

        debug!("Appended {:?} to {:?}", record, self.path);
        Ok(())
    }

    /// 全レコードを読み込む（ファイルがなければ空）
    pub fn read_all(&self) -> Result<Vec<PriceRecord>, TrackerError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        Ok(reader
            .deserialize::<PriceRecord>()
            .collect::<Result<Vec<_>, _>>()?)
    }
}
