//! 価格ログの集計（商品ごとの最新価格）

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::types::{PriceRecord, TIMESTAMP_FORMAT};

/// 表示できる価格文字列の最大長
const MAX_PRICE_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct LatestPrice {
    pub product: String,
    pub date: String,
    pub price: String,
}

impl LatestPrice {
    /// 有効な価格なら小数2桁で整形
    pub fn formatted_price(&self) -> Option<String> {
        is_valid_price(&self.price)
            .then(|| parse_leading_price(&self.price))
            .flatten()
            .map(|v| format!("{:.2}", v))
    }
}

/// 先頭の数値部分だけを読む（`"1.234.56"` → `1.234`）
pub fn parse_leading_price(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if frac_end > frac_start || digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }
    s[..end].parse().ok()
}

pub fn is_valid_price(s: &str) -> bool {
    parse_leading_price(s).is_some_and(|v| v.is_finite() && v.to_string().len() <= MAX_PRICE_LEN)
}

/// 商品ごとに日時が最も新しいレコードを返す
///
/// レコードを日時で安定ソートしてから走査するため、並びは時系列の初出順になる。
/// 同時刻は先勝ち。日時を読めないレコードは先頭に寄せ、置き換えの対象にしない。
pub fn latest_prices(records: &[PriceRecord]) -> Vec<LatestPrice> {
    let mut dated: Vec<(Option<NaiveDateTime>, &PriceRecord)> = records
        .iter()
        .map(|r| (NaiveDateTime::parse_from_str(&r.timestamp, TIMESTAMP_FORMAT).ok(), r))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut latest: Vec<(LatestPrice, Option<NaiveDateTime>)> = Vec::new();

    for (date, record) in dated {
        let entry = LatestPrice {
            product: record.product_name.clone(),
            date: record.timestamp.clone(),
            price: record.price.clone(),
        };

        match index.get(record.product_name.as_str()) {
            Some(&i) => {
                let slot = &mut latest[i];
                if let (Some(new), Some(current)) = (date, slot.1) {
                    if new > current {
                        *slot = (entry, date);
                    }
                }
            }
            None => {
                index.insert(record.product_name.as_str(), latest.len());
                latest.push((entry, date));
            }
        }
    }

    latest.into_iter().map(|(entry, _)| entry).collect()
}
