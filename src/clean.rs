//! 価格文字列の正規化
//!
//! 処理順は固定: 通貨記号除去 → trim → `,` を `.` に置換 → 数字と `.` 以外を除去。
//! 順序を変えると桁区切り付きの入力で結果が変わる（`"1.234,56"` → `"1.234.56"`）。

/// 除去する通貨表記
const CURRENCY_MARKERS: [&str; 2] = ["лв.", "BGN"];

pub fn clean_price(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut cleaned = raw.to_string();
    for marker in CURRENCY_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }

    cleaned
        .trim()
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// `None` はそのまま返す
pub fn clean_price_opt(raw: Option<&str>) -> Option<String> {
    raw.map(clean_price)
}
