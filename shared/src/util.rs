//! Small utilities shared across crates

use chrono::{DateTime, Utc};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Expand a `YYYY-MM-DD HH:mm:ss` style pattern against a timestamp.
///
/// Supported tokens: YYYY, MM, DD, HH, mm, ss. Replacement values are all
/// digits, so expansion order does not matter.
pub fn format_timestamp(ts: &DateTime<Utc>, format: &str) -> String {
    format
        .replace("YYYY", &ts.format("%Y").to_string())
        .replace("MM", &ts.format("%m").to_string())
        .replace("DD", &ts.format("%d").to_string())
        .replace("HH", &ts.format("%H").to_string())
        .replace("mm", &ts.format("%M").to_string())
        .replace("ss", &ts.format("%S").to_string())
}

/// Render rows as CSV with a UTF-8 BOM so spreadsheet tools pick up the
/// encoding. Fields containing commas, quotes or newlines are quoted with
/// doubled inner quotes.
pub fn export_csv(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::from("\u{feff}");
    out.push_str(
        &headers
            .iter()
            .map(|h| csv_field(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        out.push('\n');
        out.push_str(
            &row.iter()
                .map(|f| csv_field(f))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
