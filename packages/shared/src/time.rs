use chrono::{DateTime, Utc};

/// Get current Unix timestamp (milliseconds)
pub fn get_unix_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a Unix timestamp (milliseconds) as RFC 3339 in UTC.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn timestamp_to_rfc3339(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_recent() {
        // テスト項目: 現在時刻のミリ秒が 2020 年以降を指す
        // when (操作):
        let now = get_unix_timestamp_millis();

        // then (期待する結果):
        assert!(now > 1_577_836_800_000);
    }

    #[test]
    fn test_timestamp_to_rfc3339() {
        // テスト項目: ミリ秒タイムスタンプを RFC 3339 文字列に変換できる
        // given (前提条件):
        let millis = 1_672_498_800_000i64;

        // when (操作):
        let formatted = timestamp_to_rfc3339(millis);

        // then (期待する結果):
        assert_eq!(formatted.as_deref(), Some("2022-12-31T15:00:00+00:00"));
    }
}
