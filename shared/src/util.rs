/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Prefixed random identifier, e.g. `ord-6f1c...`
pub fn prefixed_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_ids_are_unique() {
        let a = prefixed_id("ord");
        let b = prefixed_id("ord");
        assert!(a.starts_with("ord-"));
        assert_ne!(a, b);
    }
}
