/// Shared helpers for the API layer.
use chrono::Utc;

/// Current time as an RFC 3339 string, the format every table stores.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Map the `use_ordering` site setting to an ORDER BY fragment.
/// Unknown values fall back to the manual ordering; the returned fragment is
/// always one of these constants, never user input.
pub fn order_by_clause(mode: &str) -> &'static str {
    match mode {
        "name" => "name COLLATE NOCASE ASC",
        "created_at" => "created_at ASC",
        _ => "order_index ASC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_clause() {
        assert_eq!(order_by_clause("name"), "name COLLATE NOCASE ASC");
        assert_eq!(order_by_clause("created_at"), "created_at ASC");
        assert_eq!(order_by_clause("order_index"), "order_index ASC");
        assert_eq!(order_by_clause("orderId; DROP TABLE"), "order_index ASC");
        assert_eq!(order_by_clause(""), "order_index ASC");
    }

    #[test]
    fn test_now_rfc3339_parses_back() {
        let now = now_rfc3339();
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
    }
}
