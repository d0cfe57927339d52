//! Common helpers shared across tool definitions.

/// Default number of adult travellers.
pub fn default_adults() -> u32 {
    1
}

/// Default cap on returned results.
pub fn default_max() -> u32 {
    10
}

/// Append a query parameter when the value is present.
pub fn push_opt<T: ToString>(
    query: &mut Vec<(&'static str, String)>,
    key: &'static str,
    value: Option<T>,
) {
    if let Some(value) = value {
        query.push((key, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_opt_present() {
        let mut query = vec![("origin", "JFK".to_string())];
        push_opt(&mut query, "nonStop", Some(true));
        assert_eq!(query.len(), 2);
        assert_eq!(query[1], ("nonStop", "true".to_string()));
    }

    #[test]
    fn test_push_opt_absent() {
        let mut query: Vec<(&'static str, String)> = Vec::new();
        push_opt::<String>(&mut query, "returnDate", None);
        assert!(query.is_empty());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_adults(), 1);
        assert_eq!(default_max(), 10);
    }
}
