use std::collections::HashMap;

use meteora_types::{DEFAULT_LIMIT, DEFAULT_OFFSET};
use tracing::debug;

/// Raw pagination parameters as they arrive on a fetch request.
#[derive(Debug, Default, Clone)]
pub struct FetchQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl FetchQuery {
    /// Pick `limit`/`offset` out of a parsed query string, ignoring anything else.
    pub fn from_pairs(pairs: &HashMap<String, String>) -> Self {
        Self {
            limit: pairs.get("limit").cloned(),
            offset: pairs.get("offset").cloned(),
        }
    }
}

/// Validated page bounds: `limit >= 1`, `offset >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub limit: i64,
    pub offset: i64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl PageParams {
    /// Each value falls back to its default on its own when it is missing,
    /// not an integer, or out of range.
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = match limit.map(str::parse::<i64>) {
            Some(Ok(n)) if n > 0 => n,
            other => {
                debug!("Using default limit (got {:?})", other);
                DEFAULT_LIMIT
            }
        };
        let offset = match offset.map(str::parse::<i64>) {
            Some(Ok(n)) if n >= 0 => n,
            other => {
                debug!("Using default offset (got {:?})", other);
                DEFAULT_OFFSET
            }
        };
        Self { limit, offset }
    }
}

impl From<&FetchQuery> for PageParams {
    fn from(query: &FetchQuery) -> Self {
        Self::from_query(query.limit.as_deref(), query.offset.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_use_defaults() {
        assert_eq!(PageParams::from_query(None, None), PageParams { limit: 10, offset: 0 });
    }

    #[test]
    fn valid_values_are_kept() {
        assert_eq!(PageParams::from_query(Some("3"), Some("7")), PageParams { limit: 3, offset: 7 });
        assert_eq!(PageParams::from_query(Some("1"), Some("0")), PageParams { limit: 1, offset: 0 });
    }

    #[test]
    fn invalid_values_fall_back_independently() {
        assert_eq!(PageParams::from_query(Some("0"), Some("4")), PageParams { limit: 10, offset: 4 });
        assert_eq!(PageParams::from_query(Some("-2"), Some("-1")), PageParams { limit: 10, offset: 0 });
        assert_eq!(PageParams::from_query(Some("abc"), Some("2")), PageParams { limit: 10, offset: 2 });
        assert_eq!(PageParams::from_query(Some("5"), Some("1.5")), PageParams { limit: 5, offset: 0 });
        assert_eq!(PageParams::from_query(Some(""), Some("")), PageParams::default());
    }

    #[test]
    fn query_pairs_ignore_other_keys() {
        let pairs: HashMap<String, String> = [("limit", "2"), ("offset", "1"), ("sort", "asc")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let query = FetchQuery::from_pairs(&pairs);
        assert_eq!(PageParams::from(&query), PageParams { limit: 2, offset: 1 });
    }
}
