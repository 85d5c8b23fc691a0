//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{transaction_id}', use [format_endpoint].

/// The root route, answers with a short status message.
pub const ROOT: &str = "/";
/// The route for exchanging a username and password for a session token.
pub const LOG_IN: &str = "/login";
/// The route for listing the spending categories.
pub const CATEGORIES: &str = "/categories";
/// The route describing the accepted filter field and operator codes.
pub const FILTERS: &str = "/filters";
/// The route to create transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to edit or delete a single transaction.
pub const TRANSACTION: &str = "/transactions/{transaction_id}";
/// The route to get a filtered page of transactions.
pub const SEARCH: &str = "/transactions/search";
/// The route to get filtered per-category sums.
pub const SUMMARY: &str = "/transactions/summary";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with a right brace, e.g.
/// '{transaction_id}' in '/transactions/{transaction_id}'. Only the first
/// parameter is replaced.
///
/// If no parameter is found in `endpoint_path`, the original path is returned.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    match endpoint_path[start..].find('}') {
        Some(length) => format!(
            "{}{id}{}",
            &endpoint_path[..start],
            &endpoint_path[start + length + 1..]
        ),
        None => format!("{}{id}", &endpoint_path[..start]),
    }
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::FILTERS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::SEARCH);
        assert_endpoint_is_valid_uri(endpoints::SUMMARY);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::TRANSACTION, 1));
    }

    #[test]
    fn replaces_parameter() {
        let formatted_path = format_endpoint(endpoints::TRANSACTION, 42);

        assert_eq!(formatted_path, "/transactions/42");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }
}
