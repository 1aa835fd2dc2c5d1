//! URL normalization for API endpoint construction.

/// Strip trailing slashes so endpoint joins never produce `//`.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash between.
///
/// ```
/// use atlas_chat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.atlashq.io/v1/", "/agents/a1/tools"),
///     "https://api.atlashq.io/v1/agents/a1/tools"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}
