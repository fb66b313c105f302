//! URL helpers for building API endpoints from host/port settings.

/// Build the `http://host:port` base URL for a server.
///
/// IPv6 literals are bracketed so the port separator stays unambiguous.
///
/// ```
/// use chatloop::utils::url::base_url;
///
/// assert_eq!(base_url("127.0.0.1", 9990), "http://127.0.0.1:9990");
/// assert_eq!(base_url("::1", 8080), "http://[::1]:8080");
/// ```
pub fn base_url(host: &str, port: u16) -> String {
    let host = host.trim();
    if host.contains(':') && !host.starts_with('[') {
        format!("http://[{host}]:{port}")
    } else {
        format!("http://{host}:{port}")
    }
}

/// Join a base URL and an endpoint path with exactly one slash between them.
///
/// ```
/// use chatloop::utils::url::endpoint_url;
///
/// assert_eq!(
///     endpoint_url("http://127.0.0.1:9990/", "/v1/chat/completions"),
///     "http://127.0.0.1:9990/v1/chat/completions"
/// );
/// ```
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
