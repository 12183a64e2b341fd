//! Endpoint URL helpers.

/// Strip trailing slashes so endpoint paths can be appended safely.
///
/// ```
/// use chatbox::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.openai.com/v1//"), "https://api.openai.com/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> &str {
    base_url.trim().trim_end_matches('/')
}

/// Join a base URL and an endpoint path with exactly one slash between them.
///
/// ```
/// use chatbox::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.openai.com/v1/", "/chat/completions"),
///     "https://api.openai.com/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        endpoint.trim_start_matches('/')
    )
}
