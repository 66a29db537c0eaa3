//! Issuer label derivation for provisioning payloads.

/// Brand-name label used when no site URL is configured. Returned as-is,
/// never escaped.
const DEFAULT_ISSUER: &str = "Mattermost";

/// Derive the issuer label from the configured site URL.
///
/// Trims whitespace, strips a leading `http://`/`https://` scheme and a
/// leading `www.`, keeps the remaining `host[:port][/path]` intact, and
/// percent-escapes the result so it can be embedded in the query string of
/// an `otpauth://` URL. An empty (or all-whitespace) input falls back to
/// [`DEFAULT_ISSUER`].
pub fn issuer_from_site_url(site_url: &str) -> String {
    let trimmed = site_url.trim();
    if trimmed.is_empty() {
        return DEFAULT_ISSUER.to_string();
    }

    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let host = host.strip_prefix("www.").unwrap_or(host);

    urlencoding::encode(host).into_owned()
}
