/// URL inspection helpers: registrable domain, host label, browser-internal pages
use url::Url;

use crate::category::title_case;

/// Schemes of pages the browser owns; these tabs are never moved or grouped
const INTERNAL_SCHEMES: &[&str] = &[
    "chrome",
    "chrome-extension",
    "chrome-search",
    "chrome-untrusted",
    "devtools",
    "edge",
    "brave",
    "about",
    "view-source",
    "moz-extension",
];

const ERROR_PAGE_SCHEME: &str = "chrome-error";

/// Extract the registrable domain from a URL with smart TLD handling
///
/// Keeps the last two host labels, or the last three when the TLD is two
/// letters preceded by "co" or "com":
/// - https://ai.microsoft.com → microsoft.com
/// - https://news.bbc.co.uk/article → bbc.co.uk
/// - https://shop.example.com.au/products → example.com.au
///
/// Localhost and IP addresses are returned as-is.
pub fn extract_domain(url: &str) -> Option<String> {
    let hostname = extract_hostname(url)?;

    if hostname == "localhost" || is_ip_address(&hostname) {
        return Some(hostname);
    }

    let parts: Vec<&str> = hostname.split('.').collect();
    if parts.len() < 2 {
        return Some(hostname);
    }

    let tld = parts[parts.len() - 1];
    let num_parts = if parts.len() >= 3
        && tld.len() == 2
        && matches!(parts[parts.len() - 2], "co" | "com")
    {
        3
    } else {
        2
    };

    Some(parts[parts.len() - num_parts..].join("."))
}

/// Label used when a tab cannot be analyzed: the first DNS label of the host
/// (ignoring a leading "www."), capitalized.
///
/// - https://www.github.com/rust → Github
/// - https://docs.rs/serde → Docs
pub fn host_label(url: &str) -> Option<String> {
    let hostname = extract_hostname(url)?;
    let hostname = hostname.strip_prefix("www.").unwrap_or(&hostname);
    let first = hostname.split('.').next().filter(|label| !label.is_empty())?;
    Some(title_case(first))
}

/// True for browser-owned pages (settings, new tab, extension pages, ...)
pub fn is_internal_url(url: &str) -> bool {
    scheme_of(url).is_some_and(|scheme| INTERNAL_SCHEMES.contains(&scheme.as_str()))
}

/// True for the browser's own network error page
pub fn is_error_page(url: &str) -> bool {
    scheme_of(url).is_some_and(|scheme| scheme == ERROR_PAGE_SCHEME)
}

fn scheme_of(url: &str) -> Option<String> {
    let (scheme, _) = url.trim().split_once(':')?;
    Some(scheme.to_ascii_lowercase())
}

fn extract_hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

fn is_ip_address(s: &str) -> bool {
    s.parse::<std::net::IpAddr>().is_ok()
}
