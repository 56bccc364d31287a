//! Occurrence identifier and details derivation

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Derives `occurrenceID` from a photo page URL.
///
/// Hosts starting with `f` (`flickr.com`, `farm1.static.flickr.com`) get a
/// `www.` prefix and the result always ends with `/`. Applying it to its
/// own output returns the same string.
pub fn occurrence_id(page_url: &str) -> String {
    let page_url = page_url.trim();
    let mut id = match Url::parse(page_url) {
        Ok(mut url) => {
            if let Some(host) = url.host_str().map(str::to_string) {
                if host.starts_with('f') && url.set_host(Some(&format!("www.{host}"))).is_err() {
                    tracing::debug!(url = %page_url, "Could not prefix host with www.");
                }
            }
            url.to_string()
        }
        Err(_) => page_url.replacen("://f", "://www.f", 1),
    };
    if !id.ends_with('/') {
        id.push('/');
    }
    id
}

fn bhl_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"http://www\.biodiversitylibrary\.org/page/\d+")
            .expect("biodiversity library pattern is valid")
    })
}

/// First Biodiversity Heritage Library page link in `description`, if any.
pub fn biodiversity_library_link(description: &str) -> Option<&str> {
    bhl_pattern().find(description).map(|m| m.as_str())
}
