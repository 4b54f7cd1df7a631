//! Same-host boundary for discovered links.

use url::Url;

/// Resolve an `href` found on `page_url` into an absolute URL string.
///
/// Returns `None` when either side fails to parse. Fragments and query
/// strings are kept as-is, so `/a#x` and `/a` resolve to distinct URLs.
pub fn resolve(page_url: &str, href: &str) -> Option<String> {
    let base = Url::parse(page_url).ok()?;
    let resolved = base.join(href.trim()).ok()?;
    Some(resolved.to_string())
}

/// The `host[:port]` of a URL. Default ports are folded in so that
/// `http://a/` and `http://a:80/` share a location.
fn network_location(url: &Url) -> Option<(String, Option<u16>)> {
    let host = url.host_str()?;
    Some((host.to_ascii_lowercase(), url.port_or_known_default()))
}

/// Decides whether links belong to the crawl's target site.
#[derive(Debug, Clone)]
pub struct DomainScope {
    base: Url,
}

impl DomainScope {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// True iff `candidate` has the same network location as the base URL.
    /// Paths are not considered; `mailto:` and friends never match.
    pub fn contains(&self, candidate: &str) -> bool {
        let Ok(candidate) = Url::parse(candidate) else {
            return false;
        };
        match (network_location(&self.base), network_location(&candidate)) {
            (Some(base), Some(other)) => base == other,
            _ => false,
        }
    }

    /// Resolve `href` against the page it was found on and keep it only if
    /// it stays inside the scope.
    pub fn admit(&self, page_url: &str, href: &str) -> Option<String> {
        let absolute = resolve(page_url, href)?;
        self.contains(&absolute).then_some(absolute)
    }
}

/// Free-standing form of [`DomainScope::contains`].
pub fn in_scope(base_url: &str, candidate_url: &str) -> bool {
    DomainScope::new(base_url)
        .map(|scope| scope.contains(candidate_url))
        .unwrap_or(false)
}
