//! Locators and per-page locator registries.
//!
//! A [`Locator`] is an immutable description of how to find zero or more
//! elements in the current document. Page objects declare theirs as `const`
//! items and publish them through a [`LocatorRegistry`] keyed by the semantic
//! field name, so the selector table of every screen can be inspected (and
//! reported) without touching a browser.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Selector dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `id` attribute
    Id,
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
    /// Exact link text of an anchor
    LinkText,
}

impl Strategy {
    /// Short prefix used when rendering a locator
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::LinkText => "link",
        }
    }
}

/// How to find elements in the current document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    value: Cow<'static, str>,
}

impl Locator {
    /// Locate by `id` attribute
    #[must_use]
    pub const fn id(value: &'static str) -> Self {
        Self {
            strategy: Strategy::Id,
            value: Cow::Borrowed(value),
        }
    }

    /// Locate by CSS selector
    #[must_use]
    pub const fn css(value: &'static str) -> Self {
        Self {
            strategy: Strategy::Css,
            value: Cow::Borrowed(value),
        }
    }

    /// Locate by XPath expression
    #[must_use]
    pub const fn xpath(value: &'static str) -> Self {
        Self {
            strategy: Strategy::XPath,
            value: Cow::Borrowed(value),
        }
    }

    /// Locate an anchor by its exact text
    #[must_use]
    pub const fn link_text(value: &'static str) -> Self {
        Self {
            strategy: Strategy::LinkText,
            value: Cow::Borrowed(value),
        }
    }

    /// Build a locator from a runtime string (e.g. a product name)
    #[must_use]
    pub fn dynamic(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: Cow::Owned(value.into()),
        }
    }

    /// Selector dialect
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Raw selector expression
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Equivalent CSS selector, when the dialect has one
    ///
    /// Used by backends that only speak CSS for a given query.
    #[must_use]
    pub fn as_css(&self) -> Option<String> {
        match self.strategy {
            Strategy::Id => Some(format!("#{}", self.value)),
            Strategy::Css => Some(self.value.to_string()),
            Strategy::XPath | Strategy::LinkText => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.prefix(), self.value)
    }
}

/// Named locator table for one page object
#[derive(Debug, Clone, Default)]
pub struct LocatorRegistry {
    page: &'static str,
    locators: HashMap<&'static str, Locator>,
    order: Vec<&'static str>,
}

impl LocatorRegistry {
    /// Create an empty registry for a page
    #[must_use]
    pub fn new(page: &'static str) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Add a locator under a semantic field name
    #[must_use]
    pub fn with(mut self, name: &'static str, locator: Locator) -> Self {
        if self.locators.insert(name, locator).is_none() {
            self.order.push(name);
        }
        self
    }

    /// Build a registry from a static table
    #[must_use]
    pub fn from_table(page: &'static str, table: &[(&'static str, Locator)]) -> Self {
        table
            .iter()
            .fold(Self::new(page), |reg, (name, loc)| reg.with(*name, loc.clone()))
    }

    /// Page the table belongs to
    #[must_use]
    pub const fn page(&self) -> &'static str {
        self.page
    }

    /// Look up a locator by field name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Locator> {
        self.locators.get(name)
    }

    /// Field names in declaration order
    #[must_use]
    pub fn names(&self) -> &[&'static str] {
        &self.order
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if no locator has been registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate `(name, locator)` in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Locator)> {
        self.order
            .iter()
            .filter_map(|name| self.locators.get(name).map(|loc| (*name, loc)))
    }
}

/// URL pattern matcher for page objects
///
/// Patterns support literal segments (`/cart.html`), wildcards (`/*`),
/// named path parameters (`/users/:id`) and named query parameters
/// (`/prod.html?idp_=:id`). Host and scheme are ignored.
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
    query: Vec<(String, UrlSegment)>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlSegment {
    fn parse(s: &str) -> Self {
        if s == "*" {
            Self::Wildcard
        } else if let Some(name) = s.strip_prefix(':') {
            Self::Parameter(name.to_string())
        } else {
            Self::Literal(s.to_string())
        }
    }

    fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Literal(lit) => lit == value,
            Self::Wildcard | Self::Parameter(_) => !value.is_empty(),
        }
    }
}

/// Split an absolute or relative URL into path segments and query pairs
fn split_url(url: &str) -> (Vec<&str>, Vec<(&str, &str)>) {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path_and_query = if url.contains("://") {
        without_scheme
            .find('/')
            .map_or("", |idx| &without_scheme[idx..])
    } else {
        without_scheme
    };
    let path_and_query = path_and_query.split('#').next().unwrap_or_default();
    let (path, query) = path_and_query
        .split_once('?')
        .unwrap_or((path_and_query, ""));

    let segments = path.split('/').filter(|s| !s.is_empty()).collect();
    let pairs = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect();
    (segments, pairs)
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let (segments, pairs) = split_url(pattern);
        Self {
            pattern: pattern.to_string(),
            segments: segments.into_iter().map(UrlSegment::parse).collect(),
            query: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), UrlSegment::parse(v)))
                .collect(),
        }
    }

    /// Check if a URL matches the pattern
    ///
    /// Extra query parameters in the URL are allowed; every parameter named by
    /// the pattern must be present.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let (url_segments, url_pairs) = split_url(url);

        // "/" and "/index.html" are the same document on static sites
        let url_segments: Vec<&str> = if self.segments.is_empty() {
            url_segments
                .into_iter()
                .filter(|s| *s != "index.html")
                .collect()
        } else {
            url_segments
        };

        if url_segments.len() != self.segments.len() {
            return false;
        }
        let path_ok = self
            .segments
            .iter()
            .zip(&url_segments)
            .all(|(seg, value)| seg.accepts(value));

        path_ok
            && self.query.iter().all(|(key, seg)| {
                url_pairs
                    .iter()
                    .any(|(k, v)| k == key && seg.accepts(v))
            })
    }

    /// Extract named parameters (path and query) from a URL
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();
        let (url_segments, url_pairs) = split_url(url);

        for (segment, value) in self.segments.iter().zip(&url_segments) {
            if let UrlSegment::Parameter(name) = segment {
                let _ = params.insert(name.clone(), (*value).to_string());
            }
        }
        for (key, segment) in &self.query {
            if let UrlSegment::Parameter(name) = segment {
                if let Some((_, v)) = url_pairs.iter().find(|(k, _)| k == key) {
                    let _ = params.insert(name.clone(), (*v).to_string());
                }
            }
        }
        params
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod locator_tests {
        use super::*;

        const LOGIN_BUTTON: Locator = Locator::css("button[onclick='logIn()']");

        #[test]
        fn test_const_construction() {
            assert_eq!(LOGIN_BUTTON.strategy(), Strategy::Css);
            assert_eq!(LOGIN_BUTTON.value(), "button[onclick='logIn()']");
        }

        #[test]
        fn test_display_carries_dialect() {
            assert_eq!(Locator::id("cartur").to_string(), "id=cartur");
            assert_eq!(Locator::link_text("Delete").to_string(), "link=Delete");
            assert_eq!(
                Locator::xpath("//a[text()='Delete']").to_string(),
                "xpath=//a[text()='Delete']"
            );
        }

        #[test]
        fn test_dynamic_equals_static() {
            let dynamic = Locator::dynamic(Strategy::LinkText, String::from("Nexus 6"));
            assert_eq!(dynamic, Locator::link_text("Nexus 6"));
        }

        #[test]
        fn test_as_css() {
            assert_eq!(Locator::id("totalp").as_css().as_deref(), Some("#totalp"));
            assert_eq!(Locator::css(".card").as_css().as_deref(), Some(".card"));
            assert!(Locator::link_text("Home").as_css().is_none());
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_from_table_preserves_order() {
            let reg = LocatorRegistry::from_table(
                "login",
                &[
                    ("username", Locator::id("loginusername")),
                    ("password", Locator::id("loginpassword")),
                ],
            );
            assert_eq!(reg.page(), "login");
            assert_eq!(reg.names(), &["username", "password"]);
            assert_eq!(reg.get("password"), Some(&Locator::id("loginpassword")));
            assert!(reg.get("missing").is_none());
        }

        #[test]
        fn test_duplicate_name_replaces() {
            let reg = LocatorRegistry::new("p")
                .with("a", Locator::id("one"))
                .with("a", Locator::id("two"));
            assert_eq!(reg.len(), 1);
            assert_eq!(reg.get("a"), Some(&Locator::id("two")));
        }

        #[test]
        fn test_empty() {
            assert!(LocatorRegistry::new("p").is_empty());
        }
    }

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_root_matches_index() {
            let matcher = UrlMatcher::new("/");
            assert!(matcher.matches("https://www.demoblaze.com/"));
            assert!(matcher.matches("https://www.demoblaze.com/index.html"));
            assert!(matcher.matches("https://www.demoblaze.com"));
            assert!(!matcher.matches("https://www.demoblaze.com/cart.html"));
        }

        #[test]
        fn test_literal_match() {
            let matcher = UrlMatcher::new("/cart.html");
            assert!(matcher.matches("https://www.demoblaze.com/cart.html"));
            assert!(matcher.matches("/cart.html#"));
            assert!(!matcher.matches("/prod.html"));
        }

        #[test]
        fn test_query_parameter() {
            let matcher = UrlMatcher::new("/prod.html?idp_=:id");
            assert!(matcher.matches("https://www.demoblaze.com/prod.html?idp_=7"));
            assert!(!matcher.matches("https://www.demoblaze.com/prod.html"));
            let params = matcher.extract_params("https://www.demoblaze.com/prod.html?idp_=7");
            assert_eq!(params.get("id").map(String::as_str), Some("7"));
        }

        #[test]
        fn test_path_parameter() {
            let matcher = UrlMatcher::new("/users/:id");
            assert!(matcher.matches("/users/42"));
            assert!(!matcher.matches("/users"));
            assert_eq!(
                matcher.extract_params("/users/42").get("id"),
                Some(&"42".to_string())
            );
        }

        #[test]
        fn test_pattern_getter() {
            assert_eq!(UrlMatcher::new("/cart.html").pattern(), "/cart.html");
        }
    }
}
