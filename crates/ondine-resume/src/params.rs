//! Route parameter surfaces for fallback shells.
//!
//! A fallback shell is rendered before the concrete values of its
//! dynamic route parameters are known. The route-resolution layer
//! generates one placeholder token per unknown parameter, the renderer
//! bakes those tokens into its continuation payload, and the encoded
//! state records the `(name, token)` pairs so [`crate::decode_state`]
//! can splice in the real values at request time.
//!
//! Tokens carry a process-wide random suffix so two routes rendered by
//! different builds can never collide; the codec itself only relies on
//! tokens being literal, non-overlapping substrings.

use std::hash::Hasher;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use facet::Facet;
use indexmap::IndexMap;
use rapidhash::fast::RapidHasher;

/// One fallback parameter: the route parameter name and the
/// placeholder token standing in for its value.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct FallbackParam {
    /// Route parameter name, e.g. `slug`.
    pub name: String,
    /// Placeholder token embedded verbatim in the continuation payload.
    pub token: String,
}

/// Ordered fallback route parameters for one paused render.
///
/// Created once per render of a fallback shell, consumed exactly once
/// when the state is decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackRouteParams {
    entries: Vec<FallbackParam>,
}

impl FallbackRouteParams {
    /// Generate placeholder tokens for the given parameter names.
    pub fn for_names<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let entries = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                let token = placeholder_token(&name);
                FallbackParam { name, token }
            })
            .collect();
        Self { entries }
    }

    /// Record a parameter with a caller-supplied token.
    pub fn insert(&mut self, name: impl Into<String>, token: impl Into<String>) {
        self.entries.push(FallbackParam {
            name: name.into(),
            token: token.into(),
        });
    }

    /// Whether any parameters are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The placeholder token for a parameter name, if recorded.
    pub fn token_for(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.token.as_str())
    }

    /// The recorded `(name, token)` pairs, in insertion order.
    pub fn entries(&self) -> &[FallbackParam] {
        &self.entries
    }
}

/// The value of one route parameter on the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteParamValue {
    /// A single path segment, e.g. `slug = "hello-world"`.
    One(String),
    /// A catch-all parameter's segments, e.g. `path = ["docs", "api"]`.
    Many(Vec<String>),
}

/// The route parameters resolved for the current request.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    entries: IndexMap<String, RouteParamValue>,
}

impl RequestParams {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single-segment parameter value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(name.into(), RouteParamValue::One(value.into()));
    }

    /// Set a catch-all parameter's segments.
    pub fn set_many(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.entries
            .insert(name.into(), RouteParamValue::Many(values));
    }

    /// Resolve a parameter to the text substituted for its placeholder.
    ///
    /// Catch-all segments are joined with `/`; an absent parameter
    /// resolves to the empty string.
    pub(crate) fn resolve(&self, name: &str) -> String {
        match self.entries.get(name) {
            None => String::new(),
            Some(RouteParamValue::One(value)) => value.clone(),
            Some(RouteParamValue::Many(values)) => values.join("/"),
        }
    }
}

/// Generate the placeholder token for a dynamic route parameter.
///
/// Format: `%%drp:<name>:<suffix>%%` where `<suffix>` is random per
/// process, so shells rendered by different builds cannot share
/// tokens. Stable within a process: the same name always yields the
/// same token.
pub fn placeholder_token(name: &str) -> String {
    format!("%%drp:{name}:{}%%", process_suffix())
}

/// Process-wide random suffix for placeholder tokens.
fn process_suffix() -> &'static str {
    static SUFFIX: OnceLock<String> = OnceLock::new();
    SUFFIX.get_or_init(|| {
        let mut hasher = RapidHasher::default();
        hasher.write(&std::process::id().to_le_bytes());
        if let Ok(since_epoch) = SystemTime::now().duration_since(UNIX_EPOCH) {
            hasher.write(&since_epoch.as_nanos().to_le_bytes());
        }
        format!("{:08x}", hasher.finish() >> 32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_token_shape() {
        let token = placeholder_token("slug");
        assert!(token.starts_with("%%drp:slug:"));
        assert!(token.ends_with("%%"));
    }

    #[test]
    fn test_placeholder_token_stable_within_process() {
        assert_eq!(placeholder_token("slug"), placeholder_token("slug"));
    }

    #[test]
    fn test_placeholder_tokens_distinct_per_name() {
        assert_ne!(placeholder_token("slug"), placeholder_token("lang"));
    }

    #[test]
    fn test_for_names_records_in_order() {
        let params = FallbackRouteParams::for_names(["lang", "slug"]);
        assert_eq!(params.len(), 2);
        assert_eq!(params.entries()[0].name, "lang");
        assert_eq!(params.entries()[1].name, "slug");
        assert_eq!(params.token_for("slug"), Some(placeholder_token("slug").as_str()));
    }

    #[test]
    fn test_resolve() {
        let mut params = RequestParams::new();
        params.set("slug", "hello");
        params.set_many("path", vec!["docs".to_string(), "api".to_string()]);

        assert_eq!(params.resolve("slug"), "hello");
        assert_eq!(params.resolve("path"), "docs/api");
        assert_eq!(params.resolve("missing"), "");
    }
}
