//! Postponed render state encoding and decoding.
//!
//! The wire layout is a tuple whose arity discriminates the state
//! kind — there is no separate type tag:
//!
//! | arity | layout                                      | state |
//! |-------|---------------------------------------------|-------|
//! | 1     | `[cache]`                                   | data-only |
//! | 2     | `[data, cache]`                             | HTML |
//! | 3     | `[replacements, data, cache]`               | HTML, fallback shell |
//!
//! `data` is a JSON blob of the prelude marker and the renderer's
//! opaque continuation payload; `replacements` is a JSON list of
//! `(name, token)` pairs; `cache` is a serialized
//! [`ResumeDataCache`] snapshot. Arity is load-bearing: any other
//! count is rejected as a named error rather than misread.

use facet::Facet;
use ondine_tuple::{decode_tuple, encode_tuple};

use crate::cache::ResumeDataCache;
use crate::params::{FallbackParam, FallbackRouteParams, RequestParams};
use crate::{Error, Result};

/// How much of the static HTML shell existed when the render paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum PreludeState {
    /// The render paused before producing any shell content.
    Empty,
    /// Some of the shell was already produced.
    Full,
}

/// The JSON blob carried as the `data` tuple element.
#[derive(Debug, Clone, Facet)]
struct HtmlStateBlob {
    prelude: PreludeState,
    postponed: String,
}

/// A decoded postponed render state, ready to hand to the renderer.
#[derive(Debug)]
pub enum PostponedState {
    /// The render paused before any HTML was produced; only the cache
    /// snapshot survives.
    Data {
        /// Reconstructed resume data cache.
        cache: ResumeDataCache,
    },
    /// The render paused partway through HTML production.
    Html {
        /// How much of the shell existed at pause time.
        prelude: PreludeState,
        /// The renderer's opaque continuation payload. Never
        /// interpreted here beyond placeholder substitution.
        postponed: String,
        /// Reconstructed resume data cache.
        cache: ResumeDataCache,
    },
}

impl PostponedState {
    /// Whether this is a data-only state.
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    /// Whether this is an HTML state.
    pub fn is_html(&self) -> bool {
        matches!(self, Self::Html { .. })
    }

    /// The cache snapshot carried by either variant.
    pub fn cache(&self) -> &ResumeDataCache {
        match self {
            Self::Data { cache } | Self::Html { cache, .. } => cache,
        }
    }
}

/// Encode a data-only postponed state.
///
/// Awaits the cache snapshot's serialization (draining any streamed
/// entries), then wraps it as a 1-element tuple.
pub async fn encode_data_state(cache: &mut ResumeDataCache) -> String {
    encode_tuple(&[cache.serialize().await])
}

/// Encode an HTML postponed state.
///
/// Without fallback params this is a 2-element tuple; with them, the
/// serialized replacement list is prepended as a third element. The
/// placeholder tokens are expected to already sit verbatim inside
/// `postponed` wherever the real parameter values belong.
pub async fn encode_html_state(
    postponed: &str,
    prelude: PreludeState,
    fallback_params: Option<&FallbackRouteParams>,
    cache: &mut ResumeDataCache,
) -> String {
    let data_blob = facet_json::to_string(&HtmlStateBlob {
        prelude,
        postponed: postponed.to_string(),
    });
    let cache_blob = cache.serialize().await;

    match fallback_params {
        Some(params) if !params.is_empty() => {
            let replacements_blob = facet_json::to_string(&params.entries().to_vec());
            encode_tuple(&[replacements_blob, data_blob, cache_blob])
        }
        _ => encode_tuple(&[data_blob, cache_blob]),
    }
}

/// Decode an encoded postponed state, substituting the current
/// request's route parameter values for any recorded placeholders.
///
/// Never fails: a malformed, truncated, or version-skewed blob is
/// logged and degrades to an empty data-only state, which makes the
/// request render from scratch instead of resuming. Substituted
/// parameter values are spliced in verbatim (they are URL path
/// segments; no re-escaping is applied).
pub fn decode_state(encoded: &str, params: &RequestParams) -> PostponedState {
    match decode_state_inner(encoded, params) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!(%error, "failed to decode postponed state, rendering from scratch");
            PostponedState::Data {
                cache: ResumeDataCache::empty(),
            }
        }
    }
}

fn decode_state_inner(encoded: &str, params: &RequestParams) -> Result<PostponedState> {
    let parts = decode_tuple(encoded)?;
    match parts.as_slice() {
        [cache_blob] => Ok(PostponedState::Data {
            cache: ResumeDataCache::from_serialized(cache_blob)?,
        }),
        [data_blob, cache_blob] => decode_html_state(data_blob, cache_blob),
        [replacements_blob, data_blob, cache_blob] => {
            let replacements: Vec<FallbackParam> = facet_json::from_str(replacements_blob)
                .map_err(|e| Error::Parse(format!("replacements parse error: {e}")))?;

            // Substitution happens on the serialized blob, before
            // parsing: the tokens live inside the payload's own
            // serialized text.
            let mut data_blob = data_blob.clone();
            for replacement in &replacements {
                let value = params.resolve(&replacement.name);
                data_blob = data_blob.replace(&replacement.token, &value);
            }
            decode_html_state(&data_blob, cache_blob)
        }
        other => Err(Error::UnexpectedArity(other.len())),
    }
}

fn decode_html_state(data_blob: &str, cache_blob: &str) -> Result<PostponedState> {
    let blob: HtmlStateBlob = facet_json::from_str(data_blob)
        .map_err(|e| Error::Parse(format!("state data parse error: {e}")))?;
    Ok(PostponedState::Html {
        prelude: blob.prelude,
        postponed: blob.postponed,
        cache: ResumeDataCache::from_serialized(cache_blob)?,
    })
}
