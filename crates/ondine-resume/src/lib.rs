//! # ondine-resume
//!
//! Serializes the progress of a paused streaming render into one
//! compact string, and reconstructs it on a later request so the
//! render can resume exactly where it left off.
//!
//! A paused render is one of two things:
//! - **data-only**: the render stopped before producing any HTML; all
//!   that survives is a snapshot of the resume data cache
//! - **HTML**: the render stopped partway through HTML production; the
//!   state carries a prelude-completeness marker, the renderer's
//!   opaque continuation payload, and the cache snapshot
//!
//! When the paused render was produced for a fallback shell (a dynamic
//! route whose parameters were unknown at build time), the encoded
//! state also records which placeholder tokens stand in for which
//! route parameters. [`decode_state`] substitutes the real values from
//! the current request before handing the state back to the renderer.
//!
//! The wire format is an [`ondine_tuple`] tuple whose arity is the
//! only discriminator: 1 element is a data-only state, 2 is an HTML
//! state, 3 is an HTML state with parameter substitutions. Decoding
//! never fails from the caller's point of view: a malformed, truncated
//! or version-skewed blob is logged and degrades to an empty data-only
//! state, which simply makes the request render from scratch.

mod cache;
mod params;
mod state;

pub use cache::{CacheEntry, ResumeDataCache};
pub use params::{
    FallbackParam, FallbackRouteParams, RequestParams, RouteParamValue, placeholder_token,
};
pub use state::{
    PostponedState, PreludeState, decode_state, encode_data_state, encode_html_state,
};

/// Error type for render-state decoding.
///
/// These never escape [`decode_state`]; they exist so every failure
/// on the decode path is a named, logged kind rather than a panic.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The outer tuple failed to decode.
    #[error("malformed state tuple: {0}")]
    Tuple(#[from] ondine_tuple::Error),

    /// The outer tuple decoded, but its arity matches no known state
    /// layout. Indicates version skew or corruption.
    #[error("unexpected state tuple arity {0} (expected 1, 2 or 3)")]
    UnexpectedArity(usize),

    /// A replacements blob or state data blob failed to parse.
    #[error("state blob parse error: {0}")]
    Parse(String),

    /// A cache snapshot failed to deserialize.
    #[error("cache snapshot error: {0}")]
    Cache(String),
}

/// Result type alias for render-state operations.
pub type Result<T> = std::result::Result<T, Error>;
