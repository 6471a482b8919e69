//! # ondine-tuple
//!
//! Packs an ordered sequence of opaque strings into one string, with no
//! reserved delimiter alphabet: parts may contain colons, digits, or
//! substrings that look like length headers, and still round-trip.
//!
//! The layout is length-prefixed except for the final part:
//! - every part but the last is emitted as `<byteLength>:<content>`
//! - the last part is emitted as `:<content>` and runs to the end of
//!   the string
//!
//! The final part needs no length because nothing follows it; its
//! leading colon is what lets a decoder tell "final part, raw" apart
//! from a length header, even when the final content itself starts
//! with digits and a colon (e.g. a part literally equal to `"3:"`).
//!
//! A tagged variant prefixes the encoding with exactly one ASCII digit
//! so a consumer can discriminate between payload kinds without a
//! separate header. Tags are limited to 0–9; the encoded form of a
//! tuple never depends on anything outside the parts themselves, so
//! output is byte-for-byte stable across releases.

/// Error type for tuple decoding and tag validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// A length header declared more bytes than remain in the input.
    #[error("truncated tuple: length header declared {expected} bytes but only {remaining} remain")]
    Truncated { expected: usize, remaining: usize },

    /// A length header's digits did not parse as a usize.
    #[error("unparseable length header: {0:?}")]
    BadLengthHeader(String),

    /// The input is neither a length header nor a final-part marker at
    /// the given byte offset.
    #[error("malformed tuple at byte {offset}")]
    Malformed { offset: usize },

    /// A tag outside the single-digit range was passed to encoding.
    #[error("tag {0} is out of range (tags must be 0-9)")]
    TagOutOfRange(u32),

    /// Tagged input was empty.
    #[error("missing tag: input is empty")]
    MissingTag,

    /// Tagged input did not start with an ASCII digit.
    #[error("invalid tag character {0:?}")]
    InvalidTag(char),
}

/// Result type alias for tuple codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Encode an ordered sequence of strings into one string.
///
/// Total over all inputs: zero parts yield the empty string, and any
/// part content round-trips through [`decode_tuple`].
pub fn encode_tuple<S: AsRef<str>>(parts: &[S]) -> String {
    let Some((last, rest)) = parts.split_last() else {
        return String::new();
    };

    let mut out = String::new();
    for part in rest {
        let part = part.as_ref();
        out.push_str(&part.len().to_string());
        out.push(':');
        out.push_str(part);
    }
    out.push(':');
    out.push_str(last.as_ref());
    out
}

/// Decode a string produced by [`encode_tuple`] back into its parts.
///
/// Length headers count bytes. Fails on truncated or malformed input,
/// including a declared length that would split a UTF-8 code point.
pub fn decode_tuple(encoded: &str) -> Result<Vec<String>> {
    let mut parts = Vec::new();
    if encoded.is_empty() {
        return Ok(parts);
    }

    let mut rest = encoded;
    loop {
        let offset = encoded.len() - rest.len();

        // A leading colon marks the final part; it consumes the rest
        // of the input.
        if let Some(final_part) = rest.strip_prefix(':') {
            parts.push(final_part.to_string());
            return Ok(parts);
        }

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(Error::Malformed { offset });
        }
        let Some(after_header) = rest[digits..].strip_prefix(':') else {
            return Err(Error::Malformed { offset });
        };
        let len: usize = rest[..digits]
            .parse()
            .map_err(|_| Error::BadLengthHeader(rest[..digits].to_string()))?;

        if len > after_header.len() {
            return Err(Error::Truncated {
                expected: len,
                remaining: after_header.len(),
            });
        }
        if !after_header.is_char_boundary(len) {
            return Err(Error::Malformed { offset });
        }

        parts.push(after_header[..len].to_string());
        rest = &after_header[len..];
        // A length-prefixed part is never final, so something must
        // follow it; running out of input here means the final-part
        // marker is missing.
        if rest.is_empty() {
            return Err(Error::Malformed {
                offset: encoded.len(),
            });
        }
    }
}

/// Encode a tuple prefixed with a single-digit discriminator tag.
///
/// Tags above 9 are rejected: the wire format reserves exactly one
/// leading character for the tag, and widening it would break every
/// previously persisted string.
pub fn encode_tagged_tuple<S: AsRef<str>>(tag: u32, parts: &[S]) -> Result<String> {
    if tag > 9 {
        return Err(Error::TagOutOfRange(tag));
    }
    Ok(format!("{tag}{}", encode_tuple(parts)))
}

/// Decode a string produced by [`encode_tagged_tuple`] into its tag
/// and parts.
pub fn decode_tagged_tuple(encoded: &str) -> Result<(u32, Vec<String>)> {
    let mut chars = encoded.chars();
    let Some(first) = chars.next() else {
        return Err(Error::MissingTag);
    };
    if !first.is_ascii_digit() {
        return Err(Error::InvalidTag(first));
    }
    // is_ascii_digit guarantees to_digit succeeds
    let tag = first.to_digit(10).ok_or(Error::InvalidTag(first))?;
    Ok((tag, decode_tuple(chars.as_str())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(parts: &[&str]) {
        let encoded = encode_tuple(parts);
        let decoded = decode_tuple(&encoded).unwrap();
        assert_eq!(decoded, parts, "round trip failed for {parts:?} (encoded as {encoded:?})");
    }

    #[test]
    fn test_encode_empty() {
        let parts: &[&str] = &[];
        assert_eq!(encode_tuple(parts), "");
        assert_eq!(decode_tuple("").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_encode_single_part() {
        assert_eq!(encode_tuple(&["hello"]), ":hello");
        assert_eq!(decode_tuple(":hello").unwrap(), vec!["hello"]);
    }

    #[test]
    fn test_encode_two_parts() {
        assert_eq!(encode_tuple(&["foo", "bar"]), "3:foo:bar");
        assert_eq!(decode_tuple("3:foo:bar").unwrap(), vec!["foo", "bar"]);
    }

    #[test]
    fn test_colon_part() {
        assert_eq!(encode_tuple(&[":"]), "::");
        assert_eq!(decode_tuple("::").unwrap(), vec![":"]);
    }

    #[test]
    fn test_round_trip_adversarial() {
        round_trip(&["", "", ""]);
        round_trip(&[":"]);
        round_trip(&["3:foo", "bar"]);
        round_trip(&["3:", "7:"]);
        round_trip(&["12:34:56", ":", ""]);
        round_trip(&["été", "naïve"]);
    }

    #[test]
    fn test_round_trip_nested_encoding() {
        let inner = encode_tuple(&["a", "b", "c"]);
        round_trip(&[&inner, "tail"]);
        round_trip(&[&inner]);
    }

    #[test]
    fn test_empty_final_part() {
        assert_eq!(encode_tuple(&["a", ""]), "1:a:");
        assert_eq!(decode_tuple("1:a:").unwrap(), vec!["a", ""]);
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(
            decode_tuple("9:ab:cd"),
            Err(Error::Truncated {
                expected: 9,
                remaining: 5
            })
        );
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(decode_tuple("garbage"), Err(Error::Malformed { offset: 0 })));
        // headerless digits with no colon
        assert!(matches!(decode_tuple("42"), Err(Error::Malformed { .. })));
        // non-final part consumed the whole input, final marker missing
        assert!(matches!(decode_tuple("3:foo"), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_decode_overflowing_length_header() {
        let encoded = "99999999999999999999999999:x:y";
        assert!(matches!(
            decode_tuple(encoded),
            Err(Error::BadLengthHeader(_))
        ));
    }

    #[test]
    fn test_decode_length_splitting_code_point() {
        // "é" is two bytes; a length of 1 lands inside it
        let encoded = "1:é:x";
        assert!(matches!(decode_tuple(encoded), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_tagged_round_trip() {
        for tag in 0..=9 {
            let encoded = encode_tagged_tuple(tag, &["foo", "bar"]).unwrap();
            assert_eq!(
                decode_tagged_tuple(&encoded).unwrap(),
                (tag, vec!["foo".to_string(), "bar".to_string()])
            );
        }
    }

    #[test]
    fn test_tagged_empty_parts() {
        let parts: &[&str] = &[];
        let encoded = encode_tagged_tuple(4, parts).unwrap();
        assert_eq!(encoded, "4");
        assert_eq!(decode_tagged_tuple("4").unwrap(), (4, vec![]));
    }

    #[test]
    fn test_tag_out_of_range() {
        assert_eq!(
            encode_tagged_tuple(10, &["x"]),
            Err(Error::TagOutOfRange(10))
        );
    }

    #[test]
    fn test_decode_tag_failures() {
        assert_eq!(decode_tagged_tuple(""), Err(Error::MissingTag));
        assert_eq!(decode_tagged_tuple("a:foo"), Err(Error::InvalidTag('a')));
        assert_eq!(decode_tagged_tuple("٣:foo"), Err(Error::InvalidTag('٣')));
    }
}
