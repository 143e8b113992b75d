//! Object literal classification and normalization.
//!
//! Freebase dumps write objects in one of a few shapes:
//!
//! ```text
//! <http://rdf.freebase.com/ns/m.02mjmr>     URI
//! "Hanna_Bieluszko"                         plain string (often an MQL key)
//! "Hanna Bieluszko"@en                      text with a language tag
//! "1961-08-04"^^<http://www.w3.org/...>     text with a datatype
//! ```
//!
//! Anything else is passed through untouched. Classification looks only at
//! the first and last characters; none of the functions here fail.

use crate::key_escape::unescape_key;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Syntactic shape of a raw N-Triples object token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    /// `<...>` reference.
    Uri,
    /// Quoted literal with no suffix.
    String,
    /// Quoted literal followed by a language tag or datatype.
    Text,
    /// Anything else (including the empty token).
    Other,
}

impl LiteralKind {
    /// Lower-case name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uri => "uri",
            Self::String => "string",
            Self::Text => "text",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw object token.
///
/// # Example
///
/// ```rust
/// use lattix_freebase::{classify, LiteralKind};
///
/// assert_eq!(classify("<http://rdf.freebase.com/ns/m.02mjmr>"), LiteralKind::Uri);
/// assert_eq!(classify("\"Hanna Bieluszko\""), LiteralKind::String);
/// assert_eq!(classify("\"Hanna Bieluszko\"@en"), LiteralKind::Text);
/// assert_eq!(classify("42"), LiteralKind::Other);
/// assert_eq!(classify(""), LiteralKind::Other);
/// ```
pub fn classify(token: &str) -> LiteralKind {
    match token.chars().next() {
        Some('<') => LiteralKind::Uri,
        Some('"') if token.ends_with('"') => LiteralKind::String,
        Some('"') => LiteralKind::Text,
        _ => LiteralKind::Other,
    }
}

/// Strip the angle brackets from a URI token and lower-case it.
///
/// Tokens not starting with `<` are returned unchanged, so cleaning is
/// idempotent. A missing closing `>` is tolerated.
///
/// ```rust
/// use lattix_freebase::clean_uri;
///
/// let uri = clean_uri("<http://rdf.freebase.com/ns/M.02MJMR>");
/// assert_eq!(uri, "http://rdf.freebase.com/ns/m.02mjmr");
/// assert_eq!(clean_uri(&uri), uri);
/// ```
pub fn clean_uri(token: &str) -> String {
    match strip_angle_brackets(token) {
        Some(inner) => inner.to_lowercase(),
        None => token.to_string(),
    }
}

/// Normalize a raw object token with the default [`NormalizerConfig`].
///
/// ```rust
/// use lattix_freebase::normalize;
///
/// assert_eq!(normalize("<http://rdf.freebase.com/ns/M.02mjmr>"), "http://rdf.freebase.com/ns/m.02mjmr");
/// assert_eq!(normalize("\"Barack_Hussein_Obama$002C_Jr$002E\""), "Barack_Hussein_Obama,_Jr.");
/// assert_eq!(normalize(r#""say \"hi\""@en"#), r#""say "hi""@en"#);
/// ```
pub fn normalize(token: &str) -> String {
    Normalizer::default().normalize(token)
}

/// Decode N-Triples string escapes.
///
/// Handles `\t \b \n \r \f \" \' \\`, `\uXXXX` and `\UXXXXXXXX`. Everything
/// else, quotes and suffixes included, is copied through. An escape that
/// cannot be decoded is kept as written.
///
/// ```rust
/// use lattix_freebase::unescape_ntriples;
///
/// assert_eq!(unescape_ntriples(r#""café\tbar"@fr"#), "\"café\tbar\"@fr");
/// ```
pub fn unescape_ntriples(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match decode_escape(after) {
            Some((c, consumed)) => {
                out.push(c);
                rest = &after[consumed..];
            }
            None => {
                let escape: String = after.chars().take(9).collect();
                tracing::trace!(
                    escape = %escape,
                    "undecodable N-Triples escape, keeping verbatim"
                );
                out.push('\\');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Normalization options.
///
/// The default enables every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Lower-case URIs after stripping the angle brackets.
    pub lowercase_uris: bool,
    /// Undo MQL key escaping in plain strings containing `$`.
    pub undo_key_escape: bool,
    /// Decode N-Triples escapes in tagged/typed literals.
    pub unescape_text: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            lowercase_uris: true,
            undo_key_escape: true,
            unescape_text: true,
        }
    }
}

/// Turns raw object tokens into clean values.
///
/// # Example
///
/// ```rust
/// use lattix_freebase::{Normalizer, NormalizerConfig};
///
/// let keep_case = Normalizer::new(NormalizerConfig {
///     lowercase_uris: false,
///     ..NormalizerConfig::default()
/// });
/// assert_eq!(keep_case.normalize("<ns:M.02mjmr>"), "ns:M.02mjmr");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a normalizer with the given options.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Options in use.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize one raw object token.
    ///
    /// - URI: brackets stripped, lower-cased.
    /// - String: one quote stripped from each end, then MQL key escaping undone
    ///   if the content has a `$`.
    /// - Text: N-Triples escapes decoded; the quotes and the language/datatype
    ///   suffix stay part of the value.
    /// - Other: unchanged.
    pub fn normalize(&self, token: &str) -> String {
        match classify(token) {
            LiteralKind::Uri => match strip_angle_brackets(token) {
                Some(inner) if self.config.lowercase_uris => inner.to_lowercase(),
                Some(inner) => inner.to_string(),
                None => token.to_string(),
            },
            LiteralKind::String => {
                let inner = dequote(token);
                if self.config.undo_key_escape && inner.contains('$') {
                    unescape_key(inner)
                } else {
                    inner.to_string()
                }
            }
            LiteralKind::Text if self.config.unescape_text => unescape_ntriples(token),
            LiteralKind::Text | LiteralKind::Other => token.to_string(),
        }
    }
}

fn strip_angle_brackets(token: &str) -> Option<&str> {
    let inner = token.strip_prefix('<')?;
    Some(inner.strip_suffix('>').unwrap_or(inner))
}

/// Remove one leading and one trailing `"`. A lone `"` yields "".
fn dequote(token: &str) -> &str {
    let inner = token.strip_prefix('"').unwrap_or(token);
    inner.strip_suffix('"').unwrap_or(inner)
}

/// Decode the escape following a backslash; returns the char and bytes used.
fn decode_escape(s: &str) -> Option<(char, usize)> {
    let c = match s.chars().next()? {
        't' => '\t',
        'b' => '\u{8}',
        'n' => '\n',
        'r' => '\r',
        'f' => '\u{c}',
        '"' => '"',
        '\'' => '\'',
        '\\' => '\\',
        'u' => return decode_utf16_escape(&s[1..]),
        'U' => {
            let c = char::from_u32(parse_hex(&s[1..], 8)?)?;
            return Some((c, 9));
        }
        _ => return None,
    };
    Some((c, 1))
}

/// Decode `XXXX` after `\u`. A high surrogate only decodes together with a
/// directly following `\uXXXX` low surrogate.
fn decode_utf16_escape(s: &str) -> Option<(char, usize)> {
    let unit = parse_hex(s, 4)?;
    if let Some(c) = char::from_u32(unit) {
        return Some((c, 5));
    }

    let low = s[4..].strip_prefix("\\u").and_then(|t| parse_hex(t, 4))?;
    let pair = [u16::try_from(unit).ok()?, u16::try_from(low).ok()?];
    let c = char::decode_utf16(pair).next()?.ok()?;
    Some((c, 11))
}

fn parse_hex(s: &str, digits: usize) -> Option<u32> {
    let hex = s.get(..digits)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
