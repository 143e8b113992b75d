//! Legacy MQL key escaping.
//!
//! Freebase keys (e.g. `/wikipedia/en` keys) can only hold `[A-Za-z0-9_-]`;
//! every other character is written as `$` followed by four hex digits of its
//! UTF-16 code unit. In the dumps this shows up in plain string literals:
//!
//! ```text
//! "Barack_Hussein_Obama$002C_Jr$002E"
//! ```
//!
//! Reference: <http://web.archive.org/web/20160726102723/http://wiki.freebase.com/wiki/MQL_key_escaping>

use std::fmt::Write;

/// Escape marker.
const MARKER: char = '$';

/// Number of hex digits in one escape group.
const GROUP_DIGITS: usize = 4;

/// Undo MQL key escaping.
///
/// The input is split on `$`. The first segment is copied as is; every later
/// segment must start with four hex digits naming a code unit, which is
/// decoded, followed by the rest of the segment verbatim. A segment that is too
/// short or not hex is kept as literal text, `$` included. Surrogate pairs
/// written as two adjacent groups decode to one character; a lone surrogate is
/// kept as literal text.
///
/// # Example
///
/// ```rust
/// use lattix_freebase::unescape_key;
///
/// assert_eq!(
///     unescape_key("Barack_Hussein_Obama$002C_Jr$002E"),
///     "Barack_Hussein_Obama,_Jr."
/// );
/// assert_eq!(unescape_key("foo$1bar"), "foo$1bar");
/// ```
pub fn unescape_key(s: &str) -> String {
    let mut segments = s.split(MARKER);
    let mut out = String::with_capacity(s.len());

    if let Some(head) = segments.next() {
        out.push_str(head);
    }

    // High surrogate group waiting for its low half, with its raw segment.
    let mut pending: Option<(u16, &str)> = None;

    for segment in segments {
        let Some((unit, rest)) = parse_group(segment) else {
            flush_pending(&mut out, pending.take());
            push_verbatim(&mut out, segment);
            continue;
        };

        match unit {
            0xD800..=0xDBFF if rest.is_empty() => {
                flush_pending(&mut out, pending.take());
                pending = Some((unit, segment));
            }
            0xDC00..=0xDFFF => match pending.take() {
                Some((high, _)) => {
                    let pair = [high, unit];
                    for c in char::decode_utf16(pair).flatten() {
                        out.push(c);
                    }
                    out.push_str(rest);
                }
                None => push_verbatim(&mut out, segment),
            },
            _ => {
                flush_pending(&mut out, pending.take());
                match char::from_u32(u32::from(unit)) {
                    Some(c) => {
                        out.push(c);
                        out.push_str(rest);
                    }
                    // High surrogate with trailing text: it can never pair up.
                    None => push_verbatim(&mut out, segment),
                }
            }
        }
    }

    flush_pending(&mut out, pending);
    out
}

/// Apply MQL key escaping.
///
/// Inverse of [`unescape_key`]: `unescape_key(&escape_key(s)) == s` for every
/// string, including ones that already contain `$`.
///
/// ```rust
/// use lattix_freebase::escape_key;
///
/// assert_eq!(escape_key("Barack_Hussein_Obama,_Jr."), "Barack_Hussein_Obama$002C_Jr$002E");
/// ```
pub fn escape_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut units = [0u16; 2];

    for c in s.chars() {
        if is_key_char(c) {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                // writing to a String cannot fail
                let _ = write!(out, "{MARKER}{unit:04X}");
            }
        }
    }

    out
}

/// Characters MQL keys may hold unescaped.
fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Split a segment into its leading code unit and the remainder.
fn parse_group(segment: &str) -> Option<(u16, &str)> {
    let digits = segment.get(..GROUP_DIGITS)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let unit = u16::from_str_radix(digits, 16).ok()?;
    Some((unit, &segment[GROUP_DIGITS..]))
}

fn push_verbatim(out: &mut String, segment: &str) {
    tracing::trace!(group = segment, "malformed key escape group, keeping verbatim");
    out.push(MARKER);
    out.push_str(segment);
}

fn flush_pending(out: &mut String, pending: Option<(u16, &str)>) {
    if let Some((_, segment)) = pending {
        push_verbatim(out, segment);
    }
}
