//! Markup normalization for source strings and machine translations
//!
//! Source strings reach the editor as HTML: entities are escaped, newlines are
//! rendered as `<br>` and placeholders may be wrapped in `<code>` tags. Both the
//! placeholder validator and the suggestion providers work on the plain text, so
//! the markup is stripped once here, and the text coming back from a provider is
//! cleaned up with the inverse transformation.
//!
//! # Example
//!
//! ```ignore
//! use trellis_i18n::markup::{denormalize_translation, normalize_source};
//!
//! let plain = normalize_source("Hello <code>%(name)s</code>,<br>welcome &amp; enjoy");
//! assert_eq!(plain, "Hello %(name)s,\nwelcome & enjoy");
//!
//! let cleaned = denormalize_translation("Bonjour %  (name)s,&#39;");
//! assert_eq!(cleaned, "Bonjour  %(name)s ,'");
//! ```

use regex::{Captures, Regex};
use std::sync::OnceLock;

static ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
static BR_REGEX: OnceLock<Regex> = OnceLock::new();
static CODE_REGEX: OnceLock<Regex> = OnceLock::new();
static MANGLED_PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn entity_regex() -> &'static Regex {
    ENTITY_REGEX.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").unwrap()
    })
}

/// Decode a single entity body (the part between `&` and `;`)
///
/// Returns `None` for entities that must be left untouched, either because they
/// are unknown or because angle brackets are still being held back.
fn decode_entity(body: &str, decode_angles: bool) -> Option<String> {
    let decoded = match body {
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "lt" if decode_angles => '<',
        "gt" if decode_angles => '>',
        _ => {
            let code = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

fn decode_entities(text: &str, decode_angles: bool) -> String {
    entity_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            decode_entity(&caps[1], decode_angles).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Decode HTML character references in `text`
///
/// Named references `&amp;`, `&quot;`, `&apos;`, `&nbsp;`, `&lt;`, `&gt;` and
/// numeric references (`&#39;`, `&#x27;`) are decoded in a single pass, so
/// `&amp;lt;` becomes `&lt;` and not `<`. Unknown references are kept verbatim.
pub fn unescape_entities(text: &str) -> String {
    decode_entities(text, true)
}

/// Turn the HTML rendering of a source string into the plain text sent to a provider
///
/// Steps, in order:
/// 1. decode entities other than `&lt;` / `&gt;`
/// 2. `<br>`, `<br/>`, `<br />` become newlines
/// 3. `<code>` and `</code>` wrappers are removed
/// 4. `&lt;` / `&gt;` are decoded
///
/// Angle brackets are decoded last so that escaped markup shown to the
/// translator (`&lt;code&gt;`) survives as literal text.
pub fn normalize_source(html: &str) -> String {
    let br = BR_REGEX.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
    let code = CODE_REGEX.get_or_init(|| Regex::new(r"(?i)</?code>").unwrap());

    let text = decode_entities(html, false);
    let text = br.replace_all(&text, "\n");
    let text = code.replace_all(&text, "");
    text.replace("&lt;", "<").replace("&gt;", ">")
}

/// Clean up text returned by a translation provider before it is written into a field
///
/// Entities are decoded, and printf placeholders that the remote service split
/// with whitespace (`% (name)s`, `%  (name) s`) are rejoined with a single space
/// restored on each side.
pub fn denormalize_translation(text: &str) -> String {
    let mangled = MANGLED_PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"%\s+(\([^)]+\))\s*s").unwrap());

    let text = unescape_entities(text);
    mangled.replace_all(&text, " %${1}s ").into_owned()
}
