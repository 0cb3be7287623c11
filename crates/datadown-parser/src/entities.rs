//! HTML entity decoding

use std::collections::HashMap;
use std::sync::LazyLock;

/// Named entities recognized by the inline parser, keyed without `&` and `;`
static HTML_ENTITIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    // Markup-significant characters
    m.insert("amp", "&");
    m.insert("lt", "<");
    m.insert("gt", ">");
    m.insert("quot", "\"");
    m.insert("apos", "'");
    m.insert("nbsp", "\u{a0}");
    // Copyright, trademark, registered
    m.insert("copy", "©");
    m.insert("trade", "™");
    m.insert("reg", "®");
    // Dashes and punctuation
    m.insert("mdash", "—");
    m.insert("ndash", "–");
    m.insert("hellip", "…");
    m.insert("lsquo", "‘");
    m.insert("rsquo", "’");
    m.insert("ldquo", "“");
    m.insert("rdquo", "”");
    // Arrows
    m.insert("larr", "←");
    m.insert("rarr", "→");
    m.insert("uarr", "↑");
    m.insert("darr", "↓");
    // Math
    m.insert("times", "×");
    m.insert("divide", "÷");
    m.insert("plusmn", "±");
    m.insert("ne", "≠");
    m.insert("le", "≤");
    m.insert("ge", "≥");
    m.insert("infin", "∞");
    // Currency
    m.insert("euro", "€");
    m.insert("pound", "£");
    m.insert("yen", "¥");
    m.insert("cent", "¢");
    // Other common
    m.insert("deg", "°");
    m.insert("para", "¶");
    m.insert("sect", "§");
    m.insert("bull", "•");
    m.insert("middot", "·");
    m.insert("laquo", "«");
    m.insert("raquo", "»");
    m.insert("dagger", "†");
    m.insert("Dagger", "‡");
    m.insert("permil", "‰");
    m.insert("prime", "′");
    m.insert("Prime", "″");
    m
});

/// Longest reference body worth scanning for its `;`: a 32-byte name
/// plus the terminator.
const MAX_REFERENCE_LEN: usize = 33;

/// Decode the character reference at the start of `input`.
///
/// `input` must begin with `&`. Returns the decoded text and the number
/// of bytes consumed, or `None` if there is no valid reference there.
pub fn decode_entity(input: &str) -> Option<(String, usize)> {
    let body = input.strip_prefix('&')?;
    let end = body.bytes().take(MAX_REFERENCE_LEN).position(|b| b == b';')?;
    let name = &body[..end];
    let consumed = end + 2;

    if let Some(numeric) = name.strip_prefix('#') {
        let codepoint = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) if (1..=6).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
                u32::from_str_radix(hex, 16).ok()?
            }
            Some(_) => return None,
            None if (1..=7).contains(&numeric.len()) && numeric.chars().all(|c| c.is_ascii_digit()) => {
                numeric.parse::<u32>().ok()?
            }
            None => return None,
        };
        // NUL and invalid codepoints decode to the replacement character
        let c = match codepoint {
            0 => '\u{FFFD}',
            n => char::from_u32(n).unwrap_or('\u{FFFD}'),
        };
        return Some((c.to_string(), consumed));
    }

    if name.is_empty() || name.len() > 32 || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    HTML_ENTITIES
        .get(name)
        .map(|decoded| (decoded.to_string(), consumed))
}
