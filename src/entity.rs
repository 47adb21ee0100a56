//! HTML entity and numeric character reference decoding.

use std::char;

pub const MAX_ENTITY_LENGTH: usize = 32;

/// Named entities recognized in entity references and link
/// destinations/titles.  This covers the references that occur in practice
/// in Markdown documents; unrecognized names are left as literal text, as
/// CommonMark requires for invalid references.
static ENTITIES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "AElig" => "\u{00c6}",
    "Aacute" => "\u{00c1}",
    "Agrave" => "\u{00c0}",
    "Alpha" => "\u{0391}",
    "Aring" => "\u{00c5}",
    "Auml" => "\u{00c4}",
    "Beta" => "\u{0392}",
    "Ccedil" => "\u{00c7}",
    "Dagger" => "\u{2021}",
    "Delta" => "\u{0394}",
    "Eacute" => "\u{00c9}",
    "Gamma" => "\u{0393}",
    "Lambda" => "\u{039b}",
    "Omega" => "\u{03a9}",
    "Ouml" => "\u{00d6}",
    "Phi" => "\u{03a6}",
    "Pi" => "\u{03a0}",
    "Prime" => "\u{2033}",
    "Psi" => "\u{03a8}",
    "Sigma" => "\u{03a3}",
    "Theta" => "\u{0398}",
    "Uuml" => "\u{00dc}",
    "Xi" => "\u{039e}",
    "aacute" => "\u{00e1}",
    "acirc" => "\u{00e2}",
    "aelig" => "\u{00e6}",
    "agrave" => "\u{00e0}",
    "alpha" => "\u{03b1}",
    "amp" => "&",
    "apos" => "'",
    "aring" => "\u{00e5}",
    "auml" => "\u{00e4}",
    "beta" => "\u{03b2}",
    "bull" => "\u{2022}",
    "cent" => "\u{00a2}",
    "ccedil" => "\u{00e7}",
    "copy" => "\u{00a9}",
    "dagger" => "\u{2020}",
    "darr" => "\u{2193}",
    "deg" => "\u{00b0}",
    "delta" => "\u{03b4}",
    "divide" => "\u{00f7}",
    "eacute" => "\u{00e9}",
    "ecirc" => "\u{00ea}",
    "egrave" => "\u{00e8}",
    "epsilon" => "\u{03b5}",
    "eta" => "\u{03b7}",
    "eth" => "\u{00f0}",
    "euro" => "\u{20ac}",
    "frac12" => "\u{00bd}",
    "frac14" => "\u{00bc}",
    "frac34" => "\u{00be}",
    "gamma" => "\u{03b3}",
    "ge" => "\u{2265}",
    "gt" => ">",
    "harr" => "\u{2194}",
    "hellip" => "\u{2026}",
    "iacute" => "\u{00ed}",
    "icirc" => "\u{00ee}",
    "infin" => "\u{221e}",
    "iota" => "\u{03b9}",
    "kappa" => "\u{03ba}",
    "lambda" => "\u{03bb}",
    "laquo" => "\u{00ab}",
    "larr" => "\u{2190}",
    "ldquo" => "\u{201c}",
    "le" => "\u{2264}",
    "lsquo" => "\u{2018}",
    "lt" => "<",
    "mdash" => "\u{2014}",
    "micro" => "\u{00b5}",
    "middot" => "\u{00b7}",
    "mu" => "\u{03bc}",
    "nbsp" => "\u{00a0}",
    "ndash" => "\u{2013}",
    "ne" => "\u{2260}",
    "ntilde" => "\u{00f1}",
    "nu" => "\u{03bd}",
    "oacute" => "\u{00f3}",
    "ocirc" => "\u{00f4}",
    "oelig" => "\u{0153}",
    "omega" => "\u{03c9}",
    "ouml" => "\u{00f6}",
    "para" => "\u{00b6}",
    "permil" => "\u{2030}",
    "phi" => "\u{03c6}",
    "pi" => "\u{03c0}",
    "plusmn" => "\u{00b1}",
    "pound" => "\u{00a3}",
    "prime" => "\u{2032}",
    "psi" => "\u{03c8}",
    "quot" => "\"",
    "raquo" => "\u{00bb}",
    "rarr" => "\u{2192}",
    "rdquo" => "\u{201d}",
    "reg" => "\u{00ae}",
    "rho" => "\u{03c1}",
    "rsquo" => "\u{2019}",
    "sect" => "\u{00a7}",
    "sigma" => "\u{03c3}",
    "szlig" => "\u{00df}",
    "tau" => "\u{03c4}",
    "theta" => "\u{03b8}",
    "thorn" => "\u{00fe}",
    "tilde" => "\u{02dc}",
    "times" => "\u{00d7}",
    "trade" => "\u{2122}",
    "uacute" => "\u{00fa}",
    "uarr" => "\u{2191}",
    "ucirc" => "\u{00fb}",
    "ugrave" => "\u{00f9}",
    "uuml" => "\u{00fc}",
    "xi" => "\u{03be}",
    "yen" => "\u{00a5}",
    "zeta" => "\u{03b6}",
};

/// Decodes the entity or character reference at the start of `s`, which is
/// the text immediately following a `&`.  Returns the decoded string and
/// the number of bytes consumed after the `&`.
pub fn lookup(s: &str) -> Option<(String, usize)> {
    let bytes = s.as_bytes();
    if bytes.first() == Some(&b'#') {
        return lookup_numeric(s);
    }

    let end = bytes
        .iter()
        .take(MAX_ENTITY_LENGTH)
        .position(|&c| !c.is_ascii_alphanumeric())?;
    if end == 0 || bytes[end] != b';' {
        return None;
    }

    ENTITIES
        .get(&s[..end])
        .map(|decoded| ((*decoded).to_string(), end + 1))
}

fn lookup_numeric(s: &str) -> Option<(String, usize)> {
    let bytes = s.as_bytes();
    let (radix, digits_at) = match bytes.get(1) {
        Some(b'x') | Some(b'X') => (16, 2),
        _ => (10, 1),
    };
    let max_digits = if radix == 16 { 6 } else { 7 };

    let mut value: u32 = 0;
    let mut i = digits_at;
    while i < bytes.len() && i - digits_at < max_digits {
        match (bytes[i] as char).to_digit(radix) {
            Some(d) => value = value.saturating_mul(radix).saturating_add(d),
            None => break,
        }
        i += 1;
    }
    if i == digits_at || bytes.get(i) != Some(&b';') {
        return None;
    }

    let decoded = match char::from_u32(value) {
        Some('\0') | None => '\u{fffd}',
        Some(c) => c,
    };
    Some((decoded.to_string(), i + 1))
}

/// Decodes every entity and character reference in `s`.
pub fn unescape_html(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match lookup(&rest[1..]) {
            Some((decoded, consumed)) => {
                out.push_str(&decoded);
                rest = &rest[1 + consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named() {
        assert_eq!(unescape_html("a &amp; b"), "a & b");
        assert_eq!(unescape_html("&nosuch; &amp"), "&nosuch; &amp");
    }

    #[test]
    fn numeric() {
        assert_eq!(unescape_html("&#65;&#x42;"), "AB");
        assert_eq!(unescape_html("&#0;"), "\u{fffd}");
        assert_eq!(unescape_html("&#x;"), "&#x;");
    }
}
