/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Pure transforms mediating between wire-format tokens (percent-escaped
//! dbpedia resource URLs, quoted N-Triples literals) and the canonical
//! resource/label forms used as article-table keys.

const DBPEDIA_RESOURCE_PREFIX: &str = "dbpedia.org/resource/";

/// Percent-decodes `s`. `+` maps to space, `%%` is a literal `%`. Returns
/// `false` in the second component if an invalid escape was encountered; the
/// offending `%` is copied through verbatim and decoding continues.
pub fn decode_percent(s: &str) -> (String, bool) {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut ok = true;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                if bytes.get(i + 1) == Some(&b'%') {
                    out.push(b'%');
                    i += 2;
                } else if let Some(byte) = parse_hex_pair(bytes, i + 1) {
                    out.push(byte);
                    i += 3;
                } else {
                    log::warn!("could not percent-decode {s}");
                    out.push(b'%');
                    ok = false;
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    (String::from_utf8_lossy(&out).into_owned(), ok)
}

fn parse_hex_pair(bytes: &[u8], at: usize) -> Option<u8> {
    let hi = *bytes.get(at)?;
    let lo = *bytes.get(at + 1)?;
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Removes a surrounding `<` `>` pair, if present.
pub fn strip_angle_brackets(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'<' && bytes[bytes.len() - 1] == b'>' {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Removes a leading `http://.../dbpedia.org/resource/` prefix if the
/// resource substring starts no later than byte offset 15 (accounting for
/// language subdomains such as `http://simple.`). Returns whether a prefix
/// was removed.
pub fn strip_resource_prefix(s: &str) -> (String, bool) {
    if !s.starts_with("http://") {
        return (s.to_string(), false);
    }
    match s.find(DBPEDIA_RESOURCE_PREFIX) {
        Some(pos) if pos < 15 => (s[pos + DBPEDIA_RESOURCE_PREFIX.len()..].to_string(), true),
        _ => (s.to_string(), false),
    }
}

/// Full normalization pipeline for a dbpedia resource token: strip angle
/// brackets, strip the resource prefix, percent-decode.
pub fn abbreviate_resource(s: &str) -> String {
    let stripped = strip_angle_brackets(s);
    let (prefix_stripped, _) = strip_resource_prefix(stripped);
    let (decoded, ok) = decode_percent(&prefix_stripped);
    if ok {
        decoded
    } else {
        prefix_stripped
    }
}

/// Parses an N-Triples quoted literal: strips a trailing `@xx` language tag
/// and surrounding double quotes.
pub fn parse_quoted_literal(s: &str) -> String {
    let bytes = s.as_bytes();
    let without_lang = if bytes.len() > 2 && bytes[bytes.len() - 3] == b'@' {
        &s[..s.len() - 3]
    } else {
        s
    };
    let bytes = without_lang.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"' {
        without_lang[1..without_lang.len() - 1].to_string()
    } else {
        without_lang.to_string()
    }
}

/// Replaces spaces with underscores, the canonical resource form of a title.
pub fn normalize_title(s: &str) -> String {
    s.replace(' ', "_")
}

/// Replaces underscores with spaces, the inverse of [`normalize_title`].
pub fn denormalize_title(s: &str) -> String {
    s.replace('_', " ")
}
