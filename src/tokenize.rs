/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Whitespace tokenizer for labels lines, honoring double-quote grouping and
//! backslash escaping.
//!
//! This mirrors `boost::escaped_list_separator` as used by the source corpus,
//! with one deliberate deviation: an unrecognized backslash escape is
//! emitted verbatim (the backslash and the following character both survive)
//! instead of being rejected as malformed. This is what lets raw `\uXXXX`
//! sequences in N-Triples literals pass through untouched.

/// Splits `line` into whitespace-separated tokens, treating `"..."` runs as
/// a single token (spaces inside quotes don't split) and recognizing `\`
/// escapes for `\\`, `\"`, `\ ` and `\n`; any other escape is passed through
/// as-is (backslash included).
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut has_current = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                has_current = true;
                match chars.next() {
                    Some('n') => current.push('\n'),
                    Some(next) if next == '"' || next == ' ' || next == '\\' => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => current.push('\\'),
                }
            }
            '"' => {
                in_quote = !in_quote;
                has_current = true;
            }
            ' ' | '\t' if !in_quote => {
                if has_current {
                    tokens.push(std::mem::take(&mut current));
                    has_current = false;
                }
            }
            c => {
                current.push(c);
                has_current = true;
            }
        }
    }
    if has_current {
        tokens.push(current);
    }
    tokens
}
