#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to read fixture {name}: {err}"))
}

/// Fixture lines without the trailing newline. `\x1b`-style escapes are decoded so expected
/// output can spell out ANSI sequences.
pub fn read_lines_unescaped(name: &str) -> Vec<String> {
    let raw = read_fixture(name);
    let mut normalized = raw.replace("\r\n", "\n");
    if normalized.ends_with('\n') {
        normalized.pop();
    }
    let unescaped = unescape(&normalized);
    if unescaped.is_empty() {
        return Vec::new();
    }
    unescaped.split('\n').map(|line| line.to_string()).collect()
}

pub fn unescape(input: &str) -> String {
    let mut out = String::new();
    let mut iter = input.chars();

    while let Some(ch) = iter.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match iter.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('x') => {
                let hex: String = iter.by_ref().take(2).collect();
                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) if hex.len() == 2 => out.push(byte as char),
                    _ => {
                        out.push_str("\\x");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
