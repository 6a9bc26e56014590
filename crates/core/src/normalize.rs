//! Canonical comparison keys for part names and ids.

/// Domain contractions, applied in order. `ohms` must precede `ohm`.
const CONTRACTIONS: &[(&str, &str)] = &[
    ("ohms", ""),
    ("ohm", ""),
    ("resistor", "res"),
    ("capacitor", "cap"),
    ("potentiometer", "pot"),
    ("kilo", "k"),
    ("mega", "m"),
];

/// Normalize free text into a key used only for comparison.
///
/// Lowercases, keeps ASCII letters and digits, applies the domain contractions
/// and drops a trailing `u`/`r` directly after a digit (`100r` -> `100`).
/// Digits are never dropped: with the decimal point gone, `0.1uF` and `1uF`
/// differ only by their leading zero. Every rewrite shortens the key, so passes
/// repeat until nothing changes, which makes the function idempotent.
pub fn normalize(text: &str) -> String {
    let mut key: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();

    loop {
        let next = rewrite_pass(&key);
        if next == key {
            return key;
        }
        key = next;
    }
}

/// Normalize an optional value; `None` yields the empty key.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

fn rewrite_pass(key: &str) -> String {
    let mut out = key.to_string();
    for (from, to) in CONTRACTIONS {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    strip_trailing_unit(&mut out);
    out
}

fn strip_trailing_unit(key: &mut String) {
    let mut tail = key.chars().rev();
    let last = tail.next();
    let before = tail.next();
    if matches!(last, Some('u') | Some('r')) && before.is_some_and(|c| c.is_ascii_digit()) {
        key.pop();
    }
}
