/// Canonicalize text for matching
///
/// This stage:
/// 1. Lower-cases every character
/// 2. Drops everything except Hangul, Latin letters, ASCII digits and whitespace
/// 3. Collapses whitespace runs to a single space and trims both ends
///
/// The output is idempotent: `normalize_text(&normalize_text(s)) == normalize_text(s)`.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if !is_significant(c) {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}

/// Characters that carry meaning for alignment
pub fn is_significant(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || is_hangul(c) || is_latin_letter(c)
}

/// Hangul syllables and jamo blocks
fn is_hangul(c: char) -> bool {
    matches!(c,
        '\u{1100}'..='\u{11FF}'   // Jamo
        | '\u{3131}'..='\u{318E}' // Compatibility Jamo
        | '\u{A960}'..='\u{A97F}' // Jamo Extended-A
        | '\u{AC00}'..='\u{D7A3}' // Syllables
        | '\u{D7B0}'..='\u{D7FF}' // Jamo Extended-B
    )
}

/// Precomposed Latin letters beyond ASCII (accented vowels etc.)
fn is_latin_letter(c: char) -> bool {
    matches!(c, '\u{00C0}'..='\u{024F}') && c.is_alphabetic() && c.is_lowercase()
}
