//! OCR text cleanup.
//!
//! Pure and total: every string (including the empty one) maps to a cleaned
//! string, and cleaning an already-cleaned string is a no-op.

use crate::text::re;

re!(re_decimal_digit, r"^\d$");

/// Clean raw OCR output.
///
/// - drops control and zero-width characters (tabs and line breaks survive)
/// - unifies `\r\n` and `\r` to `\n`
/// - collapses runs of spaces/tabs to a single space
/// - repairs `O`/`o` → `0` and `I`/`l` → `1` when flanked by digits
/// - trims surrounding whitespace
pub fn normalize(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !is_noise(*c)).collect();
    let unified = stripped.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = collapse_horizontal(&unified);
    let zeros = repair_between_digits(&collapsed, &['O', 'o'], '0');
    let ones = repair_between_digits(&zeros, &['I', 'l'], '1');
    ones.trim().to_string()
}

fn is_noise(c: char) -> bool {
    matches!(c,
        '\u{00}'..='\u{08}'
        | '\u{0b}'
        | '\u{0c}'
        | '\u{0e}'..='\u{1f}'
        | '\u{7f}'..='\u{9f}'
        | '\u{200b}'..='\u{200f}'
        | '\u{feff}')
}

fn collapse_horizontal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c == ' ' || c == '\t' {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Decimal digits in any script; superscripts, fractions and numeral letters
/// do not count.
fn is_decimal_digit(c: char) -> bool {
    c.is_ascii_digit() || (!c.is_ascii() && re_decimal_digit().is_match(c.encode_utf8(&mut [0; 4])))
}

/// Replace each of `confusables` with `digit` when both neighbours in the
/// input are numeric. Neighbours are read from the input, not the output.
fn repair_between_digits(text: &str, confusables: &[char], digit: char) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let flanked = i > 0
                && i + 1 < chars.len()
                && is_decimal_digit(chars[i - 1])
                && is_decimal_digit(chars[i + 1]);
            if flanked && confusables.contains(&c) {
                digit
            } else {
                c
            }
        })
        .collect()
}
