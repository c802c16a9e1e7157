//! Shared text helpers for the classifier and the field extractors.

use regex::Regex;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static ::regex::Regex {
            static R: ::std::sync::OnceLock<::regex::Regex> = ::std::sync::OnceLock::new();
            R.get_or_init(|| ::regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub(crate) use re;

re!(re_bare_date, r"\b(\d{2}[/\-.]\d{2}[/\-.]\d{4})\b");
re!(re_any_date, r"(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4})");
re!(re_whitespace, r"\s+");
re!(re_digit_run, r"\d+");
re!(re_state_name,
    r"(?i)\b(andhra\s*pradesh|arunachal\s*pradesh|assam|bihar|chhattisgarh|goa|gujarat|haryana|himachal\s*pradesh|jharkhand|karnataka|kerala|madhya\s*pradesh|maharashtra|manipur|meghalaya|mizoram|nagaland|odisha|punjab|rajasthan|sikkim|tamil\s*nadu|telangana|tripura|uttar\s*pradesh|uttarakhand|west\s*bengal|delhi|jammu|ladakh|chandigarh|puducherry)\b");
re!(re_gender_female, r"(?i)\bfemale\b");
re!(re_gender_male, r"(?i)\bmale\b");
re!(re_gender_transgender, r"(?i)\btransgender\b");
re!(re_relative_label_tail, r"(?i)(?:father|husband|mother)'?s?\s*$");

/// Keep ASCII letters, whitespace and periods, then trim.
pub fn clean_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace() || *c == '.')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Upper-case the first letter of every letter run, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

/// Collapse every whitespace run (line breaks included) to one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    re_whitespace().replace_all(s, " ").trim().to_string()
}

/// Clean, whitespace-collapse and title-case a captured person name.
/// Returns `None` when fewer than `min_len` characters survive.
pub fn person_name(raw: &str, min_len: usize) -> Option<String> {
    let cleaned = collapse_whitespace(&clean_name(raw));
    let cleaned = cleaned.trim_end_matches('.').trim_end();
    if cleaned.chars().count() < min_len {
        return None;
    }
    Some(title_case(cleaned))
}

/// True for a word made only of letters with every cased letter upper-case.
pub fn is_upper_word(word: &str) -> bool {
    word.chars().all(char::is_alphabetic)
        && word.chars().any(char::is_uppercase)
        && !word.chars().any(char::is_lowercase)
}

/// First date anywhere in `s` (two-digit years allowed).
pub fn first_date(s: &str) -> Option<String> {
    re_any_date()
        .captures(s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// First bare `dd/mm/yyyy`-shaped token in the text.
pub fn bare_date(text: &str) -> Option<String> {
    re_bare_date()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Maximal runs of digits, in order. A run of exactly N digits is a number
/// with no digit immediately before or after it.
pub fn digit_runs(text: &str) -> impl Iterator<Item = &str> {
    re_digit_run().find_iter(text).map(|m| m.as_str())
}

/// Strip everything except digits.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Whether the label match starting at `start` belongs to a relative's name
/// ("Father's Name", "Husband Name", ...).
pub fn is_relative_label(text: &str, start: usize) -> bool {
    let mut from = start.saturating_sub(12);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    re_relative_label_tail().is_match(&text[from..start])
}

/// Gender from English or Hindi tokens; female is checked before male.
pub fn gender(text: &str, tokens: &[(&str, &str)]) -> Option<String> {
    for (token, label) in tokens {
        let hit = match *token {
            "female" => re_gender_female().is_match(text),
            "male" => re_gender_male().is_match(text),
            "transgender" => re_gender_transgender().is_match(text),
            other => text.contains(other),
        };
        if hit {
            return Some((*label).to_string());
        }
    }
    None
}

/// First Indian state or union territory named in the text, title-cased.
pub fn state_name(text: &str) -> Option<String> {
    let m = re_state_name().captures(text)?.get(1)?;
    Some(title_case(&collapse_whitespace(m.as_str())))
}

/// First capture group of `re` in `text`, trimmed; `None` when empty.
pub fn capture(re: &Regex, text: &str) -> Option<String> {
    let value = re.captures(text)?.get(1)?.as_str().trim().to_string();
    (!value.is_empty()).then_some(value)
}
