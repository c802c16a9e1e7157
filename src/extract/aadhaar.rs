//! Aadhaar letters and cards.

use crate::cascade::{Cascade, Scan, Step};
use crate::fields::{labels, FieldMap};
use crate::text::{
    self, capture, collapse_whitespace, digit_runs, person_name, re, title_case,
};

re!(re_masked, r"(?i)\b(XXXX\s*XXXX\s*\d{4})\b");
re!(re_spaced, r"\b(\d{4})\s(\d{4})\s(\d{4})\b");
re!(re_hyphenated, r"\b(\d{4})-(\d{4})-(\d{4})\b");
re!(re_vid_labeled,
    r"(?i)\b(?:vid|virtual\s*id|virtual\s*identification)\s*[:\-]?\s*(\d[\d\s]{14,18})");
re!(re_vid_loose, r"(?i)VID\s*[:\-]\s*([\d\s]{16,20})");
re!(re_enrolment,
    r"(?i)(?:enrolment|enrollment)\s*(?:no\.?|number)?\s*[:\-]?\s*([\d/\s]{14,25})");
re!(re_name_labeled,
    r"(?im)^[ \t]*(?:name|naam|नाम)\s*[:\-]\s*([A-Za-z][A-Za-z .]{2,40})");
re!(re_name_heading, r"(?i)^(?:name|naam|नाम)$");
re!(re_dob_labeled,
    r"(?i)(?:dob|date\s*of\s*birth|d\.o\.b|जन्म\s*तिथि)\s*[:\-/]?\s*(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4})");
re!(re_address_anchor,
    r"(?is)(?:s[/\\]o|d[/\\]o|w[/\\]o|c[/\\]o|address|पता)\s*[:\-]?\s*(.+)");
re!(re_address_stop,
    r"(?i)\b(?:XXXX|VID\b|\d{4}[\s\-]\d{4}[\s\-]\d{4}|dob\b|male\b|female\b|मेरा\s*आधार|government|aadhaar\s*no)");
re!(re_pincode, r"\b(\d{6})\b");

const ADDRESS_MAX_CHARS: usize = 300;

/// Words that disqualify a line from the positional name guess.
const NAME_SKIP_WORDS: &[&str] = &[
    "male", "female", "dob", "date", "birth", "address", "government", "india",
    "aadhaar", "aadhar", "uid", "enrollment", "year", "of", "unique",
    "identification", "authority", "enrolment",
];

const GENDER_TOKENS: &[(&str, &str)] = &[
    ("female", "Female"),
    ("male", "Male"),
    ("transgender", "Transgender"),
    ("महिला", "Female"),
    ("पुरुष", "Male"),
];

/// Split digit characters into space-separated groups of four.
fn group_by_four(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    chars
        .chunks(4)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The Aadhaar number with separators removed; empty when none was found.
fn aadhaar_digits(found: &FieldMap) -> String {
    found
        .get(labels::AADHAAR_NUMBER)
        .map(|n| n.replace(' ', ""))
        .unwrap_or_default()
}

// ── Aadhaar number ────────────────────────────────────────────────────────────

fn masked_number(scan: &Scan, _: &FieldMap) -> Option<String> {
    let m = capture(re_masked(), scan.text())?;
    Some(collapse_whitespace(&m.to_uppercase()))
}

fn spaced_number(scan: &Scan, _: &FieldMap) -> Option<String> {
    let c = re_spaced().captures(scan.text())?;
    Some(format!("{} {} {}", &c[1], &c[2], &c[3]))
}

fn hyphenated_number(scan: &Scan, _: &FieldMap) -> Option<String> {
    let c = re_hyphenated().captures(scan.text())?;
    Some(format!("{} {} {}", &c[1], &c[2], &c[3]))
}

fn contiguous_number(scan: &Scan, _: &FieldMap) -> Option<String> {
    digit_runs(scan.text())
        .find(|run| run.chars().count() == 12)
        .map(group_by_four)
}

const NUMBER_STEPS: &[Step] = &[masked_number, spaced_number, hyphenated_number, contiguous_number];

// ── VID and enrolment ─────────────────────────────────────────────────────────

fn format_vid(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.chars().count() == 16 {
        group_by_four(&digits)
    } else {
        digits
    }
}

fn vid_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_vid_labeled(), scan.text()).map(|v| format_vid(&v))
}

fn vid_loose(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_vid_loose(), scan.text()).map(|v| format_vid(&v))
}

const VID_STEPS: &[Step] = &[vid_labeled, vid_loose];

fn enrolment(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_enrolment(), scan.text())
}

const ENROLMENT_STEPS: &[Step] = &[enrolment];

// ── Name ──────────────────────────────────────────────────────────────────────

/// Letters addressed "To" put the holder's name on the following line.
fn name_after_to(scan: &Scan, _: &FieldMap) -> Option<String> {
    let i = scan
        .lines()
        .iter()
        .position(|l| l.eq_ignore_ascii_case("to"))?;
    let candidate = text::clean_name(scan.line_after(i)?);
    let words: Vec<&str> = candidate.split_whitespace().collect();
    if (1..=5).contains(&words.len()) && words.iter().all(|w| w.len() >= 2) {
        Some(title_case(&words.join(" ")))
    } else {
        None
    }
}

fn name_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    let raw = capture(re_name_labeled(), scan.text())?;
    person_name(&raw, 4)
}

/// A lone "Name" heading line puts the value on the next line.
fn name_below_heading(scan: &Scan, _: &FieldMap) -> Option<String> {
    let i = scan
        .lines()
        .iter()
        .position(|l| re_name_heading().is_match(l))?;
    let candidate = collapse_whitespace(&text::clean_name(scan.line_after(i)?));
    let boilerplate = candidate
        .split(' ')
        .any(|w| NAME_SKIP_WORDS.contains(&w.to_lowercase().as_str()));
    (candidate.chars().count() >= 3 && !boilerplate).then(|| title_case(&candidate))
}

fn name_positional(scan: &Scan, _: &FieldMap) -> Option<String> {
    scan.lines().iter().skip(1).take(14).find_map(|line| {
        let candidate: String = line
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
            .collect();
        let candidate = collapse_whitespace(&candidate);
        let words: Vec<&str> = candidate.split(' ').filter(|w| w.len() >= 2).collect();
        let skipped = words
            .iter()
            .any(|w| NAME_SKIP_WORDS.contains(&w.to_lowercase().as_str()));
        ((2..=5).contains(&words.len()) && !skipped).then(|| title_case(&candidate))
    })
}

const NAME_STEPS: &[Step] = &[name_after_to, name_labeled, name_below_heading, name_positional];

// ── Date of birth and gender ──────────────────────────────────────────────────

fn dob_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_dob_labeled(), scan.text())
}

fn dob_bare(scan: &Scan, _: &FieldMap) -> Option<String> {
    text::bare_date(scan.text())
}

const DOB_STEPS: &[Step] = &[dob_labeled, dob_bare];

fn gender(scan: &Scan, _: &FieldMap) -> Option<String> {
    text::gender(scan.text(), GENDER_TOKENS)
}

const GENDER_STEPS: &[Step] = &[gender];

// ── Address and pincode ───────────────────────────────────────────────────────

fn address(scan: &Scan, _: &FieldMap) -> Option<String> {
    let tail = re_address_anchor().captures(scan.text())?.get(1)?.as_str();
    let body = match re_address_stop().find(tail) {
        Some(stop) => &tail[..stop.start()],
        None => tail,
    };
    let cleaned = collapse_whitespace(body);
    let cleaned = cleaned.trim_end_matches(',').trim();
    if cleaned.chars().count() <= 8 {
        return None;
    }
    let capped: String = cleaned.chars().take(ADDRESS_MAX_CHARS).collect();
    Some(capped.trim_end().to_string())
}

const ADDRESS_STEPS: &[Step] = &[address];

/// First six-digit number that is not part of the Aadhaar number.
fn pincode(scan: &Scan, found: &FieldMap) -> Option<String> {
    let used = aadhaar_digits(found);
    re_pincode()
        .captures_iter(scan.text())
        .map(|c| c[1].to_string())
        .find(|pin| !used.contains(pin.as_str()))
}

const PINCODE_STEPS: &[Step] = &[pincode];

fn state(scan: &Scan, _: &FieldMap) -> Option<String> {
    text::state_name(scan.text())
}

const STATE_STEPS: &[Step] = &[state];

/// Ten-digit number starting 6-9 that is not part of the Aadhaar number.
fn mobile(scan: &Scan, found: &FieldMap) -> Option<String> {
    let used = aadhaar_digits(found);
    digit_runs(scan.text())
        .filter(|run| run.chars().count() == 10 && run.starts_with(|c: char| ('6'..='9').contains(&c)))
        .find(|run| !used.contains(*run))
        .map(str::to_string)
}

const MOBILE_STEPS: &[Step] = &[mobile];

pub(crate) const CASCADES: &[Cascade] = &[
    Cascade::new(labels::AADHAAR_NUMBER, NUMBER_STEPS),
    Cascade::new(labels::VID, VID_STEPS),
    Cascade::new(labels::ENROLMENT_NO, ENROLMENT_STEPS),
    Cascade::new(labels::NAME, NAME_STEPS),
    Cascade::new(labels::DATE_OF_BIRTH, DOB_STEPS),
    Cascade::new(labels::GENDER, GENDER_STEPS),
    Cascade::new(labels::ADDRESS, ADDRESS_STEPS),
    Cascade::new(labels::PINCODE, PINCODE_STEPS),
    Cascade::new(labels::STATE, STATE_STEPS),
    Cascade::new(labels::MOBILE, MOBILE_STEPS),
];

/// Extract Aadhaar fields from OCR text.
pub fn extract_aadhaar(text: &str) -> FieldMap {
    crate::cascade::run(&Scan::new(text), CASCADES)
}
