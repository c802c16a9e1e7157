//! Voter ID (EPIC) cards.

use crate::cascade::{Cascade, Scan, Step};
use crate::fields::{labels, FieldMap};
use crate::text::{
    self, capture, clean_name, is_relative_label, is_upper_word, person_name, re, title_case,
};

re!(re_epic, r"\b([A-Z]{2,3}\d{7})\b");
re!(re_name_labeled,
    r"(?i)(?:elector\s*name|name\s*of\s*elector|name|नाम)\s*[:\-]\s*([A-Za-z][A-Za-z .]{2,50})");
re!(re_name_heading, r"(?i)^(?:name|naam)$");
re!(re_father_labeled,
    r"(?i)(?:father'?s?\s*name|पिता\s*का\s*नाम)\s*[:\-]?\s*([A-Za-z][A-Za-z .]{2,50})");
re!(re_husband_labeled,
    r"(?i)(?:husband'?s?\s*name|पति\s*का\s*नाम)\s*[:\-]?\s*([A-Za-z][A-Za-z .]{2,50})");
re!(re_father_heading, r"(?i)father'?s?\s*name|पिता");
re!(re_father_label_strip, r"(?i)father'?s?\s*name\s*[:\-]?");
re!(re_dob_labeled,
    r"(?i)(?:date\s*of\s*birth|dob|जन्म\s*तिथि|जन्म\s*दिनांक)\s*[:\-/]?\s*(\d{1,2}[\-/.]\d{1,2}[\-/.]\d{2,4})");
re!(re_age, r"(?i)(?:\bage|आयु)\s*[:\-/]?\s*(\d{2,3})");
re!(re_constituency,
    r"(?i)(?:assembly\s*constituency|parliamentary\s*constituency|विधान\s*सभा)\s*[:\-]?\s*([A-Za-z ()\d]{3,60})");
re!(re_part_no, r"(?i)\bpart\s*(?:no\.?|number|संख्या)?\s*[:\-]?\s*(\d+)");
re!(re_serial_no, r"(?i)(?:\bserial|\bsl\.?|क्रमांक)\s*(?:no\.?|number)?\s*[:\-]?\s*(\d+)");
re!(re_polling_station, r"(?i)polling\s*station\s*[:\-]?\s*([A-Za-z0-9 ,.]{4,80})");

/// Words that rule a capitalised line out as the elector's name.
const NAME_SKIP: &[&str] = &[
    "ELECTION", "COMMISSION", "INDIA", "ELECTOR", "ELECTORS", "PHOTO", "IDENTITY", "CARD",
    "NAME", "FATHER", "HUSBAND", "SEX", "MALE", "FEMALE", "DATE", "BIRTH", "AGE",
    "ASSEMBLY", "CONSTITUENCY", "PART", "SERIAL", "POLLING", "STATION", "ADDRESS",
];

const GENDER_TOKENS: &[(&str, &str)] = &[
    ("female", "Female"),
    ("male", "Male"),
    ("पुरुष", "Male"),
    ("महिला", "Female"),
];

fn epic_number(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_epic(), scan.text())
}

const NUMBER_STEPS: &[Step] = &[epic_number];

// ── Elector and relative names ────────────────────────────────────────────────

fn name_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    re_name_labeled()
        .captures_iter(scan.text())
        .filter(|c| c.get(0).map_or(false, |m| !is_relative_label(scan.text(), m.start())))
        .find_map(|c| person_name(c.get(1)?.as_str(), 4))
}

fn name_below_heading(scan: &Scan, _: &FieldMap) -> Option<String> {
    let i = scan
        .lines()
        .iter()
        .position(|l| re_name_heading().is_match(l))?;
    let candidate = clean_name(scan.line_after(i)?);
    (candidate.len() >= 4).then(|| title_case(&candidate))
}

/// First line of two to four all-capital words that is not card boilerplate.
fn name_capitalised_line(scan: &Scan, _: &FieldMap) -> Option<String> {
    scan.lines().iter().find_map(|line| {
        let words: Vec<&str> = line.split_whitespace().collect();
        let looks_like_name = (2..=4).contains(&words.len())
            && words.iter().all(|w| is_upper_word(w) && w.chars().count() >= 2)
            && !words.iter().any(|w| NAME_SKIP.contains(w));
        looks_like_name.then(|| title_case(line))
    })
}

const NAME_STEPS: &[Step] = &[name_labeled, name_below_heading, name_capitalised_line];

fn father_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    person_name(&capture(re_father_labeled(), scan.text())?, 4)
}

fn husband_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    person_name(&capture(re_husband_labeled(), scan.text())?, 4)
}

/// Relative's name on the heading line itself, else on the line below.
fn father_near_heading(scan: &Scan, _: &FieldMap) -> Option<String> {
    let i = scan
        .lines()
        .iter()
        .position(|l| re_father_heading().is_match(l))?;
    let same = clean_name(&re_father_label_strip().replace_all(&scan.lines()[i], ""));
    if same.len() >= 4 {
        return Some(title_case(&same));
    }
    let below = clean_name(scan.line_after(i)?);
    (below.len() >= 4).then(|| title_case(&below))
}

const RELATIVE_STEPS: &[Step] = &[father_labeled, husband_labeled, father_near_heading];

// ── Birth date or age ─────────────────────────────────────────────────────────

fn dob_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_dob_labeled(), scan.text())
}

fn dob_bare(scan: &Scan, _: &FieldMap) -> Option<String> {
    text::bare_date(scan.text())
}

const DOB_STEPS: &[Step] = &[dob_labeled, dob_bare];

/// Older cards print an age instead of a birth date.
fn age(scan: &Scan, found: &FieldMap) -> Option<String> {
    if found.contains(labels::DATE_OF_BIRTH) {
        return None;
    }
    capture(re_age(), scan.text())
}

const AGE_STEPS: &[Step] = &[age];

fn gender(scan: &Scan, _: &FieldMap) -> Option<String> {
    text::gender(scan.text(), GENDER_TOKENS)
}

const GENDER_STEPS: &[Step] = &[gender];

// ── Electoral roll details ────────────────────────────────────────────────────

fn constituency(scan: &Scan, _: &FieldMap) -> Option<String> {
    let raw = capture(re_constituency(), scan.text())?;
    Some(raw.trim_end_matches('.').trim().to_string())
}

const CONSTITUENCY_STEPS: &[Step] = &[constituency];

fn part_no(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_part_no(), scan.text())
}

const PART_NO_STEPS: &[Step] = &[part_no];

fn serial_no(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_serial_no(), scan.text())
}

const SERIAL_NO_STEPS: &[Step] = &[serial_no];

fn polling_station(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_polling_station(), scan.text())
}

const POLLING_STATION_STEPS: &[Step] = &[polling_station];

fn state(scan: &Scan, _: &FieldMap) -> Option<String> {
    text::state_name(scan.text())
}

const STATE_STEPS: &[Step] = &[state];

pub(crate) const CASCADES: &[Cascade] = &[
    Cascade::new(labels::EPIC_NUMBER, NUMBER_STEPS),
    Cascade::new(labels::NAME, NAME_STEPS),
    Cascade::new(labels::FATHERS_NAME, RELATIVE_STEPS),
    Cascade::new(labels::DATE_OF_BIRTH, DOB_STEPS),
    Cascade::new(labels::AGE, AGE_STEPS),
    Cascade::new(labels::GENDER, GENDER_STEPS),
    Cascade::new(labels::CONSTITUENCY, CONSTITUENCY_STEPS),
    Cascade::new(labels::PART_NO, PART_NO_STEPS),
    Cascade::new(labels::SERIAL_NO, SERIAL_NO_STEPS),
    Cascade::new(labels::POLLING_STATION, POLLING_STATION_STEPS),
    Cascade::new(labels::STATE, STATE_STEPS),
];

/// Extract voter ID fields from OCR text.
pub fn extract_voter(text: &str) -> FieldMap {
    crate::cascade::run(&Scan::new(text), CASCADES)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = "ELECTION COMMISSION OF INDIA\nELECTOR PHOTO IDENTITY CARD\nXYZ1234567\n\
        Elector's Name : SEEMA PATIL\nFather's Name : ANAND PATIL\nSex : Female\n\
        Date of Birth : 21/11/1992\nAssembly Constituency : 215 Kothrud\n\
        Part No : 134\nSerial No : 567\nPolling Station : Zilla Parishad School, Kothrud\n\
        Maharashtra";

    #[test]
    fn test_full_card() {
        let f = extract_voter(CARD);
        assert_eq!(f.get(labels::EPIC_NUMBER), Some("XYZ1234567"));
        assert_eq!(f.get(labels::NAME), Some("Seema Patil"));
        assert_eq!(f.get(labels::FATHERS_NAME), Some("Anand Patil"));
        assert_eq!(f.get(labels::GENDER), Some("Female"));
        assert_eq!(f.get(labels::DATE_OF_BIRTH), Some("21/11/1992"));
        assert!(!f.contains(labels::AGE));
        assert_eq!(f.get(labels::CONSTITUENCY), Some("215 Kothrud"));
        assert_eq!(f.get(labels::PART_NO), Some("134"));
        assert_eq!(f.get(labels::SERIAL_NO), Some("567"));
        assert_eq!(
            f.get(labels::POLLING_STATION),
            Some("Zilla Parishad School, Kothrud")
        );
        assert_eq!(f.get(labels::STATE), Some("Maharashtra"));
    }

    #[test]
    fn test_two_letter_epic_prefix() {
        let f = extract_voter("Election Commission\nAB1234567");
        assert_eq!(f.get(labels::EPIC_NUMBER), Some("AB1234567"));
    }

    #[test]
    fn test_age_only_without_birth_date() {
        let f = extract_voter("Name : RAMU LAL\nHusband's Name : SHYAM LAL\nAge : 45\nMale");
        assert_eq!(f.get(labels::NAME), Some("Ramu Lal"));
        assert_eq!(f.get(labels::FATHERS_NAME), Some("Shyam Lal"));
        assert_eq!(f.get(labels::AGE), Some("45"));
        assert_eq!(f.get(labels::GENDER), Some("Male"));
    }

    #[test]
    fn test_name_under_heading() {
        let f = extract_voter("Name\nKAVITA SINGH\nFather's Name\nHARI SINGH");
        assert_eq!(f.get(labels::NAME), Some("Kavita Singh"));
        assert_eq!(f.get(labels::FATHERS_NAME), Some("Hari Singh"));
    }

    #[test]
    fn test_capitalised_line_skips_commission_heading() {
        let f = extract_voter("ELECTION COMMISSION OF INDIA\nSEEMA PATIL\nABC1234567");
        assert_eq!(f.get(labels::NAME), Some("Seema Patil"));
        assert_eq!(f.get(labels::EPIC_NUMBER), Some("ABC1234567"));
    }
}
