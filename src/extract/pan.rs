//! PAN cards.

use crate::cascade::{Cascade, Scan, Step};
use crate::fields::{labels, FieldMap};
use crate::text::{self, capture, clean_name, is_relative_label, is_upper_word, person_name, re, title_case};

re!(re_pan, r"\b([A-Z]{5}[0-9]{4}[A-Z])\b");
re!(re_name_heading, r"(?i)(?:^|/)\s*name\s*$");
re!(re_name_heading_hindi, r"(?i)^(?:naam|नाम\s*/\s*name)$");
re!(re_name_labeled, r"(?i)(?:name|naam)\s*[:\-]\s*([A-Za-z][A-Za-z .]{2,50})");
re!(re_father_heading, r"(?i)father'?s?\s*name|पिता\s*का\s*नाम");
re!(re_father_labeled,
    r"(?i)(?:father'?s?\s*(?:name)?|पिता)\s*[:\-/]\s*([A-Za-z][A-Za-z .]{2,50})");
re!(re_father_label_strip, r"(?i)(?:father'?s?\s*name|पिता\s*का\s*नाम)\s*[:\-/]?\s*");
re!(re_dob_heading, r"(?i)date\s*of\s*birth|dob|जन्म\s*की\s*तारीख");
re!(re_account_type, r"(?i)\b(individual|company|firm|huf|trust|aop|boi|llp|partnership)\b");
re!(re_income_tax, r"(?i)income\s*tax|आयकर");
re!(re_latin_letter, r"[A-Za-z]");

pub const ISSUER: &str = "Income Tax Department, Govt. of India";

/// Words that rule a capitalised line out as the holder's name.
const NAME_SKIP: &[&str] = &[
    "income", "tax", "govt", "government", "permanent", "account", "india", "department",
];

fn pan_number(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_pan(), scan.text())
}

const NUMBER_STEPS: &[Step] = &[pan_number];

// ── Name ──────────────────────────────────────────────────────────────────────

/// A lone "Name" heading line puts the value on the next line.
fn name_below_heading(scan: &Scan, _: &FieldMap) -> Option<String> {
    let i = scan
        .lines()
        .iter()
        .position(|l| re_name_heading().is_match(l) || re_name_heading_hindi().is_match(l))?;
    let candidate = clean_name(scan.line_after(i)?);
    (candidate.len() >= 3).then(|| title_case(&candidate))
}

fn name_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    re_name_labeled()
        .captures_iter(scan.text())
        .filter(|c| c.get(0).map_or(false, |m| !is_relative_label(scan.text(), m.start())))
        .find_map(|c| person_name(c.get(1)?.as_str(), 3))
}

/// First line of two to five all-capital words that is not card boilerplate.
fn name_capitalised_line(scan: &Scan, _: &FieldMap) -> Option<String> {
    scan.lines().iter().find_map(|line| {
        let words: Vec<&str> = line.split_whitespace().collect();
        let lowered = line.to_lowercase();
        let looks_like_name = (2..=5).contains(&words.len())
            && words.iter().all(|w| is_upper_word(w) && w.chars().count() >= 2)
            && !NAME_SKIP.iter().any(|s| lowered.contains(s));
        looks_like_name.then(|| title_case(line))
    })
}

const NAME_STEPS: &[Step] = &[name_below_heading, name_labeled, name_capitalised_line];

// ── Father's name ─────────────────────────────────────────────────────────────

/// Value on the heading line itself, else on the line below.
fn father_near_heading(scan: &Scan, _: &FieldMap) -> Option<String> {
    let i = scan
        .lines()
        .iter()
        .position(|l| re_father_heading().is_match(l))?;
    let line = &scan.lines()[i];
    let same_line = re_father_label_strip().replace_all(line, "");
    let same_line = same_line.trim();
    if same_line.chars().count() >= 3 && re_latin_letter().is_match(same_line) {
        let candidate = clean_name(same_line);
        if candidate.len() >= 3 {
            return Some(title_case(&candidate));
        }
    }
    let candidate = clean_name(scan.line_after(i)?);
    (candidate.len() >= 3).then(|| title_case(&candidate))
}

fn father_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    let raw = capture(re_father_labeled(), scan.text())?;
    person_name(&raw, 3)
}

const FATHER_STEPS: &[Step] = &[father_near_heading, father_labeled];

// ── Date of birth ─────────────────────────────────────────────────────────────

/// Date on the first DOB heading line, else on the line below it.
fn dob_near_heading(scan: &Scan, _: &FieldMap) -> Option<String> {
    let i = scan
        .lines()
        .iter()
        .position(|l| re_dob_heading().is_match(l))?;
    text::first_date(&scan.lines()[i]).or_else(|| text::first_date(scan.line_after(i)?))
}

fn dob_bare(scan: &Scan, _: &FieldMap) -> Option<String> {
    text::bare_date(scan.text())
}

const DOB_STEPS: &[Step] = &[dob_near_heading, dob_bare];

// ── Holder type and issuer ────────────────────────────────────────────────────

fn account_type_word(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_account_type(), scan.text()).map(|t| title_case(&t))
}

/// The fourth character of a PAN encodes the holder type.
fn account_type_from_number(_: &Scan, found: &FieldMap) -> Option<String> {
    let holder = found.get(labels::PAN_NUMBER)?.chars().nth(3)?;
    let label = match holder {
        'P' => "Individual",
        'C' => "Company",
        'H' => "Huf",
        'F' => "Firm",
        'A' => "Aop",
        'T' => "Trust",
        'B' => "Boi",
        'L' => "Local Authority",
        'J' => "Artificial Juridical Person",
        'G' => "Government",
        _ => return None,
    };
    Some(label.to_string())
}

const ACCOUNT_TYPE_STEPS: &[Step] = &[account_type_word, account_type_from_number];

fn issuer(scan: &Scan, _: &FieldMap) -> Option<String> {
    re_income_tax()
        .is_match(scan.text())
        .then(|| ISSUER.to_string())
}

const ISSUER_STEPS: &[Step] = &[issuer];

pub(crate) const CASCADES: &[Cascade] = &[
    Cascade::new(labels::PAN_NUMBER, NUMBER_STEPS),
    Cascade::new(labels::NAME, NAME_STEPS),
    Cascade::new(labels::FATHERS_NAME, FATHER_STEPS),
    Cascade::new(labels::DATE_OF_BIRTH, DOB_STEPS),
    Cascade::new(labels::ACCOUNT_TYPE, ACCOUNT_TYPE_STEPS),
    Cascade::new(labels::ISSUED_BY, ISSUER_STEPS),
];

/// Extract PAN card fields from OCR text.
pub fn extract_pan(text: &str) -> FieldMap {
    crate::cascade::run(&Scan::new(text), CASCADES)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = "आयकर विभाग INCOME TAX DEPARTMENT\nभारत सरकार GOVT. OF INDIA\n\
        स्थायी लेखा संख्या कार्ड Permanent Account Number Card\nABCPE1234F\n\
        नाम / Name\nRAVI KUMAR\nपिता का नाम / Father's Name\nSURESH KUMAR\n\
        जन्म की तारीख / Date of Birth\n15/08/1990";

    #[test]
    fn test_modern_card() {
        let f = extract_pan(CARD);
        assert_eq!(f.get(labels::PAN_NUMBER), Some("ABCPE1234F"));
        assert_eq!(f.get(labels::NAME), Some("Ravi Kumar"));
        assert_eq!(f.get(labels::FATHERS_NAME), Some("Suresh Kumar"));
        assert_eq!(f.get(labels::DATE_OF_BIRTH), Some("15/08/1990"));
        assert_eq!(f.get(labels::ACCOUNT_TYPE), Some("Individual"));
        assert_eq!(f.get(labels::ISSUED_BY), Some(ISSUER));
    }

    #[test]
    fn test_minimal_card() {
        let f = extract_pan("Income Tax Department\nABCDE1234F");
        assert_eq!(f.get(labels::PAN_NUMBER), Some("ABCDE1234F"));
        assert!(f.contains(labels::ISSUED_BY));
    }

    #[test]
    fn test_old_card_without_headings() {
        let text = "INCOME TAX DEPARTMENT GOVT. OF INDIA\nMEENA IYER\nRAMAN IYER\n01/01/1975\nPermanent Account Number\nAAAPI1234C";
        let f = extract_pan(text);
        assert_eq!(f.get(labels::NAME), Some("Meena Iyer"));
        assert_eq!(f.get(labels::DATE_OF_BIRTH), Some("01/01/1975"));
        assert!(!f.contains(labels::FATHERS_NAME));
    }

    #[test]
    fn test_labeled_name_ignores_fathers_label() {
        let text = "Father's Name: GOPAL RAO\nName: ASHA RAO";
        let f = extract_pan(text);
        assert_eq!(f.get(labels::NAME), Some("Asha Rao"));
        assert_eq!(f.get(labels::FATHERS_NAME), Some("Gopal Rao"));
    }

    #[test]
    fn test_explicit_account_type_word_wins() {
        let f = extract_pan("AAACT1234Q\nStatus: Company");
        assert_eq!(f.get(labels::ACCOUNT_TYPE), Some("Company"));
        let f = extract_pan("AAATT1234Q");
        assert_eq!(f.get(labels::ACCOUNT_TYPE), Some("Trust"));
    }

    #[test]
    fn test_lowercase_pan_is_not_a_pan() {
        assert!(!extract_pan("abcde1234f").contains(labels::PAN_NUMBER));
    }
}
