//! Driving licences.

use crate::cascade::{Cascade, Scan, Step};
use crate::fields::{labels, FieldMap};
use crate::text::{
    capture, clean_name, collapse_whitespace, is_relative_label, is_upper_word, person_name, re,
    title_case,
};

re!(re_dl_grouped, r"\b([A-Z]{2})[\s\-]?(\d{2})[\s\-]?(\d{4})[\s\-]?(\d{7})\b");
re!(re_dl_compact, r"\b([A-Z]{2}\d{2}[A-Z]?\d{10,11})\b");
re!(re_dl_plain, r"\b([A-Z]{2}\d{13})\b");
re!(re_date, r"(\d{1,2}[\-/.]\d{1,2}[\-/.]\d{4})");
re!(re_issue_labeled,
    r"(?i)(?:date\s*of\s*issue|d\.?\s*o\.?\s*i\.?|issued\s*on)\s*[:\-]?\s*(\d{1,2}[\-/.]\d{1,2}[\-/.]\d{4})");
re!(re_valid_labeled,
    r"(?i)(?:valid\s*till|validity|expiry|expires?\s*on|valid\s*upto)\s*[:\-]?\s*(\d{1,2}[\-/.]\d{1,2}[\-/.]\d{4})");
re!(re_dob_labeled,
    r"(?i)(?:date\s*of\s*birth|d\.?\s*o\.?\s*b\.?|dob)\s*[:\-]?\s*(\d{1,2}[\-/.]\d{1,2}[\-/.]\d{4})");
re!(re_date_block,
    r"(\d{1,2}[\-/.]\d{1,2}[\-/.]\d{4})\s+(\d{1,2}[\-/.]\d{1,2}[\-/.]\d{4})");
re!(re_blood_labeled, r"(?i)blood\s*group\s*[:\-]?\s*([ABO]{1,2}[+\-]?)");
re!(re_blood_bare, r"\b(?:AB|A|B|O)[+\-]");
re!(re_name_heading, r"(?i)(?:^|\s)(?:name|naam)\s*$");
re!(re_name_labeled, r"(?i)(?:name|naam)\s*[:\-]\s*([A-Za-z][A-Za-z .]{2,45})");
re!(re_relation_spelled,
    r"(?i)(?:son|daughter|wife)\s*/?\s*(?:daughter\s*/\s*)?(?:son\s*/\s*)?(?:wife\s*of|of)\s*[:\-]?\s*([A-Za-z][A-Za-z .]{2,50})");
re!(re_relation_short, r"(?i)\b[SDW]\s*/\s*O\b\s*[:\-]?\s*([A-Za-z][A-Za-z .]{2,50})");
re!(re_vehicle_class,
    r"(?i)(?:\bcov\b|class\s*of\s*vehicle|vehicle\s*class|authori[sz]ed\s*to\s*drive)\s*[:\-]?\s*([A-Z0-9,/ \-]{2,40})");
re!(re_authority,
    r"(?i)(?:licen[sc]ing\s*authority|issued\s*by|issuing\s*authority|\brto\b)\s*[:\-]?\s*([A-Za-z ,.]{4,60})");
re!(re_address,
    r"(?is)(?:address|addr|पता)\s*[:\-]?\s*(.+?)(?:\n\n|\bDL\b|\bLicen|\bValid|\bCOV\b|$)");

const ADDRESS_MAX_CHARS: usize = 250;
const VEHICLE_CLASS_MAX_CHARS: usize = 60;

/// Tokens that rule a capitalised line out as the holder's name.
const NAME_SKIP: &[&str] = &[
    "DRIVING", "LICENCE", "LICENSE", "UNION", "INDIA", "TRANSPORT", "AUTHORITY",
    "VEHICLE", "CLASS", "BLOOD", "VALID", "ISSUE", "BIRTH", "GROUP", "LMV", "MCWG", "COV",
];

/// Two-letter RTO state codes that prefix a licence number.
const STATE_CODES: &[(&str, &str)] = &[
    ("AN", "Andaman & Nicobar"), ("AP", "Andhra Pradesh"), ("AR", "Arunachal Pradesh"),
    ("AS", "Assam"), ("BR", "Bihar"), ("CH", "Chandigarh"), ("CG", "Chhattisgarh"),
    ("DN", "Dadra & Nagar Haveli"), ("DD", "Daman & Diu"), ("DL", "Delhi"),
    ("GA", "Goa"), ("GJ", "Gujarat"), ("HR", "Haryana"), ("HP", "Himachal Pradesh"),
    ("JK", "Jammu & Kashmir"), ("JH", "Jharkhand"), ("KA", "Karnataka"),
    ("KL", "Kerala"), ("LD", "Lakshadweep"), ("MP", "Madhya Pradesh"),
    ("MH", "Maharashtra"), ("MN", "Manipur"), ("ML", "Meghalaya"), ("MZ", "Mizoram"),
    ("NL", "Nagaland"), ("OD", "Odisha"), ("OR", "Odisha"), ("PY", "Puducherry"),
    ("PB", "Punjab"), ("RJ", "Rajasthan"), ("SK", "Sikkim"), ("TN", "Tamil Nadu"),
    ("TG", "Telangana"), ("TR", "Tripura"), ("UP", "Uttar Pradesh"),
    ("UK", "Uttarakhand"), ("WB", "West Bengal"),
];

/// Full state name for the first two letters of a licence number.
pub fn state_for_code(dl_number: &str) -> Option<&'static str> {
    let prefix: String = dl_number.chars().take(2).collect::<String>().to_uppercase();
    STATE_CODES
        .iter()
        .find(|(code, _)| *code == prefix)
        .map(|(_, name)| *name)
}

// ── Licence number ────────────────────────────────────────────────────────────

fn number_grouped(scan: &Scan, _: &FieldMap) -> Option<String> {
    let c = re_dl_grouped().captures(scan.text())?;
    Some(format!("{}-{}-{}-{}", &c[1], &c[2], &c[3], &c[4]))
}

fn number_compact(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_dl_compact(), scan.text())
}

fn number_plain(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_dl_plain(), scan.text())
}

const NUMBER_STEPS: &[Step] = &[number_grouped, number_compact, number_plain];

// ── Dates ─────────────────────────────────────────────────────────────────────

fn all_dates(text: &str) -> Vec<&str> {
    re_date().find_iter(text).map(|m| m.as_str()).collect()
}

/// Unlabeled "issue validity" pair, used only when neither date is labeled.
fn date_block(text: &str) -> Option<(String, String)> {
    if all_dates(text).len() < 2
        || re_issue_labeled().is_match(text)
        || re_valid_labeled().is_match(text)
    {
        return None;
    }
    let c = re_date_block().captures(text)?;
    Some((c[1].to_string(), c[2].to_string()))
}

fn issue_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_issue_labeled(), scan.text())
}

fn issue_from_block(scan: &Scan, _: &FieldMap) -> Option<String> {
    date_block(scan.text()).map(|(issue, _)| issue)
}

const ISSUE_STEPS: &[Step] = &[issue_labeled, issue_from_block];

fn valid_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_valid_labeled(), scan.text())
}

fn valid_from_block(scan: &Scan, _: &FieldMap) -> Option<String> {
    date_block(scan.text()).map(|(_, valid)| valid)
}

const VALID_STEPS: &[Step] = &[valid_labeled, valid_from_block];

fn dob_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_dob_labeled(), scan.text())
}

/// With three or more dates on the card, the first one not already used as
/// issue or validity date.
fn dob_unused_date(scan: &Scan, found: &FieldMap) -> Option<String> {
    let dates = all_dates(scan.text());
    if dates.len() < 3 {
        return None;
    }
    let used = [found.get(labels::DATE_OF_ISSUE), found.get(labels::VALID_TILL)];
    dates
        .into_iter()
        .find(|d| !used.contains(&Some(*d)))
        .map(str::to_string)
}

const DOB_STEPS: &[Step] = &[dob_labeled, dob_unused_date];

// ── Blood group ───────────────────────────────────────────────────────────────

fn blood_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_blood_labeled(), scan.text()).map(|b| b.to_uppercase())
}

/// A bare group such as "B+" that is not the start of a code like "B-12".
fn blood_bare(scan: &Scan, _: &FieldMap) -> Option<String> {
    let text = scan.text();
    re_blood_bare()
        .find_iter(text)
        .find(|m| {
            !text[m.end()..]
                .chars()
                .next()
                .map_or(false, |c| c.is_ascii_digit())
        })
        .map(|m| m.as_str().to_string())
}

const BLOOD_STEPS: &[Step] = &[blood_labeled, blood_bare];

// ── Names ─────────────────────────────────────────────────────────────────────

fn name_below_heading(scan: &Scan, _: &FieldMap) -> Option<String> {
    let i = scan
        .lines()
        .iter()
        .position(|l| re_name_heading().is_match(l))?;
    let candidate = clean_name(scan.line_after(i)?);
    (candidate.len() >= 3).then(|| title_case(&candidate))
}

fn name_labeled(scan: &Scan, _: &FieldMap) -> Option<String> {
    re_name_labeled()
        .captures_iter(scan.text())
        .filter(|c| c.get(0).map_or(false, |m| !is_relative_label(scan.text(), m.start())))
        .find_map(|c| person_name(c.get(1)?.as_str(), 3))
}

/// First line of one to four all-capital words that is not licence boilerplate.
fn name_capitalised_line(scan: &Scan, _: &FieldMap) -> Option<String> {
    scan.lines().iter().find_map(|line| {
        let words: Vec<&str> = line.split_whitespace().collect();
        let upper = line.to_uppercase();
        let looks_like_name = (1..=4).contains(&words.len())
            && words.iter().all(|w| is_upper_word(w) && w.chars().count() >= 2)
            && !NAME_SKIP.iter().any(|s| upper.contains(s));
        looks_like_name.then(|| title_case(line))
    })
}

const NAME_STEPS: &[Step] = &[name_below_heading, name_labeled, name_capitalised_line];

fn relation_spelled(scan: &Scan, _: &FieldMap) -> Option<String> {
    let raw = capture(re_relation_spelled(), scan.text())?;
    person_name(&raw, 3)
}

fn relation_short(scan: &Scan, _: &FieldMap) -> Option<String> {
    let raw = capture(re_relation_short(), scan.text())?;
    person_name(&raw, 3)
}

const RELATION_STEPS: &[Step] = &[relation_spelled, relation_short];

// ── Licence details ───────────────────────────────────────────────────────────

fn vehicle_class(scan: &Scan, _: &FieldMap) -> Option<String> {
    let raw = capture(re_vehicle_class(), scan.text())?;
    let trimmed = raw.trim_end_matches(',').trim();
    Some(trimmed.chars().take(VEHICLE_CLASS_MAX_CHARS).collect())
}

const VEHICLE_CLASS_STEPS: &[Step] = &[vehicle_class];

fn issuing_authority(scan: &Scan, _: &FieldMap) -> Option<String> {
    capture(re_authority(), scan.text())
}

const AUTHORITY_STEPS: &[Step] = &[issuing_authority];

fn address(scan: &Scan, _: &FieldMap) -> Option<String> {
    let raw = capture(re_address(), scan.text())?;
    let cleaned = collapse_whitespace(&raw);
    let capped: String = cleaned
        .trim_end_matches(',')
        .chars()
        .take(ADDRESS_MAX_CHARS)
        .collect();
    let capped = capped.trim_end();
    (capped.chars().count() > 6).then(|| capped.to_string())
}

const ADDRESS_STEPS: &[Step] = &[address];

fn state_from_number(_: &Scan, found: &FieldMap) -> Option<String> {
    state_for_code(found.get(labels::DL_NUMBER)?).map(str::to_string)
}

const STATE_STEPS: &[Step] = &[state_from_number];

pub(crate) const CASCADES: &[Cascade] = &[
    Cascade::new(labels::DL_NUMBER, NUMBER_STEPS),
    Cascade::new(labels::DATE_OF_ISSUE, ISSUE_STEPS),
    Cascade::new(labels::VALID_TILL, VALID_STEPS),
    Cascade::new(labels::DATE_OF_BIRTH, DOB_STEPS),
    Cascade::new(labels::BLOOD_GROUP, BLOOD_STEPS),
    Cascade::new(labels::NAME, NAME_STEPS),
    Cascade::new(labels::RELATION_OF, RELATION_STEPS),
    Cascade::new(labels::VEHICLE_CLASS, VEHICLE_CLASS_STEPS),
    Cascade::new(labels::ISSUING_AUTHORITY, AUTHORITY_STEPS),
    Cascade::new(labels::ADDRESS, ADDRESS_STEPS),
    Cascade::new(labels::STATE, STATE_STEPS),
];

/// Extract driving licence fields from OCR text.
pub fn extract_dl(text: &str) -> FieldMap {
    crate::cascade::run(&Scan::new(text), CASCADES)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = "Indian Union Driving Licence\nIssued by Government of Maharashtra\n\
        DL No MH12 20110012345\nDOI : 12-05-2011\nValid Till : 11-05-2031\n\
        DOB : 03-04-1988 Blood Group : B+\nName\nPRIYA DESHPANDE\n\
        Son/Daughter/Wife of : VIJAY DESHPANDE\n\
        Address : Flat 5, Shanti Niwas, Kothrud, Pune 411038\n\nCOV LMV, MCWG";

    #[test]
    fn test_maharashtra_card() {
        let f = extract_dl(CARD);
        assert_eq!(f.get(labels::DL_NUMBER), Some("MH-12-2011-0012345"));
        assert_eq!(f.get(labels::STATE), Some("Maharashtra"));
        assert_eq!(f.get(labels::DATE_OF_ISSUE), Some("12-05-2011"));
        assert_eq!(f.get(labels::VALID_TILL), Some("11-05-2031"));
        assert_eq!(f.get(labels::DATE_OF_BIRTH), Some("03-04-1988"));
        assert_eq!(f.get(labels::BLOOD_GROUP), Some("B+"));
        assert_eq!(f.get(labels::NAME), Some("Priya Deshpande"));
        assert_eq!(f.get(labels::RELATION_OF), Some("Vijay Deshpande"));
        assert_eq!(f.get(labels::VEHICLE_CLASS), Some("LMV, MCWG"));
        assert_eq!(
            f.get(labels::ADDRESS),
            Some("Flat 5, Shanti Niwas, Kothrud, Pune 411038")
        );
        assert_eq!(f.get(labels::ISSUING_AUTHORITY), Some("Government of Maharashtra"));
    }

    #[test]
    fn test_state_lookup_by_prefix() {
        assert_eq!(state_for_code("MH-12-2011-0012345"), Some("Maharashtra"));
        assert_eq!(state_for_code("ka0120190001234"), Some("Karnataka"));
        assert_eq!(state_for_code("ZZ-12-2011-0012345"), None);
        assert_eq!(state_for_code(""), None);
    }

    #[test]
    fn test_no_number_means_no_state() {
        let f = extract_dl("Driving Licence\nName: ANIL KUMAR");
        assert!(!f.contains(labels::DL_NUMBER));
        assert!(!f.contains(labels::STATE));
        assert_eq!(f.get(labels::NAME), Some("Anil Kumar"));
    }

    #[test]
    fn test_compact_number_forms() {
        let f = extract_dl("KA0120190001234");
        assert_eq!(f.get(labels::DL_NUMBER), Some("KA-01-2019-0001234"));
        let f = extract_dl("TN01X20200012345");
        assert_eq!(f.get(labels::DL_NUMBER), Some("TN01X20200012345"));
        assert_eq!(f.get(labels::STATE), Some("Tamil Nadu"));
    }

    #[test]
    fn test_unlabeled_date_block_fills_issue_and_validity() {
        let text = "DL-0420110149646\n09/02/2011 08/02/2031\n01/01/1990";
        let f = extract_dl(text);
        assert_eq!(f.get(labels::DATE_OF_ISSUE), Some("09/02/2011"));
        assert_eq!(f.get(labels::VALID_TILL), Some("08/02/2031"));
        assert_eq!(f.get(labels::DATE_OF_BIRTH), Some("01/01/1990"));
    }

    #[test]
    fn test_block_is_skipped_when_a_date_is_labeled() {
        let text = "Valid Till 08/02/2031\n09/02/2011 07/07/2015";
        let f = extract_dl(text);
        assert_eq!(f.get(labels::VALID_TILL), Some("08/02/2031"));
        assert!(!f.contains(labels::DATE_OF_ISSUE));
    }

    #[test]
    fn test_blood_group_ignores_codes() {
        let f = extract_dl("Sector B-12\nO+ve");
        assert_eq!(f.get(labels::BLOOD_GROUP), Some("O+"));
    }

    #[test]
    fn test_short_relation_prefix() {
        let f = extract_dl("S/O RAJESH KUMAR");
        assert_eq!(f.get(labels::RELATION_OF), Some("Rajesh Kumar"));
    }

    #[test]
    fn test_labeled_name_skips_fathers_label() {
        let f = extract_dl("Driving Licence\nMH12 20110012345\nFather's Name: GOPAL RAO\nName: ASHA RAO");
        assert_eq!(f.get(labels::NAME), Some("Asha Rao"));
        assert_eq!(f.get(labels::STATE), Some("Maharashtra"));
    }
}
