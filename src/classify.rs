//! Document-type classification by weighted keyword and structure signals.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::normalize;
use crate::text::re;

/// Points for each keyword signal found in the lower-cased text.
const KEYWORD_POINTS: u32 = 2;
/// Points for the document type's structural ID pattern.
const STRUCTURE_POINTS: u32 = 6;

/// Identity document kinds the extractors understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Aadhaar,
    Pan,
    Dl,
    Voter,
    Unknown,
}

impl DocumentType {
    /// Scored candidates, in tie-break order.
    pub const CANDIDATES: [DocumentType; 4] = [
        DocumentType::Aadhaar,
        DocumentType::Pan,
        DocumentType::Dl,
        DocumentType::Voter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Aadhaar => "aadhaar",
            DocumentType::Pan => "pan",
            DocumentType::Dl => "dl",
            DocumentType::Voter => "voter",
            DocumentType::Unknown => "unknown",
        }
    }

    /// Number of fields a well-read document of this type usually yields.
    pub fn expected_field_count(&self) -> usize {
        match self {
            DocumentType::Aadhaar => 8,
            DocumentType::Pan => 5,
            DocumentType::Dl => 8,
            DocumentType::Voter => 7,
            DocumentType::Unknown => 4,
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            DocumentType::Aadhaar => &[
                "aadhaar", "aadhar", "uidai", "uid", "unique identification authority",
                "enrollment no", "enrolment no", "भारत सरकार", "आधार", "मेरा आधार",
                "government of india", "xxxx xxxx", "virtual id", "vid :",
            ],
            DocumentType::Pan => &[
                "permanent account number", "income tax department", "income tax",
                "आयकर विभाग", "govt. of india", "pan", "स्थायी लेखा",
            ],
            DocumentType::Dl => &[
                "driving licence", "driving license", "dl no", "licence no",
                "transport department", "vehicle class", "cov", "lmv", "mcwg", "rto",
                "union of india", "date of issue", "valid till", "son/daughter/wife",
            ],
            DocumentType::Voter => &[
                "election commission", "voter", "electors photo", "epic",
                "electoral", "निर्वाचन आयोग", "मतदाता", "part no",
                "assembly constituency", "elector photo identity card", "kkd", "kk",
            ],
            DocumentType::Unknown => &[],
        }
    }

    fn has_structure(&self, text: &str) -> bool {
        match self {
            DocumentType::Aadhaar => re_aadhaar_shape().is_match(text),
            DocumentType::Pan => re_pan_shape().is_match(text),
            DocumentType::Dl => re_dl_shape().is_match(text),
            DocumentType::Voter => re_epic_shape().is_match(text),
            DocumentType::Unknown => false,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aadhaar" => Ok(DocumentType::Aadhaar),
            "pan" => Ok(DocumentType::Pan),
            "dl" => Ok(DocumentType::Dl),
            "voter" => Ok(DocumentType::Voter),
            "unknown" => Ok(DocumentType::Unknown),
            other => Err(format!("Unknown document type: '{other}'")),
        }
    }
}

re!(re_pan_shape, r"\b[A-Z]{5}[0-9]{4}[A-Z]\b");
re!(re_aadhaar_shape, r"(?i)\b\d{4}[\s\-]\d{4}[\s\-]\d{4}\b|\b\d{12}\b|XXXX\s*XXXX\s*\d{4}");
re!(re_dl_shape, r"\b[A-Z]{2}[\s\-]?\d{2}[\s\-]?\d{4,11}\b");
re!(re_epic_shape, r"\b[A-Z]{3}\d{7}\b");

/// Evidence tally for one candidate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalScore {
    pub doc_type: DocumentType,
    pub score: u32,
}

/// Score `raw` against every candidate type, in tie-break order.
///
/// Keywords are matched on a lower-cased copy of the normalized text; the
/// structural ID patterns run on the raw text, before any digit repair.
pub fn score(raw: &str) -> [SignalScore; 4] {
    let cleaned = normalize(raw);
    let lowered = cleaned.to_lowercase();
    DocumentType::CANDIDATES.map(|doc_type| {
        let keywords = doc_type
            .keywords()
            .iter()
            .filter(|k| lowered.contains(*k))
            .count() as u32;
        let structure = if doc_type.has_structure(raw) {
            STRUCTURE_POINTS
        } else {
            0
        };
        SignalScore {
            doc_type,
            score: keywords * KEYWORD_POINTS + structure,
        }
    })
}

/// Pick the best-scoring type. The earliest candidate wins a tie; an all-zero
/// table is [`DocumentType::Unknown`].
pub fn best_of(scores: &[SignalScore]) -> DocumentType {
    let mut best: Option<SignalScore> = None;
    for s in scores {
        if best.map_or(true, |b| s.score > b.score) {
            best = Some(*s);
        }
    }
    match best {
        Some(b) if b.score > 0 => b.doc_type,
        _ => DocumentType::Unknown,
    }
}

/// Classify raw OCR text.
pub fn classify(raw: &str) -> DocumentType {
    let scores = score(raw);
    let doc_type = best_of(&scores);
    debug!(
        "Classified as {} (aadhaar={}, pan={}, dl={}, voter={})",
        doc_type, scores[0].score, scores[1].score, scores[2].score, scores[3].score
    );
    doc_type
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_of(raw: &str, doc_type: DocumentType) -> u32 {
        score(raw)
            .iter()
            .find(|s| s.doc_type == doc_type)
            .map(|s| s.score)
            .unwrap()
    }

    #[test]
    fn test_aadhaar_letter() {
        let text = "भारत सरकार\nTo\nRAVI KUMAR\n1234 5678 9012\nDOB: 15/08/1990\nMale\nAddress: 12 MG Road, Pune\n411001";
        assert_eq!(classify(text), DocumentType::Aadhaar);
    }

    #[test]
    fn test_pan_card() {
        let text = "INCOME TAX DEPARTMENT\nGOVT. OF INDIA\nABCDE1234F\nRAVI KUMAR";
        assert_eq!(classify(text), DocumentType::Pan);
    }

    #[test]
    fn test_driving_licence() {
        let text = "Union of India\nDriving Licence\nMH-12 2011 0012345\nValid Till 01/01/2031\nCOV LMV";
        assert_eq!(classify(text), DocumentType::Dl);
    }

    #[test]
    fn test_voter_card() {
        let text = "ELECTION COMMISSION OF INDIA\nElector Photo Identity Card\nABC1234567";
        assert_eq!(classify(text), DocumentType::Voter);
    }

    #[test]
    fn test_plain_prose_is_unknown() {
        assert_eq!(
            classify("Hello world, this is not an ID document."),
            DocumentType::Unknown
        );
        assert_eq!(classify(""), DocumentType::Unknown);
        assert_eq!(classify(" \n\t "), DocumentType::Unknown);
    }

    #[test]
    fn test_structure_is_case_sensitive_for_pan() {
        assert_eq!(score_of("abcde1234f", DocumentType::Pan), 0);
        assert_eq!(score_of("ABCDE1234F", DocumentType::Pan), STRUCTURE_POINTS);
    }

    #[test]
    fn test_structure_ignores_repaired_digits() {
        assert_eq!(classify("12O4 5678 9O12"), DocumentType::Unknown);
        assert_eq!(classify("ABCDE\u{200b}1234F"), DocumentType::Unknown);
        assert_eq!(score_of("1204 5678 9012", DocumentType::Aadhaar), STRUCTURE_POINTS);
    }

    #[test]
    fn test_masked_aadhaar_scores_structure_and_keyword() {
        // structure + the "xxxx xxxx" keyword
        assert_eq!(score_of("xxxx xxxx 4321", DocumentType::Aadhaar), 8);
    }

    #[test]
    fn test_ties_go_to_earliest_candidate() {
        let scores = [
            SignalScore { doc_type: DocumentType::Aadhaar, score: 4 },
            SignalScore { doc_type: DocumentType::Pan, score: 6 },
            SignalScore { doc_type: DocumentType::Dl, score: 6 },
            SignalScore { doc_type: DocumentType::Voter, score: 1 },
        ];
        assert_eq!(best_of(&scores), DocumentType::Pan);
    }

    #[test]
    fn test_deterministic() {
        let text = "Election Commission\nDL No MH12 20110012345";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn test_doc_type_string_roundtrip() {
        use std::str::FromStr;
        for t in DocumentType::CANDIDATES {
            assert_eq!(DocumentType::from_str(t.as_str()).unwrap(), t);
        }
        assert!(DocumentType::from_str("passport").is_err());
        assert_eq!(
            serde_json::to_string(&DocumentType::Dl).unwrap(),
            "\"dl\""
        );
    }
}
