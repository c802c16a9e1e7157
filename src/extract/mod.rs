//! Per-document field extraction.
//!
//! Every extractor is total: malformed, empty or foreign-script input simply
//! yields fewer fields.

pub mod aadhaar;
pub mod dl;
pub mod pan;
pub mod voter;

use tracing::debug;

use crate::cascade::{self, Cascade, Scan};
use crate::classify::DocumentType;
use crate::fields::FieldMap;

pub use aadhaar::extract_aadhaar;
pub use dl::extract_dl;
pub use pan::extract_pan;
pub use voter::extract_voter;

/// Field cascades for a document type; `Unknown` has none.
fn cascades_for(doc_type: DocumentType) -> &'static [Cascade] {
    match doc_type {
        DocumentType::Aadhaar => aadhaar::CASCADES,
        DocumentType::Pan => pan::CASCADES,
        DocumentType::Dl => dl::CASCADES,
        DocumentType::Voter => voter::CASCADES,
        DocumentType::Unknown => &[],
    }
}

/// Run the extractor matching `doc_type` over raw or cleaned OCR text.
pub fn extract(doc_type: DocumentType, text: &str) -> FieldMap {
    let cascades = cascades_for(doc_type);
    if cascades.is_empty() {
        return FieldMap::new();
    }
    let fields = cascade::run(&Scan::new(text), cascades);
    debug!("Extracted {} {} fields", fields.len(), doc_type);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    #[test]
    fn test_unknown_extracts_nothing() {
        assert!(extract(DocumentType::Unknown, "Name: RAVI KUMAR").is_empty());
    }

    #[test]
    fn test_dispatch_matches_direct_calls() {
        let text = "INCOME TAX DEPARTMENT\nABCDE1234F";
        assert_eq!(extract(DocumentType::Pan, text), extract_pan(text));
        assert_eq!(extract(DocumentType::Aadhaar, text), extract_aadhaar(text));
        assert_eq!(extract(DocumentType::Dl, text), extract_dl(text));
        assert_eq!(extract(DocumentType::Voter, text), extract_voter(text));
    }

    #[test]
    fn test_total_over_hostile_input() {
        let inputs = [
            String::new(),
            " \n\t\r ".to_string(),
            "\u{0}\u{1}\u{fffd}\u{feff}ÿþ".to_string(),
            "Name\n".to_string(),
            "To".to_string(),
            "S/O".to_string(),
            "address:".to_string(),
            "नाम / Name\nपिता का नाम".to_string(),
            "११११ २२२२ ३३३३ ४५६७८९".to_string(),
            "XXXX XXXX".to_string(),
            "0O0l0I0".repeat(500),
            String::from_utf8_lossy(&(0u8..=255).collect::<Vec<u8>>()).into_owned(),
        ];
        for input in &inputs {
            let doc_type = classify(input);
            let _ = extract(doc_type, input);
            for t in DocumentType::CANDIDATES {
                let fields = extract(t, input);
                assert!(fields.iter().all(|(_, v)| !v.trim().is_empty()));
            }
        }
    }

    #[test]
    fn test_unrelated_prose_is_near_empty() {
        let text = "Hello world, this is not an ID document.";
        for t in DocumentType::CANDIDATES {
            assert!(extract(t, text).len() <= 1, "{t}: {:?}", extract(t, text));
        }
    }
}
