//! Extraction record handed to storage and display.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::classify::DocumentType;
use crate::fields::{labels, FieldMap};

/// Characters of raw OCR text kept on a stored record.
pub const RAW_TEXT_LIMIT: usize = 4000;

/// UTC timestamp for now, e.g. `2025-02-05T12:00:00Z`.
pub fn now_iso8601() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format_iso8601(secs)
}

fn format_iso8601(secs: u64) -> String {
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let time_of_day = secs % 86_400;
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60
    )
}

/// Gregorian (year, month, day) for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Hex SHA-256 of the full raw text.
pub fn content_hash(raw_text: &str) -> String {
    let digest = Sha256::digest(raw_text.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Label of the field that identifies a document of this type.
pub fn unique_key_label(doc_type: DocumentType) -> Option<&'static str> {
    match doc_type {
        DocumentType::Aadhaar => Some(labels::AADHAAR_NUMBER),
        DocumentType::Pan => Some(labels::PAN_NUMBER),
        DocumentType::Dl => Some(labels::DL_NUMBER),
        DocumentType::Voter => Some(labels::EPIC_NUMBER),
        DocumentType::Unknown => None,
    }
}

/// Comparable identity of an extraction: the unique-key field with spaces and
/// hyphens removed, upper-cased.
pub fn unique_key(doc_type: DocumentType, fields: &FieldMap) -> Option<String> {
    let value = fields.get(unique_key_label(doc_type)?)?;
    let key: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect();
    (!key.is_empty()).then_some(key)
}

/// Share of the expected field set that was found, capped at 1.
pub fn confidence(doc_type: DocumentType, fields: &FieldMap) -> f64 {
    let expected = doc_type.expected_field_count() as f64;
    (fields.len() as f64 / expected).min(1.0)
}

/// One processed document.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub id: String,
    pub doc_type: DocumentType,
    pub fields: FieldMap,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_key: Option<String>,
    pub content_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_kb: Option<u64>,
    pub raw_text: String,
    pub extracted_at: String,
}

impl Extraction {
    pub fn new(doc_type: DocumentType, fields: FieldMap, raw_text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            doc_type,
            confidence: confidence(doc_type, &fields),
            unique_key: unique_key(doc_type, &fields),
            fields,
            content_hash: content_hash(raw_text),
            file_name: None,
            file_size_kb: None,
            raw_text: raw_text.chars().take(RAW_TEXT_LIMIT).collect(),
            extracted_at: now_iso8601(),
        }
    }

    /// Attach the uploaded file's name and size.
    pub fn with_file(mut self, file_name: impl Into<String>, size_bytes: usize) -> Self {
        self.file_name = Some(file_name.into());
        self.file_size_kb = Some((size_bytes as u64).div_ceil(1024));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        let mut map = FieldMap::new();
        for (k, v) in pairs {
            map.insert(k, *v);
        }
        map
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(format_iso8601(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_iso8601(951_782_400), "2000-02-29T00:00:00Z");
        assert_eq!(format_iso8601(1_738_756_800), "2025-02-05T12:00:00Z");
        assert_eq!(now_iso8601().len(), 20);
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_unique_key_normalization() {
        let f = fields(&[(labels::DL_NUMBER, "mh-12 2011-0012345")]);
        assert_eq!(unique_key(DocumentType::Dl, &f).as_deref(), Some("MH1220110012345"));
        let f = fields(&[(labels::AADHAAR_NUMBER, "1234 5678 9012")]);
        assert_eq!(unique_key(DocumentType::Aadhaar, &f).as_deref(), Some("123456789012"));
        assert_eq!(unique_key(DocumentType::Pan, &f), None);
        assert_eq!(unique_key(DocumentType::Unknown, &f), None);
    }

    #[test]
    fn test_confidence_is_capped() {
        let f = fields(&[(labels::NAME, "A B"), (labels::GENDER, "Male")]);
        assert!((confidence(DocumentType::Aadhaar, &f) - 0.25).abs() < 1e-9);
        assert!((confidence(DocumentType::Unknown, &f) - 0.5).abs() < 1e-9);
        let many = fields(&[
            ("a", "1"), ("b", "1"), ("c", "1"), ("d", "1"), ("e", "1"), ("f", "1"),
        ]);
        assert_eq!(confidence(DocumentType::Pan, &many), 1.0);
    }

    #[test]
    fn test_raw_text_truncated_hash_of_full_text() {
        let raw = "अ".repeat(RAW_TEXT_LIMIT + 10);
        let e = Extraction::new(DocumentType::Unknown, FieldMap::new(), &raw);
        assert_eq!(e.raw_text.chars().count(), RAW_TEXT_LIMIT);
        assert_eq!(e.content_hash, content_hash(&raw));
        assert_eq!(e.confidence, 0.0);
    }

    #[test]
    fn test_with_file_rounds_size_up() {
        let e = Extraction::new(DocumentType::Unknown, FieldMap::new(), "").with_file("a.jpg", 1025);
        assert_eq!(e.file_name.as_deref(), Some("a.jpg"));
        assert_eq!(e.file_size_kb, Some(2));
    }
}
