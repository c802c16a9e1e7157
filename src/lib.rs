//! Field extraction for OCR text of Indian identity documents.
//!
//! The core (`normalize`, `classify`, `extract`) is pure and total over any
//! string input. The remaining modules carry the service plumbing used by the
//! HTTP binary.

pub mod cascade;
pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod extract;
pub mod fields;
pub mod normalize;
pub mod ocr;
pub mod schema;
pub mod store;
pub mod text;

pub use classify::{classify, score, DocumentType, SignalScore};
pub use extract::{extract, extract_aadhaar, extract_dl, extract_pan, extract_voter};
pub use fields::FieldMap;
pub use normalize::normalize;
