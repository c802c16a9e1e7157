//! Extracted field mapping and the fixed label vocabulary.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Field labels exactly as handed to persistence and display.
pub mod labels {
    pub const AADHAAR_NUMBER: &str = "Aadhaar Number";
    pub const VID: &str = "VID";
    pub const ENROLMENT_NO: &str = "Enrolment No";
    pub const NAME: &str = "Name";
    pub const DATE_OF_BIRTH: &str = "Date of Birth";
    pub const GENDER: &str = "Gender";
    pub const ADDRESS: &str = "Address";
    pub const PINCODE: &str = "Pincode";
    pub const STATE: &str = "State";
    pub const MOBILE: &str = "Mobile";

    pub const PAN_NUMBER: &str = "PAN Number";
    pub const FATHERS_NAME: &str = "Father's Name";
    pub const ACCOUNT_TYPE: &str = "Account Type";
    pub const ISSUED_BY: &str = "Issued By";

    pub const DL_NUMBER: &str = "DL Number";
    pub const DATE_OF_ISSUE: &str = "Date of Issue";
    pub const VALID_TILL: &str = "Valid Till";
    pub const BLOOD_GROUP: &str = "Blood Group";
    pub const RELATION_OF: &str = "Son/Daughter/Wife of";
    pub const VEHICLE_CLASS: &str = "Vehicle Class";
    pub const ISSUING_AUTHORITY: &str = "Issuing Authority";

    pub const EPIC_NUMBER: &str = "EPIC Number";
    pub const AGE: &str = "Age";
    pub const CONSTITUENCY: &str = "Constituency";
    pub const PART_NO: &str = "Part No";
    pub const SERIAL_NO: &str = "Serial No";
    pub const POLLING_STATION: &str = "Polling Station";
}

/// Ordered label → value mapping. Only non-empty values are ever stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field. Blank values are dropped; returns whether
    /// the value was stored.
    pub fn insert(&mut self, label: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.trim().is_empty() {
            return false;
        }
        match self.entries.iter_mut().find(|(k, _)| k == label) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((label.to_string(), value)),
        }
        true
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a two-column `Field,Value` CSV document.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["Field", "Value"])?;
        for (label, value) in self.iter() {
            writer.write_record([label, value])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
