use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity field reported by the device, in query order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentField {
    VendorCode,
    SerialNumber,
    HardwareRevision,
    SoftwareRevision,
    ProductName,
    PartNumber,
}

impl ComponentField {
    /// All fields in the order the device is queried.
    pub const ALL: [ComponentField; 6] = [
        ComponentField::VendorCode,
        ComponentField::SerialNumber,
        ComponentField::HardwareRevision,
        ComponentField::SoftwareRevision,
        ComponentField::ProductName,
        ComponentField::PartNumber,
    ];

    /// Selector byte placed last in the component query opcode.
    #[must_use]
    pub const fn selector(&self) -> u8 {
        match self {
            ComponentField::VendorCode => 0x00,
            ComponentField::SerialNumber => 0x01,
            ComponentField::HardwareRevision => 0x02,
            ComponentField::SoftwareRevision => 0x03,
            ComponentField::ProductName => 0x04,
            ComponentField::PartNumber => 0x05,
        }
    }
}

impl fmt::Display for ComponentField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ComponentField::VendorCode => "vendor code",
            ComponentField::SerialNumber => "serial number",
            ComponentField::HardwareRevision => "hardware revision",
            ComponentField::SoftwareRevision => "software revision",
            ComponentField::ProductName => "product name",
            ComponentField::PartNumber => "part number",
        };
        write!(f, "{name}")
    }
}

/// Identity fields collected from the device during one pass of the pipeline.
///
/// Payloads are stored exactly as received, minus the acknowledgement header.
/// [`DeviceIdentity::text`] gives a printable rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    fields: BTreeMap<ComponentField, Vec<u8>>,
    retrieved_at: Option<DateTime<Utc>>,
}

impl DeviceIdentity {
    /// Create an empty identity record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the payload received for `field`, replacing any previous value.
    pub fn set(&mut self, field: ComponentField, payload: impl Into<Vec<u8>>) {
        self.fields.insert(field, payload.into());
    }

    /// Raw payload for `field`, if it has been received.
    pub fn get(&self, field: ComponentField) -> Option<&[u8]> {
        self.fields.get(&field).map(Vec::as_slice)
    }

    /// Printable payload for `field`.
    ///
    /// Trailing NUL and space padding is removed and invalid UTF-8 is replaced.
    pub fn text(&self, field: ComponentField) -> Option<String> {
        self.get(field).map(|payload| {
            let end = payload
                .iter()
                .rposition(|&b| b != 0x00 && b != b' ')
                .map_or(0, |pos| pos + 1);
            String::from_utf8_lossy(&payload[..end]).into_owned()
        })
    }

    /// Number of fields received so far.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether every field in [`ComponentField::ALL`] has been received.
    pub fn is_complete(&self) -> bool {
        ComponentField::ALL
            .iter()
            .all(|field| self.fields.contains_key(field))
    }

    /// Record the moment the last field was retrieved.
    pub fn mark_retrieved(&mut self, at: DateTime<Utc>) {
        self.retrieved_at = Some(at);
    }

    pub fn retrieved_at(&self) -> Option<DateTime<Utc>> {
        self.retrieved_at
    }

    /// Drop every collected field.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.retrieved_at = None;
    }

    /// Iterate over received fields in query order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentField, &[u8])> {
        self.fields
            .iter()
            .map(|(field, payload)| (*field, payload.as_slice()))
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for (field, _) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}={:?}", field, self.text(field).unwrap_or_default())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ComponentField::VendorCode, 0x00)]
    #[case(ComponentField::SerialNumber, 0x01)]
    #[case(ComponentField::HardwareRevision, 0x02)]
    #[case(ComponentField::SoftwareRevision, 0x03)]
    #[case(ComponentField::ProductName, 0x04)]
    #[case(ComponentField::PartNumber, 0x05)]
    fn test_selector(#[case] field: ComponentField, #[case] expected: u8) {
        assert_eq!(field.selector(), expected);
    }

    #[test]
    fn test_selectors_follow_query_order() {
        for (index, field) in ComponentField::ALL.iter().enumerate() {
            assert_eq!(usize::from(field.selector()), index);
        }
    }

    #[test]
    fn test_text_trims_padding() {
        let mut identity = DeviceIdentity::new();
        identity.set(ComponentField::ProductName, b"SENSOR-X \0\0\0".to_vec());

        assert_eq!(
            identity.text(ComponentField::ProductName).as_deref(),
            Some("SENSOR-X")
        );
    }

    #[test]
    fn test_text_all_padding_is_empty() {
        let mut identity = DeviceIdentity::new();
        identity.set(ComponentField::PartNumber, vec![0u8; 8]);

        assert_eq!(identity.text(ComponentField::PartNumber).as_deref(), Some(""));
    }

    #[test]
    fn test_completeness() {
        let mut identity = DeviceIdentity::new();
        assert!(identity.is_empty());

        for field in ComponentField::ALL {
            assert!(!identity.is_complete());
            identity.set(field, vec![field.selector()]);
        }

        assert!(identity.is_complete());
        assert_eq!(identity.len(), 6);
    }

    #[test]
    fn test_clear_drops_fields_and_timestamp() {
        let mut identity = DeviceIdentity::new();
        identity.set(ComponentField::SerialNumber, b"1234".to_vec());
        identity.mark_retrieved(Utc::now());

        identity.clear();

        assert!(identity.is_empty());
        assert!(identity.retrieved_at().is_none());
    }

    #[test]
    fn test_iter_follows_query_order() {
        let mut identity = DeviceIdentity::new();
        identity.set(ComponentField::PartNumber, b"P".to_vec());
        identity.set(ComponentField::VendorCode, b"V".to_vec());
        identity.set(ComponentField::ProductName, b"N".to_vec());

        let order: Vec<ComponentField> = identity.iter().map(|(field, _)| field).collect();
        assert_eq!(
            order,
            vec![
                ComponentField::VendorCode,
                ComponentField::ProductName,
                ComponentField::PartNumber,
            ]
        );
    }

    #[test]
    fn test_identity_serialization() {
        let mut identity = DeviceIdentity::new();
        identity.set(ComponentField::SerialNumber, b"42".to_vec());

        let json = serde_json::to_string(&identity).unwrap();
        assert!(json.contains("\"serial_number\""));

        let restored: DeviceIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, identity);
    }

    #[test]
    fn test_display_lists_fields() {
        let mut identity = DeviceIdentity::new();
        identity.set(ComponentField::VendorCode, b"ACME".to_vec());
        identity.set(ComponentField::SerialNumber, b"0042".to_vec());

        assert_eq!(
            identity.to_string(),
            "vendor code=\"ACME\", serial number=\"0042\""
        );
    }
}
