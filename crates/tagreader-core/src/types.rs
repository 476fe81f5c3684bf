use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique hardware identifier exposed by a tag.
///
/// The identifier length depends on the tag technology (4, 7 or 10 bytes for
/// ISO 14443 UIDs, 8 bytes for ISO 15693 UIDs and FeliCa IDm).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagIdentifier(Vec<u8>);

impl TagIdentifier {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Format the identifier as lowercase hex, two digits per byte, no separator.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagreader_core::TagIdentifier;
    ///
    /// let id = TagIdentifier::new([0x04, 0x9F, 0xAB]);
    /// assert_eq!(id.to_hex(), "049fab");
    /// ```
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for TagIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Vec<u8>> for TagIdentifier {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for TagIdentifier {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// Radio polling family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollingOption {
    /// ISO 14443 type A/B (MIFARE, ISO 7816 smart cards).
    Iso14443,
    /// ISO 15693 vicinity cards.
    Iso15693,
    /// ISO 18092 (FeliCa).
    Iso18092,
}

impl PollingOption {
    pub const ALL: [PollingOption; 3] = [
        PollingOption::Iso14443,
        PollingOption::Iso15693,
        PollingOption::Iso18092,
    ];
}

impl fmt::Display for PollingOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PollingOption::Iso14443 => "ISO14443",
            PollingOption::Iso15693 => "ISO15693",
            PollingOption::Iso18092 => "ISO18092",
        };
        write!(f, "{}", name)
    }
}

/// Set of polling families a reader session scans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingOptions {
    pub iso14443: bool,
    pub iso15693: bool,
    pub iso18092: bool,
}

impl PollingOptions {
    /// Every supported polling family.
    pub fn all() -> Self {
        Self {
            iso14443: true,
            iso15693: true,
            iso18092: true,
        }
    }

    /// An empty set.
    pub fn none() -> Self {
        Self {
            iso14443: false,
            iso15693: false,
            iso18092: false,
        }
    }

    /// Add a polling family to the set.
    pub fn with(mut self, option: PollingOption) -> Self {
        match option {
            PollingOption::Iso14443 => self.iso14443 = true,
            PollingOption::Iso15693 => self.iso15693 = true,
            PollingOption::Iso18092 => self.iso18092 = true,
        }
        self
    }

    pub fn contains(&self, option: PollingOption) -> bool {
        match option {
            PollingOption::Iso14443 => self.iso14443,
            PollingOption::Iso15693 => self.iso15693,
            PollingOption::Iso18092 => self.iso18092,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Iterate over the enabled families in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = PollingOption> + '_ {
        PollingOption::ALL
            .into_iter()
            .filter(move |option| self.contains(*option))
    }
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for PollingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|o| o.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![0x04, 0x9F, 0xAB], "049fab")]
    #[case(vec![0x00], "00")]
    #[case(vec![0x0A, 0xFF, 0x10, 0x01], "0aff1001")]
    #[case(vec![], "")]
    fn test_identifier_hex(#[case] bytes: Vec<u8>, #[case] expected: &str) {
        let id = TagIdentifier::new(bytes);
        assert_eq!(id.to_hex(), expected);
        assert_eq!(id.to_string(), expected);
    }

    #[test]
    fn test_identifier_accessors() {
        let id = TagIdentifier::from(&[0x01u8, 0x02][..]);
        assert_eq!(id.as_bytes(), &[0x01, 0x02]);
        assert_eq!(id.len(), 2);
        assert!(!id.is_empty());
        assert!(TagIdentifier::new(Vec::new()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_hex_is_lowercase_two_digits_per_byte(bytes in proptest::collection::vec(any::<u8>(), 0..16)) {
            let hex = TagIdentifier::new(bytes.clone()).to_hex();
            prop_assert_eq!(hex.len(), bytes.len() * 2);
            prop_assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn test_polling_options_all() {
        let options = PollingOptions::all();
        assert_eq!(options.iter().collect::<Vec<_>>(), PollingOption::ALL.to_vec());
        assert_eq!(options.to_string(), "[ISO14443, ISO15693, ISO18092]");
        assert_eq!(PollingOptions::default(), options);
    }

    #[test]
    fn test_polling_options_builder() {
        let options = PollingOptions::none().with(PollingOption::Iso15693);
        assert!(options.contains(PollingOption::Iso15693));
        assert!(!options.contains(PollingOption::Iso14443));
        assert!(!options.is_empty());
        assert!(PollingOptions::none().is_empty());
    }

    #[test]
    fn test_polling_options_serialization() {
        let options = PollingOptions::none().with(PollingOption::Iso18092);
        let json = serde_json::to_string(&options).unwrap();
        let deserialized: PollingOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(options, deserialized);
    }
}
