//! Tag types reported by reader hardware.
//!
//! A [`Tag`] is a transient reference to a physically present tag. It is
//! produced by the reader for one detection and is only meaningful while the
//! session that detected it is open.

use serde::{Deserialize, Serialize};
use std::fmt;
use tagreader_core::TagIdentifier;

/// Reader assigned handle of a detected tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagId(u64);

impl TagId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag#{}", self.0)
    }
}

/// MIFARE product family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MifareFamily {
    Ultralight,
    Plus,
    Desfire,
    Unknown,
}

/// Protocol family of a detected tag, with the data the reader exposes for it.
///
/// # Examples
///
/// ```
/// use tagreader_hardware::TagTechnology;
///
/// let tech = TagTechnology::iso7816(vec![0x04, 0x9F, 0xAB]);
/// assert_eq!(tech.name(), "ISO7816");
/// assert_eq!(tech.identifier().map(|id| id.to_hex()), Some("049fab".to_string()));
///
/// let unknown = TagTechnology::unknown("vendor proprietary");
/// assert!(unknown.identifier().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagTechnology {
    /// FeliCa (ISO 18092) tag; the identifier is the IDm.
    FeliCa { idm: TagIdentifier, system_code: u16 },

    /// MIFARE (ISO 14443 type A) tag.
    Mifare {
        identifier: TagIdentifier,
        family: MifareFamily,
    },

    /// ISO 15693 vicinity tag.
    Iso15693 {
        identifier: TagIdentifier,
        ic_manufacturer_code: u8,
    },

    /// ISO 7816 compatible smart card.
    Iso7816 {
        identifier: TagIdentifier,
        selected_aid: Option<String>,
    },

    /// Technology the reader reported but this crate does not model.
    Unknown { description: String },
}

impl TagTechnology {
    pub fn felica(idm: impl Into<Vec<u8>>, system_code: u16) -> Self {
        Self::FeliCa {
            idm: TagIdentifier::new(idm),
            system_code,
        }
    }

    pub fn mifare(identifier: impl Into<Vec<u8>>, family: MifareFamily) -> Self {
        Self::Mifare {
            identifier: TagIdentifier::new(identifier),
            family,
        }
    }

    pub fn iso15693(identifier: impl Into<Vec<u8>>, ic_manufacturer_code: u8) -> Self {
        Self::Iso15693 {
            identifier: TagIdentifier::new(identifier),
            ic_manufacturer_code,
        }
    }

    pub fn iso7816(identifier: impl Into<Vec<u8>>) -> Self {
        Self::Iso7816 {
            identifier: TagIdentifier::new(identifier),
            selected_aid: None,
        }
    }

    pub fn unknown(description: impl Into<String>) -> Self {
        Self::Unknown {
            description: description.into(),
        }
    }

    /// Get a short name for the technology.
    pub fn name(&self) -> &str {
        match self {
            Self::FeliCa { .. } => "FeliCa",
            Self::Mifare { .. } => "MIFARE",
            Self::Iso15693 { .. } => "ISO15693",
            Self::Iso7816 { .. } => "ISO7816",
            Self::Unknown { .. } => "Unknown",
        }
    }

    /// Identifier bytes, for technologies that expose one.
    pub fn identifier(&self) -> Option<&TagIdentifier> {
        match self {
            Self::FeliCa { idm, .. } => Some(idm),
            Self::Mifare { identifier, .. }
            | Self::Iso15693 { identifier, .. }
            | Self::Iso7816 { identifier, .. } => Some(identifier),
            Self::Unknown { .. } => None,
        }
    }

    /// Check if this is a known technology.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown { .. })
    }
}

/// A tag detected during a reading session.
#[derive(Debug, Clone)]
pub struct Tag {
    /// Reader assigned handle.
    pub id: TagId,

    /// Technology and technology specific data.
    pub technology: TagTechnology,

    /// Timestamp when the tag was detected.
    pub detected_at: chrono::DateTime<chrono::Utc>,
}

impl Tag {
    /// Create a tag detected now.
    pub fn new(id: TagId, technology: TagTechnology) -> Self {
        Self {
            id,
            technology,
            detected_at: chrono::Utc::now(),
        }
    }

    /// Override the detection timestamp.
    pub fn with_detected_at(mut self, detected_at: chrono::DateTime<chrono::Utc>) -> Self {
        self.detected_at = detected_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_technology_names() {
        assert_eq!(TagTechnology::felica(vec![0x01; 8], 0x0003).name(), "FeliCa");
        assert_eq!(
            TagTechnology::mifare(vec![0x04; 7], MifareFamily::Ultralight).name(),
            "MIFARE"
        );
        assert_eq!(TagTechnology::iso15693(vec![0xE0; 8], 0x04).name(), "ISO15693");
        assert_eq!(TagTechnology::iso7816(vec![0x04; 7]).name(), "ISO7816");
        assert_eq!(TagTechnology::unknown("x").name(), "Unknown");
    }

    #[test]
    fn test_every_known_technology_has_identifier() {
        let technologies = vec![
            TagTechnology::felica(vec![0x01, 0x2E], 0x0003),
            TagTechnology::mifare(vec![0x04, 0x11], MifareFamily::Desfire),
            TagTechnology::iso15693(vec![0xE0, 0x04], 0x04),
            TagTechnology::iso7816(vec![0x08, 0x99]),
        ];

        for technology in technologies {
            assert!(technology.is_known());
            assert!(technology.identifier().is_some(), "{}", technology.name());
        }
    }

    #[test]
    fn test_unknown_technology() {
        let technology = TagTechnology::unknown("ISO 14443 type B prime");
        assert!(!technology.is_known());
        assert!(technology.identifier().is_none());
    }

    #[test]
    fn test_felica_identifier_is_idm() {
        let technology = TagTechnology::felica(vec![0x01, 0x2E, 0x4C, 0xD3], 0x0003);
        assert_eq!(technology.identifier().unwrap().to_hex(), "012e4cd3");
    }

    #[test]
    fn test_tag_detected_at_override() {
        let when = chrono::Utc.with_ymd_and_hms(2025, 1, 15, 12, 30, 0).unwrap();
        let tag = Tag::new(TagId::new(7), TagTechnology::iso7816(vec![0x01]))
            .with_detected_at(when);
        assert_eq!(tag.detected_at, when);
        assert_eq!(tag.id.to_string(), "tag#7");
    }

    #[test]
    fn test_technology_serialization() {
        let technology = TagTechnology::mifare(vec![0x04, 0xAB], MifareFamily::Plus);
        let json = serde_json::to_string(&technology).unwrap();
        let deserialized: TagTechnology = serde_json::from_str(&json).unwrap();
        assert_eq!(technology, deserialized);
    }
}
