//! Wire types shared between the rhythm controller, the demo driver and the
//! fix generator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Labeled part of a song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Intro,
    Verse,
    Chorus,
    Bridge,
    Outro,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Intro,
        SectionKind::Verse,
        SectionKind::Chorus,
        SectionKind::Bridge,
        SectionKind::Outro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Intro => "intro",
            SectionKind::Verse => "verse",
            SectionKind::Chorus => "chorus",
            SectionKind::Bridge => "bridge",
            SectionKind::Outro => "outro",
        }
    }

    /// Error pattern emitted while this section plays
    pub fn error_type(&self) -> ErrorType {
        match self {
            SectionKind::Intro => ErrorType::Minimal,
            SectionKind::Verse => ErrorType::Basic,
            SectionKind::Chorus => ErrorType::Business,
            SectionKind::Bridge => ErrorType::Chaotic,
            SectionKind::Outro => ErrorType::Philosophical,
        }
    }

    /// Single-character symbol used by ASCII timelines
    pub fn symbol(&self) -> char {
        match self {
            SectionKind::Intro => 'I',
            SectionKind::Verse => 'V',
            SectionKind::Chorus => 'C',
            SectionKind::Bridge => 'B',
            SectionKind::Outro => 'O',
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intro" => Ok(SectionKind::Intro),
            "verse" => Ok(SectionKind::Verse),
            "chorus" => Ok(SectionKind::Chorus),
            "bridge" => Ok(SectionKind::Bridge),
            "outro" => Ok(SectionKind::Outro),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown section: {}",
                other
            ))),
        }
    }
}

/// Flavor of fake error the error generator should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Basic,
    Business,
    Chaotic,
    Philosophical,
    Minimal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Basic => "basic",
            ErrorType::Business => "business",
            ErrorType::Chaotic => "chaotic",
            ErrorType::Philosophical => "philosophical",
            ErrorType::Minimal => "minimal",
        }
    }

    /// Map a free-form section label to an error type.
    ///
    /// Labels that are not one of the five section kinds fall back to `basic`.
    pub fn for_section(section: &str) -> ErrorType {
        section
            .parse::<SectionKind>()
            .map(|kind| kind.error_type())
            .unwrap_or(ErrorType::Basic)
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(ErrorType::Basic),
            "business" => Ok(ErrorType::Business),
            "chaotic" => Ok(ErrorType::Chaotic),
            "philosophical" => Ok(ErrorType::Philosophical),
            "minimal" => Ok(ErrorType::Minimal),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown error type: {}",
                other
            ))),
        }
    }
}

/// Body of `POST /api/rhythm-trigger` on the error generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerPayload {
    /// Always "rhythm"; the receiver routes on it
    pub trigger: String,
    pub error_type: ErrorType,
    pub beat: u64,
    pub section: String,
    pub tempo: f64,
}

impl TriggerPayload {
    pub fn new(error_type: ErrorType, beat: u64, section: impl Into<String>, tempo: f64) -> Self {
        Self {
            trigger: "rhythm".to_string(),
            error_type,
            beat,
            section: section.into(),
            tempo,
        }
    }
}

/// Error generator's acknowledgement of a trigger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_to_error_type_table() {
        assert_eq!(SectionKind::Intro.error_type(), ErrorType::Minimal);
        assert_eq!(SectionKind::Verse.error_type(), ErrorType::Basic);
        assert_eq!(SectionKind::Chorus.error_type(), ErrorType::Business);
        assert_eq!(SectionKind::Bridge.error_type(), ErrorType::Chaotic);
        assert_eq!(SectionKind::Outro.error_type(), ErrorType::Philosophical);
    }

    #[test]
    fn test_unknown_section_label_maps_to_basic() {
        assert_eq!(ErrorType::for_section("pre-chorus"), ErrorType::Basic);
        assert_eq!(ErrorType::for_section(""), ErrorType::Basic);
        assert_eq!(ErrorType::for_section("Chorus"), ErrorType::Business);
    }

    #[test]
    fn test_payload_wire_format() {
        let payload = TriggerPayload::new(ErrorType::Chaotic, 96, "bridge", 128.0);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["trigger"], "rhythm");
        assert_eq!(json["error_type"], "chaotic");
        assert_eq!(json["beat"], 96);
        assert_eq!(json["section"], "bridge");
        assert_eq!(json["tempo"], 128.0);
    }

    #[test]
    fn test_section_kind_parse_rejects_unknown() {
        assert!("coda".parse::<SectionKind>().is_err());
        assert_eq!(" OUTRO ".parse::<SectionKind>().unwrap(), SectionKind::Outro);
    }

    #[test]
    fn test_ack_tolerates_missing_fields() {
        let ack: TriggerAck = serde_json::from_str("{}").unwrap();
        assert!(!ack.success);
        assert!(ack.message.is_none());
    }
}
