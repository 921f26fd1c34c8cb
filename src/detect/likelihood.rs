//! Emotion likelihood vocabulary
//!
//! Raw detector output uses the names `VERY_UNLIKELY` .. `VERY_LIKELY`. They
//! are normalized into the ordered `Likelihood` scale; anything else maps to
//! `Unknown`. On the wire a likelihood is its ordinal (0-5), which is what the
//! dashboard renders.

use serde::{Deserialize, Serialize};

/// Ordered likelihood of an emotion, `Unknown` sorting lowest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum Likelihood {
    #[default]
    Unknown = 0,
    VeryUnlikely = 1,
    Unlikely = 2,
    Possible = 3,
    Likely = 4,
    VeryLikely = 5,
}

impl Likelihood {
    /// Normalize a raw detector category, case-insensitively
    #[must_use]
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Unknown;
        };
        match raw.trim().to_ascii_uppercase().as_str() {
            "VERY_UNLIKELY" => Self::VeryUnlikely,
            "UNLIKELY" => Self::Unlikely,
            "POSSIBLE" => Self::Possible,
            "LIKELY" => Self::Likely,
            "VERY_LIKELY" => Self::VeryLikely,
            _ => Self::Unknown,
        }
    }
}

impl From<Likelihood> for u8 {
    fn from(value: Likelihood) -> Self {
        value as u8
    }
}

impl From<u8> for Likelihood {
    fn from(value: u8) -> Self {
        match value {
            1 => Likelihood::VeryUnlikely,
            2 => Likelihood::Unlikely,
            3 => Likelihood::Possible,
            4 => Likelihood::Likely,
            5 => Likelihood::VeryLikely,
            _ => Likelihood::Unknown,
        }
    }
}

/// One face annotation as the detector reports it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFaceAnnotation {
    #[serde(default)]
    pub joy_likelihood: Option<String>,
    #[serde(default)]
    pub sorrow_likelihood: Option<String>,
    #[serde(default)]
    pub anger_likelihood: Option<String>,
    #[serde(default)]
    pub surprise_likelihood: Option<String>,
}

/// Normalized emotions of one detected face
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceRecord {
    pub joy_likelihood: Likelihood,
    pub sorrow_likelihood: Likelihood,
    pub anger_likelihood: Likelihood,
    pub surprise_likelihood: Likelihood,
}

impl From<&RawFaceAnnotation> for FaceRecord {
    fn from(raw: &RawFaceAnnotation) -> Self {
        Self {
            joy_likelihood: Likelihood::from_raw(raw.joy_likelihood.as_deref()),
            sorrow_likelihood: Likelihood::from_raw(raw.sorrow_likelihood.as_deref()),
            anger_likelihood: Likelihood::from_raw(raw.anger_likelihood.as_deref()),
            surprise_likelihood: Likelihood::from_raw(raw.surprise_likelihood.as_deref()),
        }
    }
}
