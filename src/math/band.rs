//! Closed scalar interval used for height bands, noise bands and scale ranges.

use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` range. Infinite ends are allowed.
///
/// Serialized with open ends omitted, since JSON has no infinity:
/// `{"min": 0.35}` is `Band::above(0.35)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "BandRepr", into = "BandRepr")]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub const ANY: Self = Self { min: f32::NEG_INFINITY, max: f32::INFINITY };

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Band open towards +infinity.
    pub const fn above(min: f32) -> Self {
        Self { min, max: f32::INFINITY }
    }

    /// Band open towards -infinity.
    pub const fn below(max: f32) -> Self {
        Self { min: f32::NEG_INFINITY, max }
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }

    /// Linear interpolation across the band. Only meaningful for finite bands.
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }

    pub fn is_valid(&self) -> bool {
        !self.min.is_nan() && !self.max.is_nan() && self.min <= self.max
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

#[derive(Serialize, Deserialize)]
struct BandRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<f32>,
}

impl From<BandRepr> for Band {
    fn from(repr: BandRepr) -> Self {
        Self {
            min: repr.min.unwrap_or(f32::NEG_INFINITY),
            max: repr.max.unwrap_or(f32::INFINITY),
        }
    }
}

impl From<Band> for BandRepr {
    fn from(band: Band) -> Self {
        Self {
            min: band.min.is_finite().then_some(band.min),
            max: band.max.is_finite().then_some(band.max),
        }
    }
}

impl Default for Band {
    fn default() -> Self {
        Self::ANY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_inclusive() {
        let band = Band::new(-3.0, 18.0);
        assert!(band.contains(-3.0));
        assert!(band.contains(18.0));
        assert!(!band.contains(18.01));
    }

    #[test]
    fn test_open_bands() {
        assert!(Band::above(0.35).contains(1e9));
        assert!(!Band::above(0.35).contains(0.3));
        assert!(Band::below(-0.35).contains(-1.5));
        assert!(Band::ANY.contains(f32::MIN));
    }

    #[test]
    fn test_validity() {
        assert!(Band::new(0.8, 1.2).is_valid());
        assert!(!Band::new(1.2, 0.8).is_valid());
        assert!(!Band::new(f32::NAN, 1.0).is_valid());
        assert!(!Band::ANY.is_finite());
    }

    #[test]
    fn test_json_open_ends() {
        let json = serde_json::to_string(&Band::above(0.35)).unwrap();
        assert_eq!(json, r#"{"min":0.35}"#);
        let back: Band = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Band::above(0.35));
        let any: Band = serde_json::from_str("{}").unwrap();
        assert_eq!(any, Band::ANY);
    }

    #[test]
    fn test_lerp() {
        let band = Band::new(0.8, 1.2);
        assert_eq!(band.lerp(0.0), 0.8);
        assert!((band.lerp(0.5) - 1.0).abs() < 1e-6);
    }
}
