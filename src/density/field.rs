//! Superposed-sinusoid noise.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// One term of a `DensityField`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Wave {
    /// `amp * sin(freq * x) * cos(freq * z)`: round blobs on a lattice
    SinCos { freq: f32, amp: f32 },
    /// `amp * sin(fx * x + fz * z)`, or `cos` when `cosine`: oblique bands
    Diagonal { fx: f32, fz: f32, amp: f32, cosine: bool },
    /// `amp * fract(sin(12.9898 x + 78.233 z) * 43758.5453)`: per-point jitter
    Hash { amp: f32 },
}

impl Wave {
    pub fn eval(&self, x: f32, z: f32) -> f32 {
        match *self {
            Wave::SinCos { freq, amp } => (x * freq).sin() * (z * freq).cos() * amp,
            Wave::Diagonal { fx, fz, amp, cosine } => {
                let t = x * fx + z * fz;
                if cosine { t.cos() * amp } else { t.sin() * amp }
            }
            Wave::Hash { amp } => {
                let h = (x * 12.9898 + z * 78.233).sin() * 43758.5453;
                (h - h.floor()) * amp
            }
        }
    }

    /// Largest absolute contribution of this term.
    pub fn amplitude(&self) -> f32 {
        match *self {
            Wave::SinCos { amp, .. } | Wave::Diagonal { amp, .. } | Wave::Hash { amp } => amp.abs(),
        }
    }
}

/// Affine map from raw noise into `[0, 1]`: `((v + offset) / range).clamp(0, 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub offset: f32,
    pub range: f32,
}

impl Normalization {
    pub fn apply(&self, v: f32) -> f32 {
        ((v + self.offset) / self.range).clamp(0.0, 1.0)
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self { offset: 1.0, range: 2.0 }
    }
}

/// Sum of `Wave` terms, the first of them seed-shifted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityField {
    pub waves: Vec<Wave>,
    /// Shifts the first term's sample point by `(seed_shift * 7.3, seed_shift * 3.1)`
    #[serde(default)]
    pub seed_shift: f32,
    #[serde(default)]
    pub normalization: Normalization,
}

impl DensityField {
    pub fn new(waves: Vec<Wave>, seed_shift: f32, normalization: Normalization) -> Self {
        Self { waves, seed_shift, normalization }
    }

    /// Broad patches with fine jitter, tuned for grass meadows.
    pub fn grass() -> Self {
        Self::new(
            vec![
                Wave::SinCos { freq: 0.03, amp: 0.5 },
                Wave::Diagonal { fx: 0.1, fz: 0.07, amp: 0.3, cosine: false },
                Wave::Diagonal { fx: 0.08, fz: -0.12, amp: 0.2, cosine: true },
                Wave::SinCos { freq: 0.5, amp: 0.15 },
                Wave::Diagonal { fx: 0.7, fz: 0.6, amp: 0.1, cosine: false },
                Wave::Hash { amp: 0.1 },
            ],
            0.0,
            Normalization { offset: 1.0, range: 2.0 },
        )
    }

    /// Very low frequency field sized for forest biomes on ~1000 unit maps.
    pub fn biome() -> Self {
        Self::new(
            vec![
                Wave::SinCos { freq: 0.008, amp: 1.0 },
                Wave::Diagonal { fx: 0.016, fz: 0.016, amp: 0.5, cosine: false },
            ],
            0.0,
            Normalization { offset: 1.5, range: 3.0 },
        )
    }

    /// Mid-frequency field for single-tree scattering.
    pub fn trees(seed: u32) -> Self {
        Self::new(
            vec![
                Wave::SinCos { freq: 0.3, amp: 1.0 },
                Wave::Diagonal { fx: 0.8, fz: -0.5, amp: 0.6, cosine: false },
                Wave::Diagonal { fx: 1.2, fz: 0.9, amp: 0.4, cosine: true },
            ],
            seed_phase(seed),
            Normalization { offset: 1.5, range: 3.0 },
        )
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed_shift = seed_phase(seed);
        self
    }

    /// Raw field value. Bounded by `amplitude()`.
    /// Only the leading term sees the seed.
    pub fn noise2d(&self, x: f32, z: f32) -> f32 {
        let Some((first, rest)) = self.waves.split_first() else {
            return 0.0;
        };
        let shifted = first.eval(x + self.seed_shift * 7.3, z + self.seed_shift * 3.1);
        shifted + rest.iter().map(|w| w.eval(x, z)).sum::<f32>()
    }

    /// Field value mapped into `[0, 1]`.
    pub fn normalized(&self, x: f32, z: f32) -> f32 {
        self.normalization.apply(self.noise2d(x, z))
    }

    /// `normalized ^ power`: larger powers leave only the peaks.
    pub fn clumped(&self, x: f32, z: f32, power: f32) -> f32 {
        self.normalized(x, z).powf(power)
    }

    /// Sum of absolute term amplitudes, a bound on `|noise2d|`.
    pub fn amplitude(&self) -> f32 {
        self.waves.iter().map(Wave::amplitude).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.waves.is_empty() {
            return Err(Error::config("density field has no waves"));
        }
        if !(self.normalization.range > 0.0) {
            return Err(Error::config(format!(
                "density normalization range must be positive, got {}",
                self.normalization.range
            )));
        }
        Ok(())
    }
}

/// Seeds fold into 0..4096 so the phase shift stays small enough for f32 trig.
fn seed_phase(seed: u32) -> f32 {
    (seed % 4096) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let field = DensityField::trees(42);
        for i in 0..50 {
            let (x, z) = (i as f32 * 3.7 - 90.0, i as f32 * -1.3 + 12.0);
            assert_eq!(field.noise2d(x, z).to_bits(), field.noise2d(x, z).to_bits());
        }
    }

    #[test]
    fn test_seed_changes_field() {
        let a = DensityField::trees(1);
        let b = DensityField::trees(2);
        let differs = (0..20).any(|i| {
            let x = i as f32 * 1.9;
            a.noise2d(x, x * 0.5) != b.noise2d(x, x * 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn test_tree_field_shifts_only_leading_term() {
        let seed = 7.0f32;
        let field = DensityField::trees(7);
        for i in 0..40 {
            let (x, z) = (i as f32 * 2.9 - 50.0, i as f32 * -1.7 + 20.0);
            let expected = ((x + seed * 7.3) * 0.3).sin() * ((z + seed * 3.1) * 0.3).cos()
                + (x * 0.8 - z * 0.5).sin() * 0.6
                + (x * 1.2 + z * 0.9).cos() * 0.4;
            assert!((field.noise2d(x, z) - expected).abs() < 1e-4, "at ({}, {})", x, z);
        }
    }

    #[test]
    fn test_seed_leaves_fine_terms_alone() {
        let a = DensityField::trees(3);
        let b = DensityField::trees(11);
        let (x, z) = (4.0, -9.0);
        let lead = |f: &DensityField| f.waves[0].eval(x + f.seed_shift * 7.3, z + f.seed_shift * 3.1);
        let rest_a = a.noise2d(x, z) - lead(&a);
        let rest_b = b.noise2d(x, z) - lead(&b);
        assert!((rest_a - rest_b).abs() < 1e-5);
    }

    #[test]
    fn test_bounded_by_amplitude() {
        for field in [DensityField::grass(), DensityField::biome(), DensityField::trees(7)] {
            let amp = field.amplitude();
            for i in 0..200 {
                let x = (i as f32 * 17.31) % 500.0 - 250.0;
                let z = (i as f32 * 9.77) % 500.0 - 250.0;
                assert!(field.noise2d(x, z).abs() <= amp + 1e-4);
            }
        }
    }

    #[test]
    fn test_normalized_and_clumped_range() {
        let field = DensityField::grass();
        for i in 0..100 {
            let x = i as f32 * 2.3;
            let n = field.normalized(x, -x);
            assert!((0.0..=1.0).contains(&n));
            let c = field.clumped(x, -x, 12.0);
            assert!(c <= n + 1e-6);
        }
    }

    #[test]
    fn test_hash_wave_range() {
        let w = Wave::Hash { amp: 0.1 };
        for i in 0..100 {
            let v = w.eval(i as f32 * 0.77, i as f32 * 1.13);
            assert!((0.0..0.1 + 1e-6).contains(&v));
        }
    }

    #[test]
    fn test_validation() {
        assert!(DensityField::grass().validate().is_ok());
        let empty = DensityField::new(Vec::new(), 0.0, Normalization::default());
        assert!(empty.validate().is_err());
        let bad = DensityField::new(vec![Wave::Hash { amp: 1.0 }], 0.0, Normalization { offset: 0.0, range: 0.0 });
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let field = DensityField::trees(9);
        let json = serde_json::to_string(&field).unwrap();
        assert!(json.contains("\"kind\":\"sin_cos\""));
        let back: DensityField = serde_json::from_str(&json).unwrap();
        assert_eq!(back, field);
    }
}
