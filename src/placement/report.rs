//! Placement run summaries.

use serde::Serialize;

use crate::surface::SurfaceRejection;

/// Why a placement candidate was turned down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    Surface(SurfaceRejection),
    Biome,
    Density,
    Separation,
    /// No variant's rules hold at the point
    Variant,
}

impl From<SurfaceRejection> for Rejection {
    fn from(r: SurfaceRejection) -> Self {
        Rejection::Surface(r)
    }
}

/// Rejection histogram, in pipeline order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    pub out_of_bounds: usize,
    pub height: usize,
    pub slope: usize,
    pub material: usize,
    pub biome: usize,
    pub density: usize,
    pub separation: usize,
    pub variant: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: Rejection) {
        let slot = match rejection {
            Rejection::Surface(SurfaceRejection::OutOfBounds) => &mut self.out_of_bounds,
            Rejection::Surface(SurfaceRejection::Height) => &mut self.height,
            Rejection::Surface(SurfaceRejection::Slope) => &mut self.slope,
            Rejection::Surface(SurfaceRejection::Material) => &mut self.material,
            Rejection::Biome => &mut self.biome,
            Rejection::Density => &mut self.density,
            Rejection::Separation => &mut self.separation,
            Rejection::Variant => &mut self.variant,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.out_of_bounds
            + self.height
            + self.slope
            + self.material
            + self.biome
            + self.density
            + self.separation
            + self.variant
    }
}

/// Outcome of one species run. A shortfall is expected, not an error.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacementReport {
    pub species: String,
    pub requested: usize,
    pub placed: usize,
    pub attempts: usize,
    pub rejections: RejectionCounts,
}

impl PlacementReport {
    pub fn new(species: impl Into<String>, requested: usize) -> Self {
        Self {
            species: species.into(),
            requested,
            placed: 0,
            attempts: 0,
            rejections: RejectionCounts::default(),
        }
    }

    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.placed)
    }

    /// Accepted fraction of attempts, 0 when nothing was attempted.
    pub fn success_rate(&self) -> f32 {
        if self.attempts == 0 {
            0.0
        } else {
            self.placed as f32 / self.attempts as f32
        }
    }

    pub fn is_complete(&self) -> bool {
        self.placed >= self.requested
    }

    pub(crate) fn log(&self) {
        log::info!(
            "Placed {}/{} '{}' in {} attempts ({:.1}% accepted)",
            self.placed,
            self.requested,
            self.species,
            self.attempts,
            self.success_rate() * 100.0
        );
        if self.placed == 0 && self.requested > 0 {
            log::warn!("No '{}' instances placed; check its surface and density rules", self.species);
        }
        log::debug!("'{}' rejections: {:?}", self.species, self.rejections);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_histogram() {
        let mut counts = RejectionCounts::default();
        counts.record(Rejection::Surface(SurfaceRejection::Slope));
        counts.record(SurfaceRejection::Slope.into());
        counts.record(Rejection::Separation);
        assert_eq!(counts.slope, 2);
        assert_eq!(counts.separation, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_shortfall_and_rate() {
        let mut report = PlacementReport::new("grass", 100);
        assert_eq!(report.success_rate(), 0.0);
        report.placed = 40;
        report.attempts = 500;
        assert_eq!(report.shortfall(), 60);
        assert!((report.success_rate() - 0.08).abs() < 1e-6);
        assert!(!report.is_complete());
    }
}
