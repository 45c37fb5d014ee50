//! Instance orientation and transform composition.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Fixed correction from the asset's authoring convention to world Y-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upright {
    /// Asset is already Y-up
    #[default]
    None,
    /// Asset authored Z-up: maps +Z onto +Y (-90 degrees about X)
    ZUp,
    /// Asset authored with -Z up: maps -Z onto +Y (+90 degrees about X)
    NegZUp,
    /// Card-like asset laid flat on the surface: maps +Y onto +Z (+90 degrees about X)
    LyingFlat,
}

impl Upright {
    pub fn rotation(self) -> Quat {
        match self {
            Upright::None => Quat::IDENTITY,
            Upright::ZUp => Quat::from_rotation_x(-FRAC_PI_2),
            Upright::NegZUp | Upright::LyingFlat => Quat::from_rotation_x(FRAC_PI_2),
        }
    }
}

/// How a placed instance is rotated, lifted and scaled.
///
/// The model matrix is
/// `T(position) * Ry(yaw) * R_align(normal, align_to_normal) * R_upright * R_tilt * T(0, lift, 0) * S(scale)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Orientation {
    pub upright: Upright,
    /// 0 keeps the instance vertical, 1 aligns it fully with the surface normal
    pub align_to_normal: f32,
    /// Random tilt about X and Z, drawn in `[-t, t]` degrees
    pub tilt_jitter_degrees: f32,
    /// Offset along the instance's local up axis
    pub lift: f32,
    pub random_yaw: bool,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            upright: Upright::None,
            align_to_normal: 0.0,
            tilt_jitter_degrees: 0.0,
            lift: 0.0,
            random_yaw: true,
        }
    }
}

impl Orientation {
    pub fn with_upright(mut self, upright: Upright) -> Self {
        self.upright = upright;
        self
    }

    pub fn aligned(mut self, fraction: f32) -> Self {
        self.align_to_normal = fraction;
        self
    }

    pub fn with_tilt(mut self, degrees: f32) -> Self {
        self.tilt_jitter_degrees = degrees;
        self
    }

    pub fn with_lift(mut self, lift: f32) -> Self {
        self.lift = lift;
        self
    }

    pub fn fixed_yaw(mut self) -> Self {
        self.random_yaw = false;
        self
    }

    /// Partial rotation from world up toward `normal`.
    pub fn alignment(&self, normal: Vec3) -> Quat {
        if self.align_to_normal <= 0.0 {
            return Quat::IDENTITY;
        }
        let Some(normal) = normal.try_normalize() else {
            return Quat::IDENTITY;
        };
        let full = Quat::from_rotation_arc(Vec3::Y, normal);
        Quat::IDENTITY.slerp(full, self.align_to_normal.min(1.0))
    }

    /// Combined rotation. `tilt` is `(about X, about Z)` in radians.
    pub fn rotation(&self, normal: Vec3, yaw: f32, tilt: Vec2) -> Quat {
        let tilt = Quat::from_rotation_x(tilt.x) * Quat::from_rotation_z(tilt.y);
        Quat::from_rotation_y(yaw) * self.alignment(normal) * self.upright.rotation() * tilt
    }

    pub fn transform(&self, position: Vec3, normal: Vec3, yaw: f32, tilt: Vec2, scale: f32) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(normal, yaw, tilt), position)
            * Mat4::from_translation(Vec3::new(0.0, self.lift, 0.0))
            * Mat4::from_scale(Vec3::splat(scale))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.align_to_normal) {
            return Err(Error::config(format!(
                "normal alignment must be in [0, 1], got {}",
                self.align_to_normal
            )));
        }
        if !(self.tilt_jitter_degrees >= 0.0) || !self.tilt_jitter_degrees.is_finite() {
            return Err(Error::config(format!(
                "tilt jitter must be >= 0 degrees, got {}",
                self.tilt_jitter_degrees
            )));
        }
        if !self.lift.is_finite() {
            return Err(Error::config("lift must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_plain_transform() {
        let o = Orientation::default();
        let m = o.transform(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, 0.0, Vec2::ZERO, 2.0);
        assert!(close(m.transform_point3(Vec3::Y), Vec3::new(1.0, 4.0, 3.0)));
    }

    #[test]
    fn test_upright_corrections() {
        assert!(close(Upright::ZUp.rotation() * Vec3::Z, Vec3::Y));
        assert!(close(Upright::NegZUp.rotation() * Vec3::NEG_Z, Vec3::Y));
        assert!(close(Upright::LyingFlat.rotation() * Vec3::Y, Vec3::Z));
        assert!(close(Upright::None.rotation() * Vec3::Y, Vec3::Y));
    }

    #[test]
    fn test_full_alignment_follows_normal() {
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let o = Orientation::default().aligned(1.0);
        assert!(close(o.rotation(normal, 0.0, Vec2::ZERO) * Vec3::Y, normal));
    }

    #[test]
    fn test_partial_alignment_between_up_and_normal() {
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let up = Orientation::default().aligned(0.8).rotation(normal, 0.0, Vec2::ZERO) * Vec3::Y;
        let angle_to_normal = up.angle_between(normal).to_degrees();
        // 45 degrees of slope, 80% of it applied
        assert!((angle_to_normal - 9.0).abs() < 0.1);
    }

    #[test]
    fn test_lift_follows_local_up() {
        let o = Orientation::default().with_upright(Upright::LyingFlat).with_lift(0.5);
        let m = o.transform(Vec3::ZERO, Vec3::Y, 0.0, Vec2::ZERO, 1.0);
        assert!(close(m.transform_point3(Vec3::ZERO), Vec3::new(0.0, 0.0, 0.5)));
    }

    #[test]
    fn test_validation() {
        assert!(Orientation::default().validate().is_ok());
        assert!(Orientation::default().aligned(1.5).validate().is_err());
        assert!(Orientation::default().with_tilt(-1.0).validate().is_err());
    }
}
