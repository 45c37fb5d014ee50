//! Placed instances and the per-species store they are collected into.

pub mod asset;
pub mod store;

pub use asset::{AssetHandle, AssetLookup, AssetTable};
pub use store::{InstanceStore, SpeciesEntry};

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Dense species index assigned by `InstanceStore::register`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeciesId(pub u16);

/// One placed object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub species: SpeciesId,
    /// Index into the species' variant list, if it has any
    pub variant: Option<u16>,
    pub asset: Option<AssetHandle>,
    /// Surface point the instance stands on
    pub position: Vec3,
    pub normal: Vec3,
    /// Rotation about +Y in radians
    pub yaw: f32,
    pub scale: f32,
    /// Full model matrix, ready for upload
    pub transform: Mat4,
}

impl Instance {
    /// Instance with a plain `T * Ry(yaw) * S` transform.
    pub fn upright(species: SpeciesId, position: Vec3, yaw: f32, scale: f32) -> Self {
        Self {
            species,
            variant: None,
            asset: None,
            position,
            normal: Vec3::Y,
            yaw,
            scale,
            transform: Mat4::from_scale_rotation_translation(
                Vec3::splat(scale),
                glam::Quat::from_rotation_y(yaw),
                position,
            ),
        }
    }

    pub fn xz(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}
