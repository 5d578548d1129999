//! Model bounds and the placement that normalizes them.
//!
//! A loaded model is centred on x/z, rests on y = 0, and is uniformly scaled
//! so its bounding-box diagonal equals the target size.

use glam::{Mat4, Vec3};

use super::controller::LoadError;

/// Bounding-box diagonal of a placed model, in world units.
pub const DEFAULT_TARGET_SIZE: f32 = 3.0;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min: min.min(max), max: min.max(max) }
    }

    /// Box from `[x, y, z]` corner arrays as a renderer reports them.
    /// `None` unless both corners have exactly three components.
    #[must_use]
    pub fn from_slices(min: &[f32], max: &[f32]) -> Option<Self> {
        match (min, max) {
            ([x0, y0, z0], [x1, y1, z1]) => Some(Self::new(Vec3::new(*x0, *y0, *z0), Vec3::new(*x1, *y1, *z1))),
            _ => None,
        }
    }

    /// Tightest box around `points`; `None` for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }
}

/// Uniform scale followed by a translation: `world = scale * local + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub translation: Vec3,
}

impl Placement {
    /// Placement that centres `bounds` on x/z, drops its lowest point to
    /// y = 0, and scales its diagonal to `target_size`.
    ///
    /// # Errors
    ///
    /// [`LoadError::DegenerateBounds`] when the box has no extent or is not
    /// finite, since no scale can reach the target.
    pub fn normalize(bounds: &Aabb, target_size: f32) -> Result<Self, LoadError> {
        let diagonal = bounds.diagonal();
        if !diagonal.is_finite() || diagonal <= f32::EPSILON || !target_size.is_finite() || target_size <= 0.0 {
            return Err(LoadError::DegenerateBounds);
        }
        let scale = target_size / diagonal;
        let center = bounds.center();
        let anchor = Vec3::new(center.x, bounds.min.y, center.z);
        Ok(Self { scale, translation: -anchor * scale })
    }

    #[must_use]
    pub fn apply(&self, local: Vec3) -> Vec3 {
        local * self.scale + self.translation
    }

    /// Same placement as a matrix for the renderer.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), glam::Quat::IDENTITY, self.translation)
    }

    /// Bounds after placement.
    #[must_use]
    pub fn apply_bounds(&self, bounds: &Aabb) -> Aabb {
        Aabb::new(self.apply(bounds.min), self.apply(bounds.max))
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
