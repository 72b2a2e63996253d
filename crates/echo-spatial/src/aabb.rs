// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::error::SpatialError;
use crate::math::Vec3;

/// Axis-aligned bounding box stored as center and half extents.
///
/// Component bounds are authored in local space; [`Aabb::translated`] moves
/// them into world space by adding the owner's world position.
///
/// Invariants:
/// - `extents` components are finite and non-negative.
#[derive(Debug, Copy, Clone, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    center: Vec3,
    extents: Vec3,
}

impl Aabb {
    /// Builds an AABB centered at `center` with half-extents `extents`.
    ///
    /// Returns [`SpatialError::InvalidBounds`] when any half extent is
    /// negative or any component is non-finite.
    pub fn try_new(center: Vec3, extents: Vec3) -> Result<Self, SpatialError> {
        let valid = center.is_finite()
            && extents.is_finite()
            && extents.to_array().iter().all(|e| *e >= 0.0);
        if !valid {
            return Err(SpatialError::InvalidBounds {
                center: center.to_array(),
                extents: extents.to_array(),
            });
        }
        Ok(Self { center, extents })
    }

    /// Builds an AABB centered at the origin with half-extents `hx, hy, hz`.
    pub fn from_half_extents(hx: f32, hy: f32, hz: f32) -> Result<Self, SpatialError> {
        Self::try_new(Vec3::ZERO, Vec3::new(hx, hy, hz))
    }

    /// Returns the center.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Returns the half extents.
    #[must_use]
    pub fn extents(&self) -> Vec3 {
        self.extents
    }

    /// Returns the minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center.sub(&self.extents)
    }

    /// Returns the maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center.add(&self.extents)
    }

    /// Returns this box moved by `offset` (local → world).
    #[must_use]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            center: self.center.add(&offset),
            extents: self.extents,
        }
    }

    /// Returns `true` if `other` lies entirely inside this box.
    ///
    /// Inclusive on faces: a box contains itself. Partial overlap is not
    /// containment.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        let a_min = self.min().to_array();
        let a_max = self.max().to_array();
        let b_min = other.min().to_array();
        let b_max = other.max().to_array();
        (0..3).all(|i| a_min[i] <= b_min[i] && b_max[i] <= a_max[i])
    }

    /// Returns `true` if this AABB overlaps another (inclusive on faces).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let a_min = self.min().to_array();
        let a_max = self.max().to_array();
        let b_min = other.min().to_array();
        let b_max = other.max().to_array();
        (0..3).all(|i| a_min[i] <= b_max[i] && b_min[i] <= a_max[i])
    }
}
