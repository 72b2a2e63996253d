// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::aabb::Aabb;

/// Trigger component: a local-space volume that activators enter and exit.
#[derive(Debug, Copy, Clone, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SpatialTrigger {
    /// Local-space bounds; world bounds add the owner's position.
    pub bounds: Aabb,
    /// Append activators to the entry log on enter.
    pub track_entries: bool,
    /// Append activators to the exit log on exit.
    pub track_exits: bool,
}

impl SpatialTrigger {
    /// Trigger that logs both entries and exits.
    pub fn tracking(bounds: Aabb) -> Self {
        Self {
            bounds,
            track_entries: true,
            track_exits: true,
        }
    }

    /// Trigger that only maintains the overlap marker.
    pub fn untracked(bounds: Aabb) -> Self {
        Self {
            bounds,
            track_entries: false,
            track_exits: false,
        }
    }
}

/// Activator component: a local-space volume detected by triggers.
#[derive(Debug, Copy, Clone, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SpatialActivator {
    /// Local-space bounds; world bounds add the owner's position.
    pub bounds: Aabb,
}

/// Capability bitmask describing which spatial roles an object plays.
///
/// Checked before each role-specific index operation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Roles(u8);

impl Roles {
    /// No spatial role.
    pub const NONE: Self = Self(0);
    /// Object carries a [`SpatialActivator`].
    pub const ACTIVATOR: Self = Self(1 << 0);
    /// Object carries a [`SpatialTrigger`].
    pub const TRIGGER: Self = Self(1 << 1);
    /// Object is both trigger and activator.
    pub const BOTH: Self = Self(Self::ACTIVATOR.0 | Self::TRIGGER.0);

    /// Builds a mask from role flags.
    pub const fn from_flags(is_activator: bool, is_trigger: bool) -> Self {
        let mut bits = 0;
        if is_activator {
            bits |= Self::ACTIVATOR.0;
        }
        if is_trigger {
            bits |= Self::TRIGGER.0;
        }
        Self(bits)
    }

    /// Returns `true` if every bit in `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Shorthand for `contains(Roles::ACTIVATOR)`.
    pub const fn is_activator(self) -> bool {
        self.contains(Self::ACTIVATOR)
    }

    /// Shorthand for `contains(Roles::TRIGGER)`.
    pub const fn is_trigger(self) -> bool {
        self.contains(Self::TRIGGER)
    }

    /// Returns `true` if no role bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Roles {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::fmt::Debug for Roles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.is_activator(), self.is_trigger()) {
            (false, false) => f.write_str("Roles(none)"),
            (true, false) => f.write_str("Roles(activator)"),
            (false, true) => f.write_str("Roles(trigger)"),
            (true, true) => f.write_str("Roles(activator|trigger)"),
        }
    }
}
