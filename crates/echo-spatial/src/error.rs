// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use thiserror::Error;

use crate::ident::EntityId;

/// Errors surfaced by the host API, geometry constructors and config loading.
///
/// The per-tick pipeline itself never fails: missing data is skipped.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// The entity does not exist in the host.
    #[error("unknown entity: {0:?}")]
    UnknownEntity(EntityId),
    /// Bounds with negative or non-finite components.
    #[error("invalid bounds: center={center:?} extents={extents:?}")]
    InvalidBounds {
        /// Offending center.
        center: [f32; 3],
        /// Offending half extents.
        extents: [f32; 3],
    },
    /// Config parsed but failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// Config could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}
