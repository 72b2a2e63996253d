// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier and hashing utilities.
use blake3::Hasher;
use std::fmt;

/// Canonical 256-bit hash used for entity ids and interned group labels.
pub type Hash = [u8; 32];

/// Strongly typed identifier for a spatial object.
///
/// `EntityId` is an opaque 32-byte identifier. The in-memory host derives ids
/// from labels via [`make_entity_id`] (`blake3("entity:" || label)`), but any
/// host may mint ids its own way; the core only compares and orders them.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct EntityId(pub Hash);

impl EntityId {
    /// Returns the canonical byte representation of this id.
    #[must_use]
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", short_hex(&self.0))
    }
}

/// Interned group label.
///
/// Two tags are equal iff their labels are byte-equal. Tags are produced by
/// [`make_group_tag`]; the label itself is not retained.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct GroupTag(pub Hash);

impl GroupTag {
    /// Returns the canonical byte representation of this tag.
    #[must_use]
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }
}

impl fmt::Debug for GroupTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupTag({})", short_hex(&self.0))
    }
}

fn short_hex(h: &Hash) -> String {
    use fmt::Write as _;
    let mut out = String::with_capacity(16);
    for b in &h[..8] {
        let _ = write!(out, "{b:02x}");
    }
    out
}

fn domain_hash(domain: &[u8], label: &str) -> Hash {
    let mut hasher = Hasher::new();
    hasher.update(domain);
    hasher.update(label.as_bytes());
    hasher.finalize().into()
}

/// Produces a stable entity identifier derived from a label using BLAKE3.
#[must_use]
pub fn make_entity_id(label: &str) -> EntityId {
    EntityId(domain_hash(b"entity:", label))
}

/// Interns a group label using BLAKE3 (`blake3("group:" || label)`).
#[must_use]
pub fn make_group_tag(label: &str) -> GroupTag {
    GroupTag(domain_hash(b"group:", label))
}
