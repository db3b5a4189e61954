//! Content flags and query filters.
//!
//! Contents decide what a query treats as solid, what it merely reports as an
//! overlap, and what it ignores.

use serde::{Deserialize, Serialize};

/// Content flags describe what kind of volume a brush is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContentFlags(pub u32);

impl ContentFlags {
    /// Empty space.
    pub const EMPTY: Self = Self(0);

    /// Solid terrain: floors, walls, rocks.
    pub const SOLID: Self = Self(1 << 0);

    /// Invisible wall that blocks agents but not sensing rays.
    pub const AGENT_CLIP: Self = Self(1 << 1);

    /// Trigger volume, reported as an overlap by sweeps.
    pub const TRIGGER: Self = Self(1 << 2);

    /// An agent's own body or attachments.
    pub const AGENT_BODY: Self = Self(1 << 3);

    /// Foliage and other soft cover the agent pushes through.
    pub const FOLIAGE: Self = Self(1 << 4);

    /// What blocks an agent's body when it moves.
    pub const MASK_AGENT_SOLID: Self = Self(Self::SOLID.0 | Self::AGENT_CLIP.0 | Self::AGENT_BODY.0);

    /// What ground sensing rays and snap sweeps stand on.
    pub const MASK_GROUND: Self = Self(Self::SOLID.0 | Self::AGENT_BODY.0);

    /// Check if these flags contain every flag in `other`.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any of the given flags are set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for ContentFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for ContentFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Selects what a query collides with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Contents that stop the query.
    pub block: ContentFlags,

    /// Contents reported as non-blocking overlaps by multi-sweeps.
    pub overlap: ContentFlags,

    /// Skip brushes owned by this entity (the querying agent itself).
    pub ignore_owner: Option<u32>,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self::ground()
    }
}

impl QueryFilter {
    /// Filter for ground sensing and snapping.
    pub const fn ground() -> Self {
        Self {
            block: ContentFlags::MASK_GROUND,
            overlap: ContentFlags::EMPTY,
            ignore_owner: None,
        }
    }

    /// Filter for moving an agent's body.
    pub const fn agent_solid() -> Self {
        Self {
            block: ContentFlags::MASK_AGENT_SOLID,
            overlap: ContentFlags::EMPTY,
            ignore_owner: None,
        }
    }

    /// Same filter, additionally skipping geometry owned by `owner`.
    pub const fn ignoring(self, owner: u32) -> Self {
        Self {
            ignore_owner: Some(owner),
            ..self
        }
    }

    /// Same filter, additionally reporting `contents` as overlaps.
    pub const fn with_overlaps(self, contents: ContentFlags) -> Self {
        Self {
            overlap: contents,
            ..self
        }
    }

    /// Whether a brush with these contents and owner blocks this query.
    #[inline]
    pub fn blocks(&self, contents: ContentFlags, owner: Option<u32>) -> bool {
        self.block.intersects(contents) && !self.is_ignored(owner)
    }

    /// Whether a brush with these contents and owner is reported as an overlap.
    #[inline]
    pub fn overlaps(&self, contents: ContentFlags, owner: Option<u32>) -> bool {
        !self.block.intersects(contents) && self.overlap.intersects(contents) && !self.is_ignored(owner)
    }

    #[inline]
    fn is_ignored(&self, owner: Option<u32>) -> bool {
        owner.is_some() && owner == self.ignore_owner
    }
}
