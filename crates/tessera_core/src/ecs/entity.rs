//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - A slot index into the entity table and every component pool
//! - A generation counter for safe reuse

use std::fmt;

use super::signature::Signature;

/// Slot index reserved to mean "no entity".
pub const INVALID_INDEX: u32 = u32::MAX;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Upper 32 bits: Slot index into the entity table
/// - Lower 32 bits: Generation counter for detecting stale references
///
/// Handles are opaque to callers: only the [`World`](crate::World) that
/// issued a handle can tell whether it is still current.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Null/invalid entity ID.
    pub const NULL: Self = Self::new(INVALID_INDEX, 0);

    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-2; 2^32-1 is the sentinel)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((index as u64) << 32) | (generation as u64))
    }

    /// Reconstructs an entity ID from its packed representation.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the packed 64-bit representation.
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.0 as u32
    }

    /// Returns `true` if the index field is not the sentinel.
    ///
    /// This is a structural check only. A handle that passes it may still be
    /// stale; use [`World::is_alive`](crate::World::is_alive) for currency.
    #[inline]
    #[must_use]
    pub const fn is_index_valid(self) -> bool {
        self.index() != INVALID_INDEX
    }

    /// Checks if this entity ID carries the sentinel index.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        !self.is_index_valid()
    }

    /// Returns the tombstone written into a slot when this handle is destroyed.
    #[inline]
    #[must_use]
    pub(crate) const fn tombstone(self) -> Self {
        Self::new(INVALID_INDEX, self.generation().wrapping_add(1))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "EntityId(null, v{})", self.generation())
        } else {
            write!(f, "EntityId({}v{})", self.index(), self.generation())
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// One slot of the entity table.
///
/// While the slot is allocated `handle` is the live handle for it. While the
/// slot is free `handle` holds the sentinel index and the generation the next
/// occupant will receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityRecord {
    /// Handle currently valid for this slot (tombstone while free).
    pub handle: EntityId,
    /// Component types attached to the occupant.
    pub signature: Signature,
}

impl EntityRecord {
    /// Creates the record for a freshly appended slot.
    #[inline]
    #[must_use]
    pub const fn new(handle: EntityId) -> Self {
        Self {
            handle,
            signature: Signature::EMPTY,
        }
    }

    /// Whether the slot is currently allocated.
    #[inline]
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.handle.is_index_valid()
    }

    /// Whether `id` is the handle currently owning this slot.
    #[inline]
    #[must_use]
    pub fn is_current(&self, id: EntityId) -> bool {
        self.is_alive() && self.handle == id
    }
}
