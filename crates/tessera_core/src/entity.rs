//! # Entity Identifiers
//!
//! Entities are lightweight identifiers packed into a single unsigned integer:
//! - Low bits: the slot id (index into the registry's entity table)
//! - High bits: a version (generation) counter for safe slot reuse
//!
//! The split is selected at compile time through [`EntityRepr`], which is
//! implemented for `u32` and `u64`.

use std::fmt;
use std::hash::Hash;

/// Bit layout of a packed entity identifier.
///
/// Implemented for `u32` (20 bit id, 12 bit version) and `u64`
/// (32 bit id, 32 bit version).
pub trait EntityRepr: Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static {
    /// Mask selecting the id part.
    const ID_MASK: u64;
    /// Mask selecting the version part (after shifting).
    const VERSION_MASK: u64;
    /// Number of low bits used by the id.
    const VERSION_SHIFT: u32 = Self::ID_MASK.count_ones();
    /// All bits set: id == `ID_MASK`, version == `VERSION_MASK`.
    const NULL: Self;

    /// Truncates a `u64` into the representation.
    fn from_bits(bits: u64) -> Self;

    /// Widens the representation into a `u64`.
    fn to_bits(self) -> u64;
}

impl EntityRepr for u32 {
    const ID_MASK: u64 = 0xF_FFFF;
    const VERSION_MASK: u64 = 0xFFF;
    const NULL: Self = u32::MAX;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn from_bits(bits: u64) -> Self {
        bits as u32
    }

    #[inline]
    fn to_bits(self) -> u64 {
        u64::from(self)
    }
}

impl EntityRepr for u64 {
    const ID_MASK: u64 = 0xFFFF_FFFF;
    const VERSION_MASK: u64 = 0xFFFF_FFFF;
    const NULL: Self = u64::MAX;

    #[inline]
    fn from_bits(bits: u64) -> Self {
        bits
    }

    #[inline]
    fn to_bits(self) -> u64 {
        self
    }
}

/// Unique identifier for an entity.
///
/// Two identifiers are equal only if both their id and version match, so a
/// handle to a destroyed entity never equals the handle of the entity that
/// later reuses its slot.
///
/// # Version wrap
///
/// The version counter is finite. A slot recycled `VERSION_MASK` times comes
/// back to the version it started with, and a stale handle kept across all of
/// those recycles compares equal to the live one again. This is accepted: use
/// [`Entity64`] when a 12 bit version space is too small.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct BasicEntity<R: EntityRepr = u32>(R);

/// 32 bit entity: 20 bit id, 12 bit version.
pub type Entity = BasicEntity<u32>;

/// 64 bit entity: 32 bit id, 32 bit version.
pub type Entity64 = BasicEntity<u64>;

impl<R: EntityRepr> BasicEntity<R> {
    /// Null/invalid entity. Never handed out by a registry.
    pub const NULL: Self = Self(R::NULL);

    /// Packs an id and a version into an entity.
    ///
    /// Bits outside the masks are discarded.
    ///
    /// # Arguments
    ///
    /// * `id` - The slot id (0 to `ID_MASK`)
    /// * `version` - The generation counter (0 to `VERSION_MASK`)
    #[inline]
    #[must_use]
    pub fn new(id: u64, version: u64) -> Self {
        Self(R::from_bits(
            (id & R::ID_MASK) | ((version & R::VERSION_MASK) << R::VERSION_SHIFT),
        ))
    }

    /// Rebuilds an entity from its packed value.
    #[inline]
    #[must_use]
    pub fn from_bits(bits: R) -> Self {
        Self(bits)
    }

    /// Returns the packed value.
    #[inline]
    #[must_use]
    pub fn to_bits(self) -> R {
        self.0
    }

    /// Returns the id portion of the entity.
    #[inline]
    #[must_use]
    pub fn id(self) -> u64 {
        self.0.to_bits() & R::ID_MASK
    }

    /// Returns the version portion of the entity.
    #[inline]
    #[must_use]
    pub fn version(self) -> u64 {
        (self.0.to_bits() >> R::VERSION_SHIFT) & R::VERSION_MASK
    }

    /// Returns the id as a table index.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn index(self) -> usize {
        self.id() as usize
    }

    /// Returns the same id with the next version.
    ///
    /// The reserved value `VERSION_MASK` is skipped; the counter wraps to 0.
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        let mut version = self.version() + 1;
        if version == R::VERSION_MASK {
            version += 1;
        }
        Self::new(self.id(), version)
    }

    /// Checks if this entity is the null entity.
    #[inline]
    #[must_use]
    pub fn is_null(self) -> bool {
        self.0 == R::NULL
    }
}

impl<R: EntityRepr> Default for BasicEntity<R> {
    fn default() -> Self {
        Self::NULL
    }
}

impl<R: EntityRepr> fmt::Debug for BasicEntity<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({}v{})", self.id(), self.version())
        }
    }
}

impl<R: EntityRepr> fmt::Display for BasicEntity<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.id(), self.version())
        }
    }
}
