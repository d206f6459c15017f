//! # Component Signatures
//!
//! A fixed-width bit set recording which component types an entity owns.
//! Bit `k` corresponds to [`ComponentTypeId`] `k`.

use std::fmt;

use super::component::{ComponentTypeId, MAX_COMPONENT_TYPES};

/// Set of component types, one bit per [`ComponentTypeId`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature(u64);

impl Signature {
    /// The signature with no components.
    pub const EMPTY: Self = Self(0);

    /// Creates a signature from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Adds a component type.
    #[inline]
    pub fn insert(&mut self, id: ComponentTypeId) {
        self.0 |= id.bit();
    }

    /// Removes a component type.
    #[inline]
    pub fn remove(&mut self, id: ComponentTypeId) {
        self.0 &= !id.bit();
    }

    /// Checks whether a component type is present.
    #[inline]
    #[must_use]
    pub const fn contains(self, id: ComponentTypeId) -> bool {
        self.0 & id.bit() != 0
    }

    /// Checks whether every type in `required` is also in `self`.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Returns `true` if no component type is present.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of component types present.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Removes every component type.
    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterates over the present component types in ascending order.
    pub fn iter(self) -> impl Iterator<Item = ComponentTypeId> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            // Lowest set bit first
            let index = bits.trailing_zeros();
            bits &= bits - 1;
            ComponentTypeId::new(index as usize)
        })
    }
}

impl FromIterator<ComponentTypeId> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentTypeId>>(iter: I) -> Self {
        let mut signature = Self::EMPTY;
        for id in iter {
            signature.insert(id);
        }
        signature
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#0width$b})", self.0, width = MAX_COMPONENT_TYPES + 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: usize) -> ComponentTypeId {
        ComponentTypeId::new(index).unwrap()
    }

    #[test]
    fn test_insert_remove() {
        let mut sig = Signature::EMPTY;
        assert!(!sig.contains(id(5)));

        sig.insert(id(5));
        assert!(sig.contains(id(5)));
        assert_eq!(sig.len(), 1);

        sig.remove(id(5));
        assert!(!sig.contains(id(5)));
        assert!(sig.is_empty());
    }

    #[test]
    fn test_highest_bit() {
        let mut sig = Signature::EMPTY;
        sig.insert(id(63));
        assert!(sig.contains(id(63)));
        assert_eq!(sig.bits(), 1 << 63);
    }

    #[test]
    fn test_superset() {
        let entity: Signature = [id(0), id(1), id(4)].into_iter().collect();
        let wanted: Signature = [id(0), id(4)].into_iter().collect();
        let other: Signature = [id(0), id(2)].into_iter().collect();

        assert!(entity.contains_all(wanted));
        assert!(!entity.contains_all(other));
        assert!(entity.contains_all(Signature::EMPTY));
        assert!(Signature::EMPTY.contains_all(Signature::EMPTY));
    }

    #[test]
    fn test_iter_ascending() {
        let sig: Signature = [id(9), id(2), id(40)].into_iter().collect();
        let ids: Vec<usize> = sig.iter().map(ComponentTypeId::index).collect();
        assert_eq!(ids, vec![2, 9, 40]);
    }
}
