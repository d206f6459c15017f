//! # Signature Views
//!
//! Lazy iteration over every live entity whose signature contains a
//! requested set of component types.
//!
//! ```text
//! slot:       0        1          2        3
//! signature:  {P}      {P, R}     {R}      {}  (free)
//! view (P, R):         yields 1
//! view (P,):  yields 0, 1
//! ```
//!
//! A view borrows the world immutably, so entities cannot be created or
//! destroyed, and components cannot be attached or detached, while it is
//! alive. Collect the handles first when a system needs to mutate.

use std::iter::FusedIterator;
use std::slice;

use super::component::{Component, TypeRegistry};
use super::entity::{EntityId, EntityRecord};
use super::signature::Signature;

/// A set of component types named at the call site, as a tuple.
///
/// Implemented for `()` and tuples of up to eight component types.
pub trait ComponentSet {
    /// Builds the signature for this set.
    ///
    /// Returns `None` if any type has never been registered, in which case no
    /// entity can match.
    fn signature(types: &TypeRegistry) -> Option<Signature>;
}

impl ComponentSet for () {
    fn signature(_types: &TypeRegistry) -> Option<Signature> {
        Some(Signature::EMPTY)
    }
}

macro_rules! impl_component_set {
    ($($component:ident),+) => {
        impl<$($component: Component),+> ComponentSet for ($($component,)+) {
            fn signature(types: &TypeRegistry) -> Option<Signature> {
                let mut signature = Signature::EMPTY;
                $(signature.insert(types.lookup::<$component>()?);)+
                Some(signature)
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

/// Iterator over entities whose signature is a superset of a requested one.
///
/// Handles are yielded in ascending slot order. Created by
/// [`World::view`](crate::World::view) and
/// [`World::view_signature`](crate::World::view_signature).
#[derive(Clone, Debug)]
pub struct View<'w> {
    records: slice::Iter<'w, EntityRecord>,
    /// `None` when the request names an unregistered type.
    required: Option<Signature>,
}

impl<'w> View<'w> {
    pub(crate) fn new(records: &'w [EntityRecord], required: Option<Signature>) -> Self {
        Self {
            records: records.iter(),
            required,
        }
    }

    /// The signature every yielded entity contains, if any entity can match.
    #[must_use]
    pub fn required(&self) -> Option<Signature> {
        self.required
    }
}

impl Iterator for View<'_> {
    type Item = EntityId;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let required = self.required?;
        self.records
            .find(|record| record.is_alive() && record.signature.contains_all(required))
            .map(|record| record.handle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.required {
            Some(_) => (0, Some(self.records.len())),
            None => (0, Some(0)),
        }
    }
}

impl FusedIterator for View<'_> {}
