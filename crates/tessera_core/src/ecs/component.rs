//! # Component Types
//!
//! Components are plain Rust values attached to entities. Each distinct type
//! gets a compact [`ComponentTypeId`] from a [`TypeRegistry`] the first time
//! it is attached; that ID selects both the signature bit and the pool.
//!
//! ## Registry lifetime
//!
//! [`TypeRegistry::global`] is created on first use and lives until the
//! process exits. Worlds built with
//! [`World::with_config_and_types`](crate::World::with_config_and_types)
//! use the registry they are given instead, so IDs are only shared between
//! worlds that share a registry.

use std::alloc::Layout;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::error::{EcsError, EcsResult};

/// Maximum number of distinct component types per registry.
///
/// Bounded by the width of [`Signature`](super::Signature).
pub const MAX_COMPONENT_TYPES: usize = 64;

/// Marker trait for ECS components.
///
/// Any `'static` type can be a component. Components may own heap data; the
/// world runs their destructors when they are removed, replaced, or when the
/// owning entity or world goes away.
///
/// # Example
///
/// ```rust
/// use tessera_core::Component;
///
/// struct Name(String);
///
/// fn assert_component<C: Component>() {}
/// assert_component::<Name>();
/// ```
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Compact identifier for a component type (0-63).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ComponentTypeId(u8);

impl ComponentTypeId {
    /// Creates an ID from its index, or `None` if it does not fit a signature.
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Option<Self> {
        if index < MAX_COMPONENT_TYPES {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Returns the index used for the signature bit and pool lookup.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the signature bit for this type.
    #[inline]
    #[must_use]
    pub(crate) const fn bit(self) -> u64 {
        1 << self.0
    }
}

/// Metadata recorded for every registered component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentInfo {
    /// The registry-assigned identifier.
    pub id: ComponentTypeId,
    /// The Rust type name, for diagnostics.
    pub name: &'static str,
    /// Size and alignment of one instance.
    pub layout: Layout,
}

#[derive(Default)]
struct Registered {
    by_type: HashMap<TypeId, ComponentTypeId>,
    infos: Vec<ComponentInfo>,
}

/// Append-only mapping from Rust types to [`ComponentTypeId`]s.
///
/// IDs are assigned sequentially from 0 and never reassigned. Once
/// [`MAX_COMPONENT_TYPES`] types are registered every further new type is
/// refused, while existing types keep resolving.
///
/// The registry is internally locked so it can be shared between worlds
/// living on different threads.
#[derive(Default)]
pub struct TypeRegistry {
    inner: RwLock<Registered>,
}

static GLOBAL_REGISTRY: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry used by [`World::new`](crate::World::new).
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(Self::new())))
    }

    /// Returns the ID for `T`, registering it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::TypeCapacityExhausted`] if `T` is new and the
    /// registry already holds [`MAX_COMPONENT_TYPES`] types.
    pub fn id_for<T: Component>(&self) -> EcsResult<ComponentTypeId> {
        if let Some(id) = self.lookup::<T>() {
            return Ok(id);
        }

        let mut inner = self.inner.write();
        // Another thread may have registered T between the two locks
        if let Some(&id) = inner.by_type.get(&TypeId::of::<T>()) {
            return Ok(id);
        }

        let Some(id) = ComponentTypeId::new(inner.infos.len()) else {
            tracing::error!(
                "Component type limit ({}) reached, refusing to register {}",
                MAX_COMPONENT_TYPES,
                type_name::<T>()
            );
            return Err(EcsError::TypeCapacityExhausted {
                type_name: type_name::<T>(),
                max: MAX_COMPONENT_TYPES,
            });
        };

        inner.by_type.insert(TypeId::of::<T>(), id);
        inner.infos.push(ComponentInfo {
            id,
            name: type_name::<T>(),
            layout: Layout::new::<T>(),
        });
        tracing::debug!("Registered component {} as id {}", type_name::<T>(), id.index());

        Ok(id)
    }

    /// Returns the ID for `T` without registering it.
    #[must_use]
    pub fn lookup<T: Component>(&self) -> Option<ComponentTypeId> {
        self.inner.read().by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the metadata recorded for `id`.
    #[must_use]
    pub fn info(&self, id: ComponentTypeId) -> Option<ComponentInfo> {
        self.inner.read().infos.get(id.index()).copied()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().infos.len()
    }

    /// Returns `true` if no type has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_list()
            .entries(inner.infos.iter().map(|info| info.name))
            .finish()
    }
}
