//! # ECS World
//!
//! The central container for entities and their components: the slot table,
//! the free list, and one lazily created pool per component type in use.

// SAFETY: The world is the only place that knows which pool slots hold a
// value (the signature bits), so it is the one caller of the pool's unsafe
// accessors. Each call site states the invariant it upholds.
#![allow(unsafe_code)]

use std::any::{type_name, TypeId};
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

use super::component::{Component, ComponentTypeId, TypeRegistry};
use super::entity::{EntityId, EntityRecord};
use super::pool::ComponentPool;
use super::signature::Signature;
use super::view::{ComponentSet, View};
use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult};

/// The ECS World - owner of every entity slot and component pool.
///
/// Per slot, the lifecycle is:
///
/// ```text
/// Free -> Allocated(g) -> Free(g+1) -> Allocated(g+1) -> ...
/// ```
///
/// A handle is live only while it equals the handle stored in its slot, so
/// handles from a previous occupant are rejected by every operation.
///
/// # Capacity
///
/// The entity table grows on demand up to a fixed maximum. Each component
/// pool reserves storage for that maximum the first time its type is
/// attached, so component access is a single index computation.
///
/// # Example
///
/// ```rust
/// use tessera_core::World;
///
/// let mut world = World::new(100);
/// let entity = world.create_entity()?;
/// world.add_component(entity, 42_u32)?;
///
/// assert!(world.has_component::<u32>(entity));
/// assert!(world.destroy_entity(entity));
/// assert!(!world.has_component::<u32>(entity));
/// # Ok::<(), tessera_core::EcsError>(())
/// ```
pub struct World {
    /// All entity slots ever allocated.
    entities: Vec<EntityRecord>,
    /// Free list of entity indices for reuse (most recently freed last).
    free_indices: Vec<u32>,
    /// Pools indexed by component type ID.
    pools: Vec<Option<ComponentPool>>,
    /// Source of component type IDs.
    types: Arc<TypeRegistry>,
    /// Type IDs of every component type this world has attached.
    local_types: Vec<(TypeId, ComponentTypeId)>,
    /// Number of currently alive entities.
    alive_count: usize,
    /// Maximum number of entity slots.
    capacity: usize,
}

impl World {
    /// Creates a new world with the specified entity capacity, using the
    /// process-wide [`TypeRegistry`].
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of entities (e.g., `1_000_000`)
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= u32::MAX as usize,
            "Capacity cannot exceed u32::MAX"
        );
        Self::build(capacity, TypeRegistry::global())
    }

    /// Creates a world from a validated configuration, using the
    /// process-wide [`TypeRegistry`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the configuration is invalid.
    pub fn with_config(config: &WorldConfig) -> EcsResult<Self> {
        Self::with_config_and_types(config, TypeRegistry::global())
    }

    /// Creates a world that takes component type IDs from `types`.
    ///
    /// Worlds sharing a registry agree on every component type ID.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the configuration is invalid.
    pub fn with_config_and_types(
        config: &WorldConfig,
        types: Arc<TypeRegistry>,
    ) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::build(config.max_entities, types))
    }

    fn build(capacity: usize, types: Arc<TypeRegistry>) -> Self {
        tracing::debug!("Created world with capacity for {} entities", capacity);
        Self {
            entities: Vec::new(),
            free_indices: Vec::new(),
            pools: Vec::new(),
            types,
            local_types: Vec::new(),
            alive_count: 0,
            capacity,
        }
    }

    /// Returns the maximum capacity of this world.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Returns the number of slots in the entity table, alive or free.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no slot has ever been allocated.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the registry this world takes component type IDs from.
    #[inline]
    #[must_use]
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates a new entity, returning its ID.
    ///
    /// Reuses the most recently freed slot if there is one, carrying over the
    /// generation bumped when that slot was freed. Otherwise appends a slot
    /// at generation 0.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExhausted`] if every slot up to the
    /// configured maximum is in use. Existing entities are unaffected.
    pub fn create_entity(&mut self) -> EcsResult<EntityId> {
        if let Some(index) = self.free_indices.pop() {
            let record = &mut self.entities[index as usize];
            let id = EntityId::new(index, record.handle.generation());
            *record = EntityRecord::new(id);
            self.alive_count += 1;
            return Ok(id);
        }

        if self.entities.len() >= self.capacity {
            tracing::warn!("Entity capacity exhausted ({} slots)", self.capacity);
            return Err(EcsError::CapacityExhausted {
                capacity: self.capacity,
            });
        }

        // capacity <= u32::MAX, so every appended index fits below the sentinel
        let index = u32::try_from(self.entities.len()).map_err(|_| {
            EcsError::CapacityExhausted {
                capacity: self.capacity,
            }
        })?;
        let id = EntityId::new(index, 0);
        self.entities.push(EntityRecord::new(id));
        self.alive_count += 1;
        Ok(id)
    }

    /// Destroys an entity, dropping its components and freeing its slot.
    ///
    /// # Returns
    ///
    /// `true` if the entity was destroyed, `false` if the ID was null or
    /// stale. A stale ID never affects the slot's current occupant.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        let Some(index) = self.current_index(id) else {
            return false;
        };

        let record = &mut self.entities[index];
        let signature = record.signature;
        record.handle = id.tombstone();
        record.signature.clear();
        self.free_indices.push(id.index());
        self.alive_count -= 1;

        // The slot is already free, so a panicking destructor cannot leave a
        // dropped value reachable.
        for type_id in signature.iter() {
            self.drop_component(type_id, index);
        }
        true
    }

    /// Destroys every live entity.
    ///
    /// Slots keep their bumped generations, so handles issued before the
    /// call stay stale afterwards.
    pub fn clear(&mut self) {
        let live: Vec<EntityId> = self.iter_alive().collect();
        for id in live {
            self.destroy_entity(id);
        }
    }

    /// Checks if an entity is alive.
    ///
    /// # Arguments
    ///
    /// * `id` - The entity ID to check
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.current_index(id).is_some()
    }

    /// Returns the component signature of a live entity.
    #[inline]
    #[must_use]
    pub fn signature(&self, id: EntityId) -> Option<Signature> {
        self.current_index(id).map(|index| self.entities[index].signature)
    }

    /// Iterates over all alive entities in slot order.
    pub fn iter_alive(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities
            .iter()
            .filter(|record| record.is_alive())
            .map(|record| record.handle)
    }

    // =========================================================================
    // Component lifecycle
    // =========================================================================

    /// Attaches `component` to an entity, returning a reference to the
    /// stored value.
    ///
    /// Registers `T` on first use and allocates this world's pool for it on
    /// first attach. If the entity already has a `T`, the old value is
    /// dropped and replaced.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if `id` is null or stale.
    /// - [`EcsError::TypeCapacityExhausted`] if `T` is new and the type
    ///   registry is full.
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> EcsResult<&mut T> {
        let index = self.current_index(id).ok_or_else(|| self.stale(id))?;
        let type_id = self.resolve_type::<T>()?;

        let signature = &mut self.entities[index].signature;
        if signature.contains(type_id) {
            signature.remove(type_id);
            self.drop_component(type_id, index);
        }

        self.entities[index].signature.insert(type_id);
        let pool = self.pool_or_insert::<T>(type_id);
        // SAFETY: `index` is a live slot below the pool capacity, the pool was
        // created for `T`, and any previous value was dropped above.
        Ok(unsafe { pool.write(index, component) })
    }

    /// Detaches and drops a component.
    ///
    /// # Returns
    ///
    /// `true` if the component was removed, `false` if the ID was stale or
    /// the entity had no `T`.
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> bool {
        let Some((index, type_id)) = self.present::<T>(id) else {
            return false;
        };
        self.entities[index].signature.remove(type_id);
        self.drop_component(type_id, index);
        true
    }

    /// Detaches a component and returns it.
    ///
    /// # Returns
    ///
    /// The component, or None if the ID was stale or the entity had no `T`.
    pub fn take_component<T: Component>(&mut self, id: EntityId) -> Option<T> {
        let (index, type_id) = self.present::<T>(id)?;
        self.entities[index].signature.remove(type_id);
        let pool = self.pools[type_id.index()].as_mut()?;
        // SAFETY: The signature bit was set, so the slot holds a `T`; the bit
        // is now cleared so the value is never read or dropped again.
        Some(unsafe { pool.read::<T>(index) })
    }

    /// Checks whether a live entity has a component.
    ///
    /// Stale IDs and never-registered types report `false`.
    #[inline]
    #[must_use]
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.present::<T>(id).is_some()
    }

    /// Gets a component of a live entity.
    ///
    /// # Returns
    ///
    /// Reference to the component, or None if the ID was stale or the entity
    /// has no `T`.
    #[inline]
    #[must_use]
    pub fn get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        let (index, type_id) = self.present::<T>(id)?;
        let pool = self.pools.get(type_id.index())?.as_ref()?;
        // SAFETY: The signature bit is set, so the slot holds a `T`.
        Some(unsafe { pool.get::<T>(index) })
    }

    /// Gets a mutable component of a live entity.
    ///
    /// # Returns
    ///
    /// Mutable reference to the component, or None if the ID was stale or
    /// the entity has no `T`.
    #[inline]
    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        let (index, type_id) = self.present::<T>(id)?;
        let pool = self.pools.get_mut(type_id.index())?.as_mut()?;
        // SAFETY: The signature bit is set, so the slot holds a `T`.
        Some(unsafe { pool.get_mut::<T>(index) })
    }

    /// Gets a component, telling a stale handle apart from a missing
    /// component.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if `id` is null or stale.
    /// - [`EcsError::MissingComponent`] if the entity has no `T`.
    pub fn try_component<T: Component>(&self, id: EntityId) -> EcsResult<&T> {
        if !self.is_alive(id) {
            return Err(self.stale(id));
        }
        self.get_component::<T>(id)
            .ok_or(EcsError::MissingComponent {
                entity: id,
                type_name: type_name::<T>(),
            })
    }

    /// Returns the raw slot address of a component a live entity owns.
    ///
    /// The pointer is valid until the component is detached, its entity is
    /// destroyed, or the world is dropped.
    #[must_use]
    pub fn component_ptr(&self, id: EntityId, type_id: ComponentTypeId) -> Option<NonNull<u8>> {
        let index = self.current_index(id)?;
        if !self.entities[index].signature.contains(type_id) {
            return None;
        }
        self.pools.get(type_id.index())?.as_ref()?.slot_ptr(index)
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Iterates over live entities that have every component in `S`.
    ///
    /// `S` is a tuple of component types, e.g. `(Position, Rotation)`.
    /// Handles come out in ascending slot order.
    ///
    /// ```rust
    /// # use tessera_core::World;
    /// struct Position;
    /// struct Rotation;
    ///
    /// let mut world = World::new(8);
    /// let a = world.create_entity()?;
    /// let b = world.create_entity()?;
    /// world.add_component(a, Position)?;
    /// world.add_component(b, Position)?;
    /// world.add_component(b, Rotation)?;
    ///
    /// assert_eq!(world.view::<(Position,)>().collect::<Vec<_>>(), vec![a, b]);
    /// assert_eq!(world.view::<(Position, Rotation)>().collect::<Vec<_>>(), vec![b]);
    /// # Ok::<(), tessera_core::EcsError>(())
    /// ```
    #[must_use]
    pub fn view<S: ComponentSet>(&self) -> View<'_> {
        View::new(&self.entities, S::signature(&self.types))
    }

    /// Iterates over live entities whose signature contains `required`.
    #[must_use]
    pub fn view_signature(&self, required: Signature) -> View<'_> {
        View::new(&self.entities, Some(required))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Slot index of `id` if it is the current handle of its slot.
    #[inline]
    fn current_index(&self, id: EntityId) -> Option<usize> {
        let index = id.index() as usize;
        match self.entities.get(index) {
            Some(record) if record.is_current(id) => Some(index),
            _ => None,
        }
    }

    /// Slot index and type ID if `id` is live and owns a `T`.
    #[inline]
    fn present<T: Component>(&self, id: EntityId) -> Option<(usize, ComponentTypeId)> {
        let index = self.current_index(id)?;
        let type_id = self.local_type::<T>()?;
        self.entities[index]
            .signature
            .contains(type_id)
            .then_some((index, type_id))
    }

    /// Type ID of `T` if this world has ever attached one.
    ///
    /// No entity can own a type missing from this list, so the shared
    /// registry is only consulted on attach.
    #[inline]
    fn local_type<T: Component>(&self) -> Option<ComponentTypeId> {
        let key = TypeId::of::<T>();
        self.local_types
            .iter()
            .find(|(type_key, _)| *type_key == key)
            .map(|&(_, type_id)| type_id)
    }

    fn resolve_type<T: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        if let Some(type_id) = self.local_type::<T>() {
            return Ok(type_id);
        }
        let type_id = self.types.id_for::<T>()?;
        self.local_types.push((TypeId::of::<T>(), type_id));
        Ok(type_id)
    }

    fn stale(&self, id: EntityId) -> EcsError {
        tracing::trace!("Rejected stale entity handle {}", id);
        EcsError::StaleEntity(id)
    }

    fn pool_or_insert<T: Component>(&mut self, type_id: ComponentTypeId) -> &mut ComponentPool {
        let slot = type_id.index();
        if self.pools.len() <= slot {
            self.pools.resize_with(slot + 1, || None);
        }
        let capacity = self.capacity;
        self.pools[slot].get_or_insert_with(|| ComponentPool::for_type::<T>(capacity))
    }

    /// Drops the value stored for `type_id` at `index`.
    ///
    /// The caller clears the signature bit first, so a panicking destructor
    /// leaves no reachable or droppable value behind.
    fn drop_component(&mut self, type_id: ComponentTypeId, index: usize) {
        if let Some(pool) = self.pools.get_mut(type_id.index()).and_then(Option::as_mut) {
            // SAFETY: Callers only pass type IDs whose bit is set for the live
            // slot `index`, so the slot holds an initialized value of the
            // pool's type.
            unsafe { pool.drop_slot(index) };
        }
    }
}

impl Drop for World {
    fn drop(&mut self) {
        for index in 0..self.entities.len() {
            let record = &mut self.entities[index];
            if !record.is_alive() {
                continue;
            }
            let signature = record.signature;
            record.signature.clear();
            for type_id in signature.iter() {
                self.drop_component(type_id, index);
            }
        }
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("capacity", &self.capacity)
            .field("alive_count", &self.alive_count)
            .field("slots", &self.entities.len())
            .field("free", &self.free_indices.len())
            .field("pools", &self.pools.iter().flatten().count())
            .finish_non_exhaustive()
    }
}
