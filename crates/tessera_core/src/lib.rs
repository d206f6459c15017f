//! # TESSERA Core
//!
//! Entity-component storage: lightweight generational handles, per-type
//! component pools indexed directly by entity slot, and signature views for
//! iterating every entity that owns a given set of components.
//!
//! ## Architecture Rules
//!
//! 1. **O(1) everywhere it matters** - create, destroy, attach, detach, get
//! 2. **Stale handles are detected** - every slot carries a generation counter
//! 3. **Single-threaded storage** - a [`World`] is owned by one thread; only
//!    the [`TypeRegistry`] is shared
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::World;
//!
//! #[derive(Debug, PartialEq)]
//! struct Position(f32, f32);
//! struct Rotation(f32);
//!
//! let mut world = World::new(1_024);
//! let a = world.create_entity()?;
//! let b = world.create_entity()?;
//! world.add_component(a, Position(1.0, 2.0))?;
//! world.add_component(b, Position(0.0, 0.0))?;
//! world.add_component(b, Rotation(0.5))?;
//!
//! let moving: Vec<_> = world.view::<(Position, Rotation)>().collect();
//! assert_eq!(moving, vec![b]);
//! assert_eq!(world.get_component::<Position>(a), Some(&Position(1.0, 2.0)));
//! # Ok::<(), tessera_core::EcsError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::WorldConfig;
pub use ecs::{
    Component, ComponentInfo, ComponentPool, ComponentSet, ComponentTypeId, EntityId,
    EntityRecord, Signature, TypeRegistry, View, World, INVALID_INDEX, MAX_COMPONENT_TYPES,
};
pub use error::{EcsError, EcsResult};
