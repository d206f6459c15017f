//! # Entity Component System
//!
//! Slot-indexed entity-component storage.
//!
//! ## Design Philosophy
//!
//! - Entity IDs are slot indices with generation counters
//! - Each component type gets one pool, indexed directly by slot
//! - A per-entity bitmask records which pools hold a value for it
//! - No dynamic dispatch in hot paths

mod component;
mod entity;
mod pool;
mod signature;
mod view;
mod world;

pub use component::{Component, ComponentInfo, ComponentTypeId, TypeRegistry, MAX_COMPONENT_TYPES};
pub use entity::{EntityId, EntityRecord, INVALID_INDEX};
pub use pool::{ComponentPool, DropFn};
pub use signature::Signature;
pub use view::{ComponentSet, View};
pub use world::World;
