//! Integration tests for entity lifecycle, component access and views.

use std::collections::HashSet;
use std::sync::Arc;

use tessera_core::{EcsError, EntityId, TypeRegistry, World, WorldConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rotation {
    angle: f32,
}

fn world_with(capacity: usize) -> World {
    World::with_config_and_types(
        &WorldConfig::with_max_entities(capacity),
        Arc::new(TypeRegistry::new()),
    )
    .unwrap()
}

fn pos(x: f32) -> Position {
    Position { x, y: 0.0, z: 0.0 }
}

/// Deterministic xorshift so churn tests are reproducible.
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

#[test]
fn test_live_handles_are_unique_under_churn() {
    let mut world = world_with(64);
    let mut live: Vec<EntityId> = Vec::new();
    let mut rng = Rng(0x9E37_79B9_7F4A_7C15);

    for _ in 0..5_000 {
        let destroy = !live.is_empty() && (rng.next_u64() % 3 == 0 || live.len() == 64);
        if destroy {
            let victim = live.swap_remove((rng.next_u64() % live.len() as u64) as usize);
            assert!(world.destroy_entity(victim));
            assert!(!world.is_alive(victim));
        } else {
            live.push(world.create_entity().unwrap());
        }

        let pairs: HashSet<(u32, u32)> = live.iter().map(|id| (id.index(), id.generation())).collect();
        assert_eq!(pairs.len(), live.len());
        let slots: HashSet<u32> = live.iter().map(|id| id.index()).collect();
        assert_eq!(slots.len(), live.len(), "two live handles share a slot");
        assert_eq!(world.alive_count(), live.len());
    }

    let mut seen: Vec<EntityId> = world.iter_alive().collect();
    seen.sort();
    live.sort();
    assert_eq!(seen, live);
}

#[test]
fn test_reuse_bumps_generation_and_invalidates_old_handle() {
    let mut world = world_with(8);
    let old = world.create_entity().unwrap();
    world.add_component(old, pos(1.0)).unwrap();
    assert!(world.destroy_entity(old));

    let new = world.create_entity().unwrap();
    assert_eq!(new.index(), old.index());
    assert!(new.generation() > old.generation());

    assert!(!world.is_alive(old));
    assert!(!world.destroy_entity(old));
    assert!(!world.has_component::<Position>(old));
    assert!(!world.remove_component::<Position>(old));
    assert_eq!(world.get_component::<Position>(old), None);
    assert_eq!(world.get_component_mut::<Position>(old), None);
    assert_eq!(world.take_component::<Position>(old), None);
    assert_eq!(
        world.add_component(old, pos(2.0)).map(|p| *p),
        Err(EcsError::StaleEntity(old))
    );
    assert!(world.is_alive(new));
}

#[test]
fn test_add_then_get_returns_constructed_value() {
    let mut world = world_with(8);
    let id = world.create_entity().unwrap();
    let value = Position { x: 1.5, y: -2.0, z: 3.25 };

    world.add_component(id, value).unwrap();
    assert!(world.has_component::<Position>(id));
    assert_eq!(world.get_component::<Position>(id), Some(&value));

    assert!(world.remove_component::<Position>(id));
    assert!(!world.has_component::<Position>(id));
}

#[test]
fn test_position_rotation_scenario() {
    let mut world = world_with(16);
    let e1 = world.create_entity().unwrap();
    let e2 = world.create_entity().unwrap();
    let e3 = world.create_entity().unwrap();

    world.add_component(e1, pos(1.0)).unwrap();
    world.add_component(e2, pos(2.0)).unwrap();
    world.add_component(e2, Rotation { angle: 0.5 }).unwrap();
    world.add_component(e3, Rotation { angle: 1.0 }).unwrap();

    let both: Vec<_> = world.view::<(Position, Rotation)>().collect();
    assert_eq!(both, vec![e2]);

    let positioned: Vec<_> = world.view::<(Position,)>().collect();
    assert_eq!(positioned, vec![e1, e2]);

    // Order of the requested types does not matter
    let reversed: Vec<_> = world.view::<(Rotation, Position)>().collect();
    assert_eq!(reversed, both);

    // Destroy e2 and reuse its slot
    assert!(world.destroy_entity(e2));
    let e4 = world.create_entity().unwrap();
    assert_eq!(e4.index(), e2.index());
    assert_eq!(e4.generation(), e2.generation() + 1);

    assert_eq!(world.get_component::<Rotation>(e2), None);
    assert_eq!(
        world.try_component::<Rotation>(e2),
        Err(EcsError::StaleEntity(e2))
    );
    assert_eq!(world.view::<(Position, Rotation)>().count(), 0);
    assert_eq!(world.view::<(Position,)>().collect::<Vec<_>>(), vec![e1]);
}

#[test]
fn test_view_matches_brute_force_superset() {
    let mut world = world_with(256);
    let mut rng = Rng(42);
    let mut ids = Vec::new();

    for _ in 0..200 {
        let id = world.create_entity().unwrap();
        let roll = rng.next_u64();
        if roll & 1 != 0 {
            world.add_component(id, pos(0.0)).unwrap();
        }
        if roll & 2 != 0 {
            world.add_component(id, Rotation { angle: 0.0 }).unwrap();
        }
        if roll & 4 != 0 {
            world.add_component(id, 7_u8).unwrap();
        }
        ids.push(id);
    }
    for id in ids.iter().step_by(5) {
        assert!(world.destroy_entity(*id));
    }

    let expected: Vec<EntityId> = ids
        .iter()
        .copied()
        .filter(|&id| world.has_component::<Position>(id) && world.has_component::<Rotation>(id))
        .collect();
    let viewed: Vec<EntityId> = world.view::<(Position, Rotation)>().collect();
    assert_eq!(viewed, expected);

    // Views are restartable
    assert_eq!(world.view::<(Position, Rotation)>().collect::<Vec<_>>(), viewed);

    let signature = world.signature(expected[0]).unwrap();
    assert!(world
        .view_signature(signature)
        .all(|id| world.signature(id).unwrap().contains_all(signature)));
}

#[test]
fn test_capacity_boundary_leaves_entities_untouched() {
    let mut world = world_with(3);
    let ids: Vec<_> = (0..3).map(|i| {
        let id = world.create_entity().unwrap();
        world.add_component(id, pos(i as f32)).unwrap();
        id
    }).collect();

    assert_eq!(
        world.create_entity(),
        Err(EcsError::CapacityExhausted { capacity: 3 })
    );

    for (i, id) in ids.iter().enumerate() {
        assert!(world.is_alive(*id));
        assert_eq!(world.get_component::<Position>(*id), Some(&pos(i as f32)));
    }
    assert_eq!(world.alive_count(), 3);
}

#[test]
fn test_worlds_sharing_a_registry_agree_on_ids() {
    let types = Arc::new(TypeRegistry::new());
    let config = WorldConfig::with_max_entities(4);
    let mut left = World::with_config_and_types(&config, Arc::clone(&types)).unwrap();
    let mut right = World::with_config_and_types(&config, Arc::clone(&types)).unwrap();

    let a = left.create_entity().unwrap();
    left.add_component(a, Rotation { angle: 0.0 }).unwrap();
    let b = right.create_entity().unwrap();
    right.add_component(b, pos(0.0)).unwrap();
    right.add_component(b, Rotation { angle: 1.0 }).unwrap();

    assert_eq!(types.len(), 2);
    let rotation = types.lookup::<Rotation>().unwrap();
    assert!(left.signature(a).unwrap().contains(rotation));
    assert!(right.signature(b).unwrap().contains(rotation));

    // Pools are per world: the left world never stored a Position
    assert!(!left.has_component::<Position>(a));
    assert_eq!(left.view::<(Position,)>().count(), 0);
}

#[test]
fn test_config_driven_world() {
    let config = WorldConfig::from_toml_str("max_entities = 2").unwrap();
    let mut world = World::with_config(&config).unwrap();
    world.create_entity().unwrap();
    world.create_entity().unwrap();
    assert!(world.create_entity().is_err());

    let bad = WorldConfig::with_max_entities(0);
    assert!(matches!(
        World::with_config(&bad),
        Err(EcsError::InvalidConfig(_))
    ));
}
