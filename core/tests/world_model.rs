use warfield_core::{
    error::SimError,
    faction::Faction,
    geometry::Position,
    resource::ResourceKind,
    rng::{RngBank, SubsystemRng, SubsystemSlot},
    unit::UnitKind,
    world::{ElementRef, World},
};

fn rng(seed: u64) -> SubsystemRng {
    RngBank::new(seed).for_subsystem_at_tick(SubsystemSlot::Setup, 0)
}

#[test]
fn new_world_places_cities_at_opposite_corners() {
    let world = World::new(10, 8).expect("world");
    assert_eq!(world.city_position(Faction::North), Position::new(0, 0));
    assert_eq!(world.city_position(Faction::South), Position::new(9, 7));
    assert_eq!(world.cities().len(), 2);
    assert_eq!(world.element_at(Position::new(0, 0)), Some(ElementRef::City(Faction::North)));
    assert!(!world.is_free(Position::new(9, 7)));
    assert!(world.is_free(Position::new(4, 4)));
}

#[test]
fn degenerate_dimensions_are_rejected() {
    assert!(matches!(World::new(1, 1), Err(SimError::InvalidDimensions { .. })));
    assert!(matches!(World::new(0, 5), Err(SimError::InvalidDimensions { .. })));
    assert!(matches!(World::new(5, -1), Err(SimError::InvalidDimensions { .. })));
    assert!(World::new(1, 2).is_ok());
}

#[test]
fn random_free_position_on_full_grid_is_none() {
    let mut world = World::new(3, 3).expect("world");
    for x in 0..3 {
        for y in 0..3 {
            let pos = Position::new(x, y);
            if world.is_free(pos) {
                world.add_unit(Faction::North, UnitKind::Sower, pos).expect("unit");
            }
        }
    }
    assert_eq!(world.units().len(), 7);
    assert!(world.free_positions().is_empty());
    assert_eq!(world.find_random_free_position(&mut rng(1)), None);
}

#[test]
fn random_free_position_is_always_free() {
    let mut world = World::new(6, 6).expect("world");
    world.add_resource(ResourceKind::Ore, Position::new(2, 2), 100, 100).expect("rock");
    let mut rng = rng(3);
    for _ in 0..200 {
        let pos = world.find_random_free_position(&mut rng).expect("free cell");
        assert!(world.is_free(pos));
    }
}

#[test]
fn element_at_prefers_units_over_collectables() {
    let mut world = World::new(6, 6).expect("world");
    let cell = Position::new(2, 2);
    let stone = world.add_philosopher_stone(cell).expect("stone");
    assert_eq!(world.element_at(cell), Some(ElementRef::Collectable(stone)));

    let unit = world.add_unit(Faction::South, UnitKind::Miner, cell).expect("unit");
    assert_eq!(world.element_at(cell), Some(ElementRef::Unit(unit)));

    let rock = world.add_resource(ResourceKind::Ore, Position::new(3, 3), 10, 100).expect("rock");
    assert_eq!(world.element_at(Position::new(4, 4)), Some(ElementRef::Resource(rock)));
    assert_eq!(world.element_at(Position::new(-1, 0)), None);
    assert_eq!(world.element_at(Position::new(5, 0)), None);
}

#[test]
fn placement_violations_are_descriptive_errors() {
    let mut world = World::new(6, 6).expect("world");
    world.add_unit(Faction::North, UnitKind::Lumberjack, Position::new(3, 3)).expect("unit");

    let blocked = world.add_resource(ResourceKind::Ore, Position::new(2, 2), 100, 100);
    match blocked {
        Err(SimError::PlacementBlocked { what, position, blocked_at }) => {
            assert_eq!(what, "rock");
            assert_eq!(position, Position::new(2, 2));
            assert_eq!(blocked_at, Position::new(3, 3));
        }
        other => panic!("expected PlacementBlocked, got {other:?}"),
    }

    assert!(matches!(
        world.add_resource(ResourceKind::Ore, Position::new(5, 1), 100, 100),
        Err(SimError::OutOfBounds { .. })
    ));
    assert!(matches!(
        world.add_resource(ResourceKind::Wood, Position::new(1, 1), 101, 100),
        Err(SimError::QuantityOutOfRange { quantity: 101, max: 100 })
    ));
    assert!(matches!(
        world.add_unit(Faction::South, UnitKind::Miner, Position::new(0, 0)),
        Err(SimError::PlacementBlocked { .. })
    ));
    // Nothing was registered by the failed calls.
    assert!(world.resources().is_empty());
    assert_eq!(world.units().len(), 1);
}

#[test]
fn rocks_block_all_four_cells() {
    let mut world = World::new(8, 8).expect("world");
    assert!(world.can_place_2x2(Position::new(3, 3)));
    assert!(!world.can_place_2x2(Position::new(7, 3)));
    world.add_resource(ResourceKind::Ore, Position::new(3, 3), 100, 100).expect("rock");
    for cell in [(3, 3), (4, 3), (3, 4), (4, 4)] {
        assert!(!world.is_free(Position::new(cell.0, cell.1)));
    }
    assert!(world.is_free(Position::new(5, 5)));
    assert!(!world.can_place_2x2(Position::new(2, 2)));

    world.clear_resources();
    assert!(world.is_free(Position::new(4, 4)));
}

#[test]
fn collection_positions_surround_the_footprint() {
    let mut world = World::new(10, 10).expect("world");
    let tree = world.add_resource(ResourceKind::Wood, Position::new(5, 5), 50, 100).expect("tree");
    let rock = world.add_resource(ResourceKind::Ore, Position::new(1, 5), 100, 100).expect("rock");

    let tree = world.resource(tree).expect("tree");
    assert_eq!(tree.collection_positions().len(), 8);
    assert!(tree.is_adjacent_to(Position::new(6, 6)));
    assert!(!tree.is_adjacent_to(Position::new(5, 5)));

    let rock = world.resource(rock).expect("rock");
    let ring = rock.collection_positions();
    assert_eq!(ring.len(), 12);
    assert!(ring.iter().all(|p| rock.is_adjacent_to(*p)));
    assert!(rock.is_adjacent_to(Position::new(3, 7)));
    assert!(!rock.is_adjacent_to(Position::new(4, 5)));
    assert!(!rock.is_adjacent_to(Position::new(2, 6)));
}

#[test]
fn dead_units_block_nothing() {
    let mut world = World::new(6, 6).expect("world");
    let cell = Position::new(2, 3);
    let id = world.add_unit(Faction::North, UnitKind::Assassin, cell).expect("unit");
    assert!(!world.is_free(cell));

    world.kill_unit(id).expect("kill");
    assert!(world.is_free(cell));
    assert!(world.units_at(cell).is_empty());
    assert!(world.living_units().is_empty());
    assert_eq!(world.element_at(cell), None);

    assert_eq!(world.purge_dead_units(), vec![id]);
    assert!(world.units().is_empty());
    assert!(matches!(world.kill_unit(id), Err(SimError::UnitNotFound { .. })));
}

#[test]
fn nearest_search_breaks_ties_by_registry_order() {
    let mut world = World::new(10, 10).expect("world");
    let first = world.add_resource(ResourceKind::Wood, Position::new(2, 4), 50, 100).expect("tree");
    let _second = world.add_resource(ResourceKind::Wood, Position::new(4, 2), 50, 100).expect("tree");
    let far = world.add_resource(ResourceKind::Wood, Position::new(8, 8), 50, 100).expect("tree");

    let from = Position::new(3, 3);
    assert_eq!(world.find_nearest_resource(from, |_| true).map(|r| r.id), Some(first));
    assert_eq!(
        world.find_nearest_resource(from, |r| r.anchor.x > 5).map(|r| r.id),
        Some(far)
    );
    assert!(world.find_nearest_resource(from, |r| r.kind == ResourceKind::Ore).is_none());

    let enemy = world.add_unit(Faction::South, UnitKind::Miner, Position::new(3, 5)).expect("unit");
    world.add_unit(Faction::South, UnitKind::Miner, Position::new(3, 1)).expect("unit");
    assert_eq!(world.find_nearest_unit(from, |u| u.faction == Faction::South).map(|u| u.id), Some(enemy));
}

#[test]
fn spawn_search_scans_rings_outward() {
    let mut world = World::new(10, 10).expect("world");
    assert_eq!(world.find_spawn_position(Position::new(0, 0), 3), Some(Position::new(0, 1)));

    for x in 0..=3 {
        for y in 0..=3 {
            let pos = Position::new(x, y);
            if world.is_free(pos) {
                world.add_resource(ResourceKind::Wood, pos, 50, 100).expect("tree");
            }
        }
    }
    assert_eq!(world.find_spawn_position(Position::new(0, 0), 3), None);
    assert_eq!(world.find_spawn_position(Position::new(0, 0), 4), Some(Position::new(0, 4)));
}

#[test]
fn revived_unit_blocks_its_cell_again() {
    let mut world = World::new(6, 6).expect("world");
    let cell = Position::new(4, 1);
    let id = world.add_unit(Faction::South, UnitKind::Sower, cell).expect("unit");
    world.kill_unit(id).expect("kill");
    assert!(world.is_free(cell));

    world.unit_mut(id).expect("unit").revive();
    assert!(!world.is_free(cell));
    assert_eq!(world.living_total(), 1);
    assert!(world.purge_dead_units().is_empty());
}

#[test]
fn collectables_share_cells_and_can_be_removed() {
    let mut world = World::new(6, 6).expect("world");
    let cell = Position::new(3, 3);
    let stone = world.add_philosopher_stone(cell).expect("stone");
    let flag = world
        .add_flag(cell, chrono::DateTime::<chrono::Utc>::UNIX_EPOCH, chrono::Duration::seconds(10))
        .expect("flag");
    assert_eq!(world.collectables_at(cell), vec![stone, flag]);
    assert!(world.is_free(cell));
    assert!(world.has_active_flag());

    let removed = world.remove_collectable(flag).expect("removed");
    assert!(removed.is_flag());
    assert!(world.remove_collectable(flag).is_none());
    assert!(!world.has_active_flag());
    assert!(matches!(
        world.add_philosopher_stone(Position::new(6, 0)),
        Err(SimError::OutOfBounds { .. })
    ));
}
