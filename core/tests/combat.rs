use warfield_core::{
    clock::ManualClock,
    combat_subsystem::{find_combat_groups, resolve_group},
    engine::SimEngine,
    event::SimEvent,
    faction::Faction,
    geometry::Position,
    rng::{RngBank, SubsystemRng, SubsystemSlot},
    unit::UnitKind,
    world::World,
};

fn combat_rng(seed: u64) -> SubsystemRng {
    RngBank::new(seed).for_subsystem_at_tick(SubsystemSlot::Combat, 1)
}

#[test]
fn assassin_duel_always_leaves_exactly_one_survivor() {
    for seed in 0..64 {
        let mut world = World::new(10, 10).expect("world");
        let a = world.add_unit(Faction::South, UnitKind::Assassin, Position::new(4, 4)).expect("unit");
        let l = world.add_unit(Faction::North, UnitKind::Lumberjack, Position::new(5, 5)).expect("unit");

        let groups = find_combat_groups(&world);
        assert_eq!(groups, vec![vec![a, l]]);

        let events = resolve_group(&mut world, &groups[0], 1, &mut combat_rng(seed)).expect("resolve");
        assert_eq!(world.living_total(), 1, "seed {seed}");

        let eliminated = events.iter().filter(|e| matches!(e, SimEvent::UnitEliminated { .. })).count();
        assert_eq!(eliminated, 1);
        match events.last() {
            Some(SimEvent::CombatResolved { survivors, winner, .. }) => {
                assert_eq!(survivors.len(), 1);
                let survivor = world.unit(survivors[0]).expect("survivor");
                assert_eq!(*winner, Some(survivor.faction));
            }
            other => panic!("expected CombatResolved, got {other:?}"),
        }
    }
}

#[test]
fn both_outcomes_occur_across_seeds() {
    let mut assassin_wins = 0;
    let mut lumberjack_wins = 0;
    for seed in 0..200 {
        let mut world = World::new(10, 10).expect("world");
        let a = world.add_unit(Faction::South, UnitKind::Assassin, Position::new(4, 4)).expect("unit");
        let l = world.add_unit(Faction::North, UnitKind::Lumberjack, Position::new(4, 5)).expect("unit");
        resolve_group(&mut world, &[a, l], 1, &mut combat_rng(seed)).expect("resolve");
        if world.unit(a).is_some_and(|u| u.is_alive()) {
            assassin_wins += 1;
        } else {
            lumberjack_wins += 1;
        }
    }
    assert!(assassin_wins > 0 && lumberjack_wins > 0);
}

#[test]
fn no_combat_without_an_assassin_or_across_allies() {
    let mut world = World::new(10, 10).expect("world");
    world.add_unit(Faction::North, UnitKind::Lumberjack, Position::new(3, 3)).expect("unit");
    world.add_unit(Faction::South, UnitKind::Miner, Position::new(3, 4)).expect("unit");
    world.add_unit(Faction::North, UnitKind::Assassin, Position::new(7, 7)).expect("unit");
    world.add_unit(Faction::North, UnitKind::Sower, Position::new(7, 8)).expect("unit");
    assert!(find_combat_groups(&world).is_empty());

    // Two cells apart is not adjacent.
    world.add_unit(Faction::South, UnitKind::Assassin, Position::new(5, 3)).expect("unit");
    assert!(find_combat_groups(&world).is_empty());
}

#[test]
fn dead_units_do_not_fight() {
    let mut world = World::new(10, 10).expect("world");
    let a = world.add_unit(Faction::South, UnitKind::Assassin, Position::new(4, 4)).expect("unit");
    world.add_unit(Faction::North, UnitKind::Miner, Position::new(4, 5)).expect("unit");
    world.kill_unit(a).expect("kill");
    assert!(find_combat_groups(&world).is_empty());
}

#[test]
fn star_group_resolves_to_a_single_faction() {
    for seed in 0..32 {
        let mut world = World::new(10, 10).expect("world");
        let a = world.add_unit(Faction::South, UnitKind::Assassin, Position::new(5, 5)).expect("unit");
        for pos in [(4, 5), (6, 5), (5, 6)] {
            world.add_unit(Faction::North, UnitKind::Lumberjack, Position::new(pos.0, pos.1)).expect("unit");
        }
        let groups = find_combat_groups(&world);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 4);
        assert_eq!(groups[0][0], a);

        resolve_group(&mut world, &groups[0], 1, &mut combat_rng(seed)).expect("resolve");
        let living = world.living_units();
        assert!(!living.is_empty());
        assert!(living.iter().all(|u| u.faction == living[0].faction), "seed {seed}");
        if living[0].faction == Faction::South {
            assert_eq!(living.len(), 1);
        }
    }
}

#[test]
fn groups_are_single_hop_around_each_seed() {
    let mut world = World::new(12, 12).expect("world");
    let a = world.add_unit(Faction::South, UnitKind::Assassin, Position::new(5, 5)).expect("unit");
    let l = world.add_unit(Faction::North, UnitKind::Lumberjack, Position::new(6, 5)).expect("unit");
    let b = world.add_unit(Faction::South, UnitKind::Assassin, Position::new(7, 5)).expect("unit");

    // b is not adjacent to a, so it seeds its own group that repeats l.
    assert_eq!(find_combat_groups(&world), vec![vec![a, l], vec![b, l]]);
}

#[test]
fn engine_purges_eliminated_units_at_end_of_tick() {
    let clock = ManualClock::at_epoch();
    let mut engine = SimEngine::build_test("combat-purge".into(), 5, clock).expect("engine");
    let a = engine.world.add_unit(Faction::South, UnitKind::Assassin, Position::new(6, 6)).expect("unit");
    let m = engine.world.add_unit(Faction::North, UnitKind::Miner, Position::new(6, 7)).expect("unit");

    engine.clock.resume();
    let events = engine.tick().expect("tick");

    let eliminated: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::UnitEliminated { unit_id, .. } => Some(*unit_id),
            _ => None,
        })
        .collect();
    assert_eq!(eliminated.len(), 1);
    assert!(eliminated[0] == a || eliminated[0] == m);
    assert!(engine.world.unit(eliminated[0]).is_none());
    assert!(engine.world.units().iter().all(|u| u.alive));
    assert!(events.iter().any(|e| matches!(e, SimEvent::UnitsPurged { unit_ids, .. } if unit_ids == &eliminated)));
}
