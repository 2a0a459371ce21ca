use warfield_core::{
    city_subsystem::ProductionWeights,
    clock::ManualClock,
    config::{CityConfig, SimConfig},
    engine::SimEngine,
    event::{SimEvent, SpawnSource},
    faction::Faction,
    geometry::Position,
    resource::ResourceKind,
    rng::{RngBank, SubsystemSlot},
    unit::UnitKind,
    world::World,
};

fn engine() -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    SimEngine::build_test("production-test".into(), 31, ManualClock::at_epoch()).expect("engine")
}

#[test]
fn rolls_map_to_kinds_in_draw_order() {
    let weights = ProductionWeights { lumberjack: 2, miner: 1, assassin: 3, sower: 1 };
    assert_eq!(weights.total(), 7);
    let kinds: Vec<UnitKind> = (0..7).map(|roll| weights.select(roll)).collect();
    assert_eq!(
        kinds,
        vec![
            UnitKind::Lumberjack,
            UnitKind::Lumberjack,
            UnitKind::Miner,
            UnitKind::Assassin,
            UnitKind::Assassin,
            UnitKind::Assassin,
            UnitKind::Sower,
        ]
    );
}

#[test]
fn weights_follow_the_world() {
    let config = CityConfig::default();
    let mut world = World::new(20, 20).expect("world");

    let empty = ProductionWeights::compute(&world, Faction::North, &config);
    assert_eq!(empty, ProductionWeights { lumberjack: 1, miner: 1, assassin: 1, sower: 1 });

    for x in 5..8 {
        world.add_resource(ResourceKind::Wood, Position::new(x, 10), 50, 100).expect("tree");
    }
    world.add_resource(ResourceKind::Ore, Position::new(12, 12), 100, 100).expect("rock");
    world.add_unit(Faction::South, UnitKind::Assassin, Position::new(15, 3)).expect("unit");
    world.add_unit(Faction::South, UnitKind::Assassin, Position::new(16, 3)).expect("unit");

    let north = ProductionWeights::compute(&world, Faction::North, &config);
    assert_eq!(north, ProductionWeights { lumberjack: 6, miner: 2, assassin: 6, sower: 1 });

    // Only enemy assassins count.
    let south = ProductionWeights::compute(&world, Faction::South, &config);
    assert_eq!(south.assassin, 1);
}

#[test]
fn draws_favour_heavier_weights() {
    let weights = ProductionWeights { lumberjack: 6, miner: 1, assassin: 1, sower: 1 };
    let mut rng = RngBank::new(77).for_subsystem_at_tick(SubsystemSlot::City, 2);
    let draws: Vec<UnitKind> = (0..900).map(|_| weights.draw(&mut rng)).collect();
    let lumberjacks = draws.iter().filter(|k| **k == UnitKind::Lumberjack).count();
    assert!(lumberjacks > 450, "only {lumberjacks} lumberjacks in 900 draws");
    assert!(draws.contains(&UnitKind::Sower));
}

#[test]
fn each_city_produces_once_per_interval() {
    let mut engine = engine();
    engine.run_ticks(1).expect("tick");
    assert!(engine.world.units().is_empty());
    assert_eq!(engine.world.city(Faction::North).production_timer(), 1);

    engine.clock.resume();
    let events = engine.tick().expect("tick");
    assert_eq!(engine.world.units().len(), 2);
    assert_eq!(engine.world.city(Faction::North).production_timer(), 0);

    let spawned: Vec<(Faction, Position)> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::UnitSpawned { faction, position, source: SpawnSource::City, .. } => Some((*faction, *position)),
            _ => None,
        })
        .collect();
    assert_eq!(
        spawned,
        vec![(Faction::North, Position::new(0, 1)), (Faction::South, Position::new(18, 18))]
    );
}

#[test]
fn blocked_city_loses_its_cycle() {
    let mut engine = engine();
    for x in 0..=3 {
        for y in 0..=3 {
            let pos = Position::new(x, y);
            if engine.world.is_free(pos) {
                engine.world.add_resource(ResourceKind::Wood, pos, 50, 100).expect("tree");
            }
        }
    }

    engine.run_ticks(2).expect("ticks");
    assert_eq!(engine.world.living_count(Faction::North, UnitKind::Lumberjack), 0);
    assert_eq!(engine.world.units().iter().filter(|u| u.faction == Faction::North).count(), 0);
    assert_eq!(engine.world.units().iter().filter(|u| u.faction == Faction::South).count(), 1);
    assert_eq!(engine.world.city(Faction::North).production_timer(), 0);
    assert!(engine
        .events_for_tick(2)
        .iter()
        .any(|e| e.event_type == "production_skipped"));
}

#[test]
fn custom_interval_from_config() {
    let mut config = SimConfig::default_test();
    config.city.production_interval = 5;
    let mut engine =
        SimEngine::build("interval-test".into(), 3, config, Box::new(ManualClock::at_epoch())).expect("engine");
    engine.run_ticks(4).expect("ticks");
    assert!(engine.world.units().is_empty());
    engine.run_ticks(1).expect("tick");
    assert_eq!(engine.world.units().len(), 2);
}
