use crate::resource::ResourceKind;
use chrono::Duration;
use serde::{Deserialize, Serialize};

// ── World ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width:  i32,
    pub height: i32,
    /// Trees scattered at random free cells when the engine is built.
    pub initial_trees: u32,
    /// Attempts (not guarantees) to place a 2×2 rock at build time.
    pub initial_rocks: u32,
    /// Seed a North lumberjack and a South assassin next to their cities.
    pub starting_units: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width:          20,
            height:         20,
            initial_trees:  5,
            initial_rocks:  3,
            starting_units: true,
        }
    }
}

// ── Resources ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub wood_initial: u32,
    pub wood_max:     u32,
    pub ore_initial:  u32,
    pub ore_max:      u32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            wood_initial: 50,
            wood_max:     100,
            ore_initial:  100,
            ore_max:      100,
        }
    }
}

impl ResourceConfig {
    pub fn initial_quantity(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood_initial.min(self.wood_max),
            ResourceKind::Ore  => self.ore_initial.min(self.ore_max),
        }
    }

    pub fn max_quantity(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood_max,
            ResourceKind::Ore  => self.ore_max,
        }
    }
}

// ── Units ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    /// Wood harvested per tick by a lumberjack.
    pub lumberjack_rate: u32,
    /// Ore harvested per tick by a miner.
    pub miner_rate:      u32,
    /// Quantity a sower adds to its resource per tick.
    pub sow_rate:        u32,
    /// Random candidates examined when choosing a rock site.
    pub rock_site_attempts: u32,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            lumberjack_rate:    2,
            miner_rate:         3,
            sow_rate:           2,
            rock_site_attempts: 20,
        }
    }
}

// ── Cities ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Ticks between two production attempts.
    pub production_interval: u32,
    /// Largest perimeter ring searched for a spawn cell.
    pub spawn_radius:        i32,
    pub lumberjack_weight_per_tree:     u64,
    pub miner_weight_per_rock:          u64,
    pub assassin_weight_per_enemy_assassin: u64,
    pub sower_weight:                   u64,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            production_interval: 2,
            spawn_radius:        3,
            lumberjack_weight_per_tree:         2,
            miner_weight_per_rock:              2,
            assassin_weight_per_enemy_assassin: 3,
            sower_weight:                       1,
        }
    }
}

// ── Timed events ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Real seconds a flag stays on the map.
    pub flag_lifetime_secs: i64,
    /// Real seconds between two scheduled flags.
    pub flag_interval_secs: i64,
    /// Entries kept in the in-memory event log.
    pub event_log_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            flag_lifetime_secs: 10,
            flag_interval_secs: 120,
            event_log_capacity: 10_000,
        }
    }
}

impl EventConfig {
    pub fn flag_lifetime(&self) -> Duration {
        Duration::seconds(self.flag_lifetime_secs)
    }

    pub fn flag_interval(&self) -> Duration {
        Duration::seconds(self.flag_interval_secs)
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world:     WorldConfig,
    pub resources: ResourceConfig,
    pub units:     UnitConfig,
    pub city:      CityConfig,
    pub events:    EventConfig,
}

impl SimConfig {
    /// Load from a JSON file. Missing sections and fields take defaults.
    /// In tests, use SimConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with an unpopulated world, for scenario tests that place
    /// every entity themselves.
    pub fn default_test() -> Self {
        Self {
            world: WorldConfig {
                initial_trees:  0,
                initial_rocks:  0,
                starting_units: false,
                ..WorldConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.world.width < 1 || self.world.height < 1 {
            anyhow::bail!(
                "world dimensions must be positive, got {}x{}",
                self.world.width, self.world.height
            );
        }
        if self.city.production_interval == 0 {
            anyhow::bail!("city.production_interval must be at least 1");
        }
        if self.events.flag_lifetime_secs < 0 || self.events.flag_interval_secs < 0 {
            anyhow::bail!("flag timings must not be negative");
        }
        Ok(())
    }
}
