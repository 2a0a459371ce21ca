//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SubsystemRng instances derived
//! from the single master seed given to the engine.
//!
//! Each subsystem gets its own RNG stream per tick, seeded from
//! (master_seed, subsystem_index, tick, stream). This means:
//!   - Adding a new subsystem never changes existing subsystems' streams.
//!   - Each subsystem's stream is fully reproducible in isolation.

use crate::types::Tick;
use rand::{seq::SliceRandom, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single subsystem.
pub struct SubsystemRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create a subsystem RNG from the master seed and a stable
    /// subsystem index. The index must never change once assigned.
    pub fn new(master_seed: u64, subsystem_index: u64) -> Self {
        let derived_seed = master_seed ^ (subsystem_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n). Returns 0 when n == 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    /// Uniform index into a collection of `len` items.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.next_u64_below(len as u64) as usize)
        }
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Fisher–Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

/// All subsystem RNGs for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// The stream a subsystem uses during `tick`.
    pub fn for_subsystem_at_tick(&self, slot: SubsystemSlot, tick: Tick) -> SubsystemRng {
        self.for_stream(slot, tick, 0)
    }

    /// An independent stream within a tick, e.g. one per player command.
    pub fn for_stream(&self, slot: SubsystemSlot, tick: Tick, stream: u64) -> SubsystemRng {
        let tick_mix = tick.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        let stream_mix = stream.wrapping_mul(0x94d0_49bb_1331_11eb);
        SubsystemRng::new(self.master_seed ^ tick_mix ^ stream_mix, slot as u64)
            .with_name(slot.name())
    }
}

/// Stable subsystem slot assignments.
/// NEVER reorder or remove entries. Only append.
/// Reordering changes every subsystem's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    Setup = 0,
    Flag = 1,
    Unit = 2,
    Resource = 3,
    Collectable = 4,
    City = 5,
    Combat = 6,
    Command = 7,
    // Append new subsystems here.
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Flag => "flag",
            Self::Unit => "unit",
            Self::Resource => "resource",
            Self::Collectable => "collectable",
            Self::City => "city",
            Self::Combat => "combat",
            Self::Command => "command",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_slot_and_tick_give_same_stream() {
        let bank = RngBank::new(12345);
        let mut a = bank.for_subsystem_at_tick(SubsystemSlot::Combat, 7);
        let mut b = bank.for_subsystem_at_tick(SubsystemSlot::Combat, 7);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn ticks_and_slots_diverge() {
        let bank = RngBank::new(12345);
        let a = bank.for_subsystem_at_tick(SubsystemSlot::Unit, 1).next_u64();
        let b = bank.for_subsystem_at_tick(SubsystemSlot::Unit, 2).next_u64();
        let c = bank.for_subsystem_at_tick(SubsystemSlot::City, 1).next_u64();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn bounded_draws_stay_in_range() {
        let mut rng = RngBank::new(1).for_subsystem_at_tick(SubsystemSlot::Setup, 0);
        for _ in 0..1000 {
            assert!(rng.next_u64_below(4) < 4);
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f));
        }
        assert_eq!(rng.pick_index(0), None);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = RngBank::new(9).for_subsystem_at_tick(SubsystemSlot::Unit, 3);
        let mut items: Vec<u32> = (0..8).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..8).collect::<Vec<_>>());
    }
}
