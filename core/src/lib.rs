pub mod behavior;
pub mod city;
pub mod city_subsystem;
pub mod clock;
pub mod collectable;
pub mod collectable_subsystem;
pub mod combat_subsystem;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod faction;
pub mod flag_subsystem;
pub mod geometry;
pub mod resource;
pub mod resource_subsystem;
pub mod rng;
pub mod snapshot;
pub mod sowing;
pub mod standings;
pub mod subsystem;
pub mod types;
pub mod unit;
pub mod unit_subsystem;
pub mod world;
