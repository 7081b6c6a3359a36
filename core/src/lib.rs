//! transit-core: the deterministic simulation engine behind the transit
//! network game. Points of interest, typed routes between them, citizens
//! riding those routes, and the daily economy and objectives around them.

pub mod bootstrap;
pub mod challenge;
pub mod challenge_subsystem;
pub mod citizen;
pub mod clock;
pub mod command;
pub mod config;
pub mod economy_subsystem;
pub mod engine;
pub mod error;
pub mod event;
pub mod map;
pub mod movement_subsystem;
pub mod network;
pub mod pathfinder;
pub mod population_subsystem;
pub mod rng;
pub mod satisfaction_subsystem;
pub mod scheduler;
pub mod scoring;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod subsystem;
pub mod types;
