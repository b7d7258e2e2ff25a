//! Per-fighter combat state machines and the headless bout host that drives
//! them.
//!
//! [`fsm::FighterMachine`] is the core: a 14-state automaton fed with
//! [`components::FighterEvent`]s and emitting [`components::FighterAction`]s.
//! [`systems::Bout`] ticks two of them against each other in a hecs world,
//! and [`scene::Scenario`] scripts a bout from a timeline of intents.

pub mod components;
pub mod config;
pub mod error;
pub mod fsm;
pub mod scene;
pub mod states;
pub mod systems;

pub use error::{ConfigError, FsmError};
pub use fsm::FighterMachine;
pub use states::StateId;
