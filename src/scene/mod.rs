pub mod prefabs;
pub mod scenario;

pub use prefabs::spawn_fighter;
pub use scenario::{Cue, Expectation, Intent, Mismatch, Scenario, ScenarioOutcome};
