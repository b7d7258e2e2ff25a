use glam::Vec3;
use hecs::{Entity, World};

use crate::components::{BoutStats, Corner, FighterId, Health, LocalTransform, Velocity};
use crate::config::FighterConfig;
use crate::error::FsmError;
use crate::fsm::FighterMachine;

/// Spawn a fighter entity: corner identity, transform, velocity, health,
/// stats and its combat machine.
///
/// Fails if `config.initial_state` does not name a state.
pub fn spawn_fighter(
    world: &mut World,
    id: FighterId,
    opponent: FighterId,
    config: &FighterConfig,
) -> Result<Entity, FsmError> {
    let fsm = FighterMachine::from_config(id, config)?;
    Ok(world.spawn((
        Corner {
            id,
            name: config.name.clone(),
            opponent,
        },
        LocalTransform::at_x(config.start_x),
        Velocity(Vec3::ZERO),
        Health::new(config.health),
        BoutStats::default(),
        fsm,
    )))
}
