use glam::Vec3;
use hecs::World;

use crate::components::{Corner, FighterId, LocalTransform, Velocity};
use crate::fsm::FighterMachine;

/// Half-width of the ring along the fight axis.
pub const RING_HALF_WIDTH: f32 = 5.0;

/// Per-tick velocity retained by a fighter that is neither walking nor frozen.
const SLIDE_DAMPING: f32 = 0.5;

/// Closer than this to the move target counts as arrived.
const ARRIVAL_EPSILON: f32 = 1e-3;

/// Integrate fighter positions for one tick and mirror them into the machines.
///
/// Three movement modes, picked from the machine's current state:
/// - **Walking** (MOVING): head for `move_target_x` at `move_speed`, never
///   overshooting.
/// - **Frozen** (stun, knockdown, finisher states): velocity is zeroed.
/// - **Other** (idle, attacking, blocking, taunting): residual velocity
///   decays so a fighter that stops walking slides briefly.
///
/// Returns the fighters that reached their move target this tick. A target
/// beyond the ropes counts as reached at the ropes.
pub fn movement_system(world: &mut World) -> Vec<FighterId> {
    let mut arrived = Vec::new();

    for (_entity, (corner, local, vel, fsm)) in world.query_mut::<(
        &Corner,
        &mut LocalTransform,
        &mut Velocity,
        &mut FighterMachine,
    )>() {
        let state = fsm.state();
        let target_x = fsm
            .context()
            .move_target_x
            .clamp(-RING_HALF_WIDTH, RING_HALF_WIDTH);
        if state.allows_voluntary_movement() {
            let dx = target_x - local.position.x;
            let step = fsm.context().move_speed.abs().min(dx.abs());
            vel.0 = Vec3::new(step.copysign(dx), 0.0, 0.0);
        } else if state.is_frozen() {
            vel.0 = Vec3::ZERO;
        } else {
            vel.0 *= SLIDE_DAMPING;
            if vel.0.length_squared() < ARRIVAL_EPSILON * ARRIVAL_EPSILON {
                vel.0 = Vec3::ZERO;
            }
        }

        local.position += vel.0;
        local.position.x = local.position.x.clamp(-RING_HALF_WIDTH, RING_HALF_WIDTH);
        fsm.set_position_x(local.position.x);

        if state.allows_voluntary_movement() && (target_x - local.position.x).abs() < ARRIVAL_EPSILON {
            arrived.push(corner.id);
        }
    }

    arrived
}
