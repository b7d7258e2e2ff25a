//! Combat resolution: the host-side layer that decides whether a strike
//! connects and turns the outcome into events for the defender's machine.
//!
//! Machines never inspect each other; everything here reads one fighter,
//! lets go of it, then touches the other.

use hecs::{Entity, World};
use serde::Serialize;

use crate::components::{BoutStats, FighterEvent, FighterId, Health, LocalTransform};
use crate::config::{FinisherSpec, MoveTable};
use crate::fsm::FighterMachine;
use crate::states::StateId;

/// What happened when a move's active phase opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeOutcome {
    /// No move in flight or the move is not in the table.
    NoMove,
    OutOfReach,
    Blocked,
    /// In reach, but the defender's state is immune to this kind of hit.
    Absorbed,
    Connected { damage: u32, knockdown: bool },
}

/// Resolve the strike `attacker` just brought into ATTACK_ACTIVE against
/// `defender`.
pub fn resolve_strike(
    world: &mut World,
    moves: &MoveTable,
    attacker: Entity,
    defender: Entity,
) -> StrikeOutcome {
    let (move_id, attacker_x) = match world.get::<&FighterMachine>(attacker) {
        Ok(fsm) => match fsm.active_move_id() {
            Some(move_id) => (move_id.clone(), fsm.position_x()),
            None => return StrikeOutcome::NoMove,
        },
        Err(_) => return StrikeOutcome::NoMove,
    };
    let Some(spec) = moves.get(move_id.as_str()) else {
        return StrikeOutcome::NoMove;
    };

    let (defender_x, defender_state) = match (
        world.get::<&LocalTransform>(defender),
        world.get::<&FighterMachine>(defender),
    ) {
        (Ok(local), Ok(fsm)) => (local.position.x, fsm.state()),
        _ => return StrikeOutcome::NoMove,
    };

    if (defender_x - attacker_x).abs() > spec.reach {
        return StrikeOutcome::OutOfReach;
    }
    if defender_state == StateId::Blocking {
        if let Ok(mut stats) = world.get::<&mut BoutStats>(defender) {
            stats.hits_blocked += 1;
        }
        return StrikeOutcome::Blocked;
    }

    let knockdown = spec.knockdown_frames.is_some();
    let lands = if knockdown {
        defender_state.knockdown_interruptible()
    } else {
        defender_state.stun_interruptible()
    };
    if !lands {
        return StrikeOutcome::Absorbed;
    }

    let event = match spec.knockdown_frames {
        Some(duration_frames) => FighterEvent::Knockdown { duration_frames },
        None => FighterEvent::HitReceived {
            stun_frames: spec.stun_frames,
            damage: spec.damage,
        },
    };
    if let Ok(mut fsm) = world.get::<&mut FighterMachine>(defender) {
        fsm.push_event(event);
    }
    if let Ok(mut health) = world.get::<&mut Health>(defender) {
        health.apply_damage(spec.damage);
    }

    if let Ok(mut fsm) = world.get::<&mut FighterMachine>(attacker) {
        fsm.mark_attack_connected();
        if spec.combo_window_frames > 0 {
            fsm.set_combo_window(spec.combo_window_frames);
        }
    }
    if let Ok(mut stats) = world.get::<&mut BoutStats>(attacker) {
        stats.damage_dealt = stats.damage_dealt.saturating_add(spec.damage);
        stats.hits_landed += 1;
    }

    StrikeOutcome::Connected {
        damage: spec.damage,
        knockdown,
    }
}

/// Deliver the finisher's impact to the locked defender and book the damage.
pub fn resolve_finisher_impact(
    world: &mut World,
    finisher: &FinisherSpec,
    attacker: Entity,
    defender: Entity,
) {
    if let Ok(mut fsm) = world.get::<&mut FighterMachine>(defender) {
        fsm.push_event(FighterEvent::FinisherImpactReceived {
            stun_frames: finisher.stun_frames,
            damage: finisher.damage,
            knockdown_forced: finisher.knockdown_forced,
        });
    }
    if let Ok(mut health) = world.get::<&mut Health>(defender) {
        health.apply_damage(finisher.damage);
    }
    if let Ok(mut stats) = world.get::<&mut BoutStats>(attacker) {
        stats.damage_dealt = stats.damage_dealt.saturating_add(finisher.damage);
        stats.finishers_landed += 1;
    }
}

/// Tell the locked defender its counter worked.
pub fn resolve_finisher_counter(world: &mut World, defender: Entity) {
    if let Ok(mut fsm) = world.get::<&mut FighterMachine>(defender) {
        fsm.push_event(FighterEvent::FinisherCounterSuccess);
    }
    if let Ok(mut stats) = world.get::<&mut BoutStats>(defender) {
        stats.finishers_countered += 1;
    }
}

/// Lock `defender` for the duration announced by `attacker`'s finisher setup.
pub fn relay_finisher_lock(
    world: &mut World,
    attacker: FighterId,
    defender: Entity,
    lock_frames: u32,
) {
    if let Ok(mut fsm) = world.get::<&mut FighterMachine>(defender) {
        fsm.push_event(FighterEvent::FinisherLock {
            lock_frames,
            attacker_id: attacker,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{AttackRequest, Corner, Velocity};
    use crate::config::FighterTuning;
    use glam::Vec3;

    fn spawn(world: &mut World, id: u32, x: f32) -> Entity {
        let mut fsm = FighterMachine::new(FighterId(id), FighterTuning::default());
        fsm.set_position_x(x);
        world.spawn((
            Corner {
                id: FighterId(id),
                name: format!("f{id}"),
                opponent: FighterId(1 - id),
            },
            LocalTransform::at_x(x),
            Velocity(Vec3::ZERO),
            Health::new(100),
            BoutStats::default(),
            fsm,
        ))
    }

    fn start_attack(world: &mut World, entity: Entity, move_id: &str) {
        let moves = MoveTable::default();
        let req: AttackRequest = moves.attack_request(move_id, Some(FighterId(1))).unwrap();
        let mut fsm = world.get::<&mut FighterMachine>(entity).unwrap();
        fsm.push_event(FighterEvent::RequestAttack(req));
        fsm.process_events();
    }

    fn send(world: &mut World, entity: Entity, event: FighterEvent) {
        let mut fsm = world.get::<&mut FighterMachine>(entity).unwrap();
        fsm.push_event(event);
        fsm.process_events();
    }

    #[test]
    fn jab_in_reach_connects_and_arms_combo() {
        let mut world = World::new();
        let a = spawn(&mut world, 0, 0.0);
        let d = spawn(&mut world, 1, 1.0);
        start_attack(&mut world, a, "jab");

        let outcome = resolve_strike(&mut world, &MoveTable::default(), a, d);
        assert_eq!(
            outcome,
            StrikeOutcome::Connected {
                damage: 5,
                knockdown: false
            }
        );
        assert_eq!(world.get::<&Health>(d).unwrap().current, 95);
        assert_eq!(world.get::<&BoutStats>(a).unwrap().hits_landed, 1);

        let attacker = world.get::<&FighterMachine>(a).unwrap();
        assert!(attacker.context().attack_connected);
        assert!(attacker.context().combo_window_pending);
        assert_eq!(attacker.context().combo_window_frames, 8);
        drop(attacker);

        let defender = world.get::<&FighterMachine>(d).unwrap();
        assert_eq!(defender.pending_event_count(), 1);
    }

    #[test]
    fn out_of_reach_whiffs() {
        let mut world = World::new();
        let a = spawn(&mut world, 0, -2.0);
        let d = spawn(&mut world, 1, 2.0);
        start_attack(&mut world, a, "jab");
        assert_eq!(
            resolve_strike(&mut world, &MoveTable::default(), a, d),
            StrikeOutcome::OutOfReach
        );
        assert_eq!(world.get::<&Health>(d).unwrap().current, 100);
    }

    #[test]
    fn blocking_defender_takes_nothing() {
        let mut world = World::new();
        let a = spawn(&mut world, 0, 0.0);
        let d = spawn(&mut world, 1, 1.0);
        send(&mut world, d, FighterEvent::RequestBlock);
        start_attack(&mut world, a, "jab");
        assert_eq!(
            resolve_strike(&mut world, &MoveTable::default(), a, d),
            StrikeOutcome::Blocked
        );
        assert_eq!(world.get::<&BoutStats>(d).unwrap().hits_blocked, 1);
        assert_eq!(world.get::<&FighterMachine>(d).unwrap().pending_event_count(), 0);
    }

    #[test]
    fn knocked_down_defender_absorbs() {
        let mut world = World::new();
        let a = spawn(&mut world, 0, 0.0);
        let d = spawn(&mut world, 1, 1.0);
        send(&mut world, d, FighterEvent::Knockdown { duration_frames: 30 });
        start_attack(&mut world, a, "jab");
        assert_eq!(
            resolve_strike(&mut world, &MoveTable::default(), a, d),
            StrikeOutcome::Absorbed
        );
    }

    #[test]
    fn uppercut_delivers_knockdown() {
        let mut world = World::new();
        let a = spawn(&mut world, 0, 0.0);
        let d = spawn(&mut world, 1, 0.5);
        start_attack(&mut world, a, "uppercut");
        assert_eq!(
            resolve_strike(&mut world, &MoveTable::default(), a, d),
            StrikeOutcome::Connected {
                damage: 16,
                knockdown: true
            }
        );
        let mut defender = world.get::<&mut FighterMachine>(d).unwrap();
        defender.process_events();
        assert_eq!(defender.state(), StateId::KnockedDown);
        assert_eq!(defender.state_timer(), 50);
    }

    #[test]
    fn finisher_impact_books_damage() {
        let mut world = World::new();
        let a = spawn(&mut world, 0, 0.0);
        let d = spawn(&mut world, 1, 1.0);
        relay_finisher_lock(&mut world, FighterId(0), d, 78);
        resolve_finisher_impact(&mut world, &FinisherSpec::default(), a, d);

        let mut defender = world.get::<&mut FighterMachine>(d).unwrap();
        defender.process_events();
        assert_eq!(defender.state(), StateId::KnockedDown);
        drop(defender);
        assert_eq!(world.get::<&Health>(d).unwrap().current, 68);
        assert_eq!(world.get::<&BoutStats>(a).unwrap().finishers_landed, 1);
    }
}
