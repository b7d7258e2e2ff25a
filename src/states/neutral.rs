//! IDLE, MOVING and TAUNTING: the light-commitment states.

use tracing::trace;

use crate::components::protocol::{FighterAction, FighterEvent, MoveTiming};
use crate::components::FighterContext;

use super::{accept_lock, interrupt, StateId, StatePolicy};

/// Requests honoured from both neutral states. Also accepts a finisher lock,
/// then falls through to the shared interrupts.
fn neutral_request<P: StatePolicy>(ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
    match event {
        FighterEvent::RequestAttack(req) => {
            // The cooldown is the only anti-spam gate.
            if ctx.attack_cooldown > 0 {
                trace!(
                    fighter = %ctx.fighter_id,
                    cooldown = ctx.attack_cooldown,
                    "attack request rejected by cooldown"
                );
                return None;
            }
            ctx.active_move_id = Some(req.move_id.clone());
            ctx.target_id = req.target;
            Some(StateId::AttackWindup)
        }
        FighterEvent::RequestBlock => Some(StateId::Blocking),
        FighterEvent::RequestMove { target_x, speed } => {
            ctx.move_target_x = *target_x;
            ctx.move_speed = *speed;
            Some(StateId::Moving)
        }
        FighterEvent::RequestTaunt => Some(StateId::Taunting),
        FighterEvent::RequestFinisher(req) => {
            ctx.active_move_id = Some(req.move_id.clone());
            ctx.target_id = req.target;
            Some(StateId::FinisherSetup)
        }
        _ => accept_lock(ctx, event).or_else(|| interrupt::<P>(ctx, event)),
    }
}

/// Standing, waiting for a request.
pub struct Idle;

impl StatePolicy for Idle {
    fn enter(ctx: &mut FighterContext, _timing: Option<MoveTiming>) {
        ctx.clear_attack_intent();
        ctx.state_timer = 0;
        ctx.move_speed = 0.0;
    }

    fn handle_event(ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
        neutral_request::<Self>(ctx, event)
    }
}

/// Walking toward `move_target_x`. Position itself is owned by the movement
/// integrator; this state only marks voluntary movement as active.
pub struct Moving;

impl StatePolicy for Moving {
    fn enter(ctx: &mut FighterContext, _timing: Option<MoveTiming>) {
        ctx.clear_attack_intent();
        ctx.state_timer = 0;
        ctx.emit(FighterAction::MoveStarted {
            fighter: ctx.fighter_id,
            target_x: ctx.move_target_x,
        });
    }

    fn exit(ctx: &mut FighterContext) {
        ctx.move_speed = 0.0;
        ctx.emit(FighterAction::MoveStopped {
            fighter: ctx.fighter_id,
        });
    }

    fn handle_event(ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
        match event {
            // Re-targeting while already walking does not leave the state.
            FighterEvent::RequestMove { target_x, speed } => {
                ctx.move_target_x = *target_x;
                ctx.move_speed = *speed;
                ctx.emit(FighterAction::MoveStarted {
                    fighter: ctx.fighter_id,
                    target_x: *target_x,
                });
                None
            }
            FighterEvent::RequestIdle => Some(StateId::Idle),
            _ => neutral_request::<Self>(ctx, event),
        }
    }
}

/// Showboating. Completing the taunt grants momentum; getting hit during it
/// costs extra stun.
pub struct Taunting;

impl StatePolicy for Taunting {
    fn enter(ctx: &mut FighterContext, _timing: Option<MoveTiming>) {
        ctx.clear_attack_intent();
        ctx.state_timer = ctx.tuning.taunt_frames;
        ctx.emit(FighterAction::TauntStarted {
            fighter: ctx.fighter_id,
        });
    }

    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        if !ctx.tick_timer() {
            return None;
        }
        let momentum = ctx.tuning.momentum_for_taunt(ctx.comeback_active);
        ctx.emit(FighterAction::TauntCompleted {
            fighter: ctx.fighter_id,
            momentum,
        });
        Some(StateId::Idle)
    }

    fn handle_event(ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
        match *event {
            FighterEvent::HitReceived { stun_frames, .. }
            | FighterEvent::ReversalReceived { stun_frames } => {
                ctx.state_timer = ctx.tuning.taunt_stun(stun_frames);
                Some(StateId::Stunned)
            }
            _ => accept_lock(ctx, event).or_else(|| interrupt::<Self>(ctx, event)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::protocol::AttackRequest;
    use crate::components::{FighterId, MoveId};
    use crate::config::FighterTuning;

    fn ctx() -> FighterContext {
        FighterContext::new(FighterId(1), FighterTuning::default())
    }

    fn jab() -> FighterEvent {
        FighterEvent::RequestAttack(AttackRequest {
            move_id: MoveId::from("jab"),
            target: Some(FighterId(2)),
            timing: MoveTiming::new(3, 2, 4),
        })
    }

    #[test]
    fn idle_accepts_attack_when_cooldown_is_clear() {
        let mut ctx = ctx();
        assert_eq!(Idle::handle_event(&mut ctx, &jab()), Some(StateId::AttackWindup));
        assert_eq!(ctx.active_move_id, Some(MoveId::from("jab")));
        assert_eq!(ctx.target_id, Some(FighterId(2)));
    }

    #[test]
    fn idle_rejects_attack_during_cooldown() {
        let mut ctx = ctx();
        ctx.attack_cooldown = 1;
        assert_eq!(Idle::handle_event(&mut ctx, &jab()), None);
        assert!(ctx.active_move_id.is_none());
    }

    #[test]
    fn idle_ignores_combo_requests() {
        let mut ctx = ctx();
        let event = match jab() {
            FighterEvent::RequestAttack(req) => FighterEvent::RequestComboAttack(req),
            _ => unreachable!(),
        };
        assert_eq!(Idle::handle_event(&mut ctx, &event), None);
    }

    #[test]
    fn moving_retargets_without_transition() {
        let mut ctx = ctx();
        let event = FighterEvent::RequestMove {
            target_x: 3.0,
            speed: 0.1,
        };
        assert_eq!(Moving::handle_event(&mut ctx, &event), None);
        assert_eq!(ctx.move_target_x, 3.0);
        assert!(matches!(
            ctx.pending_actions.as_slice(),
            [FighterAction::MoveStarted { target_x, .. }] if *target_x == 3.0
        ));
        assert_eq!(
            Moving::handle_event(&mut ctx, &FighterEvent::RequestIdle),
            Some(StateId::Idle)
        );
    }

    #[test]
    fn taunt_hit_is_penalised() {
        let mut ctx = ctx();
        let hit = FighterEvent::HitReceived {
            stun_frames: 10,
            damage: 3,
        };
        assert_eq!(Taunting::handle_event(&mut ctx, &hit), Some(StateId::Stunned));
        assert_eq!(ctx.state_timer, 15);
    }

    #[test]
    fn taunt_punish_saturates_on_huge_stun() {
        let mut ctx = ctx();
        let hit = FighterEvent::HitReceived {
            stun_frames: u32::MAX,
            damage: 3,
        };
        assert_eq!(Taunting::handle_event(&mut ctx, &hit), Some(StateId::Stunned));
        assert_eq!(ctx.state_timer, u32::MAX);
    }

    #[test]
    fn completed_taunt_grants_momentum() {
        let mut ctx = ctx();
        ctx.comeback_active = true;
        Taunting::enter(&mut ctx, None);
        ctx.pending_actions.clear();
        ctx.state_timer = 1;
        assert_eq!(Taunting::update(&mut ctx), Some(StateId::Idle));
        assert_eq!(
            ctx.pending_actions,
            vec![FighterAction::TauntCompleted {
                fighter: FighterId(1),
                momentum: 15,
            }]
        );
    }
}
