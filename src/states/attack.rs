//! The three phases of a normal attack.
//!
//! ```text
//! ATTACK_WINDUP --timer--> ATTACK_ACTIVE --timer--> ATTACK_RECOVERY --timer--> IDLE
//!                                                                  \--> COMBO_WINDOW (armed)
//! ```
//!
//! Active and recovery durations are written by the transition engine from
//! the timing cached off the original request.

use crate::components::protocol::{FighterAction, MoveTiming};
use crate::components::FighterContext;

use super::{StateId, StatePolicy};

/// Telegraph. Any hit, reversal or knockdown cancels the move.
pub struct AttackWindup;

impl StatePolicy for AttackWindup {
    fn enter(ctx: &mut FighterContext, timing: Option<MoveTiming>) {
        ctx.attack_connected = false;
        ctx.state_timer = timing.map_or(0, |t| t.windup_frames);
        if let Some(move_id) = ctx.active_move_id.clone() {
            ctx.emit(FighterAction::EnterAttack {
                fighter: ctx.fighter_id,
                move_id,
                target: ctx.target_id,
            });
        }
    }

    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        ctx.tick_timer().then_some(StateId::AttackActive)
    }
}

/// Hit-resolution window. Combat resolution marks the context when the move
/// connects; the outcome is reported when the window closes.
pub struct AttackActive;

impl StatePolicy for AttackActive {
    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        if !ctx.tick_timer() {
            return None;
        }
        if let Some(move_id) = ctx.active_move_id.clone() {
            let fighter = ctx.fighter_id;
            let action = if ctx.attack_connected {
                FighterAction::AttackLanded { fighter, move_id }
            } else {
                FighterAction::AttackMissed { fighter, move_id }
            };
            ctx.emit(action);
        }
        Some(StateId::AttackRecovery)
    }
}

/// Post-attack vulnerability. Leaving it, by any route, starts the cooldown.
pub struct AttackRecovery;

impl StatePolicy for AttackRecovery {
    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        if !ctx.tick_timer() {
            return None;
        }
        if ctx.combo_window_pending && ctx.combo_window_frames > 0 {
            Some(StateId::ComboWindow)
        } else {
            Some(StateId::Idle)
        }
    }

    fn exit(ctx: &mut FighterContext) {
        ctx.attack_cooldown = ctx.tuning.attack_cooldown_frames;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::protocol::FighterEvent;
    use crate::components::{FighterId, MoveId};
    use crate::config::FighterTuning;

    fn ctx_with_move() -> FighterContext {
        let mut ctx = FighterContext::new(FighterId(7), FighterTuning::default());
        ctx.active_move_id = Some(MoveId::from("cross"));
        ctx.target_id = Some(FighterId(8));
        ctx
    }

    #[test]
    fn windup_uses_cached_timing_and_announces_the_move() {
        let mut ctx = ctx_with_move();
        AttackWindup::enter(&mut ctx, Some(MoveTiming::new(6, 3, 8)));
        assert_eq!(ctx.state_timer, 6);
        assert_eq!(
            ctx.pending_actions,
            vec![FighterAction::EnterAttack {
                fighter: FighterId(7),
                move_id: MoveId::from("cross"),
                target: Some(FighterId(8)),
            }]
        );
    }

    #[test]
    fn windup_counts_down_to_active() {
        let mut ctx = ctx_with_move();
        ctx.state_timer = 2;
        assert_eq!(AttackWindup::update(&mut ctx), None);
        assert_eq!(AttackWindup::update(&mut ctx), Some(StateId::AttackActive));
    }

    #[test]
    fn windup_is_cancelled_by_hits() {
        let mut ctx = ctx_with_move();
        let hit = FighterEvent::HitReceived {
            stun_frames: 10,
            damage: 5,
        };
        assert_eq!(AttackWindup::handle_event(&mut ctx, &hit), Some(StateId::Stunned));
        assert_eq!(ctx.state_timer, 10);
    }

    #[test]
    fn active_reports_landed_or_missed() {
        let mut ctx = ctx_with_move();
        ctx.state_timer = 1;
        assert_eq!(AttackActive::update(&mut ctx), Some(StateId::AttackRecovery));
        assert!(matches!(ctx.pending_actions[0], FighterAction::AttackMissed { .. }));

        let mut ctx = ctx_with_move();
        ctx.state_timer = 1;
        ctx.attack_connected = true;
        AttackActive::update(&mut ctx);
        assert!(matches!(ctx.pending_actions[0], FighterAction::AttackLanded { .. }));
    }

    #[test]
    fn recovery_chooses_combo_window_only_when_armed() {
        let mut ctx = ctx_with_move();
        ctx.state_timer = 1;
        assert_eq!(AttackRecovery::update(&mut ctx), Some(StateId::Idle));

        ctx.state_timer = 1;
        ctx.combo_window_pending = true;
        ctx.combo_window_frames = 0;
        assert_eq!(AttackRecovery::update(&mut ctx), Some(StateId::Idle));

        ctx.state_timer = 1;
        ctx.combo_window_frames = 8;
        assert_eq!(AttackRecovery::update(&mut ctx), Some(StateId::ComboWindow));
    }

    #[test]
    fn recovery_exit_starts_cooldown() {
        let mut ctx = ctx_with_move();
        AttackRecovery::exit(&mut ctx);
        assert_eq!(ctx.attack_cooldown, 6);
    }
}
