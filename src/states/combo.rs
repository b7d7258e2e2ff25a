//! COMBO_WINDOW: a short grace period after recovery in which a follow-up
//! attack skips the cooldown.

use crate::components::protocol::{FighterAction, FighterEvent, MoveTiming};
use crate::components::FighterContext;

use super::{interrupt, StateId, StatePolicy};

pub struct ComboWindow;

impl StatePolicy for ComboWindow {
    fn enter(ctx: &mut FighterContext, _timing: Option<MoveTiming>) {
        let frames = ctx.combo_window_frames;
        // Consumes the arming flags along with the finished move.
        ctx.clear_attack_intent();
        ctx.state_timer = frames;
        ctx.emit(FighterAction::ComboWindowOpened {
            fighter: ctx.fighter_id,
            frames,
        });
    }

    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        if !ctx.tick_timer() {
            return None;
        }
        ctx.emit(FighterAction::ComboWindowExpired {
            fighter: ctx.fighter_id,
        });
        Some(StateId::Idle)
    }

    fn handle_event(ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
        match event {
            // The one path into ATTACK_WINDUP that ignores `attack_cooldown`.
            FighterEvent::RequestComboAttack(req) => {
                ctx.active_move_id = Some(req.move_id.clone());
                ctx.target_id = req.target;
                ctx.emit(FighterAction::ComboChained {
                    fighter: ctx.fighter_id,
                    move_id: req.move_id.clone(),
                });
                Some(StateId::AttackWindup)
            }
            FighterEvent::RequestAttack(req) if ctx.attack_cooldown == 0 => {
                ctx.active_move_id = Some(req.move_id.clone());
                ctx.target_id = req.target;
                Some(StateId::AttackWindup)
            }
            _ => interrupt::<Self>(ctx, event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::protocol::AttackRequest;
    use crate::components::{FighterId, MoveId};
    use crate::config::FighterTuning;

    fn open_window(frames: u32) -> FighterContext {
        let mut ctx = FighterContext::new(FighterId(1), FighterTuning::default());
        ctx.combo_window_pending = true;
        ctx.combo_window_frames = frames;
        ctx.attack_cooldown = 6;
        ComboWindow::enter(&mut ctx, None);
        ctx
    }

    fn request(move_id: &str) -> AttackRequest {
        AttackRequest {
            move_id: MoveId::from(move_id),
            target: Some(FighterId(2)),
            timing: MoveTiming::new(6, 3, 8),
        }
    }

    #[test]
    fn entering_consumes_the_arming_flags() {
        let ctx = open_window(8);
        assert_eq!(ctx.state_timer, 8);
        assert!(!ctx.combo_window_pending);
        assert_eq!(ctx.combo_window_frames, 0);
        assert_eq!(
            ctx.pending_actions,
            vec![FighterAction::ComboWindowOpened {
                fighter: FighterId(1),
                frames: 8,
            }]
        );
    }

    #[test]
    fn combo_request_bypasses_cooldown() {
        let mut ctx = open_window(8);
        let event = FighterEvent::RequestComboAttack(request("cross"));
        assert_eq!(ComboWindow::handle_event(&mut ctx, &event), Some(StateId::AttackWindup));
        assert_eq!(ctx.attack_cooldown, 6);
        assert_eq!(ctx.active_move_id, Some(MoveId::from("cross")));
    }

    #[test]
    fn plain_request_still_respects_cooldown() {
        let mut ctx = open_window(8);
        let event = FighterEvent::RequestAttack(request("cross"));
        assert_eq!(ComboWindow::handle_event(&mut ctx, &event), None);
    }

    #[test]
    fn expiry_drops_the_combo() {
        let mut ctx = open_window(2);
        assert_eq!(ComboWindow::update(&mut ctx), None);
        assert_eq!(ComboWindow::update(&mut ctx), Some(StateId::Idle));
        assert!(matches!(
            ctx.pending_actions.last(),
            Some(FighterAction::ComboWindowExpired { .. })
        ));
    }

    #[test]
    fn getting_hit_breaks_the_combo() {
        let mut ctx = open_window(8);
        let event = FighterEvent::ReversalReceived { stun_frames: 12 };
        assert_eq!(ComboWindow::handle_event(&mut ctx, &event), Some(StateId::Stunned));
        assert_eq!(ctx.state_timer, 12);
    }
}
