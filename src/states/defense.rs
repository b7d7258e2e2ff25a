//! BLOCKING, STUNNED, KNOCKED_DOWN and GETTING_UP.

use crate::components::protocol::{FighterAction, FighterEvent, MoveTiming};
use crate::components::FighterContext;

use super::{accept_lock, interrupt, StateId, StatePolicy};

/// Guard up, for at most `max_block_frames`.
pub struct Blocking;

impl StatePolicy for Blocking {
    fn enter(ctx: &mut FighterContext, _timing: Option<MoveTiming>) {
        ctx.clear_attack_intent();
        ctx.state_timer = ctx.tuning.max_block_frames;
        ctx.emit(FighterAction::BlockStarted {
            fighter: ctx.fighter_id,
        });
    }

    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        ctx.tick_timer().then_some(StateId::Idle)
    }

    fn exit(ctx: &mut FighterContext) {
        ctx.emit(FighterAction::BlockEnded {
            fighter: ctx.fighter_id,
        });
    }

    fn handle_event(ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
        match *event {
            FighterEvent::RequestIdle => Some(StateId::Idle),
            // Blocked hits never reach the machine; a delivered one broke the guard.
            FighterEvent::HitReceived { stun_frames, .. } => {
                ctx.emit(FighterAction::GuardBroken {
                    fighter: ctx.fighter_id,
                });
                ctx.state_timer = stun_frames;
                Some(StateId::Stunned)
            }
            _ => interrupt::<Self>(ctx, event),
        }
    }
}

/// Reeling. Further hits re-enter the state with a fresh timer (stun-lock),
/// and a finisher lock overrides the stun.
pub struct Stunned;

impl StatePolicy for Stunned {
    fn enter(ctx: &mut FighterContext, _timing: Option<MoveTiming>) {
        ctx.clear_attack_intent();
    }

    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        ctx.tick_timer().then_some(StateId::Idle)
    }

    fn handle_event(ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
        accept_lock(ctx, event).or_else(|| interrupt::<Self>(ctx, event))
    }
}

/// On the canvas. Nothing gets through.
pub struct KnockedDown;

impl StatePolicy for KnockedDown {
    const STUN_INTERRUPTIBLE: bool = false;
    const KNOCKDOWN_INTERRUPTIBLE: bool = false;

    fn enter(ctx: &mut FighterContext, _timing: Option<MoveTiming>) {
        ctx.clear_attack_intent();
    }

    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        ctx.tick_timer().then_some(StateId::GettingUp)
    }

    fn handle_event(_ctx: &mut FighterContext, _event: &FighterEvent) -> Option<StateId> {
        None
    }
}

/// Rising. Can be caught with a hit, but cannot be knocked down again.
pub struct GettingUp;

impl StatePolicy for GettingUp {
    const KNOCKDOWN_INTERRUPTIBLE: bool = false;

    fn enter(ctx: &mut FighterContext, _timing: Option<MoveTiming>) {
        ctx.clear_attack_intent();
        ctx.state_timer = ctx
            .tuning
            .get_up_duration(ctx.knockdown_count, ctx.comeback_active);
    }

    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        ctx.tick_timer().then_some(StateId::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::FighterId;
    use crate::config::FighterTuning;

    fn ctx() -> FighterContext {
        FighterContext::new(FighterId(3), FighterTuning::default())
    }

    const HIT: FighterEvent = FighterEvent::HitReceived {
        stun_frames: 10,
        damage: 5,
    };

    #[test]
    fn block_is_capped_and_cancellable() {
        let mut ctx = ctx();
        Blocking::enter(&mut ctx, None);
        assert_eq!(ctx.state_timer, 45);
        assert_eq!(
            Blocking::handle_event(&mut ctx, &FighterEvent::RequestIdle),
            Some(StateId::Idle)
        );
    }

    #[test]
    fn hit_through_block_breaks_guard() {
        let mut ctx = ctx();
        assert_eq!(Blocking::handle_event(&mut ctx, &HIT), Some(StateId::Stunned));
        assert_eq!(ctx.state_timer, 10);
        assert_eq!(
            ctx.pending_actions,
            vec![FighterAction::GuardBroken {
                fighter: FighterId(3)
            }]
        );
    }

    #[test]
    fn stun_lock_refreshes_timer() {
        let mut ctx = ctx();
        ctx.state_timer = 2;
        let hit = FighterEvent::HitReceived {
            stun_frames: 9,
            damage: 1,
        };
        assert_eq!(Stunned::handle_event(&mut ctx, &hit), Some(StateId::Stunned));
        assert_eq!(ctx.state_timer, 9);
    }

    #[test]
    fn stun_escalates_to_knockdown() {
        let mut ctx = ctx();
        let event = FighterEvent::Knockdown {
            duration_frames: 40,
        };
        assert_eq!(Stunned::handle_event(&mut ctx, &event), Some(StateId::KnockedDown));
        assert_eq!(ctx.state_timer, 40);
    }

    #[test]
    fn knocked_down_accepts_nothing() {
        let mut ctx = ctx();
        ctx.state_timer = 30;
        for event in [
            HIT,
            FighterEvent::Knockdown { duration_frames: 5 },
            FighterEvent::ReversalReceived { stun_frames: 5 },
            FighterEvent::FinisherLock {
                lock_frames: 70,
                attacker_id: FighterId(4),
            },
            FighterEvent::RequestBlock,
        ] {
            assert_eq!(KnockedDown::handle_event(&mut ctx, &event), None);
        }
        assert_eq!(ctx.state_timer, 30);
    }

    #[test]
    fn knocked_down_rises_into_getting_up() {
        let mut ctx = ctx();
        ctx.state_timer = 1;
        assert_eq!(KnockedDown::update(&mut ctx), Some(StateId::GettingUp));
    }

    #[test]
    fn getting_up_is_stun_vulnerable_but_knockdown_immune() {
        let mut ctx = ctx();
        let knockdown = FighterEvent::Knockdown {
            duration_frames: 40,
        };
        assert_eq!(GettingUp::handle_event(&mut ctx, &knockdown), None);
        assert_eq!(GettingUp::handle_event(&mut ctx, &HIT), Some(StateId::Stunned));
    }

    #[test]
    fn getting_up_reads_synced_counters() {
        let mut ctx = ctx();
        ctx.knockdown_count = 3;
        GettingUp::enter(&mut ctx, None);
        assert_eq!(ctx.state_timer, 32);
    }
}
