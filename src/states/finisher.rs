//! Finisher choreography.
//!
//! The attacker runs SETUP → IMPACT → ATTACK_RECOVERY while the defender sits
//! in FINISHER_LOCKED. The two machines never see each other; the host relays
//! the attacker's actions to the defender as events:
//!
//! | attacker emits           | defender receives          |
//! |--------------------------|----------------------------|
//! | `FINISHER_SETUP_START`   | `FINISHER_LOCK`            |
//! | `FINISHER_IMPACT_START`  | `FINISHER_IMPACT_RECEIVED` |
//! | `FINISHER_COUNTERED`     | `FINISHER_COUNTER_SUCCESS` |
//!
//! If the defender never hears back, its lock times out into a short stun.

use tracing::warn;

use crate::components::protocol::{FighterAction, FighterEvent, MoveTiming};
use crate::components::FighterContext;

use super::{interrupt, StateId, StatePolicy};

/// Attacker winding up the finisher. Super-armored: shrugs off stun, but a
/// knockdown still gets through.
pub struct FinisherSetup;

impl StatePolicy for FinisherSetup {
    const STUN_INTERRUPTIBLE: bool = false;

    fn enter(ctx: &mut FighterContext, timing: Option<MoveTiming>) {
        let timing = timing.unwrap_or_default();
        ctx.finisher_active = true;
        ctx.state_timer = timing.windup_frames;
        if let Some(move_id) = ctx.active_move_id.clone() {
            ctx.emit(FighterAction::FinisherSetupStart {
                fighter: ctx.fighter_id,
                move_id,
                target: ctx.target_id,
                lock_frames: timing.windup_frames.saturating_add(timing.active_frames),
            });
        }
    }

    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        ctx.tick_timer().then_some(StateId::FinisherImpact)
    }

    fn handle_event(ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
        match *event {
            FighterEvent::CounterFinisher { stun_frames } => {
                ctx.emit(FighterAction::FinisherCountered {
                    fighter: ctx.fighter_id,
                    target: ctx.target_id,
                });
                ctx.state_timer = stun_frames;
                Some(StateId::Stunned)
            }
            _ => interrupt::<Self>(ctx, event),
        }
    }
}

/// The scripted blow lands. Nothing interrupts it.
pub struct FinisherImpact;

impl StatePolicy for FinisherImpact {
    const STUN_INTERRUPTIBLE: bool = false;
    const KNOCKDOWN_INTERRUPTIBLE: bool = false;

    fn enter(ctx: &mut FighterContext, _timing: Option<MoveTiming>) {
        if let Some(move_id) = ctx.active_move_id.clone() {
            ctx.emit(FighterAction::FinisherImpactStart {
                fighter: ctx.fighter_id,
                move_id,
                target: ctx.target_id,
            });
        }
    }

    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        if !ctx.tick_timer() {
            return None;
        }
        ctx.emit(FighterAction::FinisherCompleted {
            fighter: ctx.fighter_id,
        });
        Some(StateId::AttackRecovery)
    }

    fn handle_event(_ctx: &mut FighterContext, _event: &FighterEvent) -> Option<StateId> {
        None
    }
}

/// Defender held in place for the attacker's finisher.
///
/// Only the two terminal events leave this state early. The timer gets one
/// grace tick at zero so a terminal event relayed on the last frame of the
/// lock is still honoured; after that the fighter falls back to a short stun.
pub struct FinisherLocked;

impl StatePolicy for FinisherLocked {
    const STUN_INTERRUPTIBLE: bool = false;
    const KNOCKDOWN_INTERRUPTIBLE: bool = false;

    fn enter(ctx: &mut FighterContext, _timing: Option<MoveTiming>) {
        ctx.clear_attack_intent();
        ctx.finisher_locked = true;
        if let Some(attacker) = ctx.finisher_attacker_id {
            ctx.emit(FighterAction::FinisherLocked {
                fighter: ctx.fighter_id,
                attacker,
            });
        }
    }

    fn update(ctx: &mut FighterContext) -> Option<StateId> {
        if ctx.state_timer > 0 {
            ctx.state_timer -= 1;
            return None;
        }
        warn!(
            fighter = %ctx.fighter_id,
            attacker = ?ctx.finisher_attacker_id,
            "finisher lock expired without a terminal event, falling back to stun"
        );
        ctx.state_timer = ctx.tuning.lock_fallback_stun_frames;
        Some(StateId::Stunned)
    }

    fn exit(ctx: &mut FighterContext) {
        ctx.finisher_locked = false;
        ctx.finisher_attacker_id = None;
    }

    fn handle_event(ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
        match *event {
            FighterEvent::FinisherImpactReceived {
                stun_frames,
                knockdown_forced,
                ..
            } => {
                if knockdown_forced {
                    ctx.state_timer = ctx.tuning.finisher_knockdown_frames;
                    Some(StateId::KnockedDown)
                } else {
                    ctx.state_timer = stun_frames;
                    Some(StateId::Stunned)
                }
            }
            FighterEvent::FinisherCounterSuccess => Some(StateId::Idle),
            _ => None,
        }
    }
}
