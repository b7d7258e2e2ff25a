//! Fighter state catalog.
//!
//! [`StateId`] is the closed set of 14 states. Each variant is backed by a
//! zero-sized policy type implementing [`StatePolicy`]; the policies hold no
//! data of their own and work entirely through the [`FighterContext`] they
//! are handed. Dispatch is an exhaustive `match` (see [`with_policy!`]), so a
//! new state cannot be added without visiting every call site.
//!
//! # Writing the timer
//!
//! A handler or update that picks a data-dependent duration for the next
//! state (stun frames from a hit, lock frames from a finisher) writes
//! `ctx.state_timer` before returning the next id. `enter` only sets fixed
//! or cached durations and never overwrites a timer chosen by the caller.
//! Phase timers of attacks are written by the transition engine
//! (see [`FighterMachine`](crate::fsm::FighterMachine)).

mod attack;
mod combo;
mod defense;
mod finisher;
mod neutral;

use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, EnumString, IntoStaticStr};

use crate::components::protocol::{FighterEvent, MoveTiming};
use crate::components::FighterContext;
use crate::error::FsmError;

pub use attack::{AttackActive, AttackRecovery, AttackWindup};
pub use combo::ComboWindow;
pub use defense::{Blocking, GettingUp, KnockedDown, Stunned};
pub use finisher::{FinisherImpact, FinisherLocked, FinisherSetup};
pub use neutral::{Idle, Moving, Taunting};

/// All discrete states a fighter can be in.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StateId {
    Idle,
    Moving,
    AttackWindup,
    AttackActive,
    AttackRecovery,
    ComboWindow,
    Blocking,
    Stunned,
    KnockedDown,
    GettingUp,
    Taunting,
    FinisherSetup,
    FinisherImpact,
    FinisherLocked,
}

/// Behaviour of one state.
///
/// Every hook has a do-nothing default so a policy only spells out what it
/// actually does. `handle_event` and `update` return the next state, or
/// `None` to stay.
pub trait StatePolicy {
    /// Hits and reversals may move the fighter to STUNNED.
    const STUN_INTERRUPTIBLE: bool = true;
    /// KNOCKDOWN may move the fighter to KNOCKED_DOWN.
    const KNOCKDOWN_INTERRUPTIBLE: bool = true;

    fn enter(_ctx: &mut FighterContext, _timing: Option<MoveTiming>) {}

    fn update(_ctx: &mut FighterContext) -> Option<StateId> {
        None
    }

    fn exit(_ctx: &mut FighterContext) {}

    fn handle_event(ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
        interrupt::<Self>(ctx, event)
    }
}

/// Run `$body` with `$policy` bound to the policy type behind `$id`.
macro_rules! with_policy {
    ($id:expr, |$policy:ident| $body:expr) => {
        match $id {
            StateId::Idle => {
                type $policy = neutral::Idle;
                $body
            }
            StateId::Moving => {
                type $policy = neutral::Moving;
                $body
            }
            StateId::AttackWindup => {
                type $policy = attack::AttackWindup;
                $body
            }
            StateId::AttackActive => {
                type $policy = attack::AttackActive;
                $body
            }
            StateId::AttackRecovery => {
                type $policy = attack::AttackRecovery;
                $body
            }
            StateId::ComboWindow => {
                type $policy = combo::ComboWindow;
                $body
            }
            StateId::Blocking => {
                type $policy = defense::Blocking;
                $body
            }
            StateId::Stunned => {
                type $policy = defense::Stunned;
                $body
            }
            StateId::KnockedDown => {
                type $policy = defense::KnockedDown;
                $body
            }
            StateId::GettingUp => {
                type $policy = defense::GettingUp;
                $body
            }
            StateId::Taunting => {
                type $policy = neutral::Taunting;
                $body
            }
            StateId::FinisherSetup => {
                type $policy = finisher::FinisherSetup;
                $body
            }
            StateId::FinisherImpact => {
                type $policy = finisher::FinisherImpact;
                $body
            }
            StateId::FinisherLocked => {
                type $policy = finisher::FinisherLocked;
                $body
            }
        }
    };
}

impl StateId {
    /// Parse a state name such as `"ATTACK_WINDUP"`.
    ///
    /// An unknown name is a wiring error in the caller, reported as
    /// [`FsmError::UnknownState`].
    pub fn from_name(name: &str) -> Result<Self, FsmError> {
        name.parse()
            .map_err(|_| FsmError::UnknownState(name.to_owned()))
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn stun_interruptible(self) -> bool {
        with_policy!(self, |P| P::STUN_INTERRUPTIBLE)
    }

    pub fn knockdown_interruptible(self) -> bool {
        with_policy!(self, |P| P::KNOCKDOWN_INTERRUPTIBLE)
    }

    /// States that carry an active move and keep the cached phase timing.
    pub fn is_attack_phase(self) -> bool {
        matches!(
            self,
            Self::AttackWindup
                | Self::AttackActive
                | Self::AttackRecovery
                | Self::FinisherSetup
                | Self::FinisherImpact
        )
    }

    /// Whether the movement integrator should apply voluntary velocity.
    pub fn allows_voluntary_movement(self) -> bool {
        matches!(self, Self::Moving)
    }

    /// States in which the fighter is pinned in place: no voluntary movement
    /// and no residual velocity.
    pub fn is_frozen(self) -> bool {
        matches!(
            self,
            Self::Stunned
                | Self::KnockedDown
                | Self::GettingUp
                | Self::FinisherSetup
                | Self::FinisherImpact
                | Self::FinisherLocked
        )
    }

    pub(crate) fn enter(self, ctx: &mut FighterContext, timing: Option<MoveTiming>) {
        with_policy!(self, |P| P::enter(ctx, timing))
    }

    pub(crate) fn update(self, ctx: &mut FighterContext) -> Option<StateId> {
        with_policy!(self, |P| P::update(ctx))
    }

    pub(crate) fn exit(self, ctx: &mut FighterContext) {
        with_policy!(self, |P| P::exit(ctx))
    }

    pub(crate) fn handle_event(self, ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
        with_policy!(self, |P| P::handle_event(ctx, event))
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Forced exits shared by every state, gated by the policy's capability flags.
///
/// - Hit / reversal → STUNNED for the event's stun frames.
/// - Knockdown → KNOCKED_DOWN for the event's duration.
///
/// The finisher lock is not part of this set; see [`accept_lock`].
pub(crate) fn interrupt<P: StatePolicy + ?Sized>(
    ctx: &mut FighterContext,
    event: &FighterEvent,
) -> Option<StateId> {
    match *event {
        FighterEvent::HitReceived { stun_frames, .. }
        | FighterEvent::ReversalReceived { stun_frames }
            if P::STUN_INTERRUPTIBLE =>
        {
            ctx.state_timer = stun_frames;
            Some(StateId::Stunned)
        }
        FighterEvent::Knockdown { duration_frames } if P::KNOCKDOWN_INTERRUPTIBLE => {
            ctx.state_timer = duration_frames;
            Some(StateId::KnockedDown)
        }
        _ => None,
    }
}

/// FINISHER_LOCK → FINISHER_LOCKED for the lock frames, remembering the
/// attacker. Only IDLE, MOVING, STUNNED and TAUNTING call this; every other
/// state lets the lock fall on the floor.
pub(crate) fn accept_lock(ctx: &mut FighterContext, event: &FighterEvent) -> Option<StateId> {
    match *event {
        FighterEvent::FinisherLock {
            lock_frames,
            attacker_id,
        } => {
            ctx.state_timer = lock_frames;
            ctx.finisher_attacker_id = Some(attacker_id);
            Some(StateId::FinisherLocked)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::FighterId;
    use crate::config::FighterTuning;
    use strum::IntoEnumIterator;

    #[test]
    fn catalog_has_fourteen_states() {
        assert_eq!(StateId::COUNT, 14);
        assert_eq!(StateId::iter().count(), 14);
    }

    #[test]
    fn names_round_trip() {
        for state in StateId::iter() {
            assert_eq!(StateId::from_name(state.name()), Ok(state));
        }
        assert_eq!(StateId::from_name("ATTACK_WINDUP"), Ok(StateId::AttackWindup));
    }

    #[test]
    fn unknown_name_is_a_protocol_violation() {
        assert_eq!(
            StateId::from_name("ATACK_WINDUP"),
            Err(FsmError::UnknownState("ATACK_WINDUP".to_owned()))
        );
    }

    #[test]
    fn interruption_matrix() {
        let stun_immune = [
            StateId::KnockedDown,
            StateId::FinisherSetup,
            StateId::FinisherImpact,
            StateId::FinisherLocked,
        ];
        let knockdown_immune = [
            StateId::KnockedDown,
            StateId::GettingUp,
            StateId::FinisherImpact,
            StateId::FinisherLocked,
        ];
        for state in StateId::iter() {
            assert_eq!(state.stun_interruptible(), !stun_immune.contains(&state), "{state}");
            assert_eq!(
                state.knockdown_interruptible(),
                !knockdown_immune.contains(&state),
                "{state}"
            );
        }
    }

    #[test]
    fn finisher_lock_lands_only_on_open_states() {
        let open = [
            StateId::Idle,
            StateId::Moving,
            StateId::Stunned,
            StateId::Taunting,
        ];
        let lock = FighterEvent::FinisherLock {
            lock_frames: 78,
            attacker_id: FighterId(9),
        };
        for state in StateId::iter() {
            let mut ctx = FighterContext::new(FighterId(1), FighterTuning::default());
            let next = state.handle_event(&mut ctx, &lock);
            if open.contains(&state) {
                assert_eq!(next, Some(StateId::FinisherLocked), "{state}");
                assert_eq!(ctx.state_timer, 78);
                assert_eq!(ctx.finisher_attacker_id, Some(FighterId(9)));
            } else {
                assert_eq!(next, None, "{state}");
                assert_eq!(ctx.finisher_attacker_id, None, "{state}");
            }
        }
    }

    #[test]
    fn only_moving_allows_voluntary_movement() {
        let movers: Vec<_> = StateId::iter().filter(|s| s.allows_voluntary_movement()).collect();
        assert_eq!(movers, vec![StateId::Moving]);
        assert!(StateId::iter().filter(|s| s.is_frozen()).all(|s| !s.allows_voluntary_movement()));
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&StateId::FinisherLocked).unwrap(),
            "\"FINISHER_LOCKED\""
        );
    }
}
