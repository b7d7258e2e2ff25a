//! Messages crossing the machine boundary.
//!
//! [`FighterEvent`]s flow in (requests from the decision layer, facts from
//! combat resolution, finisher relays from the opponent's machine).
//! [`FighterAction`]s flow out to the reducer and presentation consumers.
//! The two vocabularies never overlap.

use serde::{Deserialize, Serialize};

use crate::components::fighter::{FighterId, MoveId};
use crate::states::StateId;

/// Frame counts of the three phases of a move.
///
/// Finishers reuse the same shape: setup maps to windup, impact to active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTiming {
    pub windup_frames: u32,
    pub active_frames: u32,
    pub recovery_frames: u32,
}

impl MoveTiming {
    pub const fn new(windup_frames: u32, active_frames: u32, recovery_frames: u32) -> Self {
        Self {
            windup_frames,
            active_frames,
            recovery_frames,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackRequest {
    pub move_id: MoveId,
    #[serde(default)]
    pub target: Option<FighterId>,
    #[serde(flatten)]
    pub timing: MoveTiming,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinisherRequest {
    pub move_id: MoveId,
    #[serde(default)]
    pub target: Option<FighterId>,
    pub setup_frames: u32,
    pub impact_frames: u32,
    pub recovery_frames: u32,
}

impl FinisherRequest {
    pub fn timing(&self) -> MoveTiming {
        MoveTiming::new(self.setup_frames, self.impact_frames, self.recovery_frames)
    }
}

/// Inbound message. Pushed by the host, drained by the machine in FIFO order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FighterEvent {
    RequestAttack(AttackRequest),
    RequestComboAttack(AttackRequest),
    RequestBlock,
    RequestIdle,
    RequestMove {
        target_x: f32,
        speed: f32,
    },
    RequestTaunt,
    HitReceived {
        stun_frames: u32,
        damage: u32,
    },
    Knockdown {
        duration_frames: u32,
    },
    ReversalReceived {
        stun_frames: u32,
    },
    RequestFinisher(FinisherRequest),
    FinisherLock {
        lock_frames: u32,
        attacker_id: FighterId,
    },
    FinisherImpactReceived {
        stun_frames: u32,
        damage: u32,
        knockdown_forced: bool,
    },
    CounterFinisher {
        stun_frames: u32,
    },
    FinisherCounterSuccess,
}

impl FighterEvent {
    /// Phase durations carried by an attack or finisher request.
    pub fn move_timing(&self) -> Option<MoveTiming> {
        match self {
            Self::RequestAttack(req) | Self::RequestComboAttack(req) => Some(req.timing),
            Self::RequestFinisher(req) => Some(req.timing()),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestAttack(_) => "REQUEST_ATTACK",
            Self::RequestComboAttack(_) => "REQUEST_COMBO_ATTACK",
            Self::RequestBlock => "REQUEST_BLOCK",
            Self::RequestIdle => "REQUEST_IDLE",
            Self::RequestMove { .. } => "REQUEST_MOVE",
            Self::RequestTaunt => "REQUEST_TAUNT",
            Self::HitReceived { .. } => "HIT_RECEIVED",
            Self::Knockdown { .. } => "KNOCKDOWN",
            Self::ReversalReceived { .. } => "REVERSAL_RECEIVED",
            Self::RequestFinisher(_) => "REQUEST_FINISHER",
            Self::FinisherLock { .. } => "FINISHER_LOCK",
            Self::FinisherImpactReceived { .. } => "FINISHER_IMPACT_RECEIVED",
            Self::CounterFinisher { .. } => "COUNTER_FINISHER",
            Self::FinisherCounterSuccess => "FINISHER_COUNTER_SUCCESS",
        }
    }
}

/// Outbound fact emitted by a machine. Every action names the fighter that
/// emitted it so a merged log stays readable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FighterAction {
    Transition {
        fighter: FighterId,
        from: StateId,
        to: StateId,
    },

    // Move phases
    EnterAttack {
        fighter: FighterId,
        move_id: MoveId,
        target: Option<FighterId>,
    },
    AttackLanded {
        fighter: FighterId,
        move_id: MoveId,
    },
    AttackMissed {
        fighter: FighterId,
        move_id: MoveId,
    },

    // Block / taunt / move markers
    BlockStarted {
        fighter: FighterId,
    },
    BlockEnded {
        fighter: FighterId,
    },
    GuardBroken {
        fighter: FighterId,
    },
    TauntStarted {
        fighter: FighterId,
    },
    TauntCompleted {
        fighter: FighterId,
        momentum: u32,
    },
    MoveStarted {
        fighter: FighterId,
        target_x: f32,
    },
    MoveStopped {
        fighter: FighterId,
    },

    // Combo markers
    ComboWindowOpened {
        fighter: FighterId,
        frames: u32,
    },
    ComboWindowExpired {
        fighter: FighterId,
    },
    ComboChained {
        fighter: FighterId,
        move_id: MoveId,
    },

    // Finisher markers
    FinisherSetupStart {
        fighter: FighterId,
        move_id: MoveId,
        target: Option<FighterId>,
        /// Setup plus impact frames; the host forwards this as the
        /// opponent's `FINISHER_LOCK`.
        lock_frames: u32,
    },
    FinisherImpactStart {
        fighter: FighterId,
        move_id: MoveId,
        target: Option<FighterId>,
    },
    FinisherLocked {
        fighter: FighterId,
        attacker: FighterId,
    },
    FinisherCountered {
        fighter: FighterId,
        target: Option<FighterId>,
    },
    FinisherCompleted {
        fighter: FighterId,
    },
}

impl FighterAction {
    pub fn fighter(&self) -> FighterId {
        match self {
            Self::Transition { fighter, .. }
            | Self::EnterAttack { fighter, .. }
            | Self::AttackLanded { fighter, .. }
            | Self::AttackMissed { fighter, .. }
            | Self::BlockStarted { fighter }
            | Self::BlockEnded { fighter }
            | Self::GuardBroken { fighter }
            | Self::TauntStarted { fighter }
            | Self::TauntCompleted { fighter, .. }
            | Self::MoveStarted { fighter, .. }
            | Self::MoveStopped { fighter }
            | Self::ComboWindowOpened { fighter, .. }
            | Self::ComboWindowExpired { fighter }
            | Self::ComboChained { fighter, .. }
            | Self::FinisherSetupStart { fighter, .. }
            | Self::FinisherImpactStart { fighter, .. }
            | Self::FinisherLocked { fighter, .. }
            | Self::FinisherCountered { fighter, .. }
            | Self::FinisherCompleted { fighter } => *fighter,
        }
    }

    /// `Some((from, to))` for transition records.
    pub fn as_transition(&self) -> Option<(StateId, StateId)> {
        match self {
            Self::Transition { from, to, .. } => Some((*from, *to)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finisher_request_maps_setup_and_impact_onto_move_phases() {
        let event = FighterEvent::RequestFinisher(FinisherRequest {
            move_id: MoveId::from("haymaker"),
            target: Some(FighterId(2)),
            setup_frames: 48,
            impact_frames: 30,
            recovery_frames: 42,
        });
        assert_eq!(event.move_timing(), Some(MoveTiming::new(48, 30, 42)));
        assert_eq!(FighterEvent::RequestBlock.move_timing(), None);
    }

    #[test]
    fn events_parse_from_tagged_json() {
        let event: FighterEvent = serde_json::from_str(
            r#"{"type":"REQUEST_ATTACK","move_id":"jab","windup_frames":3,"active_frames":2,"recovery_frames":4}"#,
        )
        .unwrap();
        match event {
            FighterEvent::RequestAttack(req) => {
                assert_eq!(req.move_id.as_str(), "jab");
                assert_eq!(req.target, None);
                assert_eq!(req.timing, MoveTiming::new(3, 2, 4));
            }
            other => panic!("unexpected event {other:?}"),
        }

        let event: FighterEvent =
            serde_json::from_str(r#"{"type":"HIT_RECEIVED","stun_frames":10,"damage":5}"#).unwrap();
        assert_eq!(event.name(), "HIT_RECEIVED");
    }
}
