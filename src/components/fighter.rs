use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::protocol::FighterAction;
use crate::config::FighterTuning;

/// Stable identity of one combat participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FighterId(pub u32);

impl fmt::Display for FighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fighter#{}", self.0)
    }
}

/// Name of a move in the move table (`"jab"`, `"hook"`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(pub String);

impl MoveId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MoveId {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Fighter context
// ---------------------------------------------------------------------------

/// Mutable per-fighter blackboard.
///
/// States are zero-sized policies; everything they remember between ticks
/// lives here. The owning [`FighterMachine`](crate::fsm::FighterMachine) lends
/// it out by `&mut` for the duration of one state call and never shares it.
#[derive(Clone, Debug)]
pub struct FighterContext {
    pub fighter_id: FighterId,
    /// Frames remaining in the current state. Countdown for timed states,
    /// zero for event-driven ones (IDLE, MOVING).
    pub state_timer: u32,
    /// Frames before a plain attack request is accepted again.
    pub attack_cooldown: u32,

    pub active_move_id: Option<MoveId>,
    pub target_id: Option<FighterId>,

    pub move_target_x: f32,
    /// Last position reported by the movement integrator.
    pub position_x: f32,
    pub move_speed: f32,

    // Synced from outside; read-only as far as states are concerned.
    pub comeback_active: bool,
    pub knockdown_count: u32,

    /// Armed by the host before recovery ends to continue into a combo window.
    pub combo_window_pending: bool,
    pub combo_window_frames: u32,
    /// Set by combat resolution when the current active phase connected.
    pub attack_connected: bool,

    pub finisher_active: bool,
    pub finisher_locked: bool,
    pub finisher_attacker_id: Option<FighterId>,

    pub tuning: FighterTuning,

    /// Outbound actions, drained by the host once per tick.
    pub pending_actions: Vec<FighterAction>,
}

impl FighterContext {
    pub fn new(fighter_id: FighterId, tuning: FighterTuning) -> Self {
        Self {
            fighter_id,
            state_timer: 0,
            attack_cooldown: 0,
            active_move_id: None,
            target_id: None,
            move_target_x: 0.0,
            position_x: 0.0,
            move_speed: 0.0,
            comeback_active: false,
            knockdown_count: 0,
            combo_window_pending: false,
            combo_window_frames: 0,
            attack_connected: false,
            finisher_active: false,
            finisher_locked: false,
            finisher_attacker_id: None,
            tuning,
            pending_actions: Vec::new(),
        }
    }

    /// Append an outbound action.
    pub fn emit(&mut self, action: FighterAction) {
        self.pending_actions.push(action);
    }

    /// Forget the move, target and combo arming of any attack or finisher in
    /// progress. Called on entry to every non-attack state.
    pub fn clear_attack_intent(&mut self) {
        self.active_move_id = None;
        self.target_id = None;
        self.attack_connected = false;
        self.finisher_active = false;
        self.combo_window_pending = false;
        self.combo_window_frames = 0;
    }

    /// Count the timer down by one frame. Returns `true` once it reaches zero.
    pub fn tick_timer(&mut self) -> bool {
        self.state_timer = self.state_timer.saturating_sub(1);
        self.state_timer == 0
    }
}
